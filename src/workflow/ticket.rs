use tracing::{info, warn};

use crate::context::AppContext;
use crate::domain::ParsedTicket;
use crate::error::AppResult;
use crate::prompts::NOT_A_TICKET_CODE;

pub async fn read_ticket(ctx: &AppContext, image_url: &str) -> AppResult<ParsedTicket> {
    info!(model = %ctx.config.model, "reading ticket");
    let raw = ctx.language_model.parse_ticket(image_url).await?;
    let parsed = ParsedTicket::from_response(raw)?;

    match &parsed {
        ParsedTicket::Ticket(ticket) => info!(
            merchant = %ticket.nombre,
            total = ticket.total,
            products = ticket.products.len(),
            "ticket parsed"
        ),
        ParsedTicket::Error(error) if error.code == NOT_A_TICKET_CODE => {
            info!(reason = %error.message, "image is not a ticket")
        }
        ParsedTicket::Error(error) => {
            warn!(code = %error.code, reason = %error.message, "model reported an error")
        }
    }

    Ok(parsed)
}
