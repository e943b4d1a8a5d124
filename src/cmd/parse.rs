use serde_json::{Value, json};

use crate::context::AppContext;
use crate::error::AppResult;
use crate::infra::image::resolve_image_url;
use crate::workflow::ticket::read_ticket;

#[derive(Debug, Clone)]
pub struct ParseCommandArgs {
    pub image: String,
}

/// Returns the `{"response": ...}` document printed by the CLI.
pub async fn run(ctx: &AppContext, args: ParseCommandArgs) -> AppResult<Value> {
    let image_url = resolve_image_url(&args.image)?;
    let parsed = read_ticket(ctx, &image_url).await?;
    Ok(json!({ "response": parsed.to_array() }))
}
