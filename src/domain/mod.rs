pub mod chat;
pub mod coerce;
pub mod ticket;

pub use ticket::ParsedTicket;
