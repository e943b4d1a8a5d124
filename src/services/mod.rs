pub mod language_model;
pub mod transport;

pub use language_model::LanguageModelService;
pub use transport::{ChatRequest, ChatTransport, TransportResponse};
