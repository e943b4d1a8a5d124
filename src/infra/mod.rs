pub mod groq;
pub mod http;
pub mod image;
pub mod llm;
pub mod retry;
