pub mod openai_compat;
pub mod provider;
pub mod types;

pub use openai_compat::OpenAiCompatProvider;
pub use provider::LlmProvider;
pub use types::{ChatMessage, ChatRequest, Role};
