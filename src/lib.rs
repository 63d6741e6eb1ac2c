pub mod answer;
pub mod core;
pub mod history;
pub mod llm;
pub mod pipeline;
pub mod rag;
pub mod session;
pub mod state;

#[cfg(test)]
mod testing;

pub use history::ChatHistory;
pub use pipeline::RagPipeline;
