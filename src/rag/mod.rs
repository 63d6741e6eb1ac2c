//! Retrieval side of the RAG flow.
//!
//! - `VectorIndex`: query/cleanup interface over the hosted vector database
//! - `PineconeIndex`: Pinecone REST implementation
//! - `Retriever`: embeds the question and returns relevant chunk texts

mod pinecone;
mod retriever;
mod store;

pub use pinecone::PineconeIndex;
pub use retriever::{relevance_score, Retriever};
pub use store::{ChunkSearchResult, VectorIndex};
