//! Abstract interface over the hosted vector database.
//!
//! The production implementation is `PineconeIndex` in the `pinecone` module.
//! Chunks are written by the ingestion side; this crate only queries and
//! cleans up by session.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::errors::RagError;

/// A single match returned by a similarity query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkSearchResult {
    pub id: String,
    /// Raw similarity reported by the index (cosine: -1..=1, higher = better).
    pub score: f32,
    #[serde(default)]
    pub metadata: Option<Value>,
}

impl ChunkSearchResult {
    /// Stored chunk text under `text_key` in the match metadata, if any.
    pub fn text(&self, text_key: &str) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get(text_key))
            .and_then(|v| v.as_str())
    }
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Dimension every query vector must have.
    fn dimension(&self) -> usize;

    /// Top `top_k` matches for `vector`, best first, optionally restricted to
    /// vectors whose `session_id` metadata equals `session_id`.
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        session_id: Option<&str>,
    ) -> Result<Vec<ChunkSearchResult>, RagError>;

    /// Delete every vector whose `session_id` metadata equals `session_id`.
    async fn delete_session(&self, session_id: &str) -> Result<(), RagError>;
}
