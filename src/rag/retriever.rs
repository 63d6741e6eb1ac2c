use std::sync::Arc;

use super::store::{ChunkSearchResult, VectorIndex};
use crate::core::config::RetrievalSettings;
use crate::core::errors::RagError;
use crate::llm::LlmProvider;

/// Embeds a query and pulls matching chunk texts from the vector index.
pub struct Retriever {
    embedder: Arc<dyn LlmProvider>,
    embedding_model: String,
    index: Arc<dyn VectorIndex>,
    top_k: usize,
    score_threshold: f32,
    text_key: String,
}

impl Retriever {
    pub fn new(
        embedder: Arc<dyn LlmProvider>,
        embedding_model: impl Into<String>,
        index: Arc<dyn VectorIndex>,
        settings: &RetrievalSettings,
        text_key: impl Into<String>,
    ) -> Self {
        Self {
            embedder,
            embedding_model: embedding_model.into(),
            index,
            top_k: settings.top_k,
            score_threshold: settings.score_threshold,
            text_key: text_key.into(),
        }
    }

    /// Chunk texts relevant to `query`, best first. Provider failures yield an
    /// empty list. A blank session id searches the whole index.
    pub async fn retrieve(&self, query: &str, session_id: Option<&str>) -> Vec<String> {
        let session_id = session_id.filter(|id| !id.is_empty());
        match self.try_retrieve(query, session_id).await {
            Ok(contents) => {
                tracing::info!("Retrieved {} documents for query", contents.len());
                contents
            }
            Err(err) => {
                tracing::error!("Error retrieving from vector index: {}", err);
                Vec::new()
            }
        }
    }

    async fn try_retrieve(
        &self,
        query: &str,
        session_id: Option<&str>,
    ) -> Result<Vec<String>, RagError> {
        let vector = self
            .embedder
            .embed(&[query.to_string()], &self.embedding_model)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RagError::Internal("embedding provider returned no vector".into()))?;

        let expected = self.index.dimension();
        if vector.len() != expected {
            return Err(RagError::DimensionMismatch {
                expected,
                actual: vector.len(),
            });
        }

        let matches = self.index.query(&vector, self.top_k, session_id).await?;

        Ok(matches
            .iter()
            .filter(|hit| relevance_score(hit.score) >= self.score_threshold)
            .filter_map(|hit| self.content_of(hit))
            .collect())
    }

    fn content_of(&self, hit: &ChunkSearchResult) -> Option<String> {
        let text = hit.text(&self.text_key);
        if text.is_none() {
            tracing::debug!("Match {} has no '{}' metadata, skipping", hit.id, self.text_key);
        }
        text.map(str::to_string)
    }
}

/// Maps a cosine similarity in `[-1, 1]` onto the `[0, 1]` scale the score
/// threshold is expressed in.
pub fn relevance_score(cosine: f32) -> f32 {
    (cosine + 1.0) / 2.0
}
