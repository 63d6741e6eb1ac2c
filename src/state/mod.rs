use std::sync::Arc;
use std::time::Duration;

use crate::answer::AnswerGenerator;
use crate::core::config::{AppPaths, ConfigService, RagSettings};
use crate::history::HistorySummarizer;
use crate::llm::{LlmProvider, OpenAiCompatProvider};
use crate::pipeline::RagPipeline;
use crate::rag::{PineconeIndex, Retriever, VectorIndex};
use crate::session::SessionStore;

pub mod error;

use error::InitializationError;

/// Process-wide state built once at startup.
///
/// Contains:
/// - The vector index handle (shared with session cleanup)
/// - The assembled RAG pipeline
/// - The per-session history store
#[derive(Clone)]
pub struct AppState {
    pub index: Arc<dyn VectorIndex>,
    pub pipeline: Arc<RagPipeline>,
    pub sessions: SessionStore,
}

impl AppState {
    /// Initializes the application state.
    ///
    /// 1. Loads and validates configuration (files + environment)
    /// 2. Builds the shared HTTP client and provider clients
    /// 3. Ensures the vector index exists and resolves its host
    /// 4. Wires retriever, summarizer, and generator into the pipeline
    pub async fn initialize(paths: Arc<AppPaths>) -> Result<Arc<Self>, InitializationError> {
        let config = ConfigService::new(paths);
        let raw = config.load_config().map_err(InitializationError::Config)?;
        tracing::debug!(
            "Effective configuration: {}",
            config.redact_sensitive_values(&raw)
        );
        let settings = RagSettings::from_config(&raw).map_err(InitializationError::Config)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.http.timeout_secs))
            .build()
            .map_err(InitializationError::HttpClient)?;

        let embedder: Arc<dyn LlmProvider> = Arc::new(OpenAiCompatProvider::new(
            "openai",
            &settings.embedding.base_url,
            settings.embedding.api_key.clone(),
            client.clone(),
        ));
        let completion: Arc<dyn LlmProvider> = Arc::new(OpenAiCompatProvider::new(
            "groq",
            &settings.completion.base_url,
            settings.completion.api_key.clone(),
            client.clone(),
        ));

        let index: Arc<dyn VectorIndex> = Arc::new(
            PineconeIndex::connect(&settings.pinecone, client)
                .await
                .map_err(InitializationError::VectorIndex)?,
        );

        tracing::info!(
            "Using index '{}', embeddings via {} ({}), completions via {} ({})",
            settings.pinecone.index_name,
            embedder.name(),
            settings.embedding.model,
            completion.name(),
            settings.completion.model
        );

        let pipeline = Arc::new(build_pipeline(
            &settings,
            embedder,
            completion,
            index.clone(),
        ));

        Ok(Arc::new(AppState {
            index,
            pipeline,
            sessions: SessionStore::new(),
        }))
    }
}

pub fn build_pipeline(
    settings: &RagSettings,
    embedder: Arc<dyn LlmProvider>,
    completion: Arc<dyn LlmProvider>,
    index: Arc<dyn VectorIndex>,
) -> RagPipeline {
    let retriever = Retriever::new(
        embedder,
        settings.embedding.model.clone(),
        index,
        &settings.retrieval,
        settings.pinecone.text_key.clone(),
    );
    let summarizer =
        HistorySummarizer::new(completion.clone(), &settings.completion, &settings.history);
    let generator = AnswerGenerator::new(completion, &settings.completion);

    RagPipeline::new(retriever, summarizer, generator)
}
