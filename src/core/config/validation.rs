use super::settings::{ApiKey, RagSettings};
use crate::core::errors::RagError;

pub fn validate_settings(settings: &RagSettings) -> Result<(), RagError> {
    require_key(&settings.pinecone.api_key, "pinecone.api_key", "PINECONE_API_KEY")?;
    require_key(&settings.embedding.api_key, "embedding.api_key", "OPENAI_API_KEY")?;
    require_key(&settings.completion.api_key, "completion.api_key", "GROQ_API_KEY")?;
    require_text(
        &settings.pinecone.index_name,
        "pinecone.index_name",
        "PINECONE_INDEX_NAME",
    )?;
    require_text(&settings.pinecone.region, "pinecone.region", "PINECONE_ENVIRONMENT")?;

    if settings.retrieval.top_k == 0 {
        return Err(RagError::config("retrieval.top_k must be at least 1"));
    }

    let threshold = settings.retrieval.score_threshold;
    if !(0.0..=1.0).contains(&threshold) {
        return Err(RagError::config(format!(
            "retrieval.score_threshold must be between 0 and 1 (got {threshold})"
        )));
    }

    if settings.pinecone.dimension == 0 {
        return Err(RagError::config("pinecone.dimension must be at least 1"));
    }

    Ok(())
}

fn require_key(key: &ApiKey, field: &str, env_var: &str) -> Result<(), RagError> {
    if key.is_empty() {
        return Err(missing(field, env_var));
    }
    Ok(())
}

fn require_text(value: &str, field: &str, env_var: &str) -> Result<(), RagError> {
    if value.trim().is_empty() {
        return Err(missing(field, env_var));
    }
    Ok(())
}

fn missing(field: &str, env_var: &str) -> RagError {
    RagError::config(format!("{field} is required (set {env_var})"))
}
