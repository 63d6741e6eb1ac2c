//! Typed view over the merged configuration value.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use super::service::REDACT_PLACEHOLDER;
use super::validation::validate_settings;
use crate::core::errors::RagError;

/// Provider credential. Never printed in full.
#[derive(Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACT_PLACEHOLDER)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RagSettings {
    pub pinecone: PineconeSettings,
    pub retrieval: RetrievalSettings,
    pub embedding: EmbeddingSettings,
    pub completion: CompletionSettings,
    pub history: HistorySettings,
    pub http: HttpSettings,
}

impl RagSettings {
    pub fn from_config(config: &Value) -> Result<Self, RagError> {
        let settings: RagSettings = serde_json::from_value(config.clone())
            .map_err(|e| RagError::config(format!("invalid configuration: {e}")))?;
        validate_settings(&settings)?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PineconeSettings {
    pub api_key: ApiKey,
    pub index_name: String,
    pub region: String,
    pub cloud: String,
    pub dimension: usize,
    pub metric: String,
    pub text_key: String,
    pub control_plane_url: String,
    pub api_version: String,
    pub index_ready_timeout_secs: u64,
}

impl Default for PineconeSettings {
    fn default() -> Self {
        Self {
            api_key: ApiKey::default(),
            index_name: String::new(),
            region: String::new(),
            cloud: "aws".to_string(),
            dimension: 1536,
            metric: "cosine".to_string(),
            text_key: "text".to_string(),
            control_plane_url: "https://api.pinecone.io".to_string(),
            api_version: "2024-07".to_string(),
            index_ready_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub top_k: usize,
    pub score_threshold: f32,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: 5,
            score_threshold: 0.5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub api_key: ApiKey,
    pub base_url: String,
    pub model: String,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            api_key: ApiKey::default(),
            base_url: "https://api.openai.com".to_string(),
            model: "text-embedding-3-small".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompletionSettings {
    pub api_key: ApiKey,
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
    pub summary_temperature: f64,
    pub summary_max_tokens: u32,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            api_key: ApiKey::default(),
            base_url: "https://api.groq.com/openai".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            temperature: 0.2,
            top_p: 0.9,
            max_tokens: 1500,
            summary_temperature: 0.2,
            summary_max_tokens: 400,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Summarize once the history holds more entries than this.
    pub summarize_after: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self { summarize_after: 10 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self { timeout_secs: 60 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn complete_config() -> Value {
        json!({
            "pinecone": { "api_key": "pc", "index_name": "docs", "region": "us-east-1" },
            "embedding": { "api_key": "sk" },
            "completion": { "api_key": "gsk" }
        })
    }

    #[test]
    fn defaults_fill_optional_fields() {
        let settings = RagSettings::from_config(&complete_config()).unwrap();

        assert_eq!(settings.retrieval.top_k, 5);
        assert_eq!(settings.retrieval.score_threshold, 0.5);
        assert_eq!(settings.pinecone.dimension, 1536);
        assert_eq!(settings.pinecone.metric, "cosine");
        assert_eq!(settings.embedding.model, "text-embedding-3-small");
        assert_eq!(settings.completion.model, "llama-3.3-70b-versatile");
        assert_eq!(settings.completion.max_tokens, 1500);
        assert_eq!(settings.history.summarize_after, 10);
    }

    #[test]
    fn api_key_debug_is_redacted() {
        let settings = RagSettings::from_config(&complete_config()).unwrap();
        let printed = format!("{:?}", settings.pinecone);

        assert!(printed.contains("****"));
        assert!(!printed.contains("\"pc\""));
        assert_eq!(settings.pinecone.api_key.expose(), "pc");
    }

    #[test]
    fn wrong_type_is_reported() {
        let mut config = complete_config();
        config["retrieval"] = json!({ "top_k": "many" });

        let err = RagSettings::from_config(&config).unwrap_err();
        assert!(matches!(err, RagError::Config(_)));
    }
}
