use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::provider::LlmProvider;
use super::types::ChatRequest;
use crate::core::config::ApiKey;
use crate::core::errors::RagError;

/// Client for any endpoint speaking the OpenAI `/v1` chat and embeddings API
/// (OpenAI itself, Groq's `/openai` prefix, local gateways).
#[derive(Clone)]
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: ApiKey,
    client: Client,
}

impl OpenAiCompatProvider {
    pub fn new(name: impl Into<String>, base_url: &str, api_key: ApiKey, client: Client) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        }
    }
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

#[async_trait]
impl LlmProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn chat(&self, request: ChatRequest, model_id: &str) -> Result<String, RagError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let mut body = json!({
            "model": model_id,
            "messages": request.messages,
            "stream": false,
        });

        if let Some(obj) = body.as_object_mut() {
            if let Some(t) = request.temperature { obj.insert("temperature".to_string(), json!(t)); }
            if let Some(t) = request.top_p { obj.insert("top_p".to_string(), json!(t)); }
            if let Some(t) = request.max_tokens { obj.insert("max_tokens".to_string(), json!(t)); }
        }

        let res = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| RagError::http(&self.name, e))?;

        if !res.status().is_success() {
            return Err(RagError::from_response(&self.name, res).await);
        }

        let payload: Value = res.json().await.map_err(|e| RagError::http(&self.name, e))?;

        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| RagError::EmptyCompletion(self.name.clone()))
    }

    async fn embed(&self, inputs: &[String], model_id: &str) -> Result<Vec<Vec<f32>>, RagError> {
        let url = format!("{}/v1/embeddings", self.base_url);

        let body = json!({
            "model": model_id,
            "input": inputs,
        });

        let res = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| RagError::http(&self.name, e))?;

        if !res.status().is_success() {
            return Err(RagError::from_response(&self.name, res).await);
        }

        let mut payload: EmbeddingResponse =
            res.json().await.map_err(|e| RagError::http(&self.name, e))?;
        payload.data.sort_by_key(|item| item.index);

        if payload.data.len() != inputs.len() {
            return Err(RagError::Internal(format!(
                "{} returned {} embeddings for {} inputs",
                self.name,
                payload.data.len(),
                inputs.len()
            )));
        }

        Ok(payload.data.into_iter().map(|item| item.embedding).collect())
    }
}
