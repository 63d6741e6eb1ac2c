//! Pinecone vector index over its REST API.
//!
//! `connect` talks to the control plane once at startup: it creates the
//! index when it does not exist yet, waits for it to report ready, and keeps
//! the data-plane host for subsequent queries.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Value};

use super::store::{ChunkSearchResult, VectorIndex};
use crate::core::config::{ApiKey, PineconeSettings};
use crate::core::errors::RagError;

const PROVIDER: &str = "pinecone";
const READY_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Clone)]
pub struct PineconeIndex {
    client: Client,
    api_key: ApiKey,
    api_version: String,
    index_name: String,
    host_url: String,
    dimension: usize,
}

#[derive(Debug, Deserialize)]
struct IndexDescription {
    #[serde(default)]
    dimension: Option<usize>,
    #[serde(default)]
    host: String,
    #[serde(default)]
    status: IndexStatus,
}

#[derive(Debug, Default, Deserialize)]
struct IndexStatus {
    #[serde(default)]
    ready: bool,
    #[serde(default)]
    state: String,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<ChunkSearchResult>,
}

impl PineconeIndex {
    /// Ensures the configured index exists and resolves its data-plane host.
    pub async fn connect(settings: &PineconeSettings, client: Client) -> Result<Self, RagError> {
        let control = ControlPlane {
            client: &client,
            settings,
            base_url: settings.control_plane_url.trim_end_matches('/'),
        };

        let description = match control.describe().await? {
            Some(existing) => {
                if let Some(dimension) = existing.dimension {
                    if dimension != settings.dimension {
                        tracing::warn!(
                            "Index {} has dimension {} but {} is configured",
                            settings.index_name,
                            dimension,
                            settings.dimension
                        );
                    }
                }
                existing
            }
            None => {
                tracing::info!(
                    "Creating index {} ({} dims, {}, {}/{})",
                    settings.index_name,
                    settings.dimension,
                    settings.metric,
                    settings.cloud,
                    settings.region
                );
                control.create().await?
            }
        };

        let description = if description.status.ready && !description.host.is_empty() {
            description
        } else {
            control.wait_until_ready().await?
        };

        tracing::info!(
            "Connected to index {} at {}",
            settings.index_name,
            description.host
        );

        Ok(Self {
            client,
            api_key: settings.api_key.clone(),
            api_version: settings.api_version.clone(),
            index_name: settings.index_name.clone(),
            host_url: data_plane_url(&description.host),
            dimension: description.dimension.unwrap_or(settings.dimension),
        })
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    fn post(&self, path: &str) -> RequestBuilder {
        with_auth(
            self.client.post(format!("{}{}", self.host_url, path)),
            &self.api_key,
            &self.api_version,
        )
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        session_id: Option<&str>,
    ) -> Result<Vec<ChunkSearchResult>, RagError> {
        let mut body = json!({
            "vector": vector,
            "topK": top_k,
            "includeMetadata": true,
            "includeValues": false,
        });
        if let (Some(obj), Some(session_id)) = (body.as_object_mut(), session_id) {
            obj.insert("filter".to_string(), session_filter(session_id));
        }

        let res = self
            .post("/query")
            .json(&body)
            .send()
            .await
            .map_err(|e| RagError::http(PROVIDER, e))?;

        if !res.status().is_success() {
            return Err(RagError::from_response(PROVIDER, res).await);
        }

        let payload: QueryResponse = res.json().await.map_err(|e| RagError::http(PROVIDER, e))?;
        Ok(payload.matches)
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), RagError> {
        let res = self
            .post("/vectors/delete")
            .json(&json!({ "filter": session_filter(session_id) }))
            .send()
            .await
            .map_err(|e| RagError::http(PROVIDER, e))?;

        if !res.status().is_success() {
            return Err(RagError::from_response(PROVIDER, res).await);
        }

        tracing::info!("Deleted vectors for session {} from {}", session_id, self.index_name);
        Ok(())
    }
}

struct ControlPlane<'a> {
    client: &'a Client,
    settings: &'a PineconeSettings,
    base_url: &'a str,
}

impl ControlPlane<'_> {
    async fn describe(&self) -> Result<Option<IndexDescription>, RagError> {
        let url = format!("{}/indexes/{}", self.base_url, self.settings.index_name);
        let res = with_auth(self.client.get(&url), &self.settings.api_key, &self.settings.api_version)
            .send()
            .await
            .map_err(|e| RagError::http(PROVIDER, e))?;

        if res.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !res.status().is_success() {
            return Err(RagError::from_response(PROVIDER, res).await);
        }

        res.json()
            .await
            .map(Some)
            .map_err(|e| RagError::http(PROVIDER, e))
    }

    async fn create(&self) -> Result<IndexDescription, RagError> {
        let url = format!("{}/indexes", self.base_url);
        let body = json!({
            "name": self.settings.index_name,
            "dimension": self.settings.dimension,
            "metric": self.settings.metric,
            "spec": {
                "serverless": {
                    "cloud": self.settings.cloud,
                    "region": self.settings.region,
                }
            }
        });

        let res = with_auth(self.client.post(&url), &self.settings.api_key, &self.settings.api_version)
            .json(&body)
            .send()
            .await
            .map_err(|e| RagError::http(PROVIDER, e))?;

        if !res.status().is_success() {
            return Err(RagError::from_response(PROVIDER, res).await);
        }

        res.json().await.map_err(|e| RagError::http(PROVIDER, e))
    }

    async fn wait_until_ready(&self) -> Result<IndexDescription, RagError> {
        let deadline =
            Instant::now() + Duration::from_secs(self.settings.index_ready_timeout_secs);

        loop {
            if let Some(description) = self.describe().await? {
                if description.status.ready && !description.host.is_empty() {
                    return Ok(description);
                }
                tracing::debug!(
                    "Index {} not ready yet (state: {})",
                    self.settings.index_name,
                    description.status.state
                );
            }

            if Instant::now() >= deadline {
                return Err(RagError::Internal(format!(
                    "index {} not ready after {}s",
                    self.settings.index_name, self.settings.index_ready_timeout_secs
                )));
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }
}

fn with_auth(builder: RequestBuilder, api_key: &ApiKey, api_version: &str) -> RequestBuilder {
    builder
        .header("Api-Key", api_key.expose())
        .header("X-Pinecone-API-Version", api_version)
}

fn session_filter(session_id: &str) -> Value {
    json!({ "session_id": { "$eq": session_id } })
}

/// Pinecone reports bare hostnames; tests and proxies may hand back full URLs.
fn data_plane_url(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}
