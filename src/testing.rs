//! In-memory stand-ins for the provider traits, shared by unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use crate::core::errors::RagError;
use crate::llm::{ChatRequest, LlmProvider};
use crate::rag::{ChunkSearchResult, VectorIndex};

pub enum Reply {
    Text(&'static str),
    Fail,
    Panic,
}

#[derive(Default)]
pub struct FakeLlm {
    embedding: Option<Vec<f32>>,
    replies: Mutex<VecDeque<Reply>>,
    chats: Mutex<Vec<(ChatRequest, String)>>,
    embeds: Mutex<Vec<(String, String)>>,
}

impl FakeLlm {
    pub fn with_embedding(vector: Vec<f32>) -> Self {
        Self {
            embedding: Some(vector),
            ..Self::default()
        }
    }

    pub fn failing_embeddings() -> Self {
        Self::default()
    }

    pub fn with_replies(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Self::default()
        }
    }

    pub fn chat_requests(&self) -> Vec<ChatRequest> {
        self.chats
            .lock()
            .unwrap()
            .iter()
            .map(|(request, _)| request.clone())
            .collect()
    }

    pub fn chat_models(&self) -> Vec<String> {
        self.chats
            .lock()
            .unwrap()
            .iter()
            .map(|(_, model)| model.clone())
            .collect()
    }

    pub fn chat_count(&self) -> usize {
        self.chats.lock().unwrap().len()
    }

    pub fn embed_calls(&self) -> Vec<(String, String)> {
        self.embeds.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for FakeLlm {
    fn name(&self) -> &str {
        "fake"
    }

    async fn chat(&self, request: ChatRequest, model_id: &str) -> Result<String, RagError> {
        self.chats
            .lock()
            .unwrap()
            .push((request, model_id.to_string()));
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Text(text)) => Ok(text.to_string()),
            Some(Reply::Fail) => Err(RagError::http("fake", "connection reset")),
            Some(Reply::Panic) => panic!("fake provider blew up"),
            None => Err(RagError::Internal("no scripted reply left".to_string())),
        }
    }

    async fn embed(&self, inputs: &[String], model_id: &str) -> Result<Vec<Vec<f32>>, RagError> {
        let mut embeds = self.embeds.lock().unwrap();
        for input in inputs {
            embeds.push((input.clone(), model_id.to_string()));
        }
        match &self.embedding {
            Some(vector) => Ok(inputs.iter().map(|_| vector.clone()).collect()),
            None => Err(RagError::Status {
                provider: "fake".to_string(),
                status: 401,
                body: "invalid api key".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryCall {
    pub top_k: usize,
    pub session_id: Option<String>,
}

pub struct FakeIndex {
    dimension: usize,
    results: Vec<ChunkSearchResult>,
    fail: bool,
    queries: Mutex<Vec<QueryCall>>,
    deleted: Mutex<Vec<String>>,
}

impl FakeIndex {
    pub fn new(dimension: usize, results: Vec<ChunkSearchResult>) -> Self {
        Self {
            dimension,
            results,
            fail: false,
            queries: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(dimension: usize) -> Self {
        Self {
            fail: true,
            ..Self::new(dimension, Vec::new())
        }
    }

    pub fn queries(&self) -> Vec<QueryCall> {
        self.queries.lock().unwrap().clone()
    }

    pub fn deleted_sessions(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl VectorIndex for FakeIndex {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn query(
        &self,
        _vector: &[f32],
        top_k: usize,
        session_id: Option<&str>,
    ) -> Result<Vec<ChunkSearchResult>, RagError> {
        if self.fail {
            return Err(RagError::http("fake-index", "timed out"));
        }
        self.queries.lock().unwrap().push(QueryCall {
            top_k,
            session_id: session_id.map(str::to_string),
        });
        Ok(self.results.iter().take(top_k).cloned().collect())
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), RagError> {
        if self.fail {
            return Err(RagError::http("fake-index", "timed out"));
        }
        self.deleted.lock().unwrap().push(session_id.to_string());
        Ok(())
    }
}

pub fn hit(id: &str, score: f32, text: &str) -> ChunkSearchResult {
    ChunkSearchResult {
        id: id.to_string(),
        score,
        metadata: Some(json!({ "text": text })),
    }
}
