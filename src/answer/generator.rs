use std::sync::Arc;

use super::instructions::{build_question_prompt, DOCUMENT_QA_SYSTEM_PROMPT};
use super::policy::{SafetyPolicy, JAILBREAK_REFUSAL, LEAKAGE_REFUSAL};
use crate::core::config::CompletionSettings;
use crate::core::errors::RagError;
use crate::history::ChatHistory;
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};

pub const APOLOGY: &str =
    "Sorry, I encountered an error processing your request. Please try again.";

/// Produces a grounded answer for one question.
pub struct AnswerGenerator {
    llm: Arc<dyn LlmProvider>,
    model: String,
    temperature: f64,
    top_p: f64,
    max_tokens: u32,
    policy: SafetyPolicy,
}

impl AnswerGenerator {
    pub fn new(llm: Arc<dyn LlmProvider>, settings: &CompletionSettings) -> Self {
        Self {
            llm,
            model: settings.model.clone(),
            temperature: settings.temperature,
            top_p: settings.top_p,
            max_tokens: settings.max_tokens,
            policy: SafetyPolicy,
        }
    }

    /// Answers `query` from `fragments` and the conversation so far.
    ///
    /// Never fails: blocked queries get a refusal, provider errors get an
    /// apology. A completed exchange is appended to `history` as a
    /// `User:`/`Model:` pair; the context itself is not stored.
    pub async fn generate(
        &self,
        fragments: &[String],
        query: &str,
        history: &mut ChatHistory,
    ) -> String {
        if let Some(pattern) = self.policy.jailbreak_match(query) {
            tracing::warn!("Potential jailbreak attempt detected (matched {:?})", pattern);
            return JAILBREAK_REFUSAL.to_string();
        }

        match self.complete(fragments, query, history).await {
            Ok(answer) => {
                let answer = self.screen_answer(answer);
                history.push_turn(query, &answer);
                tracing::info!("Generated RAG response successfully");
                answer
            }
            Err(err) => {
                tracing::error!("Error generating RAG response via {}: {}", self.llm.name(), err);
                APOLOGY.to_string()
            }
        }
    }

    async fn complete(
        &self,
        fragments: &[String],
        query: &str,
        history: &ChatHistory,
    ) -> Result<String, RagError> {
        let request = ChatRequest::new(build_messages(fragments, query, history))
            .temperature(self.temperature)
            .top_p(self.top_p)
            .max_tokens(self.max_tokens);

        self.llm.chat(request, &self.model).await
    }

    fn screen_answer(&self, answer: String) -> String {
        match self.policy.leakage_match(&answer) {
            Some(indicator) => {
                tracing::warn!(
                    "Response contained system information ({:?}), filtering",
                    indicator
                );
                LEAKAGE_REFUSAL.to_string()
            }
            None => answer,
        }
    }
}

fn build_messages(fragments: &[String], query: &str, history: &ChatHistory) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(DOCUMENT_QA_SYSTEM_PROMPT)];
    messages.extend(history.to_messages());
    messages.push(ChatMessage::user(build_question_prompt(fragments, query)));
    messages
}
