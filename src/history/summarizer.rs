use std::sync::Arc;

use super::ChatHistory;
use crate::core::config::{CompletionSettings, HistorySettings};
use crate::core::errors::RagError;
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};

const SUMMARIZER_INSTRUCTION: &str = "You are a conversation summarizer. Summarize the chat history concisely, focusing on the key questions asked and answers provided about the document. Keep it brief and factual. Only output the summary, nothing else.";

/// Collapses a long history into one model-written summary entry.
pub struct HistorySummarizer {
    llm: Arc<dyn LlmProvider>,
    model: String,
    temperature: f64,
    max_tokens: u32,
    threshold: usize,
}

impl HistorySummarizer {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        completion: &CompletionSettings,
        history: &HistorySettings,
    ) -> Self {
        Self {
            llm,
            model: completion.model.clone(),
            temperature: completion.summary_temperature,
            max_tokens: completion.summary_max_tokens,
            threshold: history.summarize_after,
        }
    }

    pub fn should_summarize(&self, history: &ChatHistory) -> bool {
        history.len() > self.threshold
    }

    /// Rewrites `history` into a single summary entry. On failure the history
    /// is left exactly as it was.
    pub async fn summarize(&self, history: &mut ChatHistory) {
        match self.request_summary(history).await {
            Ok(summary) => {
                history.replace_with_summary(&summary);
                tracing::info!("Chat history summarized successfully");
            }
            Err(err) => tracing::error!("Error summarizing chat history via {}: {}", self.llm.name(), err),
        }
    }

    async fn request_summary(&self, history: &ChatHistory) -> Result<String, RagError> {
        let messages = vec![
            ChatMessage::system(SUMMARIZER_INSTRUCTION),
            ChatMessage::user(format!(
                "Summarize this conversation:\n\n{}",
                history.joined()
            )),
        ];
        let request = ChatRequest::new(messages)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens);

        self.llm.chat(request, &self.model).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;
    use crate::testing::{FakeLlm, Reply};

    fn summarizer(llm: Arc<FakeLlm>) -> HistorySummarizer {
        HistorySummarizer::new(llm, &CompletionSettings::default(), &HistorySettings::default())
    }

    fn long_history() -> ChatHistory {
        let mut history = ChatHistory::new();
        for i in 0..6 {
            history.push_turn(&format!("question {i}"), &format!("answer {i}"));
        }
        history
    }

    #[test]
    fn threshold_is_strictly_greater_than_ten() {
        let llm = Arc::new(FakeLlm::default());
        let summarizer = summarizer(llm);

        let ten = ChatHistory::from_entries(vec!["User: x".to_string(); 10]);
        let eleven = ChatHistory::from_entries(vec!["User: x".to_string(); 11]);

        assert!(!summarizer.should_summarize(&ten));
        assert!(summarizer.should_summarize(&eleven));
    }

    #[tokio::test]
    async fn success_collapses_history_to_one_entry() {
        let llm = Arc::new(FakeLlm::with_replies(vec![Reply::Text("six questions about X")]));
        let mut history = long_history();

        summarizer(llm.clone()).summarize(&mut history).await;

        assert_eq!(history.len(), 1);
        assert_eq!(
            history.entries()[0],
            "Previous conversation summary: six questions about X"
        );

        let requests = llm.chat_requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.messages[0].role, Role::System);
        assert!(request.messages[1]
            .content
            .starts_with("Summarize this conversation:\n\nUser: question 0\nModel: answer 0"));
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.max_tokens, Some(400));
        assert_eq!(llm.chat_models(), vec!["llama-3.3-70b-versatile".to_string()]);
    }

    #[tokio::test]
    async fn failure_leaves_history_untouched() {
        let llm = Arc::new(FakeLlm::with_replies(vec![Reply::Fail]));
        let mut history = long_history();
        let before = history.clone();

        summarizer(llm).summarize(&mut history).await;

        assert_eq!(history, before);
    }
}
