//! Request orchestration: retrieve → fallback → summarize → generate.

use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;

use crate::answer::{AnswerGenerator, APOLOGY};
use crate::history::{ChatHistory, HistorySummarizer};
use crate::rag::Retriever;

pub const NOT_FOUND: &str =
    "Sorry! I could not find relevant information in the document to answer your question.";
pub const HISTORY_ONLY_CONTEXT: &str =
    "(No new context found. Answer based on conversation history if possible.)";

pub struct RagPipeline {
    retriever: Retriever,
    summarizer: HistorySummarizer,
    generator: AnswerGenerator,
}

impl RagPipeline {
    pub fn new(
        retriever: Retriever,
        summarizer: HistorySummarizer,
        generator: AnswerGenerator,
    ) -> Self {
        Self {
            retriever,
            summarizer,
            generator,
        }
    }

    /// Answers `query` for the session owning `history`. Always yields text;
    /// a panic anywhere below is turned into the generic apology.
    pub async fn answer(
        &self,
        query: &str,
        history: &mut ChatHistory,
        session_id: Option<&str>,
    ) -> String {
        match AssertUnwindSafe(self.run(query, history, session_id))
            .catch_unwind()
            .await
        {
            Ok(answer) => answer,
            Err(panic) => {
                let reason = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                tracing::error!("Error in main RAG flow: {}", reason);
                APOLOGY.to_string()
            }
        }
    }

    async fn run(
        &self,
        query: &str,
        history: &mut ChatHistory,
        session_id: Option<&str>,
    ) -> String {
        let mut fragments = self.retriever.retrieve(query, session_id).await;

        if fragments.is_empty() {
            if history.is_empty() {
                tracing::warn!("No relevant content found in vector store and no chat history");
                return NOT_FOUND.to_string();
            }
            tracing::info!("No documents found, answering from chat history");
            fragments = vec![HISTORY_ONLY_CONTEXT.to_string()];
        }

        if self.summarizer.should_summarize(history) {
            self.summarizer.summarize(history).await;
        }

        self.generator.generate(&fragments, query, history).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::core::config::{CompletionSettings, HistorySettings, RetrievalSettings};
    use crate::testing::{hit, FakeIndex, FakeLlm, Reply};

    struct Harness {
        chat: Arc<FakeLlm>,
        pipeline: RagPipeline,
    }

    fn harness(hits: Vec<crate::rag::ChunkSearchResult>, replies: Vec<Reply>) -> Harness {
        let embedder = Arc::new(FakeLlm::with_embedding(vec![0.0; 4]));
        let index = Arc::new(FakeIndex::new(4, hits));
        let chat = Arc::new(FakeLlm::with_replies(replies));
        let completion = CompletionSettings::default();

        let retriever = Retriever::new(
            embedder,
            "text-embedding-3-small",
            index,
            &RetrievalSettings::default(),
            "text",
        );
        let summarizer =
            HistorySummarizer::new(chat.clone(), &completion, &HistorySettings::default());
        let generator = AnswerGenerator::new(chat.clone(), &completion);

        Harness {
            chat,
            pipeline: RagPipeline::new(retriever, summarizer, generator),
        }
    }

    fn history_of(turns: usize) -> ChatHistory {
        let mut history = ChatHistory::new();
        for i in 0..turns {
            history.push_turn(&format!("q{i}"), &format!("a{i}"));
        }
        history
    }

    #[tokio::test]
    async fn no_context_and_no_history_is_not_found() {
        let h = harness(vec![], vec![Reply::Text("unused")]);
        let mut history = ChatHistory::new();

        let answer = h.pipeline.answer("anything?", &mut history, Some("s1")).await;

        assert_eq!(answer, NOT_FOUND);
        assert_eq!(h.chat.chat_count(), 0);
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn no_context_with_history_uses_placeholder() {
        let h = harness(vec![], vec![Reply::Text("From earlier: ACME.")]);
        let mut history = history_of(1);

        let answer = h.pipeline.answer("Who was it again?", &mut history, None).await;

        assert_eq!(answer, "From earlier: ACME.");
        let request = &h.chat.chat_requests()[0];
        let last = request.messages.last().unwrap();
        assert!(last.content.contains(HISTORY_ONLY_CONTEXT));
        assert_eq!(history.len(), 4);
    }

    #[tokio::test]
    async fn long_history_is_summarized_before_generation() {
        let h = harness(
            vec![hit("a", 0.9, "Chapter 2 covers pricing.")],
            vec![Reply::Text("Discussed chapters 1 to 6."), Reply::Text("Pricing.")],
        );
        let mut history = history_of(6);

        let answer = h.pipeline.answer("What is chapter 2?", &mut history, Some("s")).await;

        assert_eq!(answer, "Pricing.");
        assert_eq!(h.chat.chat_count(), 2);
        assert_eq!(
            history.entries(),
            &[
                "Previous conversation summary: Discussed chapters 1 to 6.".to_string(),
                "User: What is chapter 2?".to_string(),
                "Model: Pricing.".to_string(),
            ]
        );
        let generation = &h.chat.chat_requests()[1];
        assert_eq!(
            generation.messages[1].content,
            "Previous conversation summary: Discussed chapters 1 to 6."
        );
    }

    #[tokio::test]
    async fn ten_entries_do_not_trigger_summary() {
        let h = harness(vec![hit("a", 0.9, "ctx")], vec![Reply::Text("ok")]);
        let mut history = history_of(5);

        h.pipeline.answer("q", &mut history, None).await;

        assert_eq!(h.chat.chat_count(), 1);
        assert_eq!(history.len(), 12);
    }

    #[tokio::test]
    async fn failed_summary_still_generates() {
        let h = harness(
            vec![hit("a", 0.9, "ctx")],
            vec![Reply::Fail, Reply::Text("answer")],
        );
        let mut history = history_of(6);

        let answer = h.pipeline.answer("q", &mut history, None).await;

        assert_eq!(answer, "answer");
        assert_eq!(history.len(), 14);
    }

    #[tokio::test]
    async fn panic_inside_provider_becomes_apology() {
        let h = harness(vec![hit("a", 0.9, "ctx")], vec![Reply::Panic]);
        let mut history = ChatHistory::new();

        let answer = h.pipeline.answer("q", &mut history, None).await;

        assert_eq!(answer, APOLOGY);
        assert!(history.is_empty());
    }
}
