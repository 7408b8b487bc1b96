//! Retrieval chain: vector search, context formatting, grounded answer

use crate::error::Result;
use crate::llm::{ChatMessage, LLMClient};
use crate::prompts;
use crate::query::{normalize_query, QueryInput};
use crate::store::VectorStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Returned by [`RetrievalChain::retrieve_and_answer`] when anything fails
pub const RETRIEVAL_ERROR_MESSAGE: &str = "Error processing your query. Please try again.";

const RETRIEVAL_TEMPERATURE: f32 = 0.2;

/// A passage pulled from the vector store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub content: String,
    pub source: String,
    /// Raw store distance; lower is more relevant
    pub distance: f32,
}

impl RetrievedDocument {
    /// Display-only score in (0, 1]
    pub fn relevance(&self) -> f32 {
        1.0 / (1.0 + self.distance)
    }
}

/// Answers questions from the top passages in the vector store
pub struct RetrievalChain {
    store: Arc<dyn VectorStore>,
    llm: Arc<dyn LLMClient>,
    max_documents: usize,
}

impl RetrievalChain {
    pub fn new(store: Arc<dyn VectorStore>, llm: Arc<dyn LLMClient>, max_documents: usize) -> Self {
        Self {
            store,
            llm,
            max_documents,
        }
    }

    pub fn max_documents(&self) -> usize {
        self.max_documents
    }

    /// Top passages for the query, closest first
    pub async fn retrieve_documents(&self, query: &str) -> Result<Vec<RetrievedDocument>> {
        let hits = self
            .store
            .similarity_search_with_score(query, self.max_documents)
            .await?;

        let mut docs: Vec<RetrievedDocument> = hits
            .into_iter()
            .take(self.max_documents)
            .map(|(doc, distance)| RetrievedDocument {
                source: doc.source().to_string(),
                content: doc.content,
                distance,
            })
            .collect();

        docs.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        tracing::debug!("Retrieved {} documents", docs.len());
        Ok(docs)
    }

    /// Answer from retrieved context, propagating failures
    pub async fn try_retrieve_and_answer(
        &self,
        query: impl Into<QueryInput>,
        chat_history: &[ChatMessage],
    ) -> Result<String> {
        let query = normalize_query(query)?;
        let docs = self.retrieve_documents(&query).await?;
        let context = format_context(&docs);

        let messages = prompts::legal_research(&query, &context, chat_history);
        self.llm
            .chat_completion(messages, RETRIEVAL_TEMPERATURE)
            .await
    }

    /// Answer from retrieved context; failures yield [`RETRIEVAL_ERROR_MESSAGE`]
    pub async fn retrieve_and_answer(
        &self,
        query: impl Into<QueryInput>,
        chat_history: &[ChatMessage],
    ) -> String {
        match self.try_retrieve_and_answer(query, chat_history).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!("Error in retrieval chain: {}", e);
                RETRIEVAL_ERROR_MESSAGE.to_string()
            }
        }
    }

    /// Raw 1-10 relevance judgement with justification
    pub async fn evaluate_document_relevance(
        &self,
        query: &str,
        document_content: &str,
    ) -> Result<String> {
        let messages = prompts::document_relevance(query, document_content);
        self.llm
            .chat_completion(messages, RETRIEVAL_TEMPERATURE)
            .await
    }

    /// Structured review of a single legal document
    pub async fn analyze_document(&self, document_content: &str) -> Result<String> {
        let messages = prompts::document_analysis(document_content);
        self.llm
            .chat_completion(messages, RETRIEVAL_TEMPERATURE)
            .await
    }
}

/// Numbered context blocks in the given order
pub fn format_context(docs: &[RetrievedDocument]) -> String {
    docs.iter()
        .enumerate()
        .map(|(i, doc)| {
            format!(
                "Document {}:\nSource: {}\nRelevance Score: {:.2}\nContent: {}\n",
                i + 1,
                doc.source,
                doc.relevance(),
                doc.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Document, SOURCE_KEY};
    use crate::testing::{ScriptedLlm, StaticStore};

    fn hits() -> Vec<(Document, f32)> {
        vec![
            (
                Document::new("Oral contracts: two years.").with_metadata(SOURCE_KEY, "ccp339.txt"),
                0.9,
            ),
            (
                Document::new("Written contracts: four years.")
                    .with_metadata(SOURCE_KEY, "ccp337.txt"),
                0.1,
            ),
            (Document::new("Unattributed note."), 0.5),
        ]
    }

    fn chain(llm: Arc<ScriptedLlm>, fail: bool) -> RetrievalChain {
        let store = Arc::new(StaticStore { hits: hits(), fail });
        RetrievalChain::new(store, llm, 5)
    }

    #[tokio::test]
    async fn test_documents_sorted_by_distance() {
        let chain = chain(Arc::new(ScriptedLlm::new("answer")), false);
        let docs = chain.retrieve_documents("contract limitations").await.unwrap();
        let sources: Vec<&str> = docs.iter().map(|d| d.source.as_str()).collect();
        assert_eq!(sources, vec!["ccp337.txt", "Unknown", "ccp339.txt"]);
    }

    #[tokio::test]
    async fn test_context_block_order_and_format() {
        let chain = chain(Arc::new(ScriptedLlm::new("answer")), false);
        let docs = chain.retrieve_documents("q").await.unwrap();
        let context = format_context(&docs);

        assert!(context.starts_with(
            "Document 1:\nSource: ccp337.txt\nRelevance Score: 0.91\nContent: Written contracts: four years.\n"
        ));
        let near = context.find("four years").unwrap();
        let far = context.find("two years").unwrap();
        assert!(near < far);
        assert!(context.contains("\n\n\nDocument 2:\nSource: Unknown\nRelevance Score: 0.67\n"));
    }

    #[test]
    fn test_relevance_is_display_transform() {
        let doc = RetrievedDocument {
            content: String::new(),
            source: "x".into(),
            distance: 1.0,
        };
        assert!((doc.relevance() - 0.5).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_answer_uses_context_and_low_temperature() {
        let llm = Arc::new(ScriptedLlm::new("Under CCP 337 the period is four years."));
        let chain = chain(llm.clone(), false);
        let history = vec![ChatMessage::user("earlier question")];

        let answer = chain
            .retrieve_and_answer("Limitations for breach of contract?", &history)
            .await;
        assert_eq!(answer, "Under CCP 337 the period is four years.");

        let calls = llm.calls.lock().unwrap();
        let (messages, temperature) = &calls[0];
        assert!((temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(messages[2].content, "earlier question");
        assert!(messages
            .last()
            .unwrap()
            .content
            .contains("Source: ccp337.txt"));
    }

    #[tokio::test]
    async fn test_empty_query_returns_error_message() {
        let llm = Arc::new(ScriptedLlm::new("answer"));
        let chain = chain(llm.clone(), false);
        assert_eq!(chain.retrieve_and_answer("", &[]).await, RETRIEVAL_ERROR_MESSAGE);
        assert_eq!(chain.retrieve_and_answer("   ", &[]).await, RETRIEVAL_ERROR_MESSAGE);
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_returns_error_message() {
        let chain = chain(Arc::new(ScriptedLlm::new("answer")), true);
        assert_eq!(
            chain.retrieve_and_answer("anything", &[]).await,
            RETRIEVAL_ERROR_MESSAGE
        );
        assert!(chain.try_retrieve_and_answer("anything", &[]).await.is_err());
    }

    #[tokio::test]
    async fn test_max_documents_caps_results() {
        let store = Arc::new(StaticStore {
            hits: hits(),
            fail: false,
        });
        let chain = RetrievalChain::new(store, Arc::new(ScriptedLlm::new("a")), 2);
        assert_eq!(chain.retrieve_documents("q").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_relevance_evaluation_returns_raw_text() {
        let llm = Arc::new(ScriptedLlm::new("").on("scale of 1-10", "8 - directly on point"));
        let chain = chain(llm, false);
        let verdict = chain
            .evaluate_document_relevance("limitations", "CCP 337 text")
            .await
            .unwrap();
        assert_eq!(verdict, "8 - directly on point");
    }
}
