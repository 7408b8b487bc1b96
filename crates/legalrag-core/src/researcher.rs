//! Legal researcher agent
//!
//! Decides whether a query needs live web search, answers it from the
//! document store, and scores the answer's citations and confidence.

use crate::chains::RetrievalChain;
use crate::error::Result;
use crate::llm::{ChatMessage, LLMClient};
use crate::prompts;
use crate::query::{normalize_query, QueryInput};
use crate::search::SearchChain;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Answer returned when research fails outright
pub const RESEARCH_ERROR_MESSAGE: &str =
    "I apologize, but I encountered an error processing your request.";

/// Appended to answers produced for queries that triggered web search
pub const SEARCH_TRAILER: &str = "This answer is based on web search results.";

const CLASSIFICATION_TEMPERATURE: f32 = 0.2;

const BASE_CONFIDENCE: f64 = 0.7;
const MIN_CONFIDENCE: f64 = 0.1;
const MAX_CONFIDENCE: f64 = 0.95;
const REDUCER_PENALTY: f64 = 0.1;
const BOOSTER_BONUS: f64 = 0.05;

/// Hedging phrases, each occurrence lowers confidence
pub const CONFIDENCE_REDUCERS: [&str; 7] = [
    "not clear",
    "uncertain",
    "might",
    "may",
    "possibly",
    "cannot determine",
    "insufficient information",
];

/// Assertive phrases, each occurrence raises confidence
pub const CONFIDENCE_BOOSTERS: [&str; 7] = [
    "clearly",
    "established",
    "definitely",
    "specifically states",
    "explicitly",
    "according to",
    "demonstrates",
];

/// Whether a query should trigger live web search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchDecision {
    NeedsSearch,
    #[default]
    NoSearch,
}

impl SearchDecision {
    /// `NeedsSearch` iff the raw model output mentions the literal token
    pub fn from_model_output(output: &str) -> Self {
        if output.contains(Self::NeedsSearch.as_str()) {
            Self::NeedsSearch
        } else {
            Self::NoSearch
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NeedsSearch => "NEEDS_SEARCH",
            Self::NoSearch => "NO_SEARCH",
        }
    }
}

/// Result of one research pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchOutput {
    pub answer: String,
    pub references: Vec<String>,
    pub confidence: f64,
    pub search_performed: bool,
    /// Formatted web snippets fetched for this query, if any
    #[serde(default)]
    pub search_results: Vec<String>,
}

impl ResearchOutput {
    /// Apology answer with no references and zero confidence
    pub fn degraded() -> Self {
        Self {
            answer: RESEARCH_ERROR_MESSAGE.to_string(),
            references: Vec::new(),
            confidence: 0.0,
            search_performed: false,
            search_results: Vec::new(),
        }
    }
}

/// Researcher combining search-need classification, web search and retrieval
pub struct LegalResearcher {
    llm: Arc<dyn LLMClient>,
    search_chain: SearchChain,
    retrieval_chain: RetrievalChain,
}

impl LegalResearcher {
    pub fn new(
        llm: Arc<dyn LLMClient>,
        search_chain: SearchChain,
        retrieval_chain: RetrievalChain,
    ) -> Self {
        Self {
            llm,
            search_chain,
            retrieval_chain,
        }
    }

    pub fn search_chain(&self) -> &SearchChain {
        &self.search_chain
    }

    pub fn retrieval_chain(&self) -> &RetrievalChain {
        &self.retrieval_chain
    }

    /// Ask the model whether the query needs web search
    pub async fn determine_search_need(&self, query: &str) -> Result<SearchDecision> {
        let output = self
            .llm
            .chat_completion(prompts::search_determination(query), CLASSIFICATION_TEMPERATURE)
            .await?;

        let decision = SearchDecision::from_model_output(&output);
        tracing::debug!("Search decision for query: {}", decision.as_str());
        Ok(decision)
    }

    /// Research a query, propagating input and classification failures.
    ///
    /// Retrieval failures do not propagate: the retrieval chain's error
    /// message becomes the answer and is scored like any other.
    pub async fn try_research(
        &self,
        query: impl Into<QueryInput>,
        chat_history: &[ChatMessage],
    ) -> Result<ResearchOutput> {
        let query = normalize_query(query)?;
        let decision = self.determine_search_need(&query).await?;

        match decision {
            SearchDecision::NeedsSearch => {
                let outcome = self.search_chain.search(query.as_str(), true).await;
                tracing::info!(
                    "Web search for query returned {} snippets (performed: {})",
                    outcome.search_results.len(),
                    outcome.search_performed
                );

                let search_answer = self
                    .retrieval_chain
                    .retrieve_and_answer(query.as_str(), chat_history)
                    .await;

                Ok(ResearchOutput {
                    answer: format!("{}\n\n{}", search_answer, SEARCH_TRAILER),
                    references: extract_references(&search_answer),
                    confidence: evaluate_confidence(&search_answer),
                    search_performed: outcome.search_performed,
                    search_results: outcome.search_results,
                })
            }
            SearchDecision::NoSearch => {
                let answer = self
                    .retrieval_chain
                    .retrieve_and_answer(query.as_str(), chat_history)
                    .await;

                Ok(ResearchOutput {
                    references: extract_references(&answer),
                    confidence: evaluate_confidence(&answer),
                    answer,
                    search_performed: false,
                    search_results: Vec::new(),
                })
            }
        }
    }

    /// Research a query; any failure yields [`ResearchOutput::degraded`]
    pub async fn research(
        &self,
        query: impl Into<QueryInput>,
        chat_history: &[ChatMessage],
    ) -> ResearchOutput {
        match self.try_research(query, chat_history).await {
            Ok(output) => output,
            Err(e) => {
                tracing::error!("Error in research: {}", e);
                ResearchOutput::degraded()
            }
        }
    }
}

/// Citation-like lines, in order, duplicates kept
pub fn extract_references(text: &str) -> Vec<String> {
    text.split('\n')
        .map(str::trim)
        .filter(|line| is_reference(line))
        .map(str::to_string)
        .collect()
}

fn is_reference(line: &str) -> bool {
    line.starts_with("Source:")
        || line.starts_with('[')
        || line.contains("v.")
        || (line.starts_with("See ") && line.chars().count() > 10)
}

/// Lexical confidence estimate clamped to [0.1, 0.95]
pub fn evaluate_confidence(answer: &str) -> f64 {
    let lower = answer.to_lowercase();

    let reducers: usize = CONFIDENCE_REDUCERS
        .iter()
        .map(|phrase| lower.matches(phrase).count())
        .sum();
    let boosters: usize = CONFIDENCE_BOOSTERS
        .iter()
        .map(|phrase| lower.matches(phrase).count())
        .sum();

    let confidence =
        BASE_CONFIDENCE - reducers as f64 * REDUCER_PENALTY + boosters as f64 * BOOSTER_BONUS;
    confidence.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}
