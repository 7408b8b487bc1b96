//! Four-stage research workflow
//!
//! search → research → analyze → finalize, each stage mutating a shared
//! [`WorkflowState`]. Stage failures are recorded in `error_context` and the
//! pipeline keeps going with whatever partial state exists.

use crate::error::Result;
use crate::llm::{ChatMessage, LLMClient};
use crate::prompts;
use crate::query::{normalize_query, QueryInput};
use crate::researcher::LegalResearcher;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

const SYNTHESIS_TEMPERATURE: f32 = 0.7;

/// Confidence assigned by the final stage
pub const CLEAN_RUN_CONFIDENCE: f64 = 0.8;
pub const DEGRADED_RUN_CONFIDENCE: f64 = 0.4;

/// Pipeline position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    #[default]
    Search,
    Research,
    Analyze,
    Finalize,
    Complete,
}

impl WorkflowStep {
    pub fn next(self) -> Self {
        match self {
            Self::Search => Self::Research,
            Self::Research => Self::Analyze,
            Self::Analyze => Self::Finalize,
            Self::Finalize | Self::Complete => Self::Complete,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Research => "research",
            Self::Analyze => "analyze",
            Self::Finalize => "finalize",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State threaded through the stages
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowState {
    pub messages: Vec<ChatMessage>,
    pub context: HashMap<String, serde_json::Value>,
    pub current_step: WorkflowStep,
    pub search_results: String,
    pub research_output: String,
    pub analysis_results: String,
    pub final_answer: String,
    pub references: Vec<String>,
    pub confidence: f64,
    pub error_context: String,
    pub search_performed: bool,
}

impl WorkflowState {
    pub fn new(query: impl Into<String>) -> Self {
        let query = query.into();
        let mut context = HashMap::new();
        context.insert("query".to_string(), serde_json::Value::String(query.clone()));
        Self {
            messages: vec![ChatMessage::user(query)],
            context,
            ..Default::default()
        }
    }

    /// Content of the most recent message
    pub fn latest_query(&self) -> &str {
        self.messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or_default()
    }

    /// Messages before the latest one
    pub fn history(&self) -> &[ChatMessage] {
        match self.messages.split_last() {
            Some((_, earlier)) => earlier,
            None => &[],
        }
    }

    /// Append an error; later stages still run
    fn record_error(&mut self, stage: &str, error: impl fmt::Display) {
        let message = format!("Error in {}: {}", stage, error);
        tracing::error!("{}", message);
        if !self.error_context.is_empty() {
            self.error_context.push('\n');
        }
        self.error_context.push_str(&message);
    }

    fn advance(&mut self) {
        self.current_step = self.current_step.next();
    }
}

/// Caller-facing result of [`LegalWorkflow::process_query`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowResponse {
    pub answer: String,
    pub references: Vec<String>,
    pub confidence: f64,
    pub search_performed: bool,
    pub processing_time_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WorkflowResponse {
    fn from_state(state: WorkflowState, started: Instant) -> Self {
        let error = if state.error_context.is_empty() {
            None
        } else {
            Some(state.error_context)
        };
        Self {
            answer: state.final_answer,
            references: state.references,
            confidence: state.confidence,
            search_performed: state.search_performed,
            processing_time_ms: started.elapsed().as_millis() as u64,
            error,
        }
    }

    fn failed(error: impl fmt::Display, started: Instant) -> Self {
        let message = format!("An error occurred: {}", error);
        Self {
            answer: message.clone(),
            references: Vec::new(),
            confidence: 0.0,
            search_performed: false,
            processing_time_ms: started.elapsed().as_millis() as u64,
            error: Some(message),
        }
    }
}

/// Runs the search, research, analysis and synthesis stages in order
pub struct LegalWorkflow {
    researcher: LegalResearcher,
    llm: Arc<dyn LLMClient>,
}

impl LegalWorkflow {
    pub fn new(researcher: LegalResearcher, llm: Arc<dyn LLMClient>) -> Self {
        Self { researcher, llm }
    }

    pub fn researcher(&self) -> &LegalResearcher {
        &self.researcher
    }

    /// Run the whole pipeline for one query
    pub async fn process_query(&self, query: impl Into<QueryInput>) -> WorkflowResponse {
        let started = Instant::now();

        let query = match normalize_query(query) {
            Ok(query) => query,
            Err(e) => {
                tracing::error!("Error processing query: {}", e);
                return WorkflowResponse::failed(e, started);
            }
        };

        let state = self.run(WorkflowState::new(query)).await;
        tracing::info!(
            "Workflow finished in {} ms (confidence {:.2})",
            started.elapsed().as_millis(),
            state.confidence
        );
        WorkflowResponse::from_state(state, started)
    }

    /// Drive the state until it reaches [`WorkflowStep::Complete`]
    pub async fn run(&self, mut state: WorkflowState) -> WorkflowState {
        while state.current_step != WorkflowStep::Complete {
            tracing::debug!("Workflow stage: {}", state.current_step);
            self.run_stage(&mut state).await;
        }
        state
    }

    /// Execute the stage named by `state.current_step`
    pub async fn run_stage(&self, state: &mut WorkflowState) {
        match state.current_step {
            WorkflowStep::Search => self.search_node(state).await,
            WorkflowStep::Research => self.research_node(state).await,
            WorkflowStep::Analyze => self.analysis_node(state).await,
            WorkflowStep::Finalize => self.final_node(state).await,
            WorkflowStep::Complete => {}
        }
    }

    async fn search_node(&self, state: &mut WorkflowState) {
        let query = state.latest_query().to_string();
        // Provider failures arrive as an error snippet, not as a stage error
        let outcome = self.researcher.search_chain().search(query, true).await;
        state.context.insert(
            "search_result_count".to_string(),
            serde_json::Value::from(outcome.search_results.len()),
        );
        state.search_results = outcome.search_results.join("\n\n");
        state.advance();
    }

    async fn research_node(&self, state: &mut WorkflowState) {
        let query = state.latest_query().to_string();
        let result = self.researcher.try_research(query, state.history()).await;
        match result {
            Ok(output) => {
                state.research_output = output.answer;
                state.references = output.references;
                state.search_performed = output.search_performed;
            }
            Err(e) => state.record_error("research", e),
        }
        state.advance();
    }

    async fn analysis_node(&self, state: &mut WorkflowState) {
        let prompt = prompts::workflow_analysis(&state.search_results, &state.research_output);
        match self.synthesize(prompt).await {
            Ok(analysis) => state.analysis_results = analysis,
            Err(e) => state.record_error("analysis", e),
        }
        state.advance();
    }

    async fn final_node(&self, state: &mut WorkflowState) {
        let prompt = prompts::workflow_final(&state.research_output, &state.analysis_results);
        match self.synthesize(prompt).await {
            Ok(answer) => state.final_answer = answer,
            Err(e) => state.record_error("final answer", e),
        }

        state.confidence = if state.error_context.is_empty() {
            CLEAN_RUN_CONFIDENCE
        } else {
            DEGRADED_RUN_CONFIDENCE
        };
        state.current_step = WorkflowStep::Complete;
    }

    async fn synthesize(&self, prompt: String) -> Result<String> {
        self.llm
            .chat_completion(vec![ChatMessage::user(prompt)], SYNTHESIS_TEMPERATURE)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::RetrievalChain;
    use crate::search::SearchChain;
    use crate::store::{Document, SOURCE_KEY};
    use crate::testing::{CountingSearch, FailingSearch, ScriptedLlm, StaticStore};

    const CLASSIFY: &str = "requires web search to answer accurately";
    const ANALYZE: &str = "Analyze the following legal information";
    const FINAL: &str = "provide a comprehensive answer";

    fn workflow(llm: Arc<ScriptedLlm>) -> (LegalWorkflow, Arc<CountingSearch>) {
        let search = Arc::new(CountingSearch::new());
        let store = Arc::new(StaticStore {
            hits: vec![(
                Document::new("Civ. Code § 1550 lists the elements of a contract.")
                    .with_metadata(SOURCE_KEY, "civ1550.txt"),
                0.3,
            )],
            fail: false,
        });
        let researcher = LegalResearcher::new(
            llm.clone(),
            SearchChain::new(search.clone()),
            RetrievalChain::new(store, llm.clone(), 5),
        );
        (LegalWorkflow::new(researcher, llm), search)
    }

    #[test]
    fn test_step_order() {
        let mut step = WorkflowStep::default();
        let mut visited = vec![step];
        while step != WorkflowStep::Complete {
            step = step.next();
            visited.push(step);
        }
        assert_eq!(
            visited,
            vec![
                WorkflowStep::Search,
                WorkflowStep::Research,
                WorkflowStep::Analyze,
                WorkflowStep::Finalize,
                WorkflowStep::Complete,
            ]
        );
        assert_eq!(WorkflowStep::Complete.next(), WorkflowStep::Complete);
    }

    #[tokio::test]
    async fn test_clean_run() {
        let llm = Arc::new(
            ScriptedLlm::new("Per Smith v. Jones a contract needs consideration.")
                .on(CLASSIFY, "NO_SEARCH")
                .on(ANALYZE, "Analysis: consideration is required.")
                .on(FINAL, "Final: a contract requires consent, object and consideration."),
        );
        let (workflow, search) = workflow(llm.clone());

        let response = workflow.process_query("What makes a contract valid?").await;

        assert_eq!(
            response.answer,
            "Final: a contract requires consent, object and consideration."
        );
        assert_eq!(
            response.references,
            vec!["Per Smith v. Jones a contract needs consideration."]
        );
        assert!((response.confidence - CLEAN_RUN_CONFIDENCE).abs() < 1e-9);
        assert!(!response.search_performed);
        assert!(response.error.is_none());
        // the search stage always runs
        assert_eq!(search.call_count(), 1);
        // classification, retrieval answer, analysis, final
        assert_eq!(llm.call_count(), 4);
    }

    #[tokio::test]
    async fn test_stages_see_earlier_output() {
        let llm = Arc::new(
            ScriptedLlm::new("research answer")
                .on(CLASSIFY, "NO_SEARCH")
                .on(ANALYZE, "analysis text")
                .on(FINAL, "final text"),
        );
        let (workflow, _) = workflow(llm.clone());
        let state = workflow.run(WorkflowState::new("Explain consideration")).await;

        assert_eq!(state.current_step, WorkflowStep::Complete);
        assert!(state.search_results.starts_with("Title: Cal. Code Civ. Proc. § 337"));
        assert_eq!(state.research_output, "research answer");
        assert_eq!(state.analysis_results, "analysis text");

        let calls = llm.calls.lock().unwrap();
        let analysis_prompt = &calls[2].0[0].content;
        assert!(analysis_prompt.contains("Research: research answer"));
        assert!(analysis_prompt.contains("Search Results: Title: Cal. Code Civ. Proc."));
        assert!((calls[2].1 - 0.7).abs() < f32::EPSILON);
        let final_prompt = &calls[3].0[0].content;
        assert!(final_prompt.contains("Analysis: analysis text"));
    }

    #[tokio::test]
    async fn test_research_failure_continues_with_low_confidence() {
        let llm = Arc::new(
            ScriptedLlm::new("unused")
                .fail_on(CLASSIFY)
                .on(ANALYZE, "analysis of partial state")
                .on(FINAL, "best effort answer"),
        );
        let (workflow, _) = workflow(llm.clone());

        let state = workflow.run(WorkflowState::new("Explain laches")).await;

        assert!(state.error_context.starts_with("Error in research:"));
        assert!(state.research_output.is_empty());
        assert_eq!(state.analysis_results, "analysis of partial state");
        assert_eq!(state.final_answer, "best effort answer");
        assert!((state.confidence - DEGRADED_RUN_CONFIDENCE).abs() < 1e-9);
        assert_eq!(state.current_step, WorkflowStep::Complete);
        // classification, analysis, final
        assert_eq!(llm.call_count(), 3);
    }

    #[tokio::test]
    async fn test_search_outage_keeps_clean_confidence() {
        let llm = Arc::new(
            ScriptedLlm::new("research answer")
                .on(CLASSIFY, "NO_SEARCH")
                .on(ANALYZE, "analysis text")
                .on(FINAL, "final text"),
        );
        let store = Arc::new(StaticStore {
            hits: Vec::new(),
            fail: false,
        });
        let researcher = LegalResearcher::new(
            llm.clone(),
            SearchChain::new(Arc::new(FailingSearch)),
            RetrievalChain::new(store, llm.clone(), 5),
        );
        let workflow = LegalWorkflow::new(researcher, llm.clone());

        let state = workflow.run(WorkflowState::new("Explain laches")).await;

        assert!(state.error_context.is_empty());
        assert!(state
            .search_results
            .starts_with("Error performing search: External call failed:"));
        assert!((state.confidence - CLEAN_RUN_CONFIDENCE).abs() < 1e-9);
        assert_eq!(state.final_answer, "final text");

        let calls = llm.calls.lock().unwrap();
        assert!(calls[2].0[0]
            .content
            .contains("Search Results: Error performing search:"));
    }

    #[tokio::test]
    async fn test_final_failure_sets_low_confidence() {
        let llm = Arc::new(
            ScriptedLlm::new("answer")
                .on(CLASSIFY, "NO_SEARCH")
                .fail_on(FINAL),
        );
        let (workflow, _) = workflow(llm);
        let response = workflow.process_query("Explain laches").await;

        assert!(response.answer.is_empty());
        assert!((response.confidence - DEGRADED_RUN_CONFIDENCE).abs() < 1e-9);
        assert!(response
            .error
            .as_deref()
            .is_some_and(|e| e.starts_with("Error in final answer:")));
    }

    #[tokio::test]
    async fn test_errors_accumulate() {
        let llm = Arc::new(
            ScriptedLlm::new("answer")
                .fail_on(CLASSIFY)
                .fail_on(ANALYZE)
                .on(FINAL, "final"),
        );
        let (workflow, _) = workflow(llm);
        let state = workflow.run(WorkflowState::new("Explain laches")).await;

        let lines: Vec<&str> = state.error_context.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Error in research:"));
        assert!(lines[1].starts_with("Error in analysis:"));
    }

    #[tokio::test]
    async fn test_empty_query_is_reported() {
        let llm = Arc::new(ScriptedLlm::new("answer"));
        let (workflow, search) = workflow(llm.clone());

        let response = workflow.process_query("   ").await;
        assert_eq!(response.answer, "An error occurred: Empty query received");
        assert_eq!(response.confidence, 0.0);
        assert!(response.references.is_empty());
        assert_eq!(llm.call_count(), 0);
        assert_eq!(search.call_count(), 0);
    }

    #[test]
    fn test_state_history_excludes_latest() {
        let mut state = WorkflowState::new("second question");
        state.messages.insert(0, ChatMessage::user("first question"));
        assert_eq!(state.latest_query(), "second question");
        assert_eq!(state.history().len(), 1);
        assert_eq!(state.context["query"], "second question");
    }
}
