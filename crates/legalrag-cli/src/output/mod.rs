//! Output formatters

pub mod json;
pub mod markdown;
pub mod terminal;

use crate::app::OutputFormat;
use legalrag_core::{ResearchOutput, WorkflowResponse};
use serde::Serialize;

/// An answer as shown to the user, from either the workflow or the researcher
#[derive(Debug, Clone, Serialize)]
pub struct AnswerReport {
    pub query: String,
    pub answer: String,
    pub references: Vec<String>,
    pub confidence: f64,
    pub search_performed: bool,
    pub processing_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnswerReport {
    pub fn from_workflow(query: &str, response: WorkflowResponse) -> Self {
        Self {
            query: query.to_string(),
            answer: response.answer,
            references: response.references,
            confidence: response.confidence,
            search_performed: response.search_performed,
            processing_time_ms: response.processing_time_ms,
            error: response.error,
        }
    }

    pub fn from_research(query: &str, output: ResearchOutput, processing_time_ms: u64) -> Self {
        Self {
            query: query.to_string(),
            answer: output.answer,
            references: output.references,
            confidence: output.confidence,
            search_performed: output.search_performed,
            processing_time_ms,
            error: None,
        }
    }
}

/// Format an answer report
pub fn format_answer(report: &AnswerReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_answer(report),
        OutputFormat::Md => markdown::format_answer(report),
        OutputFormat::Cli => terminal::format_answer(report),
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
