//! JSON output formatter

use super::AnswerReport;

pub fn format_answer(report: &AnswerReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string()) + "\n"
}
