//! Markdown output formatter

use super::{yes_no, AnswerReport};

pub fn format_answer(report: &AnswerReport) -> String {
    let mut output = format!("# {}\n\n{}\n\n", report.query, report.answer.trim_end());

    output.push_str("## References\n\n");
    if report.references.is_empty() {
        output.push_str("*No references found*\n");
    }
    for reference in &report.references {
        output.push_str(&format!("- {}\n", reference));
    }

    output.push_str("\n## Metadata\n\n");
    output.push_str(&format!("- **Confidence**: {:.2}\n", report.confidence));
    output.push_str(&format!(
        "- **Search performed**: {}\n",
        yes_no(report.search_performed)
    ));
    output.push_str(&format!(
        "- **Processing time**: {} ms\n",
        report.processing_time_ms
    ));
    if let Some(ref error) = report.error {
        output.push_str(&format!("- **Errors**: {}\n", error.replace('\n', "; ")));
    }

    output
}
