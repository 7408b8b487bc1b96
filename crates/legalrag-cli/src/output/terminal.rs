//! Terminal output formatter

use super::{yes_no, AnswerReport};

pub fn format_answer(report: &AnswerReport) -> String {
    let mut output = format!("{}\n\n", report.answer.trim_end());

    if !report.references.is_empty() {
        output.push_str("References:\n");
        for reference in &report.references {
            output.push_str(&format!("  - {}\n", reference));
        }
        output.push('\n');
    }

    output.push_str(&format!("Confidence:       {:.2}\n", report.confidence));
    output.push_str(&format!(
        "Search performed: {}\n",
        yes_no(report.search_performed)
    ));
    output.push_str(&format!("Time:             {} ms\n", report.processing_time_ms));
    if let Some(ref error) = report.error {
        for line in error.lines() {
            output.push_str(&format!("Warning:          {}\n", line));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_references_listed() {
        let report = AnswerReport {
            query: "q".into(),
            answer: "Four years.\n".into(),
            references: vec!["Source: ccp337.txt".into()],
            confidence: 0.75,
            search_performed: true,
            processing_time_ms: 40,
            error: Some("Error in search: timeout".into()),
        };
        let text = format_answer(&report);
        assert!(text.starts_with("Four years.\n\nReferences:\n  - Source: ccp337.txt\n"));
        assert!(text.contains("Confidence:       0.75\n"));
        assert!(text.contains("Search performed: yes\n"));
        assert!(text.contains("Warning:          Error in search: timeout\n"));
    }
}
