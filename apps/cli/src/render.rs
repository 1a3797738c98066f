//! Terminal presentation of request states and assessment reports.

use std::fmt::Write as _;

use query_core::assessment::AssessmentReport;
use shared::domain::{QueryResult, RequestState};

pub fn render_state(state: &RequestState) -> String {
    match state {
        RequestState::Idle => "Ready.".to_string(),
        RequestState::Loading(handle) => format!("Searching... (request #{handle})"),
        RequestState::Succeeded(_, result) => render_result(result),
        RequestState::Failed(_, err) => format!("Error: {}", err.user_message()),
    }
}

pub fn render_result(result: &QueryResult) -> String {
    let mut out = String::new();
    match result {
        QueryResult::ScholarshipList(items) => {
            let _ = writeln!(out, "Scholarships found: {}", items.len());
            for (idx, item) in items.iter().enumerate() {
                let _ = writeln!(out, "\n{}. {}", idx + 1, item.title);
                if !item.eligibility_summary.is_empty() {
                    let _ = writeln!(out, "   Eligibility: {}", item.eligibility_summary);
                }
                if let Some(amount) = item.amount {
                    let _ = writeln!(out, "   Amount: ₹{amount:.0}");
                }
                if let Some(deadline) = item.deadline {
                    let _ = writeln!(out, "   Deadline: {}", deadline.format("%d %B %Y"));
                }
            }
        }
        QueryResult::CourseList(items) => {
            let _ = writeln!(out, "Recommended courses: {}", items.len());
            for (idx, item) in items.iter().enumerate() {
                let mut tags = Vec::new();
                if item.is_free {
                    tags.push("free");
                }
                if item.certificate_offered {
                    tags.push("certificate");
                }
                let _ = write!(out, "\n{}. {}", idx + 1, item.title);
                if !item.provider.is_empty() {
                    let _ = write!(out, " ({})", item.provider);
                }
                if !tags.is_empty() {
                    let _ = write!(out, " [{}]", tags.join(", "));
                }
                out.push('\n');
            }
        }
        QueryResult::AdviceText(text) => {
            out.push_str(text);
            out.push('\n');
        }
    }
    out
}

pub fn render_assessment(report: &AssessmentReport) -> String {
    let mut out = String::from("Your skill assessment results:\n\n");
    for entry in &report.scores {
        let _ = writeln!(out, "• {}: {}/100", entry.skill, entry.score);
    }
    let _ = writeln!(out, "\nAverage: {:.1}", report.average);
    let _ = writeln!(out, "Focus next on: {}", report.focus_areas.join(", "));
    out
}
