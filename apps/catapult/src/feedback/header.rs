use serde::{Deserialize, Serialize};

/// Department prefix repeated on every engineering interview title.
pub const ENGINEERING_PREFIX: &str = "Engineering - ";

/// One summary row at the top of a feedback report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub score: String,
    pub interviewer: String,
    pub interview_type: String,
}

impl Header {
    pub fn new(raw_score: &str, interviewer: &str, title: &str) -> Self {
        Self {
            score: normalize_score(raw_score),
            interviewer: interviewer.trim().to_string(),
            interview_type: truncate_interview_type(title),
        }
    }
}

/// `"4 - strong hire"` becomes `"4"`; anything not starting with a digit is kept as-is.
pub fn normalize_score(raw: &str) -> String {
    match raw.chars().next() {
        Some(c) if c.is_ascii_digit() => c.to_string(),
        _ => raw.to_string(),
    }
}

/// Drops the redundant department prefix. Titles with many dash-separated
/// parts are very specific, so only the last part is kept.
pub fn truncate_interview_type(title: &str) -> String {
    let title = title.trim();
    if let Some(rest) = title.strip_prefix(ENGINEERING_PREFIX) {
        return rest.to_string();
    }
    let parts: Vec<&str> = title.split("- ").collect();
    if parts.len() > 2 {
        if let Some(last) = parts.last() {
            return last.to_string();
        }
    }
    title.to_string()
}
