//! Intern evaluation forms.
//!
//! The form exists in two layouts. v1 has one notes field for the whole
//! evaluation; v2 follows every metric with its own notes field. Forms older
//! than the lookback window are hidden.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::feedback::INTERN_EVALUATION_PREFIX;
use crate::lever_client::RecruitingApi;
use crate::models::{FeedbackRecord, Field};
use crate::user_cache::UserDirectory;

pub const DEFAULT_CUTOFF_MONTHS: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormVersion {
    V1,
    V2,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternField {
    pub label: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternFields {
    pub overall_score: Option<String>,
    pub notes: Option<String>,
    pub other_fields: Vec<InternField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternFeedback {
    #[serde(flatten)]
    pub fields: InternFields,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternHeader {
    pub score: Option<String>,
    pub interviewer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternReport {
    pub headers: Vec<InternHeader>,
    pub feedbacks: Vec<InternFeedback>,
}

fn starts_with_ci(text: &str, prefix: &str) -> bool {
    text.to_lowercase().starts_with(prefix)
}

fn is_notes(field: &Field) -> bool {
    starts_with_ci(&field.text, "notes")
}

fn is_overall(field: &Field) -> bool {
    starts_with_ci(&field.text, "overall")
}

/// "Technical - Blue" -> "Technical".
fn clean_label(text: &str) -> String {
    text.split('-').next().unwrap_or_default().trim().to_string()
}

pub fn detect_form_version(fields: &[Field]) -> FormVersion {
    if fields.iter().filter(|f| is_notes(f)).count() > 1 {
        FormVersion::V2
    } else {
        FormVersion::V1
    }
}

pub fn extract_form_v1(fields: &[Field]) -> InternFields {
    let mut cleaned = InternFields::default();
    for field in fields {
        if is_overall(field) {
            cleaned.overall_score = Some(field.value.clone());
        } else if is_notes(field) {
            cleaned.notes = Some(field.value.clone());
        } else {
            cleaned.other_fields.push(InternField {
                label: clean_label(&field.text),
                text: field.value.clone(),
                notes: None,
            });
        }
    }
    cleaned
}

pub fn extract_form_v2(fields: &[Field]) -> InternFields {
    let mut cleaned = InternFields::default();
    let mut pending: Option<InternField> = None;

    for field in fields {
        if is_overall(field) {
            cleaned.overall_score = Some(field.value.clone());
            continue;
        }
        if is_notes(field) {
            // Notes close the metric they follow. Stray notes with nothing open
            // become an unlabeled entry.
            let mut entry = pending.take().unwrap_or(InternField {
                label: String::new(),
                text: String::new(),
                notes: None,
            });
            entry.notes = Some(field.value.clone());
            cleaned.other_fields.push(entry);
            continue;
        }
        if let Some(open) = pending.take() {
            cleaned.other_fields.push(open);
        }
        pending = Some(InternField {
            label: clean_label(&field.text),
            text: field.value.clone(),
            notes: None,
        });
    }

    if let Some(open) = pending {
        cleaned.other_fields.push(open);
    }
    cleaned
}

pub fn extract_intern_fields(fields: &[Field]) -> InternFields {
    match detect_form_version(fields) {
        FormVersion::V1 => extract_form_v1(fields),
        FormVersion::V2 => extract_form_v2(fields),
    }
}

/// A month is counted as 30 days.
pub fn is_older_than_months(completed_at_ms: i64, months: u32, now: DateTime<Utc>) -> bool {
    let Some(completed) = Utc.timestamp_millis_opt(completed_at_ms).single() else {
        return true;
    };
    now - Duration::days(i64::from(months) * 30) > completed
}

/// Completed intern forms inside the lookback window, oldest first.
pub fn recent_intern_records(
    records: Vec<FeedbackRecord>,
    cutoff_months: u32,
    now: DateTime<Utc>,
) -> Vec<FeedbackRecord> {
    let mut records: Vec<FeedbackRecord> = records
        .into_iter()
        .filter(|r| r.title.starts_with(INTERN_EVALUATION_PREFIX))
        .filter(|r| match r.completed_at {
            Some(ts) => !is_older_than_months(ts, cutoff_months, now),
            None => false,
        })
        .collect();
    records.sort_by(|a, b| {
        a.completed_at
            .cmp(&b.completed_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    records
}

pub async fn compile_intern_feedback(
    api: &dyn RecruitingApi,
    users: &UserDirectory,
    candidate_id: &str,
    cutoff_months: u32,
    now: DateTime<Utc>,
) -> InternReport {
    let records = api.list_candidate_feedback(candidate_id).await;
    compile_intern_feedback_from(records, users, cutoff_months, now).await
}

pub async fn compile_intern_feedback_from(
    records: Vec<FeedbackRecord>,
    users: &UserDirectory,
    cutoff_months: u32,
    now: DateTime<Utc>,
) -> InternReport {
    let mut report = InternReport::default();

    for record in recent_intern_records(records, cutoff_months, now) {
        let user = match users.get_or_fetch(&record.user).await {
            Ok(user) => user,
            Err(e) => {
                warn!(
                    "Skipping intern evaluation {}: could not resolve {}: {e}",
                    record.id, record.user
                );
                continue;
            }
        };

        let fields = extract_intern_fields(&record.fields);
        report.headers.push(InternHeader {
            score: fields.overall_score.clone(),
            interviewer: user.name.trim().to_string(),
        });
        report.feedbacks.push(InternFeedback {
            fields,
            username: user.name,
        });
    }

    debug!("Compiled {} intern evaluations", report.feedbacks.len());
    report
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::{directory, record, user, FakeLever};

    fn f(text: &str, value: &str) -> Field {
        Field::new(text, value)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn days_ago(days: i64) -> i64 {
        (now() - Duration::days(days)).timestamp_millis()
    }

    #[test]
    fn test_v2_grouping_flushes_trailing_entry() {
        let fields = vec![
            f("Overall", "7"),
            f("Technical - Blue", "ok"),
            f("Notes", "good"),
            f("Leadership - Green", "meh"),
        ];
        let cleaned = extract_form_v2(&fields);
        assert_eq!(cleaned.overall_score.as_deref(), Some("7"));
        assert_eq!(
            cleaned.other_fields,
            vec![
                InternField {
                    label: "Technical".to_string(),
                    text: "ok".to_string(),
                    notes: Some("good".to_string()),
                },
                InternField {
                    label: "Leadership".to_string(),
                    text: "meh".to_string(),
                    notes: None,
                },
            ]
        );
    }

    #[test]
    fn test_v2_back_to_back_metrics_flush_without_notes() {
        let fields = vec![
            f("Communication - Purple", "clear"),
            f("Ownership - Red", "high"),
            f("Notes on ownership", "drove the project"),
            f("Impact", "big"),
            f("notes", "shipped"),
        ];
        let cleaned = extract_form_v2(&fields);
        let summary: Vec<(&str, Option<&str>)> = cleaned
            .other_fields
            .iter()
            .map(|e| (e.label.as_str(), e.notes.as_deref()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Communication", None),
                ("Ownership", Some("drove the project")),
                ("Impact", Some("shipped")),
            ]
        );
        assert!(cleaned.overall_score.is_none());
    }

    #[test]
    fn test_v1_single_notes() {
        let fields = vec![
            f("Technical - Blue", "strong"),
            f("Overall Rating", "8"),
            f("Leadership - Green", "growing"),
            f("Notes", "Great summer"),
        ];
        let cleaned = extract_form_v1(&fields);
        assert_eq!(cleaned.overall_score.as_deref(), Some("8"));
        assert_eq!(cleaned.notes.as_deref(), Some("Great summer"));
        let labels: Vec<&str> = cleaned.other_fields.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Technical", "Leadership"]);
    }

    #[test]
    fn test_form_detection() {
        let v1 = vec![f("Technical", "a"), f("Notes", "b")];
        let v2 = vec![f("Technical", "a"), f("Notes", "b"), f("Impact", "c"), f("NOTES", "d")];
        assert_eq!(detect_form_version(&v1), FormVersion::V1);
        assert_eq!(detect_form_version(&v2), FormVersion::V2);
        assert_eq!(extract_intern_fields(&v2).other_fields.len(), 2);
        assert_eq!(extract_intern_fields(&v1).notes.as_deref(), Some("b"));
    }

    #[test]
    fn test_cutoff_uses_thirty_day_months() {
        assert!(!is_older_than_months(days_ago(209), 7, now()));
        assert!(is_older_than_months(days_ago(211), 7, now()));
    }

    #[tokio::test]
    async fn test_report_filters_and_orders_by_completion() {
        let api = Arc::new(FakeLever::new().with_user(user("m1", " Mentor One ")));
        let input = vec![
            record(
                "newer",
                "Intern Evaluations - Final",
                "m1",
                Some(days_ago(10)),
                &[("Overall", "9"), ("Notes", "done")],
            ),
            record(
                "older",
                "Intern Evaluations - Midpoint",
                "m1",
                Some(days_ago(40)),
                &[("Overall", "6"), ("Notes", "ok")],
            ),
            record(
                "stale",
                "Intern Evaluations - Last year",
                "m1",
                Some(days_ago(400)),
                &[("Overall", "3")],
            ),
            record(
                "draft",
                "Intern Evaluations - Final",
                "m1",
                None,
                &[("Overall", "1")],
            ),
            record("onsite", "System Design", "m1", Some(days_ago(5)), &[("Rating", "4")]),
        ];

        let report = compile_intern_feedback_from(input, &directory(api), 7, now()).await;
        let scores: Vec<Option<&str>> =
            report.headers.iter().map(|h| h.score.as_deref()).collect();
        assert_eq!(scores, vec![Some("6"), Some("9")]);
        assert_eq!(report.headers[0].interviewer, "Mentor One");
        assert_eq!(report.feedbacks[0].username, " Mentor One ");
        assert_eq!(report.feedbacks.len(), report.headers.len());
    }

    #[tokio::test]
    async fn test_unresolvable_mentor_is_skipped() {
        let api = Arc::new(FakeLever::new());
        let input = vec![record(
            "x",
            "Intern Evaluations",
            "missing",
            Some(days_ago(1)),
            &[("Overall", "5")],
        )];
        let report = compile_intern_feedback_from(input, &directory(api), 7, now()).await;
        assert_eq!(report, InternReport::default());
    }
}
