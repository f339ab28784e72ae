//! Feedback normalization for regular interview loops.
//!
//! filter -> order -> resolve interviewer -> extract fields -> header + body.
//! A record that fails any step is logged and left out of both outputs, so
//! `headers[i]` always describes `feedbacks[i]`.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::feedback::fields::{
    field_value, is_excluded, FieldPolicy, ANYTHING_ELSE_TO_KNOW_KEY, RATING_KEY,
    TEAM_FEEDBACK_KEY, TEAM_SUGGESTIONS_KEY,
};
use crate::feedback::header::Header;
use crate::feedback::ordering::order_feedback;
use crate::feedback::{FeedbackError, INTERN_EVALUATION_PREFIX};
use crate::lever_client::RecruitingApi;
use crate::models::{FeedbackRecord, User};
use crate::user_cache::UserDirectory;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackText {
    pub header: String,
    pub text: String,
}

/// A feedback form enriched for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledFeedback {
    pub id: String,
    pub title: String,
    pub user_id: String,
    pub completed_at: i64,
    /// Interviewer display name.
    pub username: String,
    /// Raw rating value as entered.
    pub score: String,
    /// First field's value; most templates put the main narrative there.
    pub feedback_text: String,
    pub feedback_texts: Vec<FeedbackText>,
    pub team_suggestion: String,
    pub team_feedback: String,
    pub anything_else_we_should_know: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackReport {
    pub headers: Vec<Header>,
    pub feedbacks: Vec<CompiledFeedback>,
}

/// Completed, non-intern records in report order.
pub fn reportable_records(records: Vec<FeedbackRecord>) -> Vec<FeedbackRecord> {
    let mut records: Vec<FeedbackRecord> = records
        .into_iter()
        .filter(|r| r.is_completed() && !r.title.starts_with(INTERN_EVALUATION_PREFIX))
        .collect();
    order_feedback(&mut records);
    records
}

/// Fetches a candidate's feedback and compiles the report.
pub async fn compile_feedback(
    api: &dyn RecruitingApi,
    users: &UserDirectory,
    candidate_id: &str,
) -> FeedbackReport {
    let records = api.list_candidate_feedback(candidate_id).await;
    compile_feedback_from(records, users).await
}

/// Compiles a report from an already fetched collection.
pub async fn compile_feedback_from(
    records: Vec<FeedbackRecord>,
    users: &UserDirectory,
) -> FeedbackReport {
    let mut report = FeedbackReport::default();

    for record in reportable_records(records) {
        let user = match users.get_or_fetch(&record.user).await {
            Ok(user) => user,
            Err(e) => {
                let err = FeedbackError::UserLookup {
                    user_id: record.user.clone(),
                    reason: e.to_string(),
                };
                warn!("Skipping feedback {} ({}): {err}", record.id, record.title);
                continue;
            }
        };

        match compile_record(&record, &user) {
            Ok((header, compiled)) => {
                report.headers.push(header);
                report.feedbacks.push(compiled);
            }
            Err(e) => warn!("Skipping feedback {} ({}): {e}", record.id, record.title),
        }
    }

    debug!("Compiled {} feedback records", report.feedbacks.len());
    report
}

fn compile_record(
    record: &FeedbackRecord,
    user: &User,
) -> Result<(Header, CompiledFeedback), FeedbackError> {
    let fields = &record.fields;
    let score = field_value(fields, RATING_KEY, FieldPolicy::Required)?;

    let header = Header::new(&score, &user.name, &record.title);

    let compiled = CompiledFeedback {
        id: record.id.clone(),
        title: record.title.clone(),
        user_id: record.user.clone(),
        completed_at: record.completed_at.unwrap_or_default(),
        username: user.name.clone(),
        feedback_text: fields.first().map(|f| f.value.clone()).unwrap_or_default(),
        feedback_texts: fields
            .iter()
            .filter(|f| !is_excluded(f))
            .map(|f| FeedbackText {
                header: f.text.clone(),
                text: f.value.clone(),
            })
            .collect(),
        team_suggestion: field_value(fields, TEAM_SUGGESTIONS_KEY, FieldPolicy::AllowMissing)?,
        team_feedback: field_value(fields, TEAM_FEEDBACK_KEY, FieldPolicy::AllowMissing)?,
        anything_else_we_should_know: field_value(
            fields,
            ANYTHING_ELSE_TO_KNOW_KEY,
            FieldPolicy::AllowMissing,
        )?,
        score,
    };

    Ok((header, compiled))
}
