//! Axum route handlers for the reviewer pages.

use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::feedback::{compile_ballista_feedback, compile_feedback, compile_intern_feedback};
use crate::models::Candidate;
use crate::render;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CandidateForm {
    pub candidate_id: String,
}

/// Lever candidate ids are UUIDs; reject anything else before calling upstream.
fn parse_candidate_id(raw: &str) -> Result<String, AppError> {
    Uuid::parse_str(raw.trim())
        .map(|id| id.to_string())
        .map_err(|_| AppError::Validation(format!("'{}' is not a valid candidate id", raw.trim())))
}

/// Candidate details are decoration; a failed lookup still renders the report.
async fn fetch_candidate(state: &AppState, candidate_id: &str) -> Option<Candidate> {
    match state.lever.get_candidate(candidate_id).await {
        Ok(candidate) => Some(candidate),
        Err(e) => {
            warn!("Could not load candidate {candidate_id}: {e}");
            None
        }
    }
}

/// GET /
pub async fn handle_home() -> Html<String> {
    Html(render::home_page())
}

/// GET /treb
pub async fn handle_intern_search() -> Html<String> {
    Html(render::intern_search_page())
}

/// POST /fetch_feedback
pub async fn handle_fetch_feedback(Form(form): Form<CandidateForm>) -> Result<Redirect, AppError> {
    let candidate_id = parse_candidate_id(&form.candidate_id)?;
    Ok(Redirect::to(&format!("/feedback/{candidate_id}")))
}

/// POST /fetch_internevals
pub async fn handle_fetch_intern_evals(
    Form(form): Form<CandidateForm>,
) -> Result<Redirect, AppError> {
    let candidate_id = parse_candidate_id(&form.candidate_id)?;
    Ok(Redirect::to(&format!("/trebuchet/{candidate_id}")))
}

/// GET /feedback/:candidate_id
pub async fn handle_feedback(
    State(state): State<AppState>,
    Path(candidate_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let candidate_id = parse_candidate_id(&candidate_id)?;
    let report = compile_feedback(state.lever.as_ref(), &state.users, &candidate_id).await;
    let candidate = fetch_candidate(&state, &candidate_id).await;
    info!(
        "Rendered {} feedback records for candidate {candidate_id}",
        report.feedbacks.len()
    );
    Ok(Html(render::feedback_page(
        &candidate_id,
        candidate.as_ref(),
        &report,
    )))
}

/// GET /trebuchet/:candidate_id
pub async fn handle_intern_feedback(
    State(state): State<AppState>,
    Path(candidate_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let candidate_id = parse_candidate_id(&candidate_id)?;
    let report = compile_intern_feedback(
        state.lever.as_ref(),
        &state.users,
        &candidate_id,
        state.config.intern_cutoff_months,
        Utc::now(),
    )
    .await;
    let candidate = fetch_candidate(&state, &candidate_id).await;
    info!(
        "Rendered {} intern evaluations for candidate {candidate_id}",
        report.feedbacks.len()
    );
    Ok(Html(render::intern_page(
        &candidate_id,
        candidate.as_ref(),
        &report,
    )))
}

/// GET /ballista/:candidate_id
pub async fn handle_ballista_feedback(
    State(state): State<AppState>,
    Path(candidate_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let candidate_id = parse_candidate_id(&candidate_id)?;
    let report = compile_ballista_feedback(state.lever.as_ref(), &state.users, &candidate_id).await;
    let candidate = fetch_candidate(&state, &candidate_id).await;
    Ok(Html(render::ballista_page(
        &candidate_id,
        candidate.as_ref(),
        &report,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_candidate_id() {
        let id = "1b25d45c-c68e-4a29-9610-a8d34afe0eb2";
        assert_eq!(parse_candidate_id(&format!(" {id} ")).unwrap(), id);
        assert!(matches!(
            parse_candidate_id("../../users"),
            Err(AppError::Validation(_))
        ));
    }
}
