//! Login gate.
//!
//! The app sits behind an identity-aware proxy which forwards the signed-in
//! user's email in a header (optionally prefixed, e.g. `accounts.google.com:`).
//! Requests must be logged in, from the company domain, and an admin.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::config::AuthConfig;
use crate::errors::AppError;
use crate::state::AppState;

/// Strips an `issuer:` prefix and normalizes case.
fn parse_email(raw: &str) -> Option<String> {
    let email = raw.rsplit(':').next().unwrap_or(raw).trim().to_lowercase();
    if email.contains('@') {
        Some(email)
    } else {
        None
    }
}

/// Returns the normalized email of an allowed reviewer.
pub fn authorize(config: &AuthConfig, header_value: Option<&str>) -> Result<String, AppError> {
    let email = header_value
        .and_then(parse_email)
        .ok_or(AppError::Unauthorized)?;

    if !config.company_domain.is_empty()
        && !email.ends_with(&format!("@{}", config.company_domain))
    {
        warn!("Rejected non-company login {email}");
        return Err(AppError::Forbidden);
    }

    if !config.admin_emails.is_empty() && !config.admin_emails.contains(&email) {
        warn!("Rejected non-admin login {email}");
        return Err(AppError::Forbidden);
    }

    Ok(email)
}

pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth = &state.config.auth;
    let header_value = request
        .headers()
        .get(auth.email_header.as_str())
        .and_then(|v| v.to_str().ok());

    let email = authorize(auth, header_value)?;
    debug!("Authorized {email}");
    Ok(next.run(request).await)
}
