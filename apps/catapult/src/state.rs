use std::sync::Arc;

use crate::config::Config;
use crate::lever_client::RecruitingApi;
use crate::user_cache::UserDirectory;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Lever API. `LeverClient` in production, a fake in tests.
    pub lever: Arc<dyn RecruitingApi>,
    /// Cache-or-fetch interviewer lookup on top of `lever`.
    pub users: UserDirectory,
    pub config: Config,
}
