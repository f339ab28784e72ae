//! In-crate fakes shared by unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::lever_client::{LeverError, RecruitingApi};
use crate::models::{
    Candidate, FeedbackRecord, FeedbackSubmission, Field, NewCandidate, Posting, User,
};
use crate::user_cache::{MemoryUserCache, UserDirectory, DEFAULT_USER_TTL};

#[derive(Default)]
pub struct FakeLever {
    users: HashMap<String, User>,
    candidates: HashMap<String, Candidate>,
    feedback: HashMap<String, Vec<FeedbackRecord>>,
    user_fetches: AtomicUsize,
}

impl FakeLever {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.users.insert(user.id.clone(), user);
        self
    }

    pub fn with_candidate(mut self, candidate: Candidate) -> Self {
        self.candidates.insert(candidate.id.clone(), candidate);
        self
    }

    pub fn with_feedback(mut self, candidate_id: &str, records: Vec<FeedbackRecord>) -> Self {
        self.feedback.insert(candidate_id.to_string(), records);
        self
    }

    pub fn user_fetches(&self) -> usize {
        self.user_fetches.load(Ordering::SeqCst)
    }
}

fn not_found(what: &str) -> LeverError {
    LeverError::Api {
        status: 404,
        message: format!("{what} not found"),
    }
}

#[async_trait]
impl RecruitingApi for FakeLever {
    async fn list_postings(&self, _team: &str) -> Vec<Posting> {
        Vec::new()
    }

    async fn get_posting(&self, posting_id: &str) -> Result<Posting, LeverError> {
        Err(not_found(posting_id))
    }

    async fn get_user(&self, user_id: &str) -> Result<User, LeverError> {
        self.user_fetches.fetch_add(1, Ordering::SeqCst);
        self.users.get(user_id).cloned().ok_or_else(|| not_found(user_id))
    }

    async fn get_candidate(&self, candidate_id: &str) -> Result<Candidate, LeverError> {
        self.candidates
            .get(candidate_id)
            .cloned()
            .ok_or_else(|| not_found(candidate_id))
    }

    async fn list_candidate_feedback(&self, candidate_id: &str) -> Vec<FeedbackRecord> {
        self.feedback.get(candidate_id).cloned().unwrap_or_default()
    }

    async fn create_or_update_candidate(
        &self,
        _perform_as: &str,
        candidate: &NewCandidate,
    ) -> Result<Candidate, LeverError> {
        Ok(Candidate {
            id: "new".to_string(),
            name: candidate.name.clone(),
            headline: Some(candidate.headline.clone()),
            location: Some(candidate.location.clone()),
            emails: candidate.emails.clone(),
            tags: candidate.tags.clone(),
        })
    }

    async fn post_feedback(
        &self,
        _candidate_id: &str,
        _perform_as: &str,
        _submission: &FeedbackSubmission,
    ) -> Result<(), LeverError> {
        Ok(())
    }
}

pub fn user(id: &str, name: &str) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        username: name.to_lowercase(),
        email: None,
    }
}

pub fn candidate(id: &str, name: &str) -> Candidate {
    Candidate {
        id: id.to_string(),
        name: name.to_string(),
        headline: None,
        location: None,
        emails: Vec::new(),
        tags: Vec::new(),
    }
}

pub fn record(
    id: &str,
    title: &str,
    user_id: &str,
    completed_at: Option<i64>,
    fields: &[(&str, &str)],
) -> FeedbackRecord {
    FeedbackRecord {
        id: id.to_string(),
        title: title.to_string(),
        user: user_id.to_string(),
        completed_at,
        fields: fields.iter().map(|(t, v)| Field::new(*t, *v)).collect(),
    }
}

pub fn directory(api: Arc<FakeLever>) -> UserDirectory {
    UserDirectory::new(api, Arc::new(MemoryUserCache::new()), DEFAULT_USER_TTL)
}
