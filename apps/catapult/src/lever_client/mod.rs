/// Lever client: the single point of entry for all recruiting API calls.
///
/// Everything upstream goes through the `RecruitingApi` trait so the pipeline
/// can run against a fake in tests. Collection reads never fail: transport or
/// decode errors are logged and degrade to an empty collection.
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{
    lever::Envelope, Candidate, FeedbackRecord, FeedbackSubmission, NewCandidate, Page, Posting,
    User,
};

pub const DEFAULT_API_URL: &str = "https://api.lever.co/v1";

#[derive(Debug, Error)]
pub enum LeverError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Deserialize)]
struct LeverErrorBody {
    message: String,
}

/// Read/write surface of the recruiting system.
///
/// Carried in `AppState` as `Arc<dyn RecruitingApi>`.
#[async_trait]
pub trait RecruitingApi: Send + Sync {
    /// All postings for a team, pagination followed to the end.
    async fn list_postings(&self, team: &str) -> Vec<Posting>;

    async fn get_posting(&self, posting_id: &str) -> Result<Posting, LeverError>;

    async fn get_user(&self, user_id: &str) -> Result<User, LeverError>;

    async fn get_candidate(&self, candidate_id: &str) -> Result<Candidate, LeverError>;

    /// All feedback forms for a candidate, pagination followed to the end.
    async fn list_candidate_feedback(&self, candidate_id: &str) -> Vec<FeedbackRecord>;

    async fn create_or_update_candidate(
        &self,
        perform_as: &str,
        candidate: &NewCandidate,
    ) -> Result<Candidate, LeverError>;

    async fn post_feedback(
        &self,
        candidate_id: &str,
        perform_as: &str,
        submission: &FeedbackSubmission,
    ) -> Result<(), LeverError>;
}

/// HTTP implementation of `RecruitingApi` using basic auth (key as user, empty password).
#[derive(Clone)]
pub struct LeverClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl LeverClient {
    pub fn new(base_url: &str, api_key: String, timeout_secs: u64) -> Result<Self, LeverError> {
        if api_key.trim().is_empty() {
            return Err(LeverError::InvalidConfig("API key is empty".to_string()));
        }
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.api_key, Some(""))
    }

    /// Sends a request and decodes the JSON body, mapping non-2xx to `LeverError::Api`.
    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, LeverError> {
        let response = self.authed(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<LeverErrorBody>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(LeverError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    async fn get_one<T: DeserializeOwned>(&self, path: &str) -> Result<T, LeverError> {
        let envelope: Envelope<T> = self.send_json(self.client.get(self.url(path))).await?;
        Ok(envelope.data)
    }

    /// Follows `next`/`hasNext` until the collection is exhausted.
    async fn get_all<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<T>, LeverError> {
        let mut items = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let mut query: Vec<(&str, &str)> = params.to_vec();
            if let Some(cursor) = offset.as_deref() {
                query.push(("offset", cursor));
            }
            let page: Page<Value> = self
                .send_json(self.client.get(self.url(path)).query(&query))
                .await?;
            items.extend(decode_items::<T>(path, page.data));

            match (page.has_next, page.next) {
                (true, Some(next)) => offset = Some(next),
                (true, None) => {
                    warn!("Lever page for {path} has hasNext without a cursor; stopping");
                    break;
                }
                (false, _) => break,
            }
        }

        debug!("Fetched {} items from {path}", items.len());
        Ok(items)
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        params: &[(&str, &str)],
        body: &B,
    ) -> Result<T, LeverError> {
        self.send_json(self.client.post(self.url(path)).query(params).json(body))
            .await
    }
}

/// Decodes page elements one by one so a single malformed record is dropped
/// instead of failing the whole collection.
fn decode_items<T: DeserializeOwned>(path: &str, raw: Vec<Value>) -> Vec<T> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(i, value)| match serde_json::from_value::<T>(value) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("Skipping malformed item {i} from {path}: {e}");
                None
            }
        })
        .collect()
}

fn degrade<T>(what: &str, result: Result<Vec<T>, LeverError>) -> Vec<T> {
    result.unwrap_or_else(|e| {
        warn!("Error reading {what} from Lever: {e}");
        Vec::new()
    })
}

#[async_trait]
impl RecruitingApi for LeverClient {
    async fn list_postings(&self, team: &str) -> Vec<Posting> {
        degrade(
            "postings",
            self.get_all("/postings", &[("team", team)]).await,
        )
    }

    async fn get_posting(&self, posting_id: &str) -> Result<Posting, LeverError> {
        self.get_one(&format!("/postings/{posting_id}")).await
    }

    async fn get_user(&self, user_id: &str) -> Result<User, LeverError> {
        self.get_one(&format!("/users/{user_id}")).await
    }

    async fn get_candidate(&self, candidate_id: &str) -> Result<Candidate, LeverError> {
        self.get_one(&format!("/candidates/{candidate_id}")).await
    }

    async fn list_candidate_feedback(&self, candidate_id: &str) -> Vec<FeedbackRecord> {
        degrade(
            "candidate feedback",
            self.get_all(&format!("/candidates/{candidate_id}/feedback"), &[])
                .await,
        )
    }

    async fn create_or_update_candidate(
        &self,
        perform_as: &str,
        candidate: &NewCandidate,
    ) -> Result<Candidate, LeverError> {
        let envelope: Envelope<Candidate> = self
            .post(
                "/candidates",
                &[("perform_as", perform_as), ("dedupe", "true")],
                candidate,
            )
            .await?;
        Ok(envelope.data)
    }

    async fn post_feedback(
        &self,
        candidate_id: &str,
        perform_as: &str,
        submission: &FeedbackSubmission,
    ) -> Result<(), LeverError> {
        let _: serde_json::Value = self
            .post(
                &format!("/candidates/{candidate_id}/feedback"),
                &[("perform_as", perform_as)],
                submission,
            )
            .await?;
        Ok(())
    }
}
