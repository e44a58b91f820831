use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use wordflash_core::model::{
    Attempt, AttemptOutcome, ChildId, ChildProfile, Difficulty, FinishSummary, GameMode,
    SessionId, SessionPlan, Theme, ThemeId,
};

use crate::error::ApiError;

/// Parameters for starting a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StartSessionRequest {
    pub child_id: ChildId,
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub theme_id: ThemeId,
}

#[derive(Debug, Serialize)]
struct CreateChildRequest<'a> {
    name: &'a str,
}

/// The three calls the game flow depends on.
///
/// The controller only sees this trait, so tests drive it with a scripted
/// fake instead of a server.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Start a new session for a child.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the server rejects it.
    async fn start_session(&self, req: &StartSessionRequest) -> Result<SessionPlan, ApiError>;

    /// Submit one attempt. The reply's `lives_left`/`finished` fields are
    /// authoritative for survival sessions.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the server rejects it.
    async fn submit_attempt(
        &self,
        session: SessionId,
        attempt: &Attempt,
    ) -> Result<AttemptOutcome, ApiError>;

    /// Close the session and fetch the authoritative summary.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the server rejects it.
    async fn finish_session(&self, session: SessionId) -> Result<FinishSummary, ApiError>;
}

/// HTTP client for the game server's JSON API.
#[derive(Clone)]
pub struct SessionApi {
    client: Client,
    base_url: String,
}

impl SessionApi {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(ApiError::Status { status, message })
    }

    /// List the available word themes.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the server rejects it.
    pub async fn list_themes(&self) -> Result<Vec<Theme>, ApiError> {
        let response = self.client.get(self.url("/api/themes")).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// List existing child profiles.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the server rejects it.
    pub async fn list_children(&self) -> Result<Vec<ChildProfile>, ApiError> {
        let response = self.client.get(self.url("/api/children")).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Create a child profile.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the server rejects it.
    pub async fn create_child(&self, name: &str) -> Result<ChildProfile, ApiError> {
        let response = self
            .client
            .post(self.url("/api/children"))
            .json(&CreateChildRequest { name })
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }
}

#[async_trait]
impl SessionBackend for SessionApi {
    async fn start_session(&self, req: &StartSessionRequest) -> Result<SessionPlan, ApiError> {
        let response = self
            .client
            .post(self.url("/api/sessions/start"))
            .json(req)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn submit_attempt(
        &self,
        session: SessionId,
        attempt: &Attempt,
    ) -> Result<AttemptOutcome, ApiError> {
        let response = self
            .client
            .post(self.url(&format!("/api/sessions/{session}/attempt")))
            .json(attempt)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn finish_session(&self, session: SessionId) -> Result<FinishSummary, ApiError> {
        let response = self
            .client
            .post(self.url(&format!("/api/sessions/{session}/finish")))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_without_double_slash() {
        let api = SessionApi::new("http://localhost:8000/");
        assert_eq!(api.url("/api/themes"), "http://localhost:8000/api/themes");
    }

    #[test]
    fn start_request_serializes_wire_names() {
        let req = StartSessionRequest {
            child_id: ChildId::new(5),
            mode: GameMode::OddOneOut,
            difficulty: Difficulty::Hard,
            theme_id: ThemeId::new(2),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["child_id"], 5);
        assert_eq!(json["mode"], "odd_one_out");
        assert_eq!(json["difficulty"], "hard");
        assert_eq!(json["theme_id"], 2);
    }
}
