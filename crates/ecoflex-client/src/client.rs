//! EcoFlex API client implementation

use std::time::Duration;

use ecoflex_core::api::{
    ApiResponse, AuthResponse, FinancialProfileInput, HealthStatus, LoginRequest, MemberInput,
    OpportunityRequest, ProfileView, RegisterRequest, ShockRequest, TrackerEntryInput,
    TrackerSaved,
};
use ecoflex_core::formula::{EconomicScore, OpportunityOutcome, ShockOutcome};
use ecoflex_core::{FamilyMember, FinancialProfile, ResilienceEntry};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{Error, Result};

/// API root used when nothing is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// EcoFlex API client
#[derive(Debug, Clone)]
pub struct EcoflexClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl EcoflexClient {
    /// Creates a client for the API rooted at `base_url`
    /// (e.g. `http://localhost:8080/api`).
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| Error::InvalidUrl {
            url: base_url.clone(),
            message: e.to_string(),
        })?;
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url,
            token: None,
        })
    }

    /// Same client carrying `token` as its bearer credential.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Replaces (or clears) the bearer token.
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// Current bearer token.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// API root without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        tracing::debug!(%method, path, "api request");
        self.http.request(method, self.url(path))
    }

    fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let token = self.token.as_deref().ok_or(Error::NotLoggedIn)?;
        Ok(self.request(method, path).bearer_auth(token))
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn get_authed<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        Self::send(self.authed(Method::GET, path)?).await
    }

    async fn post_authed<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        Self::send(self.authed(Method::POST, path)?.json(body)).await
    }

    // ------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------

    /// `POST /auth/register`
    pub async fn register(&self, request: &RegisterRequest) -> Result<ApiResponse> {
        Self::send(self.request(Method::POST, "/auth/register").json(request)).await
    }

    /// `POST /auth/login`. The caller decides whether to keep the token.
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse> {
        Self::send(self.request(Method::POST, "/auth/login").json(request)).await
    }

    /// `GET /health`
    pub async fn health(&self) -> Result<HealthStatus> {
        Self::send(self.request(Method::GET, "/health")).await
    }

    // ------------------------------------------------------------------
    // Profile
    // ------------------------------------------------------------------

    /// `GET /profile`
    pub async fn profile(&self) -> Result<ProfileView> {
        self.get_authed("/profile").await
    }

    /// `POST /profile/financial`
    pub async fn save_financial_profile(
        &self,
        profile: &FinancialProfileInput,
    ) -> Result<ApiResponse<FinancialProfile>> {
        self.post_authed("/profile/financial", profile).await
    }

    /// `POST /profile/members`, replacing the whole list.
    pub async fn save_members(
        &self,
        members: &[MemberInput],
    ) -> Result<ApiResponse<Vec<FamilyMember>>> {
        self.post_authed("/profile/members", members).await
    }

    /// `GET /profile/members`
    pub async fn members(&self) -> Result<Vec<FamilyMember>> {
        self.get_authed("/profile/members").await
    }

    // ------------------------------------------------------------------
    // Features
    // ------------------------------------------------------------------

    /// `GET /economic-score`
    pub async fn economic_score(&self) -> Result<EconomicScore> {
        self.get_authed("/economic-score").await
    }

    /// `POST /shock-simulate`
    pub async fn simulate_shock(&self, request: &ShockRequest) -> Result<ShockOutcome> {
        self.post_authed("/shock-simulate", request).await
    }

    /// `POST /opportunity-simulate`
    pub async fn simulate_opportunity(
        &self,
        request: &OpportunityRequest,
    ) -> Result<OpportunityOutcome> {
        self.post_authed("/opportunity-simulate", request).await
    }

    /// `POST /resilience-tracker`
    pub async fn record_month(&self, entry: &TrackerEntryInput) -> Result<TrackerSaved> {
        self.post_authed("/resilience-tracker", entry).await
    }

    /// `GET /resilience-tracker/history`
    pub async fn history(&self) -> Result<Vec<ResilienceEntry>> {
        self.get_authed("/resilience-tracker/history").await
    }
}

/// Turns a non-2xx response into [`Error::Api`], preferring the server's
/// `message` field over the bare status text.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });
    tracing::debug!(status = status.as_u16(), %message, "api error");
    Err(Error::Api {
        status: status.as_u16(),
        message,
    })
}
