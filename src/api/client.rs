use crate::api::error::ApiError;
use crate::models::LoginResponse;
use crate::session::SessionStore;
use anyhow::{Context, Result};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// HTTP client for the marketplace backend.
///
/// Every request re-reads the persisted session and attaches the bearer
/// credential under the backend-token-first precedence rule; the read is
/// pure and never mutates the stored pair.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    store: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, store: Arc<SessionStore>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            store,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Exchange a provider token for an authoritative identity and a backend
    /// session token
    pub async fn login(&self, id_token: &str) -> Result<LoginResponse, ApiError> {
        self.send(
            self.request(Method::POST, "/auth/login")
                .json(&serde_json::json!({ "idToken": id_token })),
        )
        .await
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
    }

    /// Send with authorization attached, decoding a JSON body on success
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.execute(request).await?;
        Ok(response.json().await?)
    }

    /// Send with authorization attached, discarding any success body
    pub(crate) async fn send_ok(&self, request: RequestBuilder) -> Result<(), ApiError> {
        self.execute(request).await?;
        Ok(())
    }

    async fn execute(&self, request: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        debug!(status = %status, "backend response");
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_response(status, &body))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.store.tokens().bearer() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.request(Method::GET, path)).await
    }

    pub(crate) async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    pub(crate) async fn post_ok(&self, path: &str, body: &impl Serialize) -> Result<(), ApiError> {
        self.send_ok(self.request(Method::POST, path).json(body))
            .await
    }

    pub(crate) async fn patch_ok(&self, path: &str, body: &impl Serialize) -> Result<(), ApiError> {
        self.send_ok(self.request(Method::PATCH, path).json(body))
            .await
    }

    pub(crate) async fn delete_ok(&self, path: &str) -> Result<(), ApiError> {
        self.send_ok(self.request(Method::DELETE, path)).await
    }
}
