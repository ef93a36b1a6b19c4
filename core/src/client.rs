//! Shared HTTP client for the academic records API.
//!
//! # Design
//! `ApiClient` holds the base URL, the credentials and the transport, and
//! nothing else. Each call is split into `build` (produces an `HttpRequest`
//! with the JSON content type and bearer token attached) and `parse_*`
//! (consumes an `HttpResponse`). The transport runs the round-trip in between.
//! Every accessor shares one `ApiClient` behind an `Arc`.

use std::sync::RwLock;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ApiError, ResponseBody};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;

pub struct ApiClient<T> {
    base_url: String,
    api_key: Option<String>,
    session_token: RwLock<Option<String>>,
    transport: T,
}

impl<T> ApiClient<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
            session_token: RwLock::new(None),
            transport,
        }
    }

    pub fn from_config(config: &ClientConfig, transport: T) -> Self {
        let client = Self::new(&config.base_url, transport);
        match &config.api_key {
            Some(key) => client.with_api_key(key.clone()),
            None => client,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Token of the logged-in user. Takes precedence over the API key.
    pub fn set_session_token(&self, token: impl Into<String>) {
        let mut slot = self.session_token.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(token.into());
    }

    pub fn clear_session_token(&self) {
        let mut slot = self.session_token.write().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }

    fn bearer_token(&self) -> Option<String> {
        let session = self.session_token.read().unwrap_or_else(|e| e.into_inner());
        session.clone().or_else(|| self.api_key.clone())
    }

    pub fn build(&self, method: HttpMethod, path: &str, body: Option<String>) -> HttpRequest {
        let mut headers = Vec::new();
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        if let Some(token) = self.bearer_token() {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }
        HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            headers,
            body,
        }
    }

    pub fn build_json<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(self.build(method, path, Some(body)))
    }
}

impl<T: Transport> ApiClient<T> {
    /// Execute `request`, turning a non-2xx status into `ApiError::Http`.
    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = %request.method, url = %request.path, "sending request");
        let response = self.transport.execute(request).await?;
        debug!(status = response.status, "received response");
        check_status(&response)?;
        Ok(response)
    }

    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        let response = self.send(self.build(HttpMethod::Get, path, None)).await?;
        parse_json(&response)
    }

    pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.build_json(HttpMethod::Post, path, body)?;
        let response = self.send(request).await?;
        parse_json(&response)
    }

    /// PUT `body`. The raw response is returned because some endpoints answer
    /// 204 with no body.
    pub async fn put<B>(&self, path: &str, body: &B) -> Result<HttpResponse, ApiError>
    where
        B: Serialize + Sync + ?Sized,
    {
        let request = self.build_json(HttpMethod::Put, path, body)?;
        self.send(request).await
    }

    /// Bodiless POST, used by the link endpoints.
    pub async fn post_empty(&self, path: &str) -> Result<(), ApiError> {
        self.send(self.build(HttpMethod::Post, path, None)).await?;
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(self.build(HttpMethod::Delete, path, None)).await?;
        Ok(())
    }
}

pub fn parse_json<R: DeserializeOwned>(response: &HttpResponse) -> Result<R, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map any non-2xx status to `ApiError::Http`, decoding the body once.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::Http {
        status: response.status,
        body: ResponseBody::decode(&response.body),
    })
}
