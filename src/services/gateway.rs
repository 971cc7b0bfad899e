// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authenticated request gateway: every backend call goes through here.
//!
//! Handles:
//! - JSON content type on every request
//! - Bearer token attachment from the session store (see `middleware::auth`)
//! - Mapping non-2xx responses to typed errors
//!
//! No retries, no token refresh, no caching.

use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::middleware::auth::attach_bearer;
use crate::services::SessionStore;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Backend API client bound to a session store.
#[derive(Clone)]
pub struct ApiGateway {
    http: reqwest::Client,
    base_url: String,
    session: SessionStore,
}

/// Result of a dispatched request, with the bearer token it carried.
///
/// Lets callers tell a rejection of the current token from a rejection of
/// one that was replaced while the request was in flight.
pub struct Dispatched<T> {
    pub result: Result<T>,
    pub token: Option<String>,
}

impl ApiGateway {
    /// Create a gateway for the configured backend.
    pub fn new(config: &Config, session: SessionStore) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    /// Send a request and parse the JSON response body.
    ///
    /// The token is read from the session immediately before dispatch. An
    /// empty 2xx body parses as JSON `null`.
    pub async fn request<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.dispatch(method, path, body).await.result
    }

    /// Like `request`, but also report which token was attached.
    pub async fn dispatch<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Dispatched<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);

        let mut request = self.http.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let (request, token) = attach_bearer(request, &self.session);

        Dispatched {
            result: self.send(request, &method, path).await,
            token,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        method: &Method,
        path: &str,
    ) -> Result<T> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(%method, path, error = %e, "Request did not reach the backend");
            ApiError::from(e)
        })?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&bytes);
            tracing::warn!(%method, path, status = status.as_u16(), "Backend returned an error");
            return Err(ApiError::from_status(status, &text));
        }

        tracing::debug!(%method, path, status = status.as_u16(), "Request completed");

        let payload: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &bytes
        };

        serde_json::from_slice(payload)
            .map_err(|e| ApiError::Decode(format!("{} {}: {}", method, path, e)))
    }

    /// GET a JSON resource.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::GET, path, None::<&()>).await
    }

    /// POST a JSON body.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, path, Some(body)).await
    }

    /// PATCH a JSON body.
    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PATCH, path, Some(body)).await
    }

    /// DELETE a resource.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::DELETE, path, None::<&()>).await
    }
}
