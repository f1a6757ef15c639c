//! `PushClient`: token, endpoint table and transport.
//!
//! # Design
//! The client carries no mutable state between calls. Every operation builds
//! an `HttpRequest`, hands it to `send` (authenticate, execute, classify
//! status) and decodes the body. Resource operations live in `resources.rs`,
//! the two-phase file upload in `upload.rs`.

use serde::de::DeserializeOwned;
use url::Url;

use crate::config::{member_url, Endpoints, TOKEN_ENV};
use crate::error::{ApiError, Result};
use crate::http::{check_status, HttpMethod, HttpRequest, Transport};
use crate::params::Params;
use crate::transport::ReqwestTransport;

/// Blocking client for the Pushbullet v2 API.
///
/// Safe to share between threads when the transport is; each call forms and
/// reads its own request.
#[derive(Clone)]
pub struct PushClient<T: Transport = ReqwestTransport> {
    token: String,
    endpoints: Endpoints,
    transport: T,
}

impl<T: Transport> std::fmt::Debug for PushClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushClient")
            .field("token", &"<redacted>")
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

impl PushClient<ReqwestTransport> {
    /// Client for the public API using the default reqwest transport.
    pub fn new(token: &str) -> Result<Self> {
        Ok(Self::with_transport(
            token,
            Endpoints::default(),
            ReqwestTransport::new()?,
        ))
    }

    /// Read `PUSHBULLET_TOKEN` (required) and `PUSHBULLET_API_ROOT` (optional).
    pub fn from_env() -> Result<Self> {
        let token = std::env::var(TOKEN_ENV)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ApiError::Configuration(format!("{TOKEN_ENV} is not set")))?;
        Ok(Self::with_transport(
            &token,
            Endpoints::from_env()?,
            ReqwestTransport::new()?,
        ))
    }
}

impl<T: Transport> PushClient<T> {
    pub fn with_transport(token: &str, endpoints: Endpoints, transport: T) -> Self {
        Self {
            token: token.to_string(),
            endpoints,
            transport,
        }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    /// Authenticate, execute and classify. Returns the body of a 2xx response.
    pub(crate) fn send(&self, request: HttpRequest) -> Result<Vec<u8>> {
        let request = request.with_token(&self.token);
        let method = request.method;
        let url = request.url.clone();
        tracing::debug!(%method, %url, "sending request");

        let response = self.transport.execute(request)?;
        tracing::debug!(%method, %url, status = response.status, "received response");

        check_status(response).inspect_err(|e| {
            tracing::warn!(%method, %url, error = %e, "request rejected by service");
        })
    }

    pub(crate) fn fetch<R: DeserializeOwned>(&self, request: HttpRequest) -> Result<R> {
        let body = self.send(request)?;
        decode(&body)
    }

    pub(crate) fn get<R: DeserializeOwned>(&self, url: &Url) -> Result<R> {
        self.fetch(HttpRequest::new(HttpMethod::Get, url.as_str()))
    }

    pub(crate) fn post<R: DeserializeOwned>(&self, url: &Url, params: &Params) -> Result<R> {
        let request = HttpRequest::new(HttpMethod::Post, url.as_str()).with_json(params.to_json()?);
        self.fetch(request)
    }

    /// POST the remaining fields to `{base}/{iden}`; `iden` is not sent in the body.
    pub(crate) fn update<R: DeserializeOwned>(
        &self,
        base: &Url,
        operation: &'static str,
        mut params: Params,
    ) -> Result<R> {
        let iden = params.take_text(operation, "iden")?;
        self.post(&member_url(base, &iden), &params)
    }

    pub(crate) fn delete(&self, base: &Url, operation: &'static str, params: &Params) -> Result<()> {
        let iden = params.text(operation, "iden")?;
        let url = member_url(base, &iden);
        self.send(HttpRequest::new(HttpMethod::Delete, url.as_str()))?;
        Ok(())
    }
}

pub(crate) fn decode<R: DeserializeOwned>(body: &[u8]) -> Result<R> {
    serde_json::from_slice(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}
