//! HTTP transport types.
//!
//! # Design
//! Requests and responses are described as plain data. `PushClient` builds
//! `HttpRequest` values and classifies `HttpResponse` values; a `Transport`
//! performs the actual round trip. Swapping the transport (reqwest in
//! production, a recording fake in tests) never touches request building.

use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::{ApiError, Result};

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        })
    }
}

/// A file carried by a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// A `multipart/form-data` body. Text fields are sent in order, followed by
/// the file part. The transport owns boundary generation and the
/// corresponding `Content-Type` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartForm {
    pub fields: Vec<(String, String)>,
    pub file: FilePart,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpBody {
    Json(Vec<u8>),
    Multipart(MultipartForm),
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<HttpBody>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Attach a JSON body and the matching content type.
    pub fn with_json(mut self, body: Vec<u8>) -> Self {
        self.headers
            .push(("content-type".to_string(), "application/json".to_string()));
        self.body = Some(HttpBody::Json(body));
        self
    }

    pub fn with_multipart(mut self, form: MultipartForm) -> Self {
        self.body = Some(HttpBody::Multipart(form));
        self
    }

    /// Basic auth with the API token as username and an empty password.
    pub fn with_token(mut self, token: &str) -> Self {
        self.headers
            .push(("authorization".to_string(), basic_auth(token)));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }
}

/// Performs one HTTP round trip.
///
/// Implementations report connection-level failures as
/// `ApiError::TransportFailure` and return every HTTP status as data; status
/// interpretation belongs to the caller.
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        (**self).execute(request)
    }
}

pub(crate) fn basic_auth(token: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{token}:")))
}

/// Any 2xx is success; everything else is a `ServiceError`.
pub(crate) fn check_status(response: HttpResponse) -> Result<Vec<u8>> {
    if (200..300).contains(&response.status) {
        return Ok(response.body);
    }
    Err(ApiError::service(response.status))
}
