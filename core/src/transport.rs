//! Blocking reqwest transport (no Tokio runtime required).

use reqwest::blocking::{multipart, Client};
use reqwest::Method;

use crate::error::{ApiError, Result};
use crate::http::{HttpBody, HttpMethod, HttpRequest, HttpResponse, MultipartForm, Transport};

/// Default transport backed by `reqwest::blocking::Client`.
///
/// Uses the client's default timeout and never retries.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let http = Client::builder()
            .user_agent(format!("pushbullet-core/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::TransportFailure(e.to_string()))?;
        Ok(Self { http })
    }

    /// Wrap an already configured client (proxies, custom TLS roots, ...).
    pub fn from_client(http: Client) -> Self {
        Self { http }
    }
}

impl Transport for ReqwestTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = match request.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Delete => Method::DELETE,
        };

        let mut builder = self.http.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body {
            None => builder,
            Some(HttpBody::Json(bytes)) => builder.body(bytes),
            Some(HttpBody::Multipart(form)) => builder.multipart(into_form(form)),
        };

        let response = builder
            .send()
            .map_err(|e| ApiError::TransportFailure(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();
        let body = response
            .bytes()
            .map_err(|e| ApiError::TransportFailure(e.to_string()))?
            .to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn into_form(form: MultipartForm) -> multipart::Form {
    let mut out = multipart::Form::new();
    for (name, value) in form.fields {
        out = out.text(name, value);
    }
    let part = multipart::Part::bytes(form.file.bytes).file_name(form.file.file_name);
    out.part(form.file.field, part)
}
