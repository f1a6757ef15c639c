//! Shared test helpers: a recording fake transport and fixture loading.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use pushbullet_core::{ApiError, Endpoints, HttpRequest, HttpResponse, PushClient, Transport};

pub const TOKEN: &str = "foobar";

/// Replays canned responses and records every request it sees.
///
/// With a single response queued it is replayed forever; with several they
/// are served in order and the last one repeats.
#[derive(Default)]
pub struct FakeTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeTransport {
    pub fn respond(status: u16, body: &str) -> Arc<Self> {
        Self::sequence(vec![HttpResponse::new(status, body)])
    }

    pub fn sequence(responses: Vec<HttpResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Transport for FakeTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests.lock().unwrap().push(request);
        let mut responses = self.responses.lock().unwrap();
        let response = if responses.len() > 1 {
            responses.pop_front()
        } else {
            responses.front().cloned()
        };
        response.ok_or_else(|| ApiError::TransportFailure("no canned response".into()))
    }
}

/// Always fails at the connection level.
pub struct DownTransport;

impl Transport for DownTransport {
    fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, ApiError> {
        Err(ApiError::TransportFailure("connection refused".into()))
    }
}

pub fn client(transport: &Arc<FakeTransport>) -> PushClient<Arc<FakeTransport>> {
    PushClient::with_transport(TOKEN, Endpoints::default(), Arc::clone(transport))
}

pub fn json_body(request: &HttpRequest) -> serde_json::Value {
    match &request.body {
        Some(pushbullet_core::HttpBody::Json(bytes)) => serde_json::from_slice(bytes).unwrap(),
        other => panic!("expected JSON body, got {other:?}"),
    }
}
