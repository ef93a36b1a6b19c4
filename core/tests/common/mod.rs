//! Scripted transport shared by the accessor tests.
//!
//! Responses are served in the order they were queued and every request is
//! recorded, so tests can assert on exactly which calls were issued.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use scolarite_core::{Accessors, ApiClient, ApiError, HttpMethod, HttpRequest, HttpResponse, Transport};

pub const BASE_URL: &str = "http://localhost:5000";

#[derive(Clone, Default)]
pub struct ScriptedTransport {
    responses: Arc<Mutex<VecDeque<Result<HttpResponse, ApiError>>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, status: u16, body: &str) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(HttpResponse::new(status, body)));
        self
    }

    pub fn fail(&self, reason: &str) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(ApiError::Transport(reason.to_string())));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// `(method, path relative to BASE_URL)` for each request, in order.
    pub fn calls(&self) -> Vec<(HttpMethod, String)> {
        self.requests()
            .into_iter()
            .map(|req| (req.method, req.path.trim_start_matches(BASE_URL).to_string()))
            .collect()
    }
}

impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let path = request.path.clone();
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted response left for {path}"))
    }
}

pub fn registry() -> (Accessors<ScriptedTransport>, ScriptedTransport) {
    let transport = ScriptedTransport::new();
    let accessors = Accessors::new(ApiClient::new(BASE_URL, transport.clone()));
    (accessors, transport)
}

pub fn body_json(request: &HttpRequest) -> serde_json::Value {
    serde_json::from_str(request.body.as_deref().expect("request has no body")).unwrap()
}
