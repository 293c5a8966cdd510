// crates/envview-keyvault/tests/common/mod.rs
// ============================================================================
// Module: Key Vault Test Helpers
// Description: Recording fake HTTP server for Key Vault and token endpoints.
// Purpose: Serve scripted responses and capture requests for assertions.
// Dependencies: tiny_http
// ============================================================================

#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Shared test helpers; not every test file uses every helper."
)]

use std::sync::Arc;
use std::sync::Mutex;
use std::thread;

use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

/// Request captured by [`FakeServer`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method.
    pub method: String,
    /// Path and query.
    pub url: String,
    /// Header name/value pairs.
    pub headers: Vec<(String, String)>,
    /// Request body.
    pub body: String,
}

impl RecordedRequest {
    /// Returns the first header value matching `name`, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns the path component of the request URL.
    pub fn path(&self) -> &str {
        self.url.split('?').next().unwrap_or_default()
    }
}

/// Scripted HTTP server running on a background thread.
pub struct FakeServer {
    /// Base URL, e.g. `http://127.0.0.1:40000`.
    pub base_url: String,
    /// Requests seen so far, recorded before each response is sent.
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeServer {
    /// Starts a server answering every request with `handler(request, base_url)`.
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&RecordedRequest, &str) -> (u16, String) + Send + 'static,
    {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let base_url = format!("http://{addr}");
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&requests);
        let base = base_url.clone();
        thread::spawn(move || {
            for mut request in server.incoming_requests() {
                let mut body = String::new();
                let _ = request.as_reader().read_to_string(&mut body);
                let captured = RecordedRequest {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    headers: request
                        .headers()
                        .iter()
                        .map(|header| {
                            (header.field.to_string(), header.value.as_str().to_string())
                        })
                        .collect(),
                    body,
                };
                let (status, payload) = handler(&captured, &base);
                recorded.lock().unwrap().push(captured);
                let content_type =
                    Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
                let response =
                    Response::from_string(payload).with_status_code(status).with_header(content_type);
                let _ = request.respond(response);
            }
        });

        Self {
            base_url,
            requests,
        }
    }

    /// Returns a snapshot of the recorded requests.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}
