// HTTP transport seam.
//
// The fetch layer talks to an `HttpTransport` rather than to reqwest directly,
// so parsing and caching can be exercised against canned responses. Transports
// report every status code as-is; deciding what counts as failure is the
// caller's job.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::LAST_MODIFIED;
use tracing::debug;

use crate::config::HttpConfig;
use crate::error::TransportError;

/// The parts of an HTTP response the pipeline consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    /// Raw `Last-Modified` header value, if the server sent one.
    pub last_modified: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// A `200 OK` response carrying `body`.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            reason: "OK".into(),
            last_modified: None,
            body: body.into(),
        }
    }

    /// An empty response with the given status line.
    pub fn with_status(status: u16, reason: &str) -> Self {
        Self {
            status,
            reason: reason.into(),
            last_modified: None,
            body: Vec::new(),
        }
    }

    pub fn last_modified(mut self, value: &str) -> Self {
        self.last_modified = Some(value.into());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;

    async fn head(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

// ---------------------------------------------------------------------------
// reqwest-backed transport
// ---------------------------------------------------------------------------

/// Production transport over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Client {
                message: e.to_string(),
            })?;
        Ok(Self { http })
    }

    pub fn from_config(config: &HttpConfig) -> Result<Self, TransportError> {
        Self::new(&config.user_agent, Duration::from_secs(config.timeout_secs))
    }

    /// Wrap an already configured client.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<HttpResponse, TransportError> {
        let network = |e: reqwest::Error| TransportError::Network {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = request.send().await.map_err(network)?;
        let status = response.status();
        let last_modified = response
            .headers()
            .get(LAST_MODIFIED)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await.map_err(network)?.to_vec();

        debug!(url, status = status.as_u16(), bytes = body.len(), "HTTP response");

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            last_modified,
            body,
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        self.send(self.http.get(url), url).await
    }

    async fn head(&self, url: &str) -> Result<HttpResponse, TransportError> {
        self.send(self.http.head(url), url).await
    }
}

// ---------------------------------------------------------------------------
// In-memory transport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Route {
    Respond(HttpResponse),
    Fail(String),
}

#[derive(Debug, Default)]
struct StaticRoutes {
    get: HashMap<String, Route>,
    head: HashMap<String, Route>,
    get_count: HashMap<String, usize>,
    head_count: HashMap<String, usize>,
}

/// Serves canned responses from memory and counts requests per URL.
///
/// Unknown URLs answer `404 Not Found`. Unless a HEAD response is registered
/// explicitly, HEAD mirrors GET without the body.
#[derive(Debug, Default)]
pub struct StaticTransport {
    routes: Mutex<StaticRoutes>,
}

impl StaticTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer GET `url` with `response`, replacing any earlier route.
    pub fn serve(&self, url: &str, response: HttpResponse) {
        self.lock().get.insert(url.to_string(), Route::Respond(response));
    }

    /// Answer HEAD `url` with `response` instead of mirroring GET.
    pub fn serve_head(&self, url: &str, response: HttpResponse) {
        self.lock().head.insert(url.to_string(), Route::Respond(response));
    }

    /// Make every request to `url` fail at the network level.
    pub fn fail(&self, url: &str, message: &str) {
        let mut routes = self.lock();
        routes.get.insert(url.to_string(), Route::Fail(message.into()));
        routes.head.remove(url);
    }

    pub fn get_count(&self, url: &str) -> usize {
        self.lock().get_count.get(url).copied().unwrap_or(0)
    }

    pub fn head_count(&self, url: &str) -> usize {
        self.lock().head_count.get(url).copied().unwrap_or(0)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StaticRoutes> {
        self.routes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn resolve(route: Option<Route>, url: &str) -> Result<HttpResponse, TransportError> {
        match route {
            Some(Route::Respond(response)) => Ok(response),
            Some(Route::Fail(message)) => Err(TransportError::Network {
                url: url.to_string(),
                message,
            }),
            None => Ok(HttpResponse::with_status(404, "Not Found")),
        }
    }
}

#[async_trait]
impl HttpTransport for StaticTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let route = {
            let mut routes = self.lock();
            *routes.get_count.entry(url.to_string()).or_default() += 1;
            routes.get.get(url).cloned()
        };
        Self::resolve(route, url)
    }

    async fn head(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let route = {
            let mut routes = self.lock();
            *routes.head_count.entry(url.to_string()).or_default() += 1;
            match routes.head.get(url) {
                Some(route) => Some(route.clone()),
                None => routes.get.get(url).cloned().map(|route| match route {
                    Route::Respond(mut response) => {
                        response.body.clear();
                        Route::Respond(response)
                    }
                    failure => failure,
                }),
            }
        };
        Self::resolve(route, url)
    }
}
