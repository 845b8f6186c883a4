// src/checker/probe.rs
// =============================================================================
// This module checks if a single listing URL is alive.
//
// Key functionality:
// - Makes HTTP HEAD requests (lightweight, no body download)
// - Falls back to one GET when the server answers HEAD with 405
// - Bounds every attempt with its own timeout
// - Retries network failures (timeouts, DNS, resets) a fixed number of times
// - Never fails: every outcome comes back as a ProbeResult value
//
// Outcome rules:
//   2xx / 3xx        -> alive (a redirect means the site still exists)
//   405 on HEAD      -> decided by a single GET, where only 2xx is alive
//   other status     -> broken, "HTTP <status>", no retry
//   network failure  -> retried, then broken with a timeout/connection label
//   redirect loop    -> broken, "too many redirects", no retry
// =============================================================================

use async_trait::async_trait;
use reqwest::{redirect, Client, Method, StatusCode};
use std::error::Error as StdError;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::retry::retry;

/// Identifies us to the sites we probe
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; LinkChecker/1.0)";

/// Outcome of one liveness probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub ok: bool,
    /// Final HTTP status, if the server answered at all
    pub status: Option<u16>,
    /// Why the URL counts as broken
    pub error: Option<String>,
}

impl ProbeResult {
    pub fn alive(status: u16) -> Self {
        Self {
            ok: true,
            status: Some(status),
            error: None,
        }
    }

    pub fn http_error(status: u16) -> Self {
        Self {
            ok: false,
            status: Some(status),
            error: Some(format!("HTTP {}", status)),
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            status: None,
            error: Some(reason.into()),
        }
    }
}

/// Anything that can decide whether a URL is alive
///
/// The batch driver only knows this trait; HttpProber is the real one.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, url: &str) -> ProbeResult;
}

/// Knobs for a single probe
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Upper bound for one request attempt
    pub timeout: Duration,
    /// Extra attempts after a network failure
    pub retry_count: u32,
    /// Pause between attempts
    pub retry_delay: Duration,
    /// Redirect hops followed before giving up
    pub max_redirects: usize,
    pub user_agent: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(8000),
            retry_count: 2,
            retry_delay: Duration::from_millis(1000),
            max_redirects: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

// Why one request attempt produced no status code
#[derive(Debug, Clone, PartialEq, Eq)]
enum AttemptError {
    Timeout,
    TooManyRedirects,
    Network(String),
}

impl AttemptError {
    // Redirect loops come back the same every time
    fn is_transient(&self) -> bool {
        !matches!(self, AttemptError::TooManyRedirects)
    }

    fn label(&self, timeout: Duration) -> String {
        match self {
            AttemptError::Timeout => format!("timeout after {} ms", timeout.as_millis()),
            AttemptError::TooManyRedirects => "too many redirects".to_string(),
            AttemptError::Network(message) => format!("connection error: {}", message),
        }
    }
}

/// Probes URLs over real HTTP
///
/// One client is shared by every probe so connections get pooled.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
    config: ProbeConfig,
}

impl HttpProber {
    pub fn new(config: ProbeConfig) -> anyhow::Result<Self> {
        // Timeouts are applied per attempt in attempt(), not on the client
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client, config })
    }

    // One request, bounded by the configured timeout.
    // Only the status matters, so the body is never read.
    async fn attempt(&self, method: Method, url: &Url) -> Result<StatusCode, AttemptError> {
        debug!(%method, %url, "probing");
        let request = self.client.request(method, url.clone()).send();

        match tokio::time::timeout(self.config.timeout, request).await {
            Err(_elapsed) => Err(AttemptError::Timeout),
            Ok(Err(e)) => Err(categorize_error(&e)),
            Ok(Ok(response)) => Ok(response.status()),
        }
    }

    // Some servers reject HEAD but serve GET: give GET one chance.
    // Only a 2xx counts here, an unfollowed 3xx is an HTTP error.
    async fn probe_with_get(&self, url: &Url) -> ProbeResult {
        match self.attempt(Method::GET, url).await {
            Ok(status) if status.is_success() => ProbeResult::alive(status.as_u16()),
            Ok(status) => ProbeResult::http_error(status.as_u16()),
            Err(e) => ProbeResult::failed(e.label(self.config.timeout)),
        }
    }
}

#[async_trait]
impl Probe for HttpProber {
    async fn probe(&self, url: &str) -> ProbeResult {
        let target = match parse_probe_url(url) {
            Ok(target) => target,
            Err(reason) => return ProbeResult::failed(format!("invalid URL: {}", reason)),
        };

        let this = self;
        let target_ref = &target;
        let head = retry(
            self.config.retry_count,
            self.config.retry_delay,
            AttemptError::is_transient,
            move || this.attempt(Method::HEAD, target_ref),
        )
        .await;

        match head {
            Ok(status) if is_alive(status) => ProbeResult::alive(status.as_u16()),
            Ok(StatusCode::METHOD_NOT_ALLOWED) => {
                debug!(%target, "HEAD not allowed, falling back to GET");
                self.probe_with_get(&target).await
            }
            Ok(status) => ProbeResult::http_error(status.as_u16()),
            Err(e) => ProbeResult::failed(e.label(self.config.timeout)),
        }
    }
}

// 2xx and 3xx both mean "something lives at this address"
fn is_alive(status: StatusCode) -> bool {
    status.is_success() || status.is_redirection()
}

// Only absolute http(s) URLs can be probed
fn parse_probe_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported scheme '{}'", other)),
    }
}

// Maps reqwest's error kinds onto the retry policy's categories
fn categorize_error(error: &reqwest::Error) -> AttemptError {
    if error.is_timeout() {
        AttemptError::Timeout
    } else if error.is_redirect() {
        AttemptError::TooManyRedirects
    } else {
        AttemptError::Network(error_chain(error))
    }
}

// Joins an error with its sources ("a: b: c"), skipping parts the outer
// message already repeats
fn error_chain(error: &dyn StdError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();

    while let Some(inner) = source {
        let text = inner.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = inner.source();
    }

    message
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why tokio::time::timeout instead of the client's timeout?
//    - It wraps exactly one attempt, so each retry gets a fresh budget
//    - When the deadline passes, the request future is dropped, which
//      cancels that request and nothing else
//
// 2. What does `move || this.attempt(...)` capture?
//    - Two shared references (&HttpProber and &Url)
//    - References are Copy, so every call builds a new future from them
// -----------------------------------------------------------------------------
