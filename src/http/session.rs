use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{COOKIE, HeaderValue};
use reqwest::{Client, Request, Url, redirect};

use crate::error::HttpError;

/// Bound on establishing a TCP connection.
pub const DIAL_TIMEOUT: Duration = Duration::from_secs(30);
/// TCP keep-alive probe interval for pooled connections.
pub const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(30);
pub const TLS_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);
pub const RESPONSE_HEADER_TIMEOUT: Duration = Duration::from_secs(10);
pub const MAX_REDIRECTS: usize = 10;

/// Per-phase limits applied to every request of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimeouts {
    /// Establishing the connection, TLS handshake included.
    pub dial: Duration,
    /// Longest silence while waiting on the server once connected.
    pub response_header: Duration,
    /// Upper bound for one request, from dial to response headers.
    pub total: Duration,
}

impl Default for SessionTimeouts {
    fn default() -> Self {
        Self {
            dial: DIAL_TIMEOUT,
            response_header: RESPONSE_HEADER_TIMEOUT,
            total: DIAL_TIMEOUT
                .saturating_add(TLS_HANDSHAKE_TIMEOUT)
                .saturating_add(RESPONSE_HEADER_TIMEOUT),
        }
    }
}

/// Isolated HTTP session owned by a single worker.
///
/// Each session has its own connection pool and cookie jar, so workers behave
/// like independent clients.
#[derive(Debug)]
pub struct WorkerSession {
    client: Client,
    jar: Arc<Jar>,
}

impl WorkerSession {
    /// Builds a session with a fresh pool and an empty cookie jar.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn new() -> Result<Self, HttpError> {
        Self::with_timeouts(SessionTimeouts::default())
    }

    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn with_timeouts(timeouts: SessionTimeouts) -> Result<Self, HttpError> {
        let jar = Arc::new(Jar::default());
        // Location targets are resolved with `Url::join`, which collapses
        // `.`/`..` segments and percent-encodes non-ASCII bytes.
        let client = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .connect_timeout(timeouts.dial)
            .read_timeout(timeouts.response_header)
            .tcp_keepalive(KEEP_ALIVE_INTERVAL)
            .timeout(timeouts.total)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|err| HttpError::BuildClientFailed { source: err })?;
        Ok(Self { client, jar })
    }

    /// Moves the cookies carried by `request` into the jar for its URL.
    ///
    /// The `Cookie` header is removed so the jar builds the outgoing header,
    /// merging recorded cookies with those the server set earlier in the
    /// session. Returns the number of cookies seeded.
    pub fn seed_cookies(&self, request: &mut Request) -> usize {
        let values: Vec<HeaderValue> = request.headers().get_all(COOKIE).iter().cloned().collect();
        request.headers_mut().remove(COOKIE);
        let mut seeded = 0usize;
        for value in &values {
            let Ok(raw) = value.to_str() else {
                continue;
            };
            for pair in raw.split(';').map(str::trim) {
                if pair.is_empty() || !pair.contains('=') {
                    continue;
                }
                self.jar.add_cookie_str(pair, request.url());
                seeded = seeded.saturating_add(1);
            }
        }
        seeded
    }

    /// Cookies the session would send to `url`, as a `Cookie` header value.
    #[must_use]
    pub fn cookie_header(&self, url: &Url) -> Option<String> {
        self.jar
            .cookies(url)
            .and_then(|value| value.to_str().ok().map(str::to_owned))
    }

    /// Sends `request` and returns the response status.
    ///
    /// The response body is released without being read.
    ///
    /// # Errors
    ///
    /// Returns the transport error when no response was received.
    pub async fn dispatch(&self, request: Request) -> Result<u16, reqwest::Error> {
        let response = self.client.execute(request).await?;
        let status = response.status().as_u16();
        drop(response);
        Ok(status)
    }
}
