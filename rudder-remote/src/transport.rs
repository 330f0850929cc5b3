//! HTTP transport for encoded WebDriver commands.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use http::StatusCode;
use reqwest::header::CONTENT_TYPE;
use rudder_codec::WireRequest;
use rudder_common::RemoteConfig;
use url::Url;

use crate::RemoteError;

/// Raw answer from the remote end: HTTP status plus undecoded body bytes.
#[derive(Debug, Clone)]
pub struct WireResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl WireResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Carries one encoded command to the server and returns its raw answer.
///
/// Implementations must not interpret the body; envelope handling lives in
/// the session layer so fakes can stay byte-oriented.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &WireRequest) -> Result<WireResponse, RemoteError>;
}

/// [`Transport`] backed by a shared reqwest client, anchored to a base URL.
///
/// ```no_run
/// use rudder_remote::ReqwestTransport;
///
/// let transport = ReqwestTransport::new("http://localhost:4444/wd/hub").unwrap();
/// # let _ = transport;
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    endpoint: Url,
    inner: reqwest::Client,
    request_timeout: Duration,
}

impl ReqwestTransport {
    /// Point a transport at a WebDriver server, e.g. `http://localhost:9515`.
    pub fn new(endpoint: &str) -> Result<Self, RemoteError> {
        let endpoint = Url::parse(endpoint).map_err(|e| RemoteError::Url(e.to_string()))?;
        let inner = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| RemoteError::Build(e.to_string()))?;
        Ok(Self {
            endpoint,
            inner,
            request_timeout: Duration::from_secs(30),
        })
    }

    /// Build a transport from shared configuration, honoring its timeouts.
    pub fn from_config(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let endpoint =
            Url::parse(&config.endpoint).map_err(|e| RemoteError::Url(e.to_string()))?;
        let inner = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| RemoteError::Build(e.to_string()))?;
        Ok(Self {
            endpoint,
            inner,
            request_timeout: config.request_timeout(),
        })
    }

    /// Override the per-request timeout (default 30s).
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.request_timeout = dur;
        self
    }

    /// Splice an encoded path onto the base URL. `Url::join` would drop a
    /// base path such as `/wd/hub`, so the strings are joined directly.
    fn request_url(&self, path: &str) -> Result<Url, RemoteError> {
        let base = self.endpoint.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}{path}")).map_err(|e| RemoteError::Url(e.to_string()))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &WireRequest) -> Result<WireResponse, RemoteError> {
        let url = self.request_url(&request.path)?;
        let mut builder = self
            .inner
            .request(request.method.clone(), url)
            .timeout(self.request_timeout);

        let mut body_len = 0usize;
        if let Some(body) = &request.body {
            let bytes = serde_json::to_vec(body).map_err(|e| RemoteError::Build(e.to_string()))?;
            body_len = bytes.len();
            builder = builder
                .header(CONTENT_TYPE, "application/json; charset=utf-8")
                .body(bytes);
        }

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            body_len,
            timeout_ms = self.request_timeout.as_millis() as u64,
            "webdriver.request.start"
        );

        let t0 = Instant::now();
        let response = builder.send().await.map_err(|err| {
            tracing::warn!(path = %request.path, message = %err, "webdriver.network_error");
            RemoteError::Network(err.to_string())
        })?;
        let status = response.status();
        let body = response.bytes().await.map_err(|err| {
            tracing::warn!(path = %request.path, message = %err, "webdriver.network_error");
            RemoteError::Network(err.to_string())
        })?;

        tracing::debug!(
            %status,
            duration_ms = t0.elapsed().as_millis() as u64,
            body_len = body.len(),
            "webdriver.response"
        );

        Ok(WireResponse {
            status,
            body: body.to_vec(),
        })
    }
}
