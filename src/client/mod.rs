//! HTTP plumbing for the configuration / identity service.
//!
//! parse_address -> Url (bare `host:port` gets `http://`)
//! Endpoint::url -> `{base}/apis/{service}/{version}/{method}`
//! send_request / send_raw -> exactly one request, JSON on both sides.
//!
//! No retries, no backoff: any failure is returned to the caller as an
//! `ApiError` and the command aborts.
//!
use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::{log_debug, log_trace};

/// Every request gives up after this long unless the caller overrides it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Gateway address used when neither flag, env nor context file supply one.
pub const DEFAULT_ADDRESS: &str = "localhost:5555";

/// Failure of a single request.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to encode request body")]
    Encode(#[source] serde_json::Error),

    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("server responded with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode response")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },
}

/// HTTP verbs the service API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    fn as_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_reqwest().as_str())
    }
}

/// Remote operations exposed by the gateway, all under `core/v1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    LoginUser,
    RegisterUser,
    GetConfigGroup,
    PutStandaloneConfig,
    ValidateConfiguration,
}

impl Endpoint {
    pub const SERVICE: &'static str = "core";
    pub const VERSION: &'static str = "v1";

    pub fn operation(&self) -> &'static str {
        match self {
            Endpoint::LoginUser => "LoginUser",
            Endpoint::RegisterUser => "RegisterUser",
            Endpoint::GetConfigGroup => "GetConfigGroup",
            Endpoint::PutStandaloneConfig => "PutStandaloneConfig",
            Endpoint::ValidateConfiguration => "ValidateConfiguration",
        }
    }

    pub fn url(&self, base: &Url) -> Result<Url> {
        build_url(base, Self::SERVICE, Self::VERSION, self.operation())
    }
}

/// Parse a user supplied gateway address.
///
/// Parsing Strategy:
/// 1. Try to parse as URL. If the scheme is http or https, use it as is.
/// 2. Otherwise treat the input as `host[:port][/prefix]` and prepend `http://`.
/// 3. Reject empty input and anything that still has no host.
///
/// Examples:
/// - "https://gw.example.org" -> https://gw.example.org/
/// - "localhost:5555"          -> http://localhost:5555/
pub fn parse_address(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("Address is empty");
    }

    // "localhost:5555" parses as scheme "localhost", so fall through on
    // anything that is not http(s).
    if let Ok(url) = Url::parse(trimmed)
        && matches!(url.scheme(), "http" | "https")
    {
        return Ok(url);
    }

    let url = Url::parse(&format!("http://{trimmed}"))
        .with_context(|| format!("Invalid address: '{trimmed}'"))?;
    if url.host_str().is_none_or(str::is_empty) {
        bail!("Address has no host: '{trimmed}'");
    }
    Ok(url)
}

/// `{base}/apis/{service}/{version}/{method}`; a path prefix on `base` is kept.
pub fn build_url(base: &Url, service: &str, version: &str, method: &str) -> Result<Url> {
    let root = base.as_str().trim_end_matches('/');
    let joined = format!("{root}/apis/{service}/{version}/{method}");
    Url::parse(&joined).with_context(|| format!("Invalid endpoint URL: '{joined}'"))
}

/* ---- Request description ---- */

/// Everything needed to issue one request.
#[derive(Debug, Clone)]
pub struct RequestSpec<B = ()> {
    pub method: Method,
    pub url: Url,
    /// Sent as `Authorization: Bearer <token>` when present.
    pub token: Option<String>,
    pub timeout: Duration,
    pub body: Option<B>,
}

impl RequestSpec<()> {
    pub fn new(method: Method, url: Url) -> Self {
        RequestSpec {
            method,
            url,
            token: None,
            timeout: DEFAULT_TIMEOUT,
            body: None,
        }
    }
}

impl<B> RequestSpec<B> {
    pub fn with_body<C>(self, body: C) -> RequestSpec<C> {
        RequestSpec {
            method: self.method,
            url: self.url,
            token: self.token,
            timeout: self.timeout,
            body: Some(body),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Status code + body text, for callers that interpret the status themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON. An empty body decodes as `null`.
    pub fn decode<R: DeserializeOwned>(&self) -> Result<R, ApiError> {
        let text = if self.body.trim().is_empty() {
            "null"
        } else {
            self.body.as_str()
        };
        serde_json::from_str(text).map_err(|source| ApiError::Decode {
            source,
            body: self.body.clone(),
        })
    }
}

/* ---- Async core ---- */

pub async fn send_raw_async<B: Serialize>(spec: &RequestSpec<B>) -> Result<RawResponse, ApiError> {
    let transport = |source: reqwest::Error| ApiError::Transport {
        url: spec.url.to_string(),
        source,
    };

    let client = reqwest::Client::builder()
        .timeout(spec.timeout)
        .build()
        .map_err(transport)?;

    let mut req = client.request(spec.method.as_reqwest(), spec.url.clone());
    if let Some(body) = &spec.body {
        let bytes = serde_json::to_vec(body).map_err(ApiError::Encode)?;
        log_trace!("request body: {}", String::from_utf8_lossy(&bytes));
        req = req
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(bytes);
    }
    if let Some(token) = &spec.token {
        req = req.bearer_auth(token);
    }

    log_debug!("{} {}", spec.method, spec.url);
    let resp = req.send().await.map_err(transport)?;
    let status = resp.status().as_u16();
    let body = resp.text().await.map_err(transport)?;
    log_debug!("{} {} -> {}", spec.method, spec.url, status);
    log_trace!("response body: {body}");

    Ok(RawResponse { status, body })
}

pub async fn send_request_async<B, R>(spec: &RequestSpec<B>) -> Result<R, ApiError>
where
    B: Serialize,
    R: DeserializeOwned,
{
    let raw = send_raw_async(spec).await?;
    if !raw.is_success() {
        return Err(ApiError::Status {
            status: raw.status,
            body: raw.body,
        });
    }
    raw.decode()
}

/* ---- Synchronous wrappers ---- */

/// Drive a future to completion on a temporary Tokio runtime.
fn block_on<F: Future>(fut: F) -> Result<F::Output> {
    let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    Ok(rt.block_on(fut))
}

/// Issue the request, require a 2xx status and decode the JSON body into `R`.
pub fn send_request<B, R>(spec: &RequestSpec<B>) -> Result<R>
where
    B: Serialize,
    R: DeserializeOwned,
{
    Ok(block_on(send_request_async(spec))??)
}

/// Issue the request and hand back status + body without judging either.
pub fn send_raw<B: Serialize>(spec: &RequestSpec<B>) -> Result<RawResponse> {
    Ok(block_on(send_raw_async(spec))??)
}
