use std::env;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use url::Url;

use crate::error::{Error, Result};
use crate::observability::{CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS};
use crate::types::{ChatRequest, ChatResponse, ErrorResponse};

/// Relay used when neither an explicit URL nor `RELAYCHAT_URL` is given.
pub const DEFAULT_RELAY_URL: &str = "http://127.0.0.1:8000/";
const CHAT_PATH: &str = "api/chat";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Issues one chat request and returns the relay's answer.
///
/// This is the seam between the chat state machine and the network.
#[async_trait::async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send `request` and wait for the reply.
    ///
    /// Non-2xx replies are returned as [`Error::Backend`]; everything that
    /// prevents a reply from being read is a transport error.
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse>;
}

/// HTTP client for a relay's `POST /api/chat` endpoint.
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: ReqwestClient,
    endpoint: Url,
    timeout: Duration,
}

impl RelayClient {
    /// Create a new relay client.
    ///
    /// The base URL can be provided directly or read from the RELAYCHAT_URL
    /// environment variable.
    pub fn new(base_url: Option<String>) -> Result<Self> {
        Self::with_options(base_url, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(base_url: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        let base_url = match base_url {
            Some(url) => url,
            None => env::var("RELAYCHAT_URL").unwrap_or_else(|_| DEFAULT_RELAY_URL.to_string()),
        };
        let endpoint = chat_endpoint(&base_url)?;

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }

    /// The full URL requests are posted to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    /// Turn a non-2xx response into a backend error, keeping `detail` when the
    /// body carries one.
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();
        let detail = match response.text().await {
            Ok(body) => serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|e| e.detail),
            Err(e) => {
                tracing::debug!(status_code, error = %e, "could not read error body");
                None
            }
        };
        Error::backend(status_code, detail)
    }

    /// Post `request` to the relay and parse the answer.
    pub async fn send(&self, request: &ChatRequest) -> Result<ChatResponse> {
        CLIENT_REQUESTS.click();
        let start = Instant::now();
        let result = self.send_inner(request).await;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        if let Err(err) = &result {
            CLIENT_REQUEST_ERRORS.click();
            tracing::warn!(endpoint = %self.endpoint, error = %err, "chat request failed");
        }
        result
    }

    async fn send_inner(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .headers(self.default_headers())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::timeout(e.to_string(), Some(self.timeout.as_secs_f64()))
                } else if e.is_connect() {
                    Error::connection(e.to_string(), Some(Box::new(e)))
                } else {
                    Error::http_client(e.to_string(), Some(Box::new(e)))
                }
            })?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        response.json::<ChatResponse>().await.map_err(|e| {
            if e.is_timeout() {
                Error::timeout(
                    format!("reading response: {}", e),
                    Some(self.timeout.as_secs_f64()),
                )
            } else {
                Error::serialization(
                    format!("malformed response body: {}", e),
                    Some(Box::new(e)),
                )
            }
        })
    }
}

#[async_trait::async_trait]
impl ChatTransport for RelayClient {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse> {
        RelayClient::send(self, request).await
    }
}

/// Resolve the chat endpoint under `base_url`.
///
/// A base without a trailing slash is treated as a directory so that
/// `http://host/prefix` resolves to `http://host/prefix/api/chat`.
fn chat_endpoint(base_url: &str) -> Result<Url> {
    let mut base = Url::parse(base_url)?;
    if base.cannot_be_a_base() {
        return Err(Error::url(
            format!("{base_url} cannot be used as a base URL"),
            None,
        ));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join(CHAT_PATH)?)
}
