use std::env;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::backend::ChatBackend;
use crate::error::{Error, Result};
use crate::observability::{CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS};
use crate::types::{AgentInfo, AgentListResponse, ChatRequest, ChatResponse};

/// Where the backend listens during local development.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const LOCAL_HOSTS: &[&str] = &["localhost", "127.0.0.1", "[::1]", "::1"];

/// Client for the multi-agent chat API.
#[derive(Debug, Clone)]
pub struct HubClient {
    client: ReqwestClient,
    base_url: Url,
    timeout: Duration,
}

impl HubClient {
    /// Create a new client.
    ///
    /// The base URL can be provided directly or read from the AGENTHUB_URL
    /// environment variable; otherwise [`DEFAULT_API_URL`] is used.
    pub fn new(base_url: Option<String>) -> Result<Self> {
        Self::with_options(base_url, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(base_url: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        let base_url = match base_url {
            Some(url) => url,
            None => env::var("AGENTHUB_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
        };
        let base_url = normalize_base_url(&base_url)?;

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
            base_url,
            timeout,
        })
    }

    /// Returns the URL every endpoint is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn session_endpoint(&self, session_id: &str) -> Result<Url> {
        let mut url = self.endpoint("api/sessions/")?;
        url.path_segments_mut()
            .map_err(|_| Error::url("base URL cannot carry a path", None))?
            .pop_if_empty()
            .push(session_id);
        Ok(url)
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    fn map_send_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::timeout(
                format!("Request timed out: {}", e),
                Some(self.timeout.as_secs_f64()),
            )
        } else if e.is_connect() {
            Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
        } else {
            Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
        }
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();

        // FastAPI reports failures as {"detail": "..."}
        #[derive(Deserialize)]
        struct ErrorResponse {
            detail: Option<serde_json::Value>,
        }

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {}", e),
                    Some(Box::new(e)),
                );
            }
        };

        let error_message = serde_json::from_str::<ErrorResponse>(&error_body)
            .ok()
            .and_then(|e| e.detail)
            .map(|detail| match detail {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .unwrap_or(error_body);

        match status_code {
            400 => Error::bad_request(error_message),
            404 => Error::not_found(error_message, None, None),
            408 => Error::timeout(error_message, None),
            500 => Error::internal_server(error_message),
            502..=504 => Error::service_unavailable(error_message),
            _ => Error::api(status_code, error_message),
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }
        response.json::<T>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<Response> {
        CLIENT_REQUESTS.click();
        let start = Instant::now();
        let result = request
            .headers(self.default_headers())
            .send()
            .await
            .map_err(|e| self.map_send_error(e));
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        if result.is_err() {
            CLIENT_REQUEST_ERRORS.click();
        }
        result
    }

    /// Fetch the agents the backend offers, in the order it lists them.
    pub async fn list_agents(&self) -> Result<Vec<AgentInfo>> {
        let url = self.endpoint("api/agents")?;
        let response = self.execute(self.client.get(url)).await?;
        let list: AgentListResponse = Self::decode(response).await?;
        list.into_agents()
    }

    /// Send one conversation turn.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let url = self.endpoint("api/chat")?;
        let response = self.execute(self.client.post(url).json(request)).await?;
        Self::decode(response).await
    }

    /// Ask the backend to forget a session.
    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        let url = self.session_endpoint(session_id)?;
        let response = self.execute(self.client.delete(url)).await?;
        if !response.status().is_success() {
            return Err(match Self::process_error_response(response).await {
                Error::NotFound { message, .. } => Error::not_found(
                    message,
                    Some("session".to_string()),
                    Some(session_id.to_string()),
                ),
                err => err,
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ChatBackend for HubClient {
    async fn list_agents(&self) -> Result<Vec<AgentInfo>> {
        HubClient::list_agents(self).await
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        HubClient::chat(self, request).await
    }

    async fn delete_session(&self, session_id: &str) -> Result<()> {
        HubClient::delete_session(self, session_id).await
    }
}

/// Picks the API base for a page origin.
///
/// A local development origin talks to the backend on its fixed port; any
/// other origin serves the API itself.
pub fn resolve_base_url(origin: &Url) -> Url {
    let is_local = origin
        .host_str()
        .map(|host| LOCAL_HOSTS.contains(&host))
        .unwrap_or(false);
    if is_local {
        Url::parse(DEFAULT_API_URL).unwrap_or_else(|_| origin.clone())
    } else {
        let mut root = origin.clone();
        root.set_path("/");
        root.set_query(None);
        root.set_fragment(None);
        root
    }
}

fn normalize_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)?;
    if url.cannot_be_a_base() {
        return Err(Error::validation(
            format!("{raw} cannot be used as a base URL"),
            Some("base_url".to_string()),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
