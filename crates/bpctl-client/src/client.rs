//! Base HTTP client for the control plane API.

use bpctl_config::CliConfig;
use bpctl_core::{Error, Result, SessionError, Warnings};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, USER_AGENT};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Header carrying comma-separated, query-escaped warnings.
pub const WARNINGS_HEADER: &str = "x-cf-warnings";

const CLIENT_USER_AGENT: &str = concat!("bpctl/", env!("CARGO_PKG_VERSION"));

/// Control plane API client.
pub struct ControlPlaneClient {
    pub(crate) client: reqwest::Client,
    pub(crate) api_url: Url,
    pub(crate) token: String,
    pub(crate) binary_name: String,
    pub(crate) poll_interval: Duration,
    pub(crate) job_timeout: Duration,
}

impl std::fmt::Debug for ControlPlaneClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlPlaneClient")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .field("binary_name", &self.binary_name)
            .field("poll_interval", &self.poll_interval)
            .field("job_timeout", &self.job_timeout)
            .finish_non_exhaustive()
    }
}

impl ControlPlaneClient {
    pub fn new(api_url: &str, token: impl Into<String>) -> Result<Self> {
        let defaults = CliConfig::default();
        Self::build(
            api_url,
            token.into(),
            defaults.binary_name,
            false,
            defaults.poll_interval,
            defaults.job_timeout,
        )
    }

    /// Build a client from the stored session settings.
    pub fn from_config(config: &CliConfig) -> Result<Self> {
        let api = config.api.as_deref().ok_or_else(|| SessionError::NoApiEndpoint {
            binary_name: config.binary_name.clone(),
        })?;
        let token = config.token.clone().ok_or_else(|| SessionError::NotLoggedIn {
            binary_name: config.binary_name.clone(),
        })?;

        Self::build(
            api,
            token,
            config.binary_name.clone(),
            config.skip_ssl_validation,
            config.poll_interval,
            config.job_timeout,
        )
    }

    fn build(
        api_url: &str,
        token: String,
        binary_name: String,
        skip_ssl_validation: bool,
        poll_interval: Duration,
        job_timeout: Duration,
    ) -> Result<Self> {
        let mut api_url = Url::parse(api_url)
            .map_err(|e| Error::Transfer(format!("invalid API URL '{}': {}", api_url, e)))?;
        // API paths are joined relative to the endpoint, which may carry a prefix.
        if !api_url.path().ends_with('/') {
            let path = format!("{}/", api_url.path());
            api_url.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(skip_ssl_validation)
            .build()
            .map_err(|e| Error::Transfer(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url,
            token,
            binary_name,
            poll_interval,
            job_timeout,
        })
    }

    pub fn with_polling(mut self, poll_interval: Duration, job_timeout: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.job_timeout = job_timeout;
        self
    }

    pub fn with_binary_name(mut self, binary_name: impl Into<String>) -> Self {
        self.binary_name = binary_name.into();
        self
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// URL of an API path such as `/v3/buildpacks`, below the endpoint's prefix.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        self.api_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| Error::Transfer(format!("invalid URL '{}': {}", path, e)))
    }

    /// Resolve a server-provided reference, such as a `Location` header.
    pub(crate) fn resolve(&self, reference: &str) -> Result<Url> {
        self.api_url
            .join(reference)
            .map_err(|e| Error::Transfer(format!("invalid URL '{}': {}", reference, e)))
    }

    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(AUTHORIZATION, &self.token)
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, CLIENT_USER_AGENT)
    }

    /// Send a request, returning the successful response and its warnings.
    pub(crate) async fn send(
        &self,
        request: RequestBuilder,
    ) -> (std::result::Result<Response, RequestFailure>, Warnings) {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return (Err(RequestFailure::Transport(e.to_string())), Warnings::new()),
        };

        let warnings = parse_warnings(response.headers());
        let status = response.status();
        debug!(url = %response.url(), %status, warnings = warnings.len(), "Control plane response");

        if status.is_success() {
            return (Ok(response), warnings);
        }

        let body = response.text().await.unwrap_or_default();
        let errors = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|b| b.errors)
            .unwrap_or_default();

        (Err(RequestFailure::Status { status, errors, body }), warnings)
    }

    /// Send a request and decode the JSON body of a successful response.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> (std::result::Result<T, RequestFailure>, Warnings) {
        let (response, warnings) = self.send(request).await;
        let response = match response {
            Ok(response) => response,
            Err(failure) => return (Err(failure), warnings),
        };

        let decoded = response
            .json::<T>()
            .await
            .map_err(|e| RequestFailure::Transport(format!("invalid response body: {}", e)));
        (decoded, warnings)
    }
}

/// A single entry of a control-plane error document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiErrorEntry {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub detail: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    errors: Vec<ApiErrorEntry>,
}

/// Why a request did not produce a usable response.
#[derive(Debug, Clone)]
pub(crate) enum RequestFailure {
    Transport(String),
    Status {
        status: StatusCode,
        errors: Vec<ApiErrorEntry>,
        body: String,
    },
}

impl RequestFailure {
    /// The first error detail reported by the control plane, if any.
    pub(crate) fn detail(&self) -> Option<&str> {
        match self {
            RequestFailure::Status { errors, .. } => errors.first().map(|e| e.detail.as_str()),
            RequestFailure::Transport(_) => None,
        }
    }

    pub(crate) fn status(&self) -> Option<StatusCode> {
        match self {
            RequestFailure::Status { status, .. } => Some(*status),
            RequestFailure::Transport(_) => None,
        }
    }
}

impl From<RequestFailure> for Error {
    fn from(failure: RequestFailure) -> Self {
        match failure {
            RequestFailure::Transport(message) => Error::Transfer(message),
            RequestFailure::Status {
                status,
                errors,
                body,
            } => {
                let first = errors.into_iter().next().unwrap_or_default();
                let detail = if first.detail.is_empty() {
                    body
                } else {
                    first.detail
                };
                Error::Api {
                    status: status.as_u16(),
                    code: first.code,
                    detail,
                }
            }
        }
    }
}

/// Decode every warning carried by the warnings header, in order.
pub fn parse_warnings(headers: &HeaderMap) -> Warnings {
    let mut warnings = Warnings::new();

    for value in headers.get_all(WARNINGS_HEADER) {
        let Ok(raw) = value.to_str() else {
            continue;
        };

        for part in raw.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let unplussed = part.replace('+', " ");
            let decoded = urlencoding::decode(&unplussed)
                .map(|d| d.into_owned())
                .unwrap_or(unplussed);
            warnings.push(decoded);
        }
    }

    warnings
}
