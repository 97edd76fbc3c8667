//! Storefront backend HTTP client.

use reqwest::{
    Client, RequestBuilder, Response,
    header::{COOKIE, HeaderMap, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::http::{ApiResponse, BackendError, Endpoint};

/// Header carrying the per-attempt checkout key.
const IDEMPOTENCY_KEY: &str = "Idempotency-Key";

/// Connection settings for the storefront backend.
#[derive(Debug, Clone)]
pub struct BackendSettings {
    /// Backend origin, e.g. `"http://localhost:8080"`.
    pub base_url: String,

    /// Session credential sent as the `token` cookie on every request.
    pub session_token: Option<String>,
}

/// HTTP client for the storefront REST backend.
///
/// The session credential is attached once at construction, so callers never
/// pass it explicitly.
#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    http: Client,
}

impl BackendClient {
    /// Create a new client from the given settings.
    ///
    /// # Errors
    ///
    /// Returns an error when the session token is not a valid header value or
    /// the underlying HTTP client cannot be built.
    pub fn new(settings: &BackendSettings) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();

        if let Some(token) = settings.session_token.as_deref() {
            let mut cookie = HeaderValue::from_str(&format!("token={token}"))
                .map_err(|_invalid| BackendError::InvalidCredential)?;

            cookie.set_sensitive(true);
            headers.insert(COOKIE, cookie);
        }

        let http = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Absolute URL for an endpoint.
    #[must_use]
    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// Issue a GET and decode the envelope.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status or an
    /// undecodable body.
    pub async fn get<T>(&self, endpoint: Endpoint) -> Result<ApiResponse<T>, BackendError>
    where
        T: DeserializeOwned,
    {
        self.get_path(endpoint, None).await
    }

    /// Issue a GET against an endpoint with a trailing path segment.
    ///
    /// # Errors
    ///
    /// Same as [`BackendClient::get`].
    pub async fn get_with_segment<T>(
        &self,
        endpoint: Endpoint,
        segment: &str,
    ) -> Result<ApiResponse<T>, BackendError>
    where
        T: DeserializeOwned,
    {
        self.get_path(endpoint, Some(segment)).await
    }

    /// Issue a JSON POST and decode the envelope.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status or an
    /// undecodable body.
    pub async fn post<B, T>(
        &self,
        endpoint: Endpoint,
        body: &B,
        idempotency_key: Option<Uuid>,
    ) -> Result<ApiResponse<T>, BackendError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self
            .http
            .request(endpoint.method(), self.url(endpoint))
            .json(body);

        if let Some(key) = idempotency_key {
            request = request.header(IDEMPOTENCY_KEY, key.to_string());
        }

        Self::send(endpoint, request).await
    }

    async fn get_path<T>(
        &self,
        endpoint: Endpoint,
        segment: Option<&str>,
    ) -> Result<ApiResponse<T>, BackendError>
    where
        T: DeserializeOwned,
    {
        let url = match segment {
            Some(segment) => format!("{}/{segment}", self.url(endpoint)),
            None => self.url(endpoint),
        };

        Self::send(endpoint, self.http.request(endpoint.method(), url)).await
    }

    async fn send<T>(
        endpoint: Endpoint,
        request: RequestBuilder,
    ) -> Result<ApiResponse<T>, BackendError>
    where
        T: DeserializeOwned,
    {
        debug!(path = endpoint.path(), "sending backend request");

        let response = request.send().await?;

        Self::decode(endpoint, response).await
    }

    async fn decode<T>(
        endpoint: Endpoint,
        response: Response,
    ) -> Result<ApiResponse<T>, BackendError>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ApiResponse<serde_json::Value>>(&body)
                .ok()
                .and_then(|envelope| envelope.message);

            warn!(path = endpoint.path(), %status, "backend request failed");

            return Err(BackendError::Status { status, message });
        }

        serde_json::from_slice(&body).map_err(|error| {
            BackendError::Malformed(format!(
                "{} returned an invalid body: {error}",
                endpoint.path()
            ))
        })
    }
}
