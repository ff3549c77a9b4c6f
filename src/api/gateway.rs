//! The authenticated request gateway.
//!
//! All console traffic funnels through [`ApiGateway`]: it resolves the host
//! and bearer token from the session store, issues the request, and on a 401
//! runs the single-flight refresh protocol before retrying exactly once.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::SessionStore;

use super::refresh::RefreshCoordinator;
use super::ApiError;

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Gateway for the console API.
/// Clone is cheap - the HTTP client and refresh coordinator are shared, so
/// clones participate in the same single-flight refresh cycle.
#[derive(Clone)]
pub struct ApiGateway {
    http: Client,
    session: Arc<SessionStore>,
    refresh: Arc<RefreshCoordinator>,
}

impl ApiGateway {
    /// Create a gateway over the given session store
    pub fn new(session: Arc<SessionStore>) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            session,
            refresh: Arc::new(RefreshCoordinator::new()),
        })
    }

    /// The session store this gateway reads credentials from
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Replace the bound on the refresh network call (default 15s).
    ///
    /// Call before handing out clones: the coordinator is swapped, so clones
    /// made earlier keep the old one and stop sharing refresh cycles.
    pub fn with_refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh = Arc::new(RefreshCoordinator::with_timeout(timeout));
        self
    }

    /// Send an authenticated GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.dispatch(Method::GET, path, None, true).await
    }

    /// Send an authenticated POST request with a JSON body
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.dispatch(Method::POST, path, Some(encode_body(body)?), true)
            .await
    }

    /// Send an authenticated PUT request with a JSON body
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.dispatch(Method::PUT, path, Some(encode_body(body)?), true)
            .await
    }

    /// Send an authenticated DELETE request
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.dispatch(Method::DELETE, path, None, true).await
    }

    /// Send a GET request without credentials
    pub async fn get_unauthenticated<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ApiError> {
        self.dispatch(Method::GET, path, None, false).await
    }

    /// Send a POST request without credentials (login and the like)
    pub async fn post_unauthenticated<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.dispatch(Method::POST, path, Some(encode_body(body)?), false)
            .await
    }

    /// Core request path: resolve credentials, send, and recover from a 401
    /// with one refresh-and-retry.
    async fn dispatch<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        requires_auth: bool,
    ) -> Result<T, ApiError> {
        // Fast-fail before touching the network: an authenticated call with
        // no stored credentials can never succeed.
        if requires_auth && !self.session.is_authenticated() {
            return Err(ApiError::Unauthenticated);
        }

        let url = self.resolve_url(path);
        debug!(method = %method, url = %url, "Dispatching request");

        // Re-read the token at send time; a concurrent refresh may have
        // replaced the pair since this task last looked.
        let bearer = if requires_auth {
            self.session.credential_pair().map(|p| p.access_token)
        } else {
            None
        };

        let response = self
            .send(method.clone(), &url, body.as_ref(), bearer.as_deref())
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED && requires_auth {
            debug!(url = %url, "Access token rejected, entering refresh protocol");

            let Some(token) = self.refresh.refresh(&self.http, &self.session).await else {
                return Err(ApiError::SessionExpired);
            };

            // Retry exactly once with the refreshed token. Any failure here,
            // 401 included, surfaces as-is; there is no second retry.
            let retry = self
                .send(method, &url, body.as_ref(), Some(&token))
                .await?;
            if !retry.status().is_success() {
                warn!(url = %url, status = %retry.status(), "Retry after refresh failed");
                return Err(ApiError::RequestFailed {
                    status: retry.status().as_u16(),
                });
            }
            return Self::decode_response(retry).await;
        }

        if !response.status().is_success() {
            warn!(url = %url, status = %response.status(), "Request failed");
            return Err(ApiError::RequestFailed {
                status: response.status().as_u16(),
            });
        }

        Self::decode_response(response).await
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        bearer: Option<&str>,
    ) -> Result<Response, ApiError> {
        let mut request = self
            .http
            .request(method, url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "*/*");

        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }

    /// Absolute URLs pass through; everything else is joined to the host
    fn resolve_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.session.api_host(), path)
        }
    }

    /// Decode a success response. An empty body or a non-JSON content type
    /// decodes as the empty object rather than failing to parse.
    async fn decode_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let is_json = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("application/json"))
            .unwrap_or(false);
        let is_empty = response.content_length() == Some(0);

        if is_empty || !is_json {
            return serde_json::from_value(Value::Object(serde_json::Map::new()))
                .map_err(|e| ApiError::decode(e, "{}"));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::decode(e, &body))
    }
}

/// JSON-encode a request body up front so dispatch can hold it across the
/// retry without re-serializing.
fn encode_body<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(ApiError::InvalidRequestBody)
}
