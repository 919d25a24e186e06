//! # Backend API
//!
//! Typed access to the PoliBest REST backend.
//!
//! ## Resource Handles
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       ApiClient Layout                                  │
//! │                                                                         │
//! │  Workflow / CLI                                                        │
//! │       │                                                                 │
//! │       │  api.quotes().get("kp-id")                                     │
//! │       ▼                                                                 │
//! │  QuoteApi / CalculationApi / DocumentApi / InstructionApi /            │
//! │  CatalogApi / AuthApi                                                  │
//! │       │                                                                 │
//! │       │  one request, one typed response                               │
//! │       ▼                                                                 │
//! │  ApiClient::send                                                       │
//! │  ├── Authorization: Bearer <token from SessionContext>                 │
//! │  ├── 401 → session cleared, ClientError::Unauthorized                  │
//! │  ├── 403 access_denied → ClientError::AccessDenied                     │
//! │  ├── 404 → ClientError::NotFound(detail)                               │
//! │  └── other → ClientError::Status { status, detail }                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No call is retried. A failure is reported once and the caller decides.

pub mod auth;
pub mod calculations;
pub mod catalog;
pub mod documents;
pub mod instructions;
pub mod quotes;

pub use auth::AuthApi;
pub use calculations::CalculationApi;
pub use catalog::{CatalogApi, DashboardStats};
pub use documents::DocumentApi;
pub use instructions::InstructionApi;
pub use quotes::QuoteApi;

use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::session::SessionContext;

// =============================================================================
// Response Helpers
// =============================================================================

/// `{"message": ...}` acknowledgement returned by deletes and logout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: String,
}

/// `{"id": ..., "message": ...}` returned by quote create/update.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Created {
    pub id: String,
    #[serde(default)]
    pub message: String,
}

/// A file served by one of the `/file` endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl Download {
    /// Body as UTF-8 text, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Extracts the file name from a `Content-Disposition` header.
///
/// Prefers the RFC 5987 form `filename*=UTF-8''<percent-encoded>` and falls
/// back to a plain `filename="..."`.
pub fn content_disposition_filename(header: &str) -> Option<String> {
    let params = header.split(';').map(str::trim);

    let mut plain = None;
    for param in params {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();

        if key == "filename*" {
            let encoded = match value.split_once("''") {
                Some((_charset, rest)) => rest,
                None => value,
            };
            if let Ok(decoded) = urlencoding::decode(encoded) {
                return Some(decoded.into_owned());
            }
        } else if key == "filename" {
            plain = Some(value.trim_matches('"').to_string());
        }
    }
    plain
}

/// Reads the `detail` of an error body, falling back to the raw body.
fn error_detail(body: &str) -> (String, Option<serde_json::Value>) {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(json) => {
            let detail = match json.get("detail") {
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => body.to_string(),
            };
            (detail, Some(json))
        }
        Err(_) => (body.to_string(), None),
    }
}

// =============================================================================
// Api Client
// =============================================================================

/// HTTP client for the backend, sharing one [`SessionContext`].
///
/// ## Usage
/// ```rust,ignore
/// let api = ApiClient::new(&config, session)?;
///
/// let quotes = api.quotes().list().await?;
/// let prices = api.catalog().calculator_prices().await?;
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    auth_url: String,
    callback_url: String,
    session: SessionContext,
}

impl ApiClient {
    /// Creates a client for the configured backend.
    pub fn new(config: &ClientConfig, session: SessionContext) -> ClientResult<Self> {
        Url::parse(&config.api_url)?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(ApiClient {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            auth_url: config.auth_url.clone(),
            callback_url: config.auth_callback_url(),
            session,
        })
    }

    /// The session context this client reads its token from.
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    // =========================================================================
    // Resource Handles
    // =========================================================================

    /// Sign-in, current user and sign-out.
    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.clone())
    }

    /// Commercial proposals (`/kp`).
    pub fn quotes(&self) -> QuoteApi {
        QuoteApi::new(self.clone())
    }

    /// Saved calculator results.
    pub fn calculations(&self) -> CalculationApi {
        CalculationApi::new(self.clone())
    }

    /// Generated text documents.
    pub fn documents(&self) -> DocumentApi {
        DocumentApi::new(self.clone())
    }

    /// Instruction library.
    pub fn instructions(&self) -> InstructionApi {
        InstructionApi::new(self.clone())
    }

    /// Products, settings, calculator prices and dashboard stats.
    pub fn catalog(&self) -> CatalogApi {
        CatalogApi::new(self.clone())
    }

    // =========================================================================
    // Request Plumbing
    // =========================================================================

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    /// Sends a request with the session token and maps error statuses.
    async fn send(&self, request: RequestBuilder) -> ClientResult<Response> {
        let request = match self.session.bearer_token().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await.map_err(|e| {
            error!(error = %e, "Backend request failed");
            ClientError::from(e)
        })?;

        let status = response.status();
        debug!(url = %response.url(), status = status.as_u16(), "Backend responded");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let (detail, json) = error_detail(&body);

        Err(match status {
            StatusCode::UNAUTHORIZED => {
                self.session.on_auth_failure().await;
                ClientError::Unauthorized
            }
            StatusCode::FORBIDDEN if detail == "access_denied" => {
                let email = json
                    .as_ref()
                    .and_then(|j| j.get("email"))
                    .and_then(|e| e.as_str())
                    .unwrap_or_default()
                    .to_string();
                ClientError::AccessDenied { email }
            }
            StatusCode::NOT_FOUND => ClientError::NotFound(detail),
            _ => {
                error!(status = status.as_u16(), detail = %detail, "Backend returned an error");
                ClientError::Status {
                    status: status.as_u16(),
                    detail,
                }
            }
        })
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.send(self.request(Method::GET, path)).await?;
        Ok(response.json().await?)
    }

    pub(crate) async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(self.request(method, path).json(body)).await?;
        Ok(response.json().await?)
    }

    /// Request without a body (e.g. toggle and logout endpoints).
    pub(crate) async fn call<T: DeserializeOwned>(&self, method: Method, path: &str) -> ClientResult<T> {
        let response = self.send(self.request(method, path)).await?;
        Ok(response.json().await?)
    }

    pub(crate) async fn delete(&self, path: &str) -> ClientResult<Ack> {
        self.call(Method::DELETE, path).await
    }

    /// Fetches a file endpoint. `fallback_name` is used when the response
    /// carries no usable `Content-Disposition`.
    pub(crate) async fn download(&self, path: &str, fallback_name: &str) -> ClientResult<Download> {
        let response = self.send(self.request(Method::GET, path)).await?;

        let headers = response.headers();
        let file_name = headers
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(content_disposition_filename)
            .unwrap_or_else(|| fallback_name.to_string());
        let mime = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();

        let bytes = response.bytes().await?.to_vec();
        debug!(file_name = %file_name, size = bytes.len(), "Downloaded file");

        Ok(Download {
            file_name,
            mime,
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_from_rfc5987_header() {
        let header = "attachment; filename*=UTF-8''%D0%9A%D0%9F%20-%20%D0%A4%D0%B0%D1%80%D0%B1%D0%B0.txt";
        assert_eq!(
            content_disposition_filename(header).as_deref(),
            Some("КП - Фарба.txt")
        );
    }

    #[test]
    fn test_filename_plain_and_missing() {
        assert_eq!(
            content_disposition_filename("attachment; filename=\"report.pdf\"").as_deref(),
            Some("report.pdf")
        );
        assert_eq!(content_disposition_filename("inline"), None);
    }

    #[test]
    fn test_error_detail_parsing() {
        let (detail, json) = error_detail(r#"{"detail":"КП не знайдено"}"#);
        assert_eq!(detail, "КП не знайдено");
        assert!(json.is_some());

        let (detail, _) = error_detail(r#"{"detail":[{"loc":["body","title"]}]}"#);
        assert!(detail.starts_with('['));

        let (detail, json) = error_detail("Internal Server Error");
        assert_eq!(detail, "Internal Server Error");
        assert!(json.is_none());
    }

    #[test]
    fn test_url_joining() {
        let mut config = ClientConfig::default();
        config.api_url = "http://localhost:8001/api/".to_string();
        let api = ApiClient::new(&config, SessionContext::new()).unwrap();
        assert_eq!(api.url("/kp/stats/funnel"), "http://localhost:8001/api/kp/stats/funnel");
        assert_eq!(api.url("kp"), "http://localhost:8001/api/kp");
    }
}
