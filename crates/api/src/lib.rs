//! Area backend API client.
//!
//! This module provides a lightweight async client for the Area REST backend.
//! It focuses on:
//!
//! - Constructing an HTTP client with sensible defaults
//! - Resolving the base URL and session token from [`ClientSettings`]
//! - Validating the base URL for safety
//! - Typed wrappers for the service, act, and applet endpoints
//!
//! The primary entry point is [`AreaClient`].
//!
//! # Example
//!
//! ```ignore
//! use area_api::AreaClient;
//! use area_util::ClientSettings;
//!
//! async fn run() -> Result<(), area_api::ApiError> {
//!     let client = AreaClient::from_settings(&ClientSettings::load().unwrap_or_default())?;
//!     for service in client.list_services().await? {
//!         println!("{} {}", service.id, service.name);
//!     }
//!     Ok(())
//! }
//! ```

use std::env;
use std::time::Duration;

use area_types::{Act, ActKind, ActSchema, AppletCreateRequest, AppletReceipt, AppletSummary, ExistingApplet, RemoteId, Service, ServiceDetail};
use area_util::ClientSettings;
use reqwest::{Client, Method, RequestBuilder, StatusCode, header};
use serde::{Deserialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

/// Hostnames allowed for local development regardless of scheme.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1"];
/// Name of the cookie the backend reads the session token from.
const SESSION_COOKIE: &str = "access_token";

/// Errors returned by [`AreaClient`].
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid API base URL '{base}': {reason}")]
    InvalidBaseUrl { base: String, reason: String },

    #[error("invalid session token: {0}")]
    InvalidToken(#[from] header::InvalidHeaderValue),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend rejected the session (HTTP 401 or 403).
    #[error("not authorized (HTTP {status}); sign in again")]
    Unauthorized { status: u16 },

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    fn invalid_base(base: &str, reason: impl Into<String>) -> Self {
        Self::InvalidBaseUrl {
            base: base.to_string(),
            reason: reason.into(),
        }
    }
}

/// `GET /services/{id}/is_connected` answers `{"is_connected": bool}`; older
/// deployments answer a bare boolean.
#[derive(Deserialize)]
#[serde(untagged)]
enum ConnectionPayload {
    Flag(bool),
    Object { is_connected: bool },
}

impl ConnectionPayload {
    fn is_connected(&self) -> bool {
        match self {
            Self::Flag(flag) | Self::Object { is_connected: flag } => *flag,
        }
    }
}

#[derive(Debug, Clone)]
/// Thin wrapper around a configured `reqwest::Client` for Area backend access.
///
/// The client pre-configures default headers (including the session cookie)
/// and builds requests against a validated base URL.
pub struct AreaClient {
    pub base_url: String,
    pub http: Client,
    pub user_agent: String,
}

impl AreaClient {
    /// Construct an [`AreaClient`] from resolved settings.
    ///
    /// The base URL comes from [`ClientSettings::resolved_api_base`]. Non-localhost
    /// hosts must use HTTPS. When a session token is available it is sent as the
    /// `access_token` cookie on every request.
    pub fn from_settings(settings: &ClientSettings) -> Result<Self, ApiError> {
        let base_url = settings.resolved_api_base();
        validate_base_url(&base_url)?;

        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        if let Some(token) = settings.resolved_session_token() {
            let mut cookie = header::HeaderValue::from_str(&format!("{SESSION_COOKIE}={token}"))?;
            cookie.set_sensitive(true);
            default_headers.insert(header::COOKIE, cookie);
        }

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url,
            http,
            user_agent: format!("area-cli/0.1; {}", env::consts::OS),
        })
    }

    /// Build a `reqwest::RequestBuilder` for a method and API-relative path.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, %method, "building request");

        self.http.request(method, url).header(header::USER_AGENT, &self.user_agent)
    }

    /// `GET /services/list`
    pub async fn list_services(&self) -> Result<Vec<Service>, ApiError> {
        self.get_json("/services/list").await
    }

    /// `GET /services/{id}`
    pub async fn get_service(&self, service_id: RemoteId) -> Result<ServiceDetail, ApiError> {
        self.get_json(&format!("/services/{service_id}")).await
    }

    /// `GET /services/{id}/is_connected`
    pub async fn is_connected(&self, service_id: RemoteId) -> Result<bool, ApiError> {
        let payload: ConnectionPayload = self.get_json(&format!("/services/{service_id}/is_connected")).await?;
        Ok(payload.is_connected())
    }

    /// `GET /services/{id}/actions` or `GET /services/{id}/reactions`
    pub async fn list_acts(&self, service_id: RemoteId, kind: ActKind) -> Result<Vec<Act>, ApiError> {
        self.get_json(&format!("/services/{service_id}/{kind}")).await
    }

    /// `GET /actions/{id}` or `GET /reactions/{id}`
    pub async fn get_act_schema(&self, act_id: RemoteId, kind: ActKind) -> Result<ActSchema, ApiError> {
        self.get_json(&format!("/{kind}/{act_id}")).await
    }

    /// `GET /users/areas/me`
    pub async fn list_my_applets(&self) -> Result<Vec<AppletSummary>, ApiError> {
        self.get_json("/users/areas/me").await
    }

    /// `GET /areas/{id}`
    pub async fn get_applet(&self, applet_id: RemoteId) -> Result<ExistingApplet, ApiError> {
        self.get_json(&format!("/areas/{applet_id}")).await
    }

    /// `POST /users/areas/me`
    pub async fn create_applet(&self, request: &AppletCreateRequest) -> Result<AppletReceipt, ApiError> {
        let receipt = self.send_receipt(Method::POST, "/users/areas/me", request).await?;
        info!(name = %request.name, area_id = ?receipt.area_id, "applet created");
        Ok(receipt)
    }

    /// `PATCH /users/areas/{id}`
    pub async fn update_applet(&self, applet_id: RemoteId, request: &AppletCreateRequest) -> Result<AppletReceipt, ApiError> {
        let receipt = self.send_receipt(Method::PATCH, &format!("/users/areas/{applet_id}"), request).await?;
        info!(applet_id, name = %request.name, "applet updated");
        Ok(receipt)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.request(Method::GET, path).send().await?;
        decode_response(response.status(), &response.text().await?)
    }

    async fn send_receipt(&self, method: Method, path: &str, request: &AppletCreateRequest) -> Result<AppletReceipt, ApiError> {
        let response = self.request(method, path).json(request).send().await?;
        decode_receipt(response.status(), &response.text().await?)
    }
}

/// Create and update may answer with an empty body; that reads as a receipt
/// with no fields set.
fn decode_receipt(status: StatusCode, body: &str) -> Result<AppletReceipt, ApiError> {
    let receipt: Option<AppletReceipt> = decode_response(status, body)?;
    Ok(receipt.unwrap_or_default())
}

/// Map an HTTP status and body into a typed payload or an [`ApiError`].
///
/// An empty successful body decodes as JSON `null`, which only `Option` or
/// unit-like targets accept.
fn decode_response<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, ApiError> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ApiError::Unauthorized { status: status.as_u16() });
    }
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            body: body.to_string(),
        });
    }
    let body = if body.trim().is_empty() { "null" } else { body };
    Ok(serde_json::from_str(body)?)
}

/// Validate that a base URL is acceptable for use by the client.
///
/// Rules:
/// - `localhost` or `127.0.0.1`: any scheme is allowed
/// - otherwise: scheme must be HTTPS
fn validate_base_url(base: &str) -> Result<(), ApiError> {
    let parsed_base_url = Url::parse(base).map_err(|error| ApiError::invalid_base(base, error.to_string()))?;

    let host_name = parsed_base_url
        .host_str()
        .ok_or_else(|| ApiError::invalid_base(base, "URL must include a host"))?;

    if LOCALHOST_DOMAINS
        .iter()
        .any(|&allowed| host_name.eq_ignore_ascii_case(allowed))
    {
        return Ok(());
    }

    if parsed_base_url.scheme() != "https" {
        return Err(ApiError::invalid_base(
            base,
            format!("must use https for non-localhost hosts; got '{}://'", parsed_base_url.scheme()),
        ));
    }

    Ok(())
}
