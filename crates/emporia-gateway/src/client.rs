//! # API Gateway Client
//!
//! Bearer-authenticated HTTP with transparent token refresh.
//!
//! ## Per-Call State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Request Lifecycle                                    │
//! │                                                                         │
//! │  ISSUED ──► OK ─────────────────────────────────────────────► DONE     │
//! │    │                                                                    │
//! │    ├──► OTHER_ERROR ──► ALERTED (blocking dialog) ──────────► DONE     │
//! │    │                                                                    │
//! │    └──► EXPIRED ──► REFRESHING ──┬──► RETRY_OK ─────────────► DONE     │
//! │                        │         └──► RETRY_FAIL (log only) ► DONE     │
//! │                        │                                                │
//! │                        └──► REFRESH_FAIL ──► SESSION_TERMINATED        │
//! │                             (records cleared, login redirect fires     │
//! │                              exactly once, caller gets no result)      │
//! │                                                                         │
//! │  Refresh is attempted AT MOST ONCE per original call. A failure on     │
//! │  the retried request never triggers a second refresh, so an expiry     │
//! │  loop cannot form.                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Expiry Classification
//! The backend has no structured error codes; expiry is recognized by exact
//! string equality against the sentinel messages in
//! [`crate::error::TOKEN_EXPIRED_MESSAGES`].
//!
//! ## Single-Flight Refresh
//! Concurrent calls that both observe an expired token serialize on an
//! async mutex; whoever enters second finds the token already replaced and
//! retries with it instead of refreshing again. Without the guard each
//! caller would refresh independently and overwrite the other's token.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, multipart, Method};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::GatewayConfig;
use crate::error::{is_token_expired_message, GatewayError, GatewayResult};
use crate::session::TokenStore;
use crate::ui::UiSink;

/// Refresh endpoint path, relative to the base URL.
pub const REFRESH_PATH: &str = "auth/refresh";

/// Whole-request timeout. The original had none (a stalled call blocked its
/// flow forever); a bound is the safe enhancement.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// TCP connect timeout.
const CONNECT_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// Response Envelope
// =============================================================================

/// The backend's uniform response envelope: `{status, message, result}`.
///
/// `result` stays untyped at this seam; callers deserialize the slice they
/// need. `status` is the server-side business verdict and can be `false`
/// even on an HTTP 200 (checkout validation, for example).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub status: bool,

    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub result: Value,
}

/// Refresh request body: `{"refreshToken": ...}`.
#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    #[serde(rename = "refreshToken")]
    refresh_token: &'a str,
}

/// Payload of a successful refresh response.
///
/// NOTE: the backend delivers the NEW ACCESS token under a field
/// historically named `refreshToken`. That naming is almost certainly a bug
/// in the source contract, but it IS the wire contract: we preserve it here
/// and store the value in the access-token slot. The stored refresh token
/// is never touched by a refresh.
#[derive(Debug, Deserialize)]
struct RefreshResult {
    #[serde(rename = "refreshToken")]
    refresh_token: String,
}

// =============================================================================
// Upload Form
// =============================================================================

/// A rebuildable description of a multipart body.
///
/// `reqwest`'s multipart form is consumed on send, but an expired-token
/// retry must send the body a second time - so uploads carry this
/// description and the client materializes a fresh form per attempt.
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    parts: Vec<UploadPart>,
}

#[derive(Debug, Clone)]
enum UploadPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        content_type: Option<String>,
        bytes: Vec<u8>,
    },
}

impl UploadForm {
    /// Creates an empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a text field.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(UploadPart::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Appends a file field.
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Self {
        self.parts.push(UploadPart::File {
            name: name.into(),
            file_name: file_name.into(),
            content_type: content_type.map(str::to_string),
            bytes,
        });
        self
    }

    /// Materializes a transport form for one attempt.
    fn to_multipart(&self) -> GatewayResult<multipart::Form> {
        let mut form = multipart::Form::new();
        for part in &self.parts {
            form = match part {
                UploadPart::Text { name, value } => form.text(name.clone(), value.clone()),
                UploadPart::File {
                    name,
                    file_name,
                    content_type,
                    bytes,
                } => {
                    let mut file = multipart::Part::bytes(bytes.clone()).file_name(file_name.clone());
                    if let Some(ct) = content_type {
                        file = file
                            .mime_str(ct)
                            .map_err(|e| GatewayError::InvalidUpload(e.to_string()))?;
                    }
                    form.part(name.clone(), file)
                }
            };
        }
        Ok(form)
    }
}

/// Body of one outbound attempt. Borrows so a retry can reuse it.
#[derive(Clone, Copy)]
enum RequestPayload<'a> {
    Empty,
    Json(&'a Value),
    Multipart(&'a UploadForm),
}

// =============================================================================
// API Gateway Client
// =============================================================================

/// Issues authenticated HTTP calls, classifies expiry, refreshes the access
/// token at most once per call, and terminates the session when refresh is
/// irrecoverable.
pub struct ApiGatewayClient {
    http: reqwest::Client,
    config: GatewayConfig,
    tokens: TokenStore,
    ui: Arc<dyn UiSink>,
    /// Single-flight guard: only one refresh runs at a time.
    refresh_guard: Mutex<()>,
}

impl ApiGatewayClient {
    /// Creates a client over the given config, token store, and UI sink.
    pub fn new(
        config: GatewayConfig,
        tokens: TokenStore,
        ui: Arc<dyn UiSink>,
    ) -> GatewayResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;

        Ok(ApiGatewayClient {
            http,
            config,
            tokens,
            ui,
            refresh_guard: Mutex::new(()),
        })
    }

    /// The token store this client reads and refreshes.
    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Issues an authenticated JSON call.
    ///
    /// Returns `Ok(Some(envelope))` when the backend answered with a
    /// success status. Returns `Ok(None)` when the failure was absorbed:
    /// a generic error already shown to the user, a failed post-refresh
    /// retry (logged only), or a terminated session. Callers CANNOT
    /// distinguish "no data" from "error already handled" - that ambiguity
    /// is part of the original contract and is deliberate.
    ///
    /// `Err` is reserved for local failures (storage, URL, serialization)
    /// that never reached the network.
    pub async fn execute(
        &self,
        path: &str,
        method: Method,
        payload: Option<&Value>,
    ) -> GatewayResult<Option<ApiEnvelope>> {
        let body = match payload {
            Some(value) => RequestPayload::Json(value),
            None => RequestPayload::Empty,
        };
        self.run(path, method, body).await
    }

    /// Issues an authenticated multipart upload.
    ///
    /// No explicit content-type header is set so the transport can attach
    /// its own boundary. Same return contract as [`Self::execute`].
    pub async fn upload(
        &self,
        path: &str,
        method: Method,
        form: &UploadForm,
    ) -> GatewayResult<Option<ApiEnvelope>> {
        self.run(path, method, RequestPayload::Multipart(form)).await
    }

    // =========================================================================
    // Request Orchestration
    // =========================================================================

    async fn run(
        &self,
        path: &str,
        method: Method,
        payload: RequestPayload<'_>,
    ) -> GatewayResult<Option<ApiEnvelope>> {
        let url = self.config.endpoint(path)?;
        let token = self.tokens.access_token()?;
        debug!(%method, %url, "issuing api request");

        match self.attempt(token.as_deref(), &method, &url, payload).await {
            Ok(envelope) => Ok(Some(envelope)),
            Err(GatewayError::TokenExpired { message }) => {
                debug!(message, "access token rejected, entering refresh cycle");
                self.refresh_and_retry(token.as_deref(), &method, &url, payload)
                    .await
            }
            Err(err @ (GatewayError::Network(_) | GatewayError::Http { .. })) => {
                warn!(%method, %url, error = %err, "api request failed");
                self.ui.alert_error(&err.user_message());
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// One wire attempt: send, then classify a non-success response.
    async fn attempt(
        &self,
        token: Option<&str>,
        method: &Method,
        url: &Url,
        payload: RequestPayload<'_>,
    ) -> GatewayResult<ApiEnvelope> {
        let mut request = self.http.request(method.clone(), url.clone());
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request = match payload {
            // JSON content type goes out even on bodyless calls, exactly
            // like the original transport
            RequestPayload::Empty => request.header(header::CONTENT_TYPE, "application/json"),
            RequestPayload::Json(body) => request.json(body),
            RequestPayload::Multipart(form) => request.multipart(form.to_multipart()?),
        };

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or_default();
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Network response was not ok")
                .to_string();

            if is_token_expired_message(&message) {
                return Err(GatewayError::TokenExpired { message });
            }
            return Err(GatewayError::Http {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    /// Refreshes the access token and retries the original request once.
    async fn refresh_and_retry(
        &self,
        stale_token: Option<&str>,
        method: &Method,
        url: &Url,
        payload: RequestPayload<'_>,
    ) -> GatewayResult<Option<ApiEnvelope>> {
        let fresh = match self.refresh_access_token(stale_token).await {
            Ok(token) => token,
            // Storage failures are local plumbing, not a refresh verdict
            Err(err @ GatewayError::Storage(_)) => return Err(err),
            Err(reason) => {
                warn!(error = %reason, "token refresh failed, terminating session");
                self.terminate_session();
                return Ok(None);
            }
        };

        match self.attempt(Some(&fresh), method, url, payload).await {
            Ok(envelope) => Ok(Some(envelope)),
            Err(err) => {
                // Logged only. Never a second refresh, never an alert: the
                // caller sees no result and the flow ends here.
                error!(%method, %url, error = %err, "request failed after token refresh");
                Ok(None)
            }
        }
    }

    /// Mints a new access token from the stored refresh token.
    ///
    /// Holds the single-flight guard for the whole exchange. `stale_token`
    /// is the access token the caller's failed attempt used: if the stored
    /// token has already moved past it, a concurrent call won the refresh
    /// and its token is returned without another exchange.
    async fn refresh_access_token(&self, stale_token: Option<&str>) -> GatewayResult<String> {
        let _guard = self.refresh_guard.lock().await;

        if let Some(current) = self.tokens.access_token()? {
            if stale_token != Some(current.as_str()) {
                debug!("token already refreshed by a concurrent call");
                return Ok(current);
            }
        }

        let Some(refresh_token) = self.tokens.refresh_token()? else {
            return Err(GatewayError::RefreshFailed(
                "no refresh token found".to_string(),
            ));
        };

        let url = self.config.endpoint(REFRESH_PATH)?;
        let response = self
            .http
            .post(url)
            .bearer_auth(&refresh_token)
            .json(&RefreshRequest {
                refresh_token: &refresh_token,
            })
            .send()
            .await
            .map_err(|e| GatewayError::RefreshFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GatewayError::RefreshFailed(format!(
                "refresh endpoint returned {}",
                response.status()
            )));
        }

        let envelope: ApiEnvelope = response
            .json()
            .await
            .map_err(|e| GatewayError::RefreshFailed(e.to_string()))?;
        let refreshed: RefreshResult = serde_json::from_value(envelope.result)
            .map_err(|e| GatewayError::RefreshFailed(e.to_string()))?;

        self.tokens.set_access_token(&refreshed.refresh_token)?;
        info!("access token refreshed");
        Ok(refreshed.refresh_token)
    }

    /// Clears the session and fires the login redirect - once.
    fn terminate_session(&self) {
        if let Err(e) = self.tokens.clear_all() {
            error!(error = %e, "failed to clear session records during teardown");
        }
        self.ui.navigate_to_login();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
