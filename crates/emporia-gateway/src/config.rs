//! # Gateway Configuration
//!
//! Configuration for the API gateway client.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Explicit value (highest priority)                                  │
//! │     GatewayConfig::from_env_or(Some("https://shop.example.com/"))      │
//! │                                                                         │
//! │  2. Environment Variable                                               │
//! │     EMPORIA_BASE_URL=https://shop.example.com/                         │
//! │                                                                         │
//! │  3. Default Value (lowest priority)                                    │
//! │     http://localhost:8010/  (local development backend)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use url::Url;

use crate::error::{GatewayError, GatewayResult};

/// Environment variable overriding the backend base URL.
pub const BASE_URL_ENV: &str = "EMPORIA_BASE_URL";

/// Default backend base URL for local development.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8010/";

// =============================================================================
// Gateway Config
// =============================================================================

/// Configuration for [`crate::ApiGatewayClient`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Backend base URL. Always ends with a slash so request paths join as
    /// plain concatenation (`{base}{path}`).
    pub base_url: Url,
}

impl GatewayConfig {
    /// Creates a config from an explicit base URL.
    pub fn new(base_url: &str) -> GatewayResult<Self> {
        // A trailing slash makes Url::join treat the last segment as a
        // directory; without it "api/v1".join("orders") would drop "v1"
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };

        Ok(GatewayConfig {
            base_url: Url::parse(&normalized)?,
        })
    }

    /// Creates a config from an explicit value, the `EMPORIA_BASE_URL`
    /// environment variable, or the local-development default.
    pub fn from_env_or(base_url: Option<String>) -> GatewayResult<Self> {
        let raw = base_url
            .or_else(|| std::env::var(BASE_URL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self::new(&raw)
    }

    /// Builds the full URL for a request path.
    pub fn endpoint(&self, path: &str) -> GatewayResult<Url> {
        // Leading slashes would escape the base path prefix
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(GatewayError::from)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
