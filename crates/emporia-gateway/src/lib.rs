//! # Emporia Gateway
//!
//! Session and API gateway layer for the Emporia storefront: bearer-token
//! HTTP with transparent refresh, persisted login state, and the
//! locally-held cart.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        emporia-gateway                                  │
//! │                                                                         │
//! │   view layer                                                            │
//! │      │                                                                  │
//! │      ├──► SessionManager ──► TokenStore ──┐                            │
//! │      │         (session.rs)               │                            │
//! │      ├──► CartStore ──────────────────────┼──► dyn KeyValueStorage     │
//! │      │         (cart_store.rs)            │        (storage.rs)        │
//! │      │            │                       │                            │
//! │      └──► ApiGatewayClient ◄──────────────┘                            │
//! │                (client.rs)                                              │
//! │                    │                                                    │
//! │                    ├──► backend HTTP (reqwest)                          │
//! │                    └──► dyn UiSink (ui.rs): alerts, login redirect     │
//! │                                                                         │
//! │   Pure cart/user/validation logic lives in emporia-core; this crate    │
//! │   adds persistence, transport, and the token lifecycle around it.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. **Injected capabilities**: storage and UI side effects enter through
//!    traits, never through globals. Tests run on in-memory fakes.
//! 2. **Write-through state**: session records and the cart are re-read
//!    from storage before every decision and persisted on every mutation.
//! 3. **Absorbed failures**: expiry, refresh, and alerted errors resolve
//!    inside the gateway; callers see `Ok(None)`, and `Err` is
//!    reserved for local plumbing failures.

pub mod cart_store;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;
pub mod storage;
pub mod ui;

pub use cart_store::{CartStore, CART_KEY, CREATE_ORDER_PATH};
pub use client::{ApiEnvelope, ApiGatewayClient, UploadForm, REFRESH_PATH};
pub use config::{GatewayConfig, BASE_URL_ENV, DEFAULT_BASE_URL};
pub use error::{
    is_token_expired_message, GatewayError, GatewayResult, TOKEN_EXPIRED_MESSAGES,
};
pub use session::{
    SessionManager, TokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY,
};
pub use storage::{JsonFileStorage, KeyValueStorage, MemoryStorage, StorageError};
pub use ui::{TracingSink, UiSink};

/// Re-exported so callers can name HTTP methods without depending on
/// reqwest directly.
pub use reqwest::Method;
