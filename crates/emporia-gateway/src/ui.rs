//! # UI Side-Effect Sink
//!
//! The seam through which the gateway reaches back into the view layer.
//!
//! ## Why a Trait?
//! Two gateway behaviors are, by contract, user-visible side effects rather
//! than return values: generic API errors surface as a blocking alert
//! dialog, and an irrecoverable refresh failure forces navigation to the
//! login entry point. The view layer owns both presentations; the gateway
//! only fires them through this trait.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Side-Effect Flow                                  │
//! │                                                                         │
//! │  ApiGatewayClient ── generic API error ──► alert_error(message)        │
//! │  ApiGatewayClient ── refresh failure ────► navigate_to_login()         │
//! │  CartStore ───────── checkout done ──────► alert_success(message)      │
//! │  CartStore ───────── empty cart ─────────► alert_error(message)        │
//! │                                                                         │
//! │  The alert is BLOCKING in the view layer; from here it is              │
//! │  fire-and-forget. Callers of execute()/upload() get no value when an   │
//! │  alert was shown - that ambiguity is part of the original contract.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{info, warn};

// =============================================================================
// UiSink Trait
// =============================================================================

/// View-layer side effects the gateway can trigger.
pub trait UiSink: Send + Sync {
    /// Shows a blocking error dialog with the given message.
    fn alert_error(&self, message: &str);

    /// Shows a blocking success dialog with the given message.
    fn alert_success(&self, message: &str);

    /// Forces navigation to the login entry point. Fired exactly once per
    /// terminated session.
    fn navigate_to_login(&self);
}

// =============================================================================
// Tracing Sink
// =============================================================================

/// Default sink that records side effects in the log stream.
///
/// Useful for headless runs and as a safe fallback before the view layer
/// registers its own sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl UiSink for TracingSink {
    fn alert_error(&self, message: &str) {
        warn!(message, "user-facing error alert");
    }

    fn alert_success(&self, message: &str) {
        info!(message, "user-facing success alert");
    }

    fn navigate_to_login(&self) {
        warn!("session terminated, redirecting to login");
    }
}

// =============================================================================
// Recording Sink (test support)
// =============================================================================

/// Captures fired side effects for assertions.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    pub errors: std::sync::Mutex<Vec<String>>,
    pub successes: std::sync::Mutex<Vec<String>>,
    pub login_redirects: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl RecordingSink {
    pub fn redirect_count(&self) -> usize {
        self.login_redirects
            .load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    pub fn success_messages(&self) -> Vec<String> {
        self.successes.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl UiSink for RecordingSink {
    fn alert_error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }

    fn alert_success(&self, message: &str) {
        self.successes.lock().unwrap().push(message.to_string());
    }

    fn navigate_to_login(&self) {
        self.login_redirects
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }
}
