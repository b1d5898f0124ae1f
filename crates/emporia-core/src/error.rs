//! # Error Types
//!
//! Domain-specific error types for emporia-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  emporia-core errors (this file)                                       │
//! │  ├── CoreError        - General domain errors                          │
//! │  ├── CartError        - Cart state violations                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  emporia-gateway errors (separate crate)                               │
//! │  └── GatewayError     - Storage, HTTP, and token lifecycle failures    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → GatewayError → Frontend           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, field name, etc.)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-facing messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Cart state violation (wraps CartError).
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Cart Error
// =============================================================================

/// Cart state violations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Checkout attempted with nothing in the cart.
    ///
    /// ## When This Occurs
    /// - The persisted cart key is missing or holds an empty array
    /// - All lines were removed before the checkout button was pressed
    #[error("No items in the cart")]
    Empty,
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when view-layer input doesn't meet requirements.
/// Used for early validation before cart logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Value must be at least one.
    #[error("{field} must be at least 1")]
    BelowMinimum { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
