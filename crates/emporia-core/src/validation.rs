//! # Validation Module
//!
//! Input validation for view-layer requests before cart logic runs.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend (TypeScript)                                        │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (Rust)                                           │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── Cart input rules (non-empty id, non-negative price)               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend                                                      │
//! │  └── Authoritative validation at checkout (stock, prices, address)     │
//! │                                                                         │
//! │  The client cart is OPTIMISTIC: stock is never checked here.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::cart::ProductSnapshot;
use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Cart Input Validators
// =============================================================================

/// Validates a product snapshot before it enters the cart.
///
/// ## Rules
/// - Product id must not be empty
/// - Unit price must not be negative (zero is allowed: giveaways exist)
///
/// ## Example
/// ```rust
/// use emporia_core::ProductSnapshot;
/// use emporia_core::validation::validate_snapshot;
///
/// let snapshot = ProductSnapshot {
///     product_id: "P1".to_string(),
///     name: "Walnut desk".to_string(),
///     image_ref: "desk.jpg".to_string(),
///     unit_price: 10.0,
/// };
/// assert!(validate_snapshot(&snapshot).is_ok());
/// ```
pub fn validate_snapshot(snapshot: &ProductSnapshot) -> ValidationResult<()> {
    if snapshot.product_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "productId".to_string(),
        });
    }

    if snapshot.unit_price < 0.0 || snapshot.unit_price.is_nan() {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates a shipping address id before checkout.
///
/// ## Rules
/// - Must not be empty (the confirm-address step must have picked one)
pub fn validate_address_id(address_id: &str) -> ValidationResult<()> {
    if address_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "address".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
