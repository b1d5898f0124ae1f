//! # emporia-core: Pure Business Logic for Emporia
//!
//! This crate is the **heart** of the Emporia storefront client. It contains
//! all business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Emporia Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Frontend (single-page storefront)               │   │
//! │  │    Product UI ──► Cart UI ──► Address UI ──► Order UI          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ narrow interface                       │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    emporia-gateway                              │   │
//! │  │    execute, upload, login, logout, add, remove, checkout       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ emporia-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   cart    │  │   user    │  │   error   │  │ validation│  │   │
//! │  │   │   Cart    │  │  Profile  │  │ CoreError │  │   rules   │  │   │
//! │  │   │ CartLine  │  │Credential │  │Validation │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`cart`] - Cart line merging, totals, and order payload construction
//! - [`user`] - User profile and credential types
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Storage, network, file system access is FORBIDDEN here
//! 3. **Explicit Errors**: All errors are typed, never strings or panics
//! 4. **Wire Fidelity**: Serialized field names match the backend contract
//!    exactly, even where the contract's naming is historical
//!
//! ## Example Usage
//!
//! ```rust
//! use emporia_core::{Cart, ProductSnapshot};
//!
//! let snapshot = ProductSnapshot {
//!     product_id: "P1".to_string(),
//!     name: "Walnut desk".to_string(),
//!     image_ref: "desk.jpg".to_string(),
//!     unit_price: 10.0,
//! };
//!
//! let mut cart = Cart::default();
//! cart.add(&snapshot);
//! cart.add(&snapshot);
//!
//! // Repeat adds merge into one line: quantity 2, line total 20.0
//! assert_eq!(cart.lines().len(), 1);
//! assert!((cart.total() - 20.0).abs() < f64::EPSILON);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod user;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use emporia_core::Cart` instead of
// `use emporia_core::cart::Cart`

pub use cart::{Cart, CartLine, OrderSubmission, ProductSnapshot};
pub use error::{CartError, CoreError, CoreResult, ValidationError};
pub use user::{Credential, UserProfile};
