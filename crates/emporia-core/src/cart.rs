//! # Cart Module
//!
//! Pure cart math: line merging, totals, and order payload construction.
//!
//! ## Cart Invariants
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Cart Invariants                                 │
//! │                                                                         │
//! │  1. At most ONE line per product id                                    │
//! │     add(P1) ──► [P1 x1]    add(P1) again ──► [P1 x2]   (merged)        │
//! │                                                                         │
//! │  2. line_total == unit_price × quantity                                │
//! │     Maintained INCREMENTALLY: every repeat-add does                    │
//! │       quantity   += 1                                                   │
//! │       line_total += unit_price                                          │
//! │                                                                         │
//! │  3. Lines keep insertion order                                         │
//! │     The order submission arrays are index-aligned to this order        │
//! │                                                                         │
//! │  4. Totals are recomputed on demand, never cached                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Price Representation
//! Prices arrive from the backend as JSON numbers and are persisted as JSON
//! numbers, so lines carry `f64` end to end. Totals are aggregates of those
//! wire values; comparisons in consumers use a tolerance.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CartError;

// =============================================================================
// Product Snapshot
// =============================================================================

/// The view layer's add-to-cart input: the product fields frozen at the
/// moment of adding.
///
/// ## Price Freezing
/// The price is captured here. If the backend price changes after the line
/// is in the cart, the cart keeps charging the captured price until
/// checkout, where the server has the final word.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductSnapshot {
    /// Product id (server-assigned, opaque).
    #[serde(rename = "id")]
    pub product_id: String,

    /// Display name at time of adding.
    pub name: String,

    /// Image reference shown in the cart UI.
    #[serde(rename = "image")]
    pub image_ref: String,

    /// Unit price at time of adding. Never negative.
    #[serde(rename = "price")]
    pub unit_price: f64,
}

// =============================================================================
// Cart Line
// =============================================================================

/// One product entry in the cart with aggregated quantity and total.
///
/// ## Serialized Shape
/// Field names match the persisted cart entries the frontend has always
/// read and written:
/// ```json
/// { "id": "P1", "name": "Walnut desk", "image": "desk.jpg",
///   "price": 10.0, "quantity": 2, "total": 20.0 }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    /// Product id - the line's unique key within the cart.
    #[serde(rename = "id")]
    pub product_id: String,

    /// Product name at time of adding (frozen).
    pub name: String,

    /// Image reference at time of adding (frozen).
    #[serde(rename = "image")]
    pub image_ref: String,

    /// Unit price at time of adding (frozen).
    #[serde(rename = "price")]
    pub unit_price: f64,

    /// Quantity in cart. Always >= 1.
    pub quantity: i64,

    /// Aggregated line total. Equals `unit_price * quantity`.
    #[serde(rename = "total")]
    pub line_total: f64,
}

impl CartLine {
    /// Creates a fresh line from a product snapshot.
    ///
    /// New lines always start at quantity 1 with the line total equal to
    /// the unit price.
    pub fn from_snapshot(snapshot: &ProductSnapshot) -> Self {
        CartLine {
            product_id: snapshot.product_id.clone(),
            name: snapshot.name.clone(),
            image_ref: snapshot.image_ref.clone(),
            unit_price: snapshot.unit_price,
            quantity: 1,
            line_total: snapshot.unit_price,
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// Ordered, deduplicated collection of cart lines.
///
/// ## Serialized Shape
/// Serializes as a bare JSON array of lines - the exact document the
/// frontend has always persisted for the cart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Builds a cart from already-persisted lines.
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        Cart { lines }
    }

    /// Adds a product to the cart or merges into the existing line.
    ///
    /// ## Behavior
    /// - Product already in cart: `quantity += 1`, `line_total += unit_price`
    /// - Product not in cart: appended as a new line at quantity 1
    ///
    /// The incoming snapshot's price only matters for a NEW line; a merged
    /// line keeps charging its frozen price.
    pub fn add(&mut self, snapshot: &ProductSnapshot) {
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == snapshot.product_id)
        {
            line.quantity += 1;
            line.line_total += line.unit_price;
            return;
        }

        self.lines.push(CartLine::from_snapshot(snapshot));
    }

    /// Removes a line from the cart by product id.
    ///
    /// Returns `true` if a line was removed. Removing an absent product is
    /// a no-op, matching how the cart UI has always behaved.
    pub fn remove(&mut self, product_id: &str) -> bool {
        let initial_len = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        self.lines.len() != initial_len
    }

    /// Clears all lines from the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Returns the lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Looks up a line by product id.
    pub fn line(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Calculates the cart total.
    ///
    /// Recomputed from the line totals on every call - never cached, so a
    /// partially updated persisted cart can never serve a stale sum.
    pub fn total(&self) -> f64 {
        self.lines.iter().map(|l| l.line_total).sum()
    }

    /// Builds the order submission payload from the current cart order.
    ///
    /// ## Errors
    /// Returns [`CartError::Empty`] when there is nothing to submit.
    pub fn order_submission(&self, address_id: &str) -> Result<OrderSubmission, CartError> {
        if self.lines.is_empty() {
            return Err(CartError::Empty);
        }

        Ok(OrderSubmission {
            product_ids: self.lines.iter().map(|l| l.product_id.clone()).collect(),
            quantities: self.lines.iter().map(|l| l.quantity).collect(),
            address_id: address_id.to_string(),
        })
    }
}

// =============================================================================
// Order Submission
// =============================================================================

/// The checkout payload: parallel arrays index-aligned to cart order.
///
/// ## Serialized Shape
/// The backend expects lower-case plural keys and `address` for the
/// shipping address id:
/// ```json
/// { "quantities": [2, 1], "productids": ["P1", "P2"], "address": "A7" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderSubmission {
    /// Product ids, one per cart line, in cart order.
    #[serde(rename = "productids")]
    pub product_ids: Vec<String>,

    /// Quantities, index-aligned with `productids`.
    pub quantities: Vec<i64>,

    /// Selected shipping address id.
    #[serde(rename = "address")]
    pub address_id: String,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn snapshot(id: &str, price: f64) -> ProductSnapshot {
        ProductSnapshot {
            product_id: id.to_string(),
            name: format!("Product {}", id),
            image_ref: format!("{}.jpg", id),
            unit_price: price,
        }
    }

    #[test]
    fn test_first_add_starts_at_quantity_one() {
        let mut cart = Cart::new();
        cart.add(&snapshot("P1", 10.0));

        assert_eq!(cart.lines().len(), 1);
        let line = cart.line("P1").unwrap();
        assert_eq!(line.quantity, 1);
        assert!((line.line_total - 10.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_repeat_adds_merge_incrementally() {
        let mut cart = Cart::new();
        let p = snapshot("P1", 10.0);

        let n = 7;
        for _ in 0..n {
            cart.add(&p);
        }

        // N adds at price p: quantity == N, line_total == N * p
        assert_eq!(cart.lines().len(), 1);
        let line = cart.line("P1").unwrap();
        assert_eq!(line.quantity, n);
        assert!((line.line_total - (n as f64) * 10.0).abs() < TOLERANCE);
        assert!((line.unit_price - 10.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_merge_keeps_frozen_price() {
        let mut cart = Cart::new();
        cart.add(&snapshot("P1", 10.0));

        // Backend raised the price; the existing line keeps the old one
        cart.add(&snapshot("P1", 12.0));

        let line = cart.line("P1").unwrap();
        assert_eq!(line.quantity, 2);
        assert!((line.unit_price - 10.0).abs() < TOLERANCE);
        assert!((line.line_total - 20.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_lines_keep_insertion_order() {
        let mut cart = Cart::new();
        cart.add(&snapshot("P2", 5.0));
        cart.add(&snapshot("P1", 10.0));
        cart.add(&snapshot("P2", 5.0));

        let ids: Vec<&str> = cart.lines().iter().map(|l| l.product_id.as_str()).collect();
        assert_eq!(ids, vec!["P2", "P1"]);
    }

    #[test]
    fn test_remove_drops_line_and_total() {
        let mut cart = Cart::new();
        cart.add(&snapshot("P1", 10.0));
        cart.add(&snapshot("P2", 4.5));
        cart.add(&snapshot("P1", 10.0));

        let before = cart.total();
        let former = cart.line("P1").unwrap().line_total;

        assert!(cart.remove("P1"));
        assert!(cart.line("P1").is_none());
        assert!((cart.total() - (before - former)).abs() < TOLERANCE);
    }

    #[test]
    fn test_remove_absent_product_is_noop() {
        let mut cart = Cart::new();
        cart.add(&snapshot("P1", 10.0));

        assert!(!cart.remove("P9"));
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn test_total_is_sum_of_line_totals() {
        let mut cart = Cart::new();
        cart.add(&snapshot("P1", 10.0));
        cart.add(&snapshot("P1", 10.0));
        cart.add(&snapshot("P2", 0.99));

        assert!((cart.total() - 20.99).abs() < TOLERANCE);
    }

    #[test]
    fn test_worked_example() {
        // [] -> add P1@10 -> [P1 x1 total 10] -> add P1@10 -> [P1 x2 total 20]
        //    -> remove P1 -> []
        let mut cart = Cart::new();
        assert!(cart.is_empty());

        cart.add(&snapshot("P1", 10.0));
        assert_eq!(cart.line("P1").unwrap().quantity, 1);
        assert!((cart.total() - 10.0).abs() < TOLERANCE);

        cart.add(&snapshot("P1", 10.0));
        assert_eq!(cart.line("P1").unwrap().quantity, 2);
        assert!((cart.total() - 20.0).abs() < TOLERANCE);

        cart.remove("P1");
        assert!(cart.is_empty());
        assert!(cart.total().abs() < TOLERANCE);
    }

    #[test]
    fn test_order_submission_is_index_aligned() {
        let mut cart = Cart::new();
        cart.add(&snapshot("P1", 10.0));
        cart.add(&snapshot("P1", 10.0));
        cart.add(&snapshot("P2", 5.0));
        cart.add(&snapshot("P3", 2.0));

        let submission = cart.order_submission("A7").unwrap();
        assert_eq!(submission.product_ids, vec!["P1", "P2", "P3"]);
        assert_eq!(submission.quantities, vec![2, 1, 1]);
        assert_eq!(submission.address_id, "A7");
    }

    #[test]
    fn test_order_submission_rejects_empty_cart() {
        let cart = Cart::new();
        assert!(matches!(
            cart.order_submission("A7"),
            Err(CartError::Empty)
        ));
    }

    #[test]
    fn test_order_submission_wire_names() {
        let submission = OrderSubmission {
            product_ids: vec!["P1".to_string()],
            quantities: vec![2],
            address_id: "A7".to_string(),
        };

        let json = serde_json::to_value(&submission).unwrap();
        assert_eq!(json["productids"][0], "P1");
        assert_eq!(json["quantities"][0], 2);
        assert_eq!(json["address"], "A7");
    }

    #[test]
    fn test_cart_serializes_as_bare_array() {
        let mut cart = Cart::new();
        cart.add(&snapshot("P1", 10.0));

        let json = serde_json::to_value(&cart).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["id"], "P1");
        assert_eq!(json[0]["price"], 10.0);
        assert_eq!(json[0]["quantity"], 1);
        assert_eq!(json[0]["total"], 10.0);
    }

    #[test]
    fn test_cart_roundtrips_through_persisted_json() {
        let raw = r#"[
            {"id":"P1","name":"Walnut desk","image":"desk.jpg",
             "price":10.0,"quantity":2,"total":20.0}
        ]"#;

        let mut cart: Cart = serde_json::from_str(raw).unwrap();
        cart.add(&ProductSnapshot {
            product_id: "P1".to_string(),
            name: "Walnut desk".to_string(),
            image_ref: "desk.jpg".to_string(),
            unit_price: 10.0,
        });

        let line = cart.line("P1").unwrap();
        assert_eq!(line.quantity, 3);
        assert!((line.line_total - 30.0).abs() < TOLERANCE);
    }
}
