//! # Persisted Cart Store
//!
//! The cart as the rest of the application sees it: every operation
//! re-reads the persisted document, applies pure cart math from
//! `emporia-core`, and writes the result straight back.
//!
//! ## Write-Through Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Cart Operation Shape                               │
//! │                                                                         │
//! │   add / remove / clear:                                                 │
//! │     storage ──read──► Cart ──mutate──► Cart ──write──► storage         │
//! │                                                                         │
//! │   items / total:                                                        │
//! │     storage ──read──► Cart ──derive──► value                           │
//! │                                                                         │
//! │   No in-memory cart survives between calls. Independent UI actions     │
//! │   (product page add, cart page remove) each see the latest persisted   │
//! │   state instead of racing a stale snapshot.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Checkout Reconciliation
//! Checkout submits the persisted cart as index-aligned parallel arrays and
//! clears the cart ONLY on a `status: true` verdict from the backend. Any
//! other outcome leaves the cart exactly as it was, so the user can retry.

use std::sync::Arc;

use reqwest::Method;
use tracing::{debug, info, warn};

use emporia_core::validation::{validate_address_id, validate_snapshot};
use emporia_core::{Cart, CartLine, ProductSnapshot};

use crate::client::{ApiEnvelope, ApiGatewayClient};
use crate::error::GatewayResult;
use crate::storage::KeyValueStorage;
use crate::ui::UiSink;

/// Key holding the serialized cart document.
///
/// The name is historical: the storefront has always persisted its cart
/// under `ads`, and existing documents must stay readable.
pub const CART_KEY: &str = "ads";

/// Checkout endpoint path, relative to the base URL.
pub const CREATE_ORDER_PATH: &str = "orders/create-order";

/// Success alert text. Fixed wording regardless of the backend's message.
const ORDER_PLACED_MESSAGE: &str = "Order placed successfully";

// =============================================================================
// Cart Store
// =============================================================================

/// Persisted, deduplicated cart with checkout reconciliation.
pub struct CartStore {
    storage: Arc<dyn KeyValueStorage>,
    ui: Arc<dyn UiSink>,
}

impl CartStore {
    /// Creates a cart store over the given storage and UI sink.
    pub fn new(storage: Arc<dyn KeyValueStorage>, ui: Arc<dyn UiSink>) -> Self {
        CartStore { storage, ui }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds a product to the cart, merging into an existing line.
    ///
    /// The write is persisted before this returns.
    pub fn add(&self, snapshot: &ProductSnapshot) -> GatewayResult<()> {
        validate_snapshot(snapshot).map_err(emporia_core::CoreError::from)?;

        let mut cart = self.load()?;
        cart.add(snapshot);
        self.save(&cart)?;
        debug!(product = %snapshot.product_id, lines = cart.lines().len(), "cart updated");
        Ok(())
    }

    /// Removes a line by product id. Returns whether a line was removed;
    /// removing an absent product is a persisted no-op.
    pub fn remove(&self, product_id: &str) -> GatewayResult<bool> {
        let mut cart = self.load()?;
        let removed = cart.remove(product_id);
        if removed {
            self.save(&cart)?;
        }
        Ok(removed)
    }

    /// Empties the cart.
    pub fn clear(&self) -> GatewayResult<()> {
        self.save(&Cart::new())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// The persisted cart lines, in insertion order.
    pub fn items(&self) -> GatewayResult<Vec<CartLine>> {
        Ok(self.load()?.lines().to_vec())
    }

    /// The persisted cart total, recomputed from the line totals.
    pub fn total(&self) -> GatewayResult<f64> {
        Ok(self.load()?.total())
    }

    /// Whether the persisted cart has no lines.
    pub fn is_empty(&self) -> GatewayResult<bool> {
        Ok(self.load()?.is_empty())
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Submits the persisted cart as an order.
    ///
    /// Returns `Ok(Some(envelope))` when the backend accepted the order:
    /// the cart is cleared, a success alert fires, and the envelope carries
    /// the server confirmation (order id and friends under `result`).
    /// Every other outcome returns `Ok(None)` with the cart untouched:
    /// - empty cart: error alert, no HTTP call
    /// - backend verdict `status: false`: the backend's message is alerted
    /// - transport/expiry failures: already handled inside the client
    pub async fn checkout(
        &self,
        client: &ApiGatewayClient,
        address_id: &str,
    ) -> GatewayResult<Option<ApiEnvelope>> {
        validate_address_id(address_id).map_err(emporia_core::CoreError::from)?;

        let cart = self.load()?;
        let submission = match cart.order_submission(address_id) {
            Ok(submission) => submission,
            Err(e) => {
                self.ui.alert_error(&e.to_string());
                return Ok(None);
            }
        };

        let payload = serde_json::to_value(&submission)?;
        let Some(envelope) = client
            .execute(CREATE_ORDER_PATH, Method::POST, Some(&payload))
            .await?
        else {
            // The client already alerted or tore the session down
            return Ok(None);
        };

        if !envelope.status {
            warn!(message = %envelope.message, "order rejected by backend");
            self.ui.alert_error(&envelope.message);
            return Ok(None);
        }

        self.clear()?;
        self.ui.alert_success(ORDER_PLACED_MESSAGE);
        info!(lines = submission.product_ids.len(), "order placed, cart cleared");
        Ok(Some(envelope))
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    fn load(&self) -> GatewayResult<Cart> {
        let Some(raw) = self.storage.get(CART_KEY)? else {
            return Ok(Cart::new());
        };

        match serde_json::from_str(&raw) {
            Ok(cart) => Ok(cart),
            Err(e) => {
                // A corrupt cart document resets to empty instead of
                // wedging every cart operation
                warn!(error = %e, "persisted cart is corrupt, starting empty");
                Ok(Cart::new())
            }
        }
    }

    fn save(&self, cart: &Cart) -> GatewayResult<()> {
        self.storage.set(CART_KEY, &serde_json::to_string(cart)?)?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayConfig;
    use crate::session::TokenStore;
    use crate::storage::MemoryStorage;
    use crate::ui::RecordingSink;
    use mockito::Matcher;
    use serde_json::json;

    const TOLERANCE: f64 = 1e-9;

    fn snapshot(id: &str, price: f64) -> ProductSnapshot {
        ProductSnapshot {
            product_id: id.to_string(),
            name: format!("Product {}", id),
            image_ref: format!("{}.jpg", id),
            unit_price: price,
        }
    }

    struct Fixture {
        store: CartStore,
        sink: Arc<RecordingSink>,
        storage: Arc<MemoryStorage>,
    }

    fn fixture() -> Fixture {
        let storage = Arc::new(MemoryStorage::new());
        let sink = Arc::new(RecordingSink::default());
        Fixture {
            store: CartStore::new(storage.clone(), sink.clone()),
            sink,
            storage,
        }
    }

    fn client_for(server: &mockito::Server, fx: &Fixture) -> ApiGatewayClient {
        fx.storage.set("accessToken", "acc-1").unwrap();
        fx.storage.set("refreshToken", "ref-1").unwrap();
        ApiGatewayClient::new(
            GatewayConfig::new(&server.url()).unwrap(),
            TokenStore::new(fx.storage.clone()),
            fx.sink.clone(),
        )
        .unwrap()
    }

    #[test]
    fn test_add_persists_immediately() {
        let fx = fixture();
        fx.store.add(&snapshot("P1", 10.0)).unwrap();

        // A second store over the same storage sees the write
        let other = CartStore::new(fx.storage.clone(), fx.sink.clone());
        let items = other.items().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id, "P1");
        assert_eq!(items[0].quantity, 1);
    }

    #[test]
    fn test_repeat_add_merges_through_persistence() {
        let fx = fixture();
        fx.store.add(&snapshot("P1", 10.0)).unwrap();
        fx.store.add(&snapshot("P1", 10.0)).unwrap();
        fx.store.add(&snapshot("P2", 5.0)).unwrap();

        let items = fx.store.items().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].quantity, 2);
        assert!((items[0].line_total - 20.0).abs() < TOLERANCE);
        assert!((fx.store.total().unwrap() - 25.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_cart_persists_as_bare_json_array_under_historical_key() {
        let fx = fixture();
        fx.store.add(&snapshot("P1", 10.0)).unwrap();

        // The document lives under the key the storefront has always used
        let raw = fx.storage.get("ads").unwrap().unwrap();
        let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(doc.is_array());
        assert_eq!(doc[0]["id"], "P1");
        assert_eq!(doc[0]["total"], 10.0);
    }

    #[test]
    fn test_remove_persists_and_reports() {
        let fx = fixture();
        fx.store.add(&snapshot("P1", 10.0)).unwrap();
        fx.store.add(&snapshot("P2", 5.0)).unwrap();

        assert!(fx.store.remove("P1").unwrap());
        assert!(!fx.store.remove("P1").unwrap());

        let items = fx.store.items().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id, "P2");
    }

    #[test]
    fn test_external_write_is_visible() {
        // Write-through works both ways: a document written by another
        // component is picked up on the next read
        let fx = fixture();
        fx.storage
            .set(
                CART_KEY,
                r#"[{"id":"P9","name":"Lamp","image":"lamp.jpg","price":3.5,"quantity":2,"total":7.0}]"#,
            )
            .unwrap();

        let items = fx.store.items().unwrap();
        assert_eq!(items[0].product_id, "P9");
        assert!((fx.store.total().unwrap() - 7.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_corrupt_cart_resets_to_empty() {
        let fx = fixture();
        fx.storage.set(CART_KEY, "{not an array").unwrap();

        assert!(fx.store.is_empty().unwrap());
        fx.store.add(&snapshot("P1", 10.0)).unwrap();
        assert_eq!(fx.store.items().unwrap().len(), 1);
    }

    #[test]
    fn test_add_rejects_invalid_snapshot() {
        let fx = fixture();
        let mut bad = snapshot("P1", 10.0);
        bad.unit_price = -1.0;

        assert!(fx.store.add(&bad).is_err());
        assert!(fx.store.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_checkout_success_clears_cart() {
        let mut server = mockito::Server::new_async().await;
        let fx = fixture();
        let client = client_for(&server, &fx);

        fx.store.add(&snapshot("P1", 10.0)).unwrap();
        fx.store.add(&snapshot("P1", 10.0)).unwrap();
        fx.store.add(&snapshot("P2", 5.0)).unwrap();

        let mock = server
            .mock("POST", "/orders/create-order")
            .match_header("authorization", "Bearer acc-1")
            .match_body(Matcher::Json(json!({
                "productids": ["P1", "P2"],
                "quantities": [2, 1],
                "address": "A7",
            })))
            .with_status(200)
            .with_body(r#"{"status":true,"message":"Order received","result":{"orderId":"O1"}}"#)
            .expect(1)
            .create_async()
            .await;

        let confirmation = fx.store.checkout(&client, "A7").await.unwrap().unwrap();

        // The server confirmation reaches the caller intact
        assert!(confirmation.status);
        assert_eq!(confirmation.result["orderId"], "O1");
        assert!(fx.store.is_empty().unwrap());
        // The success alert wording is fixed, not the backend's message
        assert_eq!(fx.sink.success_messages(), vec!["Order placed successfully"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_checkout_rejected_verdict_keeps_cart() {
        let mut server = mockito::Server::new_async().await;
        let fx = fixture();
        let client = client_for(&server, &fx);

        fx.store.add(&snapshot("P1", 10.0)).unwrap();

        server
            .mock("POST", "/orders/create-order")
            .with_status(200)
            .with_body(r#"{"status":false,"message":"Out of stock","result":null}"#)
            .create_async()
            .await;

        let confirmation = fx.store.checkout(&client, "A7").await.unwrap();

        assert!(confirmation.is_none());
        assert_eq!(fx.store.items().unwrap().len(), 1);
        assert_eq!(fx.sink.error_messages(), vec!["Out of stock"]);
        assert!(fx.sink.success_messages().is_empty());
    }

    #[tokio::test]
    async fn test_checkout_empty_cart_never_hits_the_wire() {
        let mut server = mockito::Server::new_async().await;
        let fx = fixture();
        let client = client_for(&server, &fx);

        let order = server
            .mock("POST", "/orders/create-order")
            .expect(0)
            .create_async()
            .await;

        let confirmation = fx.store.checkout(&client, "A7").await.unwrap();

        assert!(confirmation.is_none());
        assert_eq!(fx.sink.error_messages(), vec!["No items in the cart"]);
        order.assert_async().await;
    }

    #[tokio::test]
    async fn test_checkout_transport_failure_keeps_cart() {
        let mut server = mockito::Server::new_async().await;
        let fx = fixture();
        let client = client_for(&server, &fx);

        fx.store.add(&snapshot("P1", 10.0)).unwrap();

        server
            .mock("POST", "/orders/create-order")
            .with_status(500)
            .with_body(r#"{"status":false,"message":"Database unavailable","result":null}"#)
            .create_async()
            .await;

        let confirmation = fx.store.checkout(&client, "A7").await.unwrap();

        // The client alerted; the cart is intact for a retry
        assert!(confirmation.is_none());
        assert_eq!(fx.store.items().unwrap().len(), 1);
        assert_eq!(fx.sink.error_messages(), vec!["Database unavailable"]);
    }

    #[tokio::test]
    async fn test_checkout_rejects_blank_address() {
        let server = mockito::Server::new_async().await;
        let fx = fixture();
        let client = client_for(&server, &fx);
        fx.store.add(&snapshot("P1", 10.0)).unwrap();

        assert!(fx.store.checkout(&client, "  ").await.is_err());
        assert_eq!(fx.store.items().unwrap().len(), 1);
    }
}
