//! Command handlers for the Cart context.
//!
//! `CartStore` owns the session's cart aggregate and persists a snapshot of
//! its line items after every change. The in-memory cart is authoritative:
//! persistence is best-effort and its failures are logged, never returned.
//! Snapshots are written after the cart lock is released, so reads never wait
//! on storage I/O; a revision counter keeps an older snapshot from landing
//! after a newer one.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use kalakriti_core::command::Command;
use kalakriti_core::storage::{self, CART_STORAGE_KEY, KeyValueStore};
use rust_decimal::Decimal;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::domain::aggregates::{Cart, CartLineItem, ProductId};
use crate::domain::commands::{
    AddItem, ClearCart, RemoveItem, RemoveOrderedItems, UpdateQuantity,
};

/// Result of a handled cart command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartCommandResult {
    /// Correlation ID of the handled command.
    pub correlation_id: Uuid,
    /// Whether the cart contents changed.
    pub changed: bool,
    /// Σ quantity after the command.
    pub total_items: u64,
}

#[derive(Debug)]
struct CartState {
    cart: Cart,
    revision: u64,
}

/// The session's cart, backed by a durable key-value store.
pub struct CartStore {
    state: Mutex<CartState>,
    written_revision: Mutex<u64>,
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("cart", &self.lock().cart)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Loads the cart snapshot from `store`.
    ///
    /// A missing, unreadable or corrupt snapshot yields an empty cart; the
    /// failure is logged and not propagated.
    #[must_use]
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let lines: Vec<CartLineItem> =
            storage::load_best_effort(store.as_ref(), CART_STORAGE_KEY).unwrap_or_default();
        let cart = Cart::from_snapshot(lines);
        debug!(lines = cart.lines().len(), "cart loaded from storage");
        Self {
            state: Mutex::new(CartState { cart, revision: 0 }),
            written_revision: Mutex::new(0),
            store,
        }
    }

    /// Handles the `AddItem` command.
    #[instrument(skip(self, command), fields(product_id = %command.item.product_id, quantity = command.item.quantity))]
    pub fn handle_add_item(&self, command: &AddItem) -> CartCommandResult {
        self.mutate(command, |cart| cart.add_item(command.item.clone()))
    }

    /// Handles the `RemoveItem` command. Removing an absent product is a no-op.
    #[instrument(skip(self, command), fields(product_id = %command.product_id))]
    pub fn handle_remove_item(&self, command: &RemoveItem) -> CartCommandResult {
        self.mutate(command, |cart| cart.remove_item(&command.product_id))
    }

    /// Handles the `UpdateQuantity` command. A quantity of zero or less removes
    /// the line.
    #[instrument(skip(self, command), fields(product_id = %command.product_id, quantity = command.quantity))]
    pub fn handle_update_quantity(&self, command: &UpdateQuantity) -> CartCommandResult {
        self.mutate(command, |cart| {
            cart.update_quantity(&command.product_id, command.quantity)
        })
    }

    /// Handles the `ClearCart` command.
    #[instrument(skip(self, command))]
    pub fn handle_clear(&self, command: &ClearCart) -> CartCommandResult {
        self.mutate(command, Cart::clear)
    }

    /// Handles the `RemoveOrderedItems` command: takes the submitted order's
    /// quantities out of the cart, keeping anything added since.
    #[instrument(skip(self, command), fields(lines = command.items.len()))]
    pub fn handle_remove_ordered_items(&self, command: &RemoveOrderedItems) -> CartCommandResult {
        self.mutate(command, |cart| cart.remove_ordered(&command.items))
    }

    /// Returns a copy of the current cart.
    #[must_use]
    pub fn snapshot(&self) -> Cart {
        self.lock().cart.clone()
    }

    /// Σ quantity over all lines.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.lock().cart.total_items()
    }

    /// Σ (unit price × quantity) over all lines.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lock().cart.subtotal()
    }

    /// Returns `true` if the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().cart.is_empty()
    }

    /// Quantity of `product_id`, 0 when absent.
    #[must_use]
    pub fn item_quantity(&self, product_id: &ProductId) -> u32 {
        self.lock().cart.item_quantity(product_id)
    }

    /// Returns `true` if `product_id` is in the cart.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.lock().cart.contains(product_id)
    }

    fn mutate<C, F>(&self, command: &C, apply: F) -> CartCommandResult
    where
        C: Command,
        F: FnOnce(&mut Cart) -> bool,
    {
        let (changed, total_items, pending) = {
            let mut state = self.lock();
            let changed = apply(&mut state.cart);
            let pending = if changed {
                state.revision += 1;
                Some((state.revision, state.cart.lines().to_vec()))
            } else {
                None
            };
            (changed, state.cart.total_items(), pending)
        };
        if let Some((revision, lines)) = pending {
            self.persist(revision, &lines);
        }
        info!(
            command = command.command_type(),
            correlation_id = %command.correlation_id(),
            changed,
            total_items,
            "handled cart command"
        );
        CartCommandResult {
            correlation_id: command.correlation_id(),
            changed,
            total_items,
        }
    }

    fn persist(&self, revision: u64, lines: &[CartLineItem]) {
        let mut written = self
            .written_revision
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if revision <= *written {
            debug!(revision, written = *written, "skipping superseded cart snapshot");
            return;
        }
        storage::save_best_effort(self.store.as_ref(), CART_STORAGE_KEY, lines);
        *written = revision;
    }

    fn lock(&self) -> MutexGuard<'_, CartState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::sync::{Arc, Mutex};
    use std::thread;

    use kalakriti_core::error::DomainError;
    use kalakriti_core::storage::{CART_STORAGE_KEY, KeyValueStore};
    use kalakriti_test_support::{FailingStore, MemoryStore};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::CartStore;
    use crate::domain::aggregates::{CartLineItem, ProductId, UnitPrice};
    use crate::domain::commands::{
        AddItem, ClearCart, RemoveItem, RemoveOrderedItems, UpdateQuantity,
    };

    fn item(id: &str, price: i64, quantity: u32) -> CartLineItem {
        CartLineItem {
            product_id: ProductId::new(id),
            title: format!("Terracotta {id}"),
            unit_price: UnitPrice::new(Decimal::from(price)).unwrap(),
            quantity,
            image_ref: String::new(),
        }
    }

    fn add(store: &CartStore, id: &str, price: i64, quantity: u32) {
        store.handle_add_item(&AddItem {
            correlation_id: Uuid::new_v4(),
            item: item(id, price, quantity),
        });
    }

    fn quantities(store: &CartStore) -> BTreeMap<String, u32> {
        store
            .snapshot()
            .lines()
            .iter()
            .map(|l| (l.product_id.to_string(), l.quantity))
            .collect()
    }

    #[test]
    fn test_add_item_persists_snapshot() {
        // Arrange
        let backing = Arc::new(MemoryStore::new());
        let store = CartStore::load(backing.clone());

        // Act
        let result = store.handle_add_item(&AddItem {
            correlation_id: Uuid::new_v4(),
            item: item("p1", 250, 2),
        });

        // Assert
        assert!(result.changed);
        assert_eq!(result.total_items, 2);
        let raw = backing.get(CART_STORAGE_KEY).unwrap().unwrap();
        assert!(raw.contains("\"productId\":\"p1\""));
    }

    #[test]
    fn test_snapshot_round_trip_reproduces_quantities() {
        // Arrange
        let backing = Arc::new(MemoryStore::new());
        let original = CartStore::load(backing.clone());
        add(&original, "p1", 100, 2);
        add(&original, "p2", 40, 1);
        add(&original, "p1", 100, 1);
        original.handle_update_quantity(&UpdateQuantity {
            correlation_id: Uuid::new_v4(),
            product_id: ProductId::new("p2"),
            quantity: 5,
        });

        // Act
        let reloaded = CartStore::load(backing);

        // Assert
        assert_eq!(quantities(&reloaded), quantities(&original));
        assert_eq!(reloaded.subtotal(), original.subtotal());
    }

    #[test]
    fn test_corrupt_snapshot_loads_empty_cart() {
        let backing = Arc::new(MemoryStore::with_entry(CART_STORAGE_KEY, "[{\"productId\":"));

        let store = CartStore::load(backing);

        assert!(store.is_empty());
    }

    #[test]
    fn test_unreadable_store_loads_empty_cart() {
        let store = CartStore::load(Arc::new(FailingStore));

        assert_eq!(store.total_items(), 0);
    }

    #[test]
    fn test_failing_writes_do_not_fail_mutations() {
        // Arrange
        let store = CartStore::load(Arc::new(FailingStore));

        // Act
        add(&store, "p1", 100, 3);
        let removed = store.handle_remove_item(&RemoveItem {
            correlation_id: Uuid::new_v4(),
            product_id: ProductId::new("p1"),
        });

        // Assert
        assert!(removed.changed);
        assert!(store.is_empty());
    }

    #[test]
    fn test_noop_command_does_not_write() {
        // Arrange
        let backing = Arc::new(MemoryStore::new());
        let store = CartStore::load(backing.clone());

        // Act
        let result = store.handle_remove_item(&RemoveItem {
            correlation_id: Uuid::new_v4(),
            product_id: ProductId::new("absent"),
        });

        // Assert
        assert!(!result.changed);
        assert_eq!(backing.write_count(), 0);
    }

    #[test]
    fn test_clear_empties_and_persists_empty_list() {
        // Arrange
        let backing = Arc::new(MemoryStore::new());
        let store = CartStore::load(backing.clone());
        add(&store, "p1", 100, 1);

        // Act
        store.handle_clear(&ClearCart {
            correlation_id: Uuid::new_v4(),
        });

        // Assert
        assert!(store.is_empty());
        assert_eq!(backing.get(CART_STORAGE_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_item_quantity_and_contains() {
        let store = CartStore::load(Arc::new(MemoryStore::new()));
        add(&store, "p1", 100, 4);

        assert_eq!(store.item_quantity(&ProductId::new("p1")), 4);
        assert_eq!(store.item_quantity(&ProductId::new("p2")), 0);
        assert!(store.contains(&ProductId::new("p1")));
        assert!(!store.contains(&ProductId::new("p2")));
    }

    #[test]
    fn test_remove_ordered_items_keeps_later_additions_and_persists() {
        // Arrange
        let backing = Arc::new(MemoryStore::new());
        let store = CartStore::load(backing.clone());
        add(&store, "p1", 100, 2);
        let ordered = store.snapshot().lines().to_vec();
        add(&store, "p2", 60, 1);

        // Act
        let result = store.handle_remove_ordered_items(&RemoveOrderedItems {
            correlation_id: Uuid::new_v4(),
            items: ordered,
        });

        // Assert
        assert!(result.changed);
        assert_eq!(quantities(&store), BTreeMap::from([("p2".to_string(), 1)]));
        let reloaded = CartStore::load(backing);
        assert_eq!(quantities(&reloaded), quantities(&store));
    }

    /// A store whose writes wait until the test releases them.
    struct GatedStore {
        entered: Mutex<Sender<()>>,
        release: Mutex<Receiver<()>>,
    }

    impl KeyValueStore for GatedStore {
        fn get(&self, _key: &str) -> Result<Option<String>, DomainError> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), DomainError> {
            let _ = self.entered.lock().unwrap().send(());
            let _ = self.release.lock().unwrap().recv();
            Ok(())
        }

        fn remove(&self, _key: &str) -> Result<(), DomainError> {
            Ok(())
        }
    }

    #[test]
    fn test_reads_do_not_wait_for_a_slow_write() {
        // Arrange
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let store = Arc::new(CartStore::load(Arc::new(GatedStore {
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        })));
        let writer = {
            let store = Arc::clone(&store);
            thread::spawn(move || add(&store, "p1", 100, 2))
        };
        entered_rx.recv().unwrap();

        // Act
        let total_items = store.total_items();
        release_tx.send(()).unwrap();
        writer.join().unwrap();

        // Assert
        assert_eq!(total_items, 2);
    }
}
