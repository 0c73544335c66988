//! Infrastructure wiring: one shared storage handle, services built over it.

use std::sync::Arc;

use stockroom_catalog::{ITEM_KEY, ITEMS_COLLECTION, ItemCatalog};
use stockroom_ledger::{MOVEMENT_KEY, MOVEMENTS_COLLECTION, StockLedger};
use stockroom_orders::{ORDER_KEY, ORDERS_COLLECTION, OrderService};
use stockroom_storage::{InMemoryStore, KeyValueStore};

/// Long-lived service bundle shared by all requests.
///
/// Built once at process start; the storage handle holds no per-request
/// state, so arbitrary request concurrency needs no locking up here.
pub struct AppServices {
    pub catalog: ItemCatalog,
    pub ledger: Arc<StockLedger>,
    pub orders: OrderService,
}

/// Build the full service stack over a freshly declared store.
pub fn build_services() -> AppServices {
    let store: Arc<dyn KeyValueStore> = Arc::new(InMemoryStore::with_collections(&[
        (ITEMS_COLLECTION, ITEM_KEY),
        (MOVEMENTS_COLLECTION, MOVEMENT_KEY),
        (ORDERS_COLLECTION, ORDER_KEY),
    ]));

    let catalog = ItemCatalog::new(store.clone());
    let ledger = Arc::new(StockLedger::new(store.clone()));
    let orders = OrderService::new(store, ledger.clone());

    AppServices {
        catalog,
        ledger,
        orders,
    }
}
