use std::sync::Arc;

use pool_core::service::RideService;
use pool_core::storage::memory::MemoryStore;
use pool_core::test_helpers::seeded_store;

/// Service over a freshly seeded store, handing both back.
pub fn seeded_service() -> (Arc<MemoryStore>, RideService) {
    let store = Arc::new(seeded_store());
    let service = RideService::new(store.clone()).expect("service over seeded store");
    (store, service)
}
