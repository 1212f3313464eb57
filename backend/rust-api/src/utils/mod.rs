pub mod retry;
pub mod ttl_cache;
pub mod version_history;
