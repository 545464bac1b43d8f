// Adapters layer: concrete implementations for external systems (places search, email finder, storage).

pub mod email_finder;
pub mod places;
pub mod storage;
