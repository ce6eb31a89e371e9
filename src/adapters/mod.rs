// Adapters layer: concrete implementations for external systems (storage, http, GitHub).

pub mod github;
pub mod http;
pub mod storage;
