//! Stockroom API - Goods Service
//!
//! This crate implements the consistency and durability layer of the goods
//! service: the transactional Postgres repository, the cache-aside list read
//! path with invalidation-on-write, the batched analytical event writer, and
//! the change-notification plumbing between them. An Axum router provides
//! the thin HTTP glue on top.

pub mod cache;
pub mod config;
pub mod error;
pub mod events;
pub mod interactor;
pub mod listener;
pub mod pubsub;
pub mod repo;
pub mod routes;
pub mod state;

// Re-export commonly used types
pub use cache::{CacheStore, MemoryCacheStore, LIST_CACHE_KEY};
pub use config::{AnalyticsConfig, ApiConfig, DbConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use events::{EventSink, EventWriter, PgEventSink, DEFAULT_FLUSH_THRESHOLD};
pub use interactor::{GoodsInteractor, MutationOutcome};
pub use listener::EventListener;
pub use pubsub::{Message, PubSub, PublishError, EVENT_TOPIC};
pub use repo::{GoodsRepository, PgGoodsRepository};
pub use routes::create_router;
pub use state::AppState;
