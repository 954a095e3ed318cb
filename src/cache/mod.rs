//! Caching subsystem.
//!
//! Two tiers sit between entity objects and the network:
//!
//! - [`response::ResponseCache`]: durable store of raw HTTP responses,
//!   keyed by request URL. Unbounded, persisted across process runs by the
//!   default sqlite backend, never expires unless configured to.
//!
//! - [`document::DocumentCache`]: bounded in-memory LRU of parsed pages.
//!   Exists only to avoid re-parsing; losing an entry costs a re-parse from
//!   the response tier, never a wrong answer.
//!
//! Neither tier stores failures: a fetch error is never cached.

pub mod document;
pub mod response;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use document::{DEFAULT_DOCUMENT_CACHE_CAPACITY, Document, DocumentCache};
pub use response::{
    BackendChoice, CacheBackend, CacheConfig, CachedResponse, Expiration, MemoryBackend,
    ResponseCache,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteBackend;
