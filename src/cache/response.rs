//! Durable cache of raw HTTP responses.
//!
//! [`ResponseCache`] wraps a [`CacheBackend`] with an expiration policy.
//! The backend is chosen through [`CacheConfig`]:
//!
//! - `Sqlite` (default with the `sqlite` feature): a single-table database
//!   under the user cache directory, surviving process restarts.
//! - `Memory`: unbounded moka cache, lost at exit.
//! - `Custom`: any caller-supplied [`CacheBackend`].
//! - `Disabled`: every lookup misses, nothing is stored.
//!
//! Keys are full request URLs, so entries stay valid across processes.
//!
//! Backend failures degrade to misses (reads) or are skipped (writes) with
//! a warning; a broken cache never fails a fetch that the network can
//! satisfy.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use moka::sync::Cache;
use tracing::{debug, warn};

use crate::Result;
use crate::telemetry;
use crate::transport::HttpResponse;

/// Default cache file name (inside the `enmet` cache directory).
pub const DEFAULT_CACHE_NAME: &str = "enmet_data.sqlite";

/// A stored HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedResponse {
    /// Final URL (after redirects).
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub fetched_at: SystemTime,
}

impl CachedResponse {
    /// Snapshot of a live response, stamped with the current time.
    pub fn from_http(response: &HttpResponse) -> Self {
        Self {
            url: response.url.clone(),
            status: response.status,
            headers: response.headers.clone(),
            body: response.body.clone(),
            fetched_at: SystemTime::now(),
        }
    }

    /// Age of this entry relative to `now`. Entries from the future count as fresh.
    pub fn age(&self, now: SystemTime) -> Duration {
        now.duration_since(self.fetched_at).unwrap_or_default()
    }
}

/// Storage behind a [`ResponseCache`].
///
/// Implementations must be thread-safe; the fetcher calls them from
/// whichever thread triggers a lazy resolution.
pub trait CacheBackend: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    fn get(&self, key: &str) -> Result<Option<CachedResponse>>;

    fn insert(&self, key: &str, response: &CachedResponse) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;

    fn clear(&self) -> Result<()>;

    /// Number of stored entries.
    fn len(&self) -> Result<u64>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// When stored responses stop being served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expiration {
    /// Keep forever, never re-validate.
    #[default]
    Never,
    /// Treat entries older than this as misses.
    After(Duration),
}

impl Expiration {
    pub fn is_expired(&self, response: &CachedResponse, now: SystemTime) -> bool {
        match self {
            Self::Never => false,
            Self::After(ttl) => response.age(now) > *ttl,
        }
    }
}

/// Which backend a [`ResponseCache`] opens.
#[derive(Clone)]
pub enum BackendChoice {
    /// sqlite database at the given path (parent directories are created).
    #[cfg(feature = "sqlite")]
    Sqlite { path: PathBuf },
    /// Unbounded in-memory store.
    Memory,
    /// Caller-supplied backend.
    Custom(Arc<dyn CacheBackend>),
    /// No response caching at all.
    Disabled,
}

impl fmt::Debug for BackendChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite { path } => f.debug_struct("Sqlite").field("path", path).finish(),
            Self::Memory => f.write_str("Memory"),
            Self::Custom(backend) => f.debug_tuple("Custom").field(&backend.name()).finish(),
            Self::Disabled => f.write_str("Disabled"),
        }
    }
}

impl Default for BackendChoice {
    #[cfg(feature = "sqlite")]
    fn default() -> Self {
        Self::Sqlite {
            path: default_cache_path(),
        }
    }

    #[cfg(not(feature = "sqlite"))]
    fn default() -> Self {
        Self::Memory
    }
}

/// Default cache path: `<user cache dir>/enmet/enmet_data.sqlite`.
pub fn default_cache_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("enmet")
        .join(DEFAULT_CACHE_NAME)
}

/// Configuration for the response cache.
///
/// ```rust
/// # use enmet::cache::{BackendChoice, CacheConfig, Expiration};
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .backend(BackendChoice::Memory)
///     .expire_after(Duration::from_secs(7 * 24 * 3600));
/// assert_eq!(config.expiration, Expiration::After(Duration::from_secs(604_800)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CacheConfig {
    /// Storage backend. Default: sqlite under the user cache directory.
    pub backend: BackendChoice,
    /// Expiration policy. Default: never expire.
    pub expiration: Expiration,
}

impl CacheConfig {
    /// Create a new config with the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// In-memory cache, nothing persisted.
    pub fn memory() -> Self {
        Self::new().backend(BackendChoice::Memory)
    }

    /// No response caching.
    pub fn disabled() -> Self {
        Self::new().backend(BackendChoice::Disabled)
    }

    /// sqlite cache at a specific path.
    #[cfg(feature = "sqlite")]
    pub fn sqlite(path: impl Into<PathBuf>) -> Self {
        Self::new().backend(BackendChoice::Sqlite { path: path.into() })
    }

    /// Set the backend.
    pub fn backend(mut self, backend: BackendChoice) -> Self {
        self.backend = backend;
        self
    }

    /// Expire entries after `ttl`.
    pub fn expire_after(mut self, ttl: Duration) -> Self {
        self.expiration = Expiration::After(ttl);
        self
    }

    /// Set the expiration policy.
    pub fn expiration(mut self, expiration: Expiration) -> Self {
        self.expiration = expiration;
        self
    }
}

/// Unbounded in-memory [`CacheBackend`].
pub struct MemoryBackend {
    entries: Cache<String, CachedResponse>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            entries: Cache::builder().build(),
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&self, key: &str) -> Result<Option<CachedResponse>> {
        Ok(self.entries.get(key))
    }

    fn insert(&self, key: &str, response: &CachedResponse) -> Result<()> {
        self.entries.insert(key.to_string(), response.clone());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.invalidate(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.entries.invalidate_all();
        Ok(())
    }

    fn len(&self) -> Result<u64> {
        self.entries.run_pending_tasks();
        Ok(self.entries.entry_count())
    }
}

/// Raw-response tier: a backend plus expiration policy.
pub struct ResponseCache {
    backend: Option<Arc<dyn CacheBackend>>,
    expiration: Expiration,
}

impl ResponseCache {
    /// Open the backend described by `config`.
    pub fn open(config: &CacheConfig) -> Result<Self> {
        let backend: Option<Arc<dyn CacheBackend>> = match &config.backend {
            #[cfg(feature = "sqlite")]
            BackendChoice::Sqlite { path } => {
                Some(Arc::new(super::sqlite::SqliteBackend::open(path)?))
            }
            BackendChoice::Memory => Some(Arc::new(MemoryBackend::new())),
            BackendChoice::Custom(backend) => Some(Arc::clone(backend)),
            BackendChoice::Disabled => None,
        };
        debug!(backend = ?config.backend, expiration = ?config.expiration, "opened response cache");
        Ok(Self {
            backend,
            expiration: config.expiration,
        })
    }

    /// Look up a stored response.
    ///
    /// Expired entries are removed and reported as misses.
    pub fn get(&self, key: &str) -> Option<CachedResponse> {
        let backend = self.backend.as_ref()?;
        let found = match backend.get(key) {
            Ok(found) => found,
            Err(e) => {
                warn!(backend = backend.name(), key, error = %e, "response cache read failed");
                None
            }
        };
        let hit = match found {
            Some(response) if self.expiration.is_expired(&response, SystemTime::now()) => {
                debug!(key, "response cache entry expired");
                if let Err(e) = backend.remove(key) {
                    warn!(backend = backend.name(), key, error = %e, "failed to drop expired entry");
                }
                None
            }
            other => other,
        };
        let counter = if hit.is_some() {
            telemetry::CACHE_HITS_TOTAL
        } else {
            telemetry::CACHE_MISSES_TOTAL
        };
        metrics::counter!(counter, "tier" => "response").increment(1);
        hit
    }

    /// Store a response. Write failures are logged and skipped.
    pub fn insert(&self, key: &str, response: &CachedResponse) {
        let Some(backend) = &self.backend else {
            return;
        };
        if let Err(e) = backend.insert(key, response) {
            warn!(backend = backend.name(), key, error = %e, "response cache write failed");
        }
    }

    /// Number of stored entries (0 when caching is disabled).
    pub fn len(&self) -> Result<u64> {
        match &self.backend {
            Some(backend) => backend.len(),
            None => Ok(0),
        }
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Drop every stored response.
    pub fn clear(&self) -> Result<()> {
        match &self.backend {
            Some(backend) => backend.clear(),
            None => Ok(()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }
}
