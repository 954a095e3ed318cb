//! Page fetcher: the single path from a page request to a parsed document.
//!
//! Entity pages go through three tiers, top to bottom:
//!
//! 1. [`DocumentCache`]: already parsed in this process.
//! 2. [`ResponseCache`]: raw body stored earlier (possibly by an earlier run).
//! 3. [`Transport`]: network request, throttled to `query_rate`.
//!
//! A miss at one tier populates that tier and every tier above it. Search
//! requests and redirect lookups bypass both caches.
//!
//! The response cache is opened lazily on first use, so its configuration
//! can be replaced any time before that (see [`PageFetcher::set_cache_config`]).

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use serde::Deserialize;
use tracing::{debug, info};

use crate::cache::{CacheConfig, CachedResponse, Document, DocumentCache, ResponseCache};
use crate::telemetry;
use crate::transport::{HttpResponse, Transport};
use crate::{EnmetError, Result};

/// Catalog site root.
pub const DEFAULT_BASE_URL: &str = "https://www.metal-archives.com";

/// Default limit on uncached requests per second.
pub const DEFAULT_QUERY_RATE: f64 = 3.0;

/// The fixed set of entity pages, each with its resource template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    Band,
    /// Full band comment, when the band page truncates it.
    BandInfo,
    Discography,
    Recommendations,
    Album,
    Artist,
    ArtistBiography,
    ArtistTrivia,
    ArtistLinks,
    Lyrics,
    /// Advanced search form; carries the country selector.
    AdvancedSearch,
}

impl PageKind {
    /// Path (relative to the base URL) of this page for entity `id`.
    pub fn resource(&self, id: &str) -> String {
        match self {
            Self::Band => format!("bands/_/{id}"),
            Self::BandInfo => format!("band/read-more/id/{id}"),
            Self::Discography => format!("band/discography/id/{id}/tab/all"),
            Self::Recommendations => {
                format!("band/ajax-recommendations/id/{id}/showMoreSimilar/1")
            }
            Self::Album => format!("albums/_/_/{id}"),
            Self::Artist => format!("artists/_/{id}"),
            Self::ArtistBiography => format!("artist/read-more/id/{id}"),
            Self::ArtistTrivia => format!("artist/read-more/id/{id}/field/trivia"),
            Self::ArtistLinks => format!("link/ajax-list/type/person/id/{id}"),
            Self::Lyrics => format!("release/ajax-view-lyrics/id/{id}"),
            Self::AdvancedSearch => "search/advanced/".to_string(),
        }
    }
}

/// Counters describing where page requests were served from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    /// Requests that reached the transport (including searches).
    pub network_requests: u64,
    /// Entity pages served from the response cache.
    pub response_cache_hits: u64,
    /// Entity pages served from the document cache.
    pub document_cache_hits: u64,
    /// HTML parses performed.
    pub parses: u64,
}

#[derive(Default)]
struct Counters {
    network_requests: AtomicU64,
    response_cache_hits: AtomicU64,
    document_cache_hits: AtomicU64,
    parses: AtomicU64,
}

/// One page of a data-table search response.
#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(rename = "iTotalRecords", default)]
    total: usize,
    #[serde(rename = "aaData", default)]
    rows: Vec<Vec<String>>,
}

/// Fetches pages through the cache tiers.
pub struct PageFetcher {
    base_url: String,
    transport: Arc<dyn Transport>,
    documents: DocumentCache,
    cache_config: RwLock<CacheConfig>,
    responses: RwLock<Option<Arc<ResponseCache>>>,
    min_interval: Duration,
    next_slot: Mutex<Option<Instant>>,
    counters: Counters,
}

impl PageFetcher {
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn Transport>,
        cache_config: CacheConfig,
        document_cache_capacity: u64,
        query_rate: f64,
    ) -> Result<Self> {
        let min_interval = if query_rate > 0.0 {
            Duration::try_from_secs_f64(1.0 / query_rate).map_err(|e| {
                EnmetError::Configuration(format!("query rate {query_rate} is out of range: {e}"))
            })?
        } else {
            Duration::ZERO
        };
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            transport,
            documents: DocumentCache::new(document_cache_capacity),
            cache_config: RwLock::new(cache_config),
            responses: RwLock::new(None),
            min_interval,
            next_slot: Mutex::new(None),
            counters: Counters::default(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL of a site resource.
    pub fn url_for(&self, resource: &str) -> String {
        format!("{}/{}", self.base_url, resource.trim_start_matches('/'))
    }

    /// Parsed page `kind` of entity `id`.
    pub fn document(&self, kind: PageKind, id: &str) -> Result<Arc<Document>> {
        let url = self.url_for(&kind.resource(id));
        if let Some(document) = self.documents.get(&url) {
            debug!(%url, "document cache hit");
            self.counters
                .document_cache_hits
                .fetch_add(1, Ordering::Relaxed);
            return Ok(document);
        }

        let body = self.cached_body(&url)?;
        let document = Arc::new(Document::parse(url.as_str(), &body));
        self.counters.parses.fetch_add(1, Ordering::Relaxed);
        self.documents.insert(&url, Arc::clone(&document));
        Ok(document)
    }

    /// Re-fetch page `kind` of entity `id` from the network, replacing what
    /// both cache tiers hold for it.
    pub fn refresh(&self, kind: PageKind, id: &str) -> Result<Arc<Document>> {
        let url = self.url_for(&kind.resource(id));
        let response = self.network_get(&url, &[])?.error_for_status()?;
        self.response_cache()?.insert(&url, &CachedResponse::from_http(&response));
        let document = Arc::new(Document::parse(url.as_str(), &response.body));
        self.counters.parses.fetch_add(1, Ordering::Relaxed);
        self.documents.insert(&url, Arc::clone(&document));
        Ok(document)
    }

    /// Run a data-table search, following pagination until every row is in.
    ///
    /// Never cached.
    pub fn search(&self, resource: &str, params: &[(String, String)]) -> Result<Vec<Vec<String>>> {
        let url = self.url_for(resource);
        let mut rows: Vec<Vec<String>> = Vec::new();
        loop {
            let mut query = params.to_vec();
            query.push(("iDisplayStart".to_string(), rows.len().to_string()));
            let response = self.network_get(&url, &query)?.error_for_status()?;
            let page: SearchPage = serde_json::from_str(&response.body)?;

            let received = page.rows.len();
            rows.extend(page.rows);
            if received == 0 || rows.len() >= page.total {
                break;
            }
        }
        debug!(%url, count = rows.len(), "search finished");
        Ok(rows)
    }

    /// Final URL reached from `resource` after redirects. Never cached.
    pub fn resolve_redirect(&self, resource: &str) -> Result<String> {
        let url = self.url_for(resource);
        Ok(self.network_get(&url, &[])?.error_for_status()?.url)
    }

    /// The configuration the response cache is (or will be) opened with.
    pub fn cache_config(&self) -> CacheConfig {
        self.cache_config.read().clone()
    }

    /// Replace the response cache.
    ///
    /// The new backend is opened immediately and serves every later request.
    /// Documents parsed under the previous cache stay in the document tier.
    pub fn set_cache_config(&self, config: CacheConfig) -> Result<CacheConfig> {
        let cache = Arc::new(ResponseCache::open(&config)?);
        *self.cache_config.write() = config.clone();
        *self.responses.write() = Some(cache);
        info!(backend = ?config.backend, "response cache replaced");
        Ok(config)
    }

    /// Number of entries in the response cache, opening it if needed.
    pub fn response_cache_len(&self) -> Result<u64> {
        self.response_cache()?.len()
    }

    /// Number of parsed documents held in memory.
    pub fn document_cache_len(&self) -> u64 {
        self.documents.len()
    }

    /// Drop every parsed document.
    pub fn clear_documents(&self) {
        self.documents.clear();
    }

    pub fn stats(&self) -> FetchStats {
        FetchStats {
            network_requests: self.counters.network_requests.load(Ordering::Relaxed),
            response_cache_hits: self.counters.response_cache_hits.load(Ordering::Relaxed),
            document_cache_hits: self.counters.document_cache_hits.load(Ordering::Relaxed),
            parses: self.counters.parses.load(Ordering::Relaxed),
        }
    }

    fn response_cache(&self) -> Result<Arc<ResponseCache>> {
        if let Some(cache) = self.responses.read().as_ref() {
            return Ok(Arc::clone(cache));
        }
        let mut slot = self.responses.write();
        if let Some(cache) = slot.as_ref() {
            return Ok(Arc::clone(cache));
        }
        let cache = Arc::new(ResponseCache::open(&self.cache_config.read())?);
        *slot = Some(Arc::clone(&cache));
        Ok(cache)
    }

    /// Body of `url` from the response cache, or from the network (then stored).
    fn cached_body(&self, url: &str) -> Result<String> {
        let cache = self.response_cache()?;
        if let Some(hit) = cache.get(url) {
            debug!(%url, "response cache hit");
            self.counters
                .response_cache_hits
                .fetch_add(1, Ordering::Relaxed);
            return Ok(hit.body);
        }

        let response = self.network_get(url, &[])?.error_for_status()?;
        cache.insert(url, &CachedResponse::from_http(&response));
        Ok(response.body)
    }

    fn network_get(&self, url: &str, query: &[(String, String)]) -> Result<HttpResponse> {
        self.throttle();
        info!(%url, "fetching from network");
        self.counters
            .network_requests
            .fetch_add(1, Ordering::Relaxed);

        let start = Instant::now();
        let result = self.transport.get(url, query);
        metrics::histogram!(telemetry::HTTP_REQUEST_DURATION_SECONDS)
            .record(start.elapsed().as_secs_f64());
        let status = match &result {
            Ok(response) if response.is_success() => "ok",
            _ => "error",
        };
        metrics::counter!(telemetry::HTTP_REQUESTS_TOTAL, "status" => status).increment(1);
        result
    }

    /// Wait until this request's slot under the query rate comes up.
    fn throttle(&self) {
        if self.min_interval.is_zero() {
            return;
        }
        let mut next = self.next_slot.lock();
        let now = Instant::now();
        let start = match *next {
            Some(at) if at > now => {
                std::thread::sleep(at - now);
                at
            }
            _ => now,
        };
        *next = Some(start + self.min_interval);
    }
}
