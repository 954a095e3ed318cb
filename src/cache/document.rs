//! In-memory cache of parsed pages.
//!
//! Bounded, least-recently-used. Values are shared [`Document`] handles, so
//! an evicted page stays usable by whoever still holds it.

use std::sync::Arc;

use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use parking_lot::Mutex;
use scraper::Html;

use crate::telemetry;

/// Default number of parsed pages kept in memory.
pub const DEFAULT_DOCUMENT_CACHE_CAPACITY: u64 = 100;

/// A parsed page.
///
/// The HTML tree is not `Sync`, so access goes through [`Document::with`],
/// which holds the document lock for the duration of the closure.
pub struct Document {
    url: String,
    html: Mutex<Html>,
}

impl Document {
    /// Parse a full HTML document.
    pub fn parse(url: impl Into<String>, body: &str) -> Self {
        Self {
            url: url.into(),
            html: Mutex::new(Html::parse_document(body)),
        }
    }

    /// Request URL this document was fetched from.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Run an extractor against the parsed tree.
    pub fn with<R>(&self, f: impl FnOnce(&Html) -> R) -> R {
        f(&self.html.lock())
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document").field("url", &self.url).finish()
    }
}

/// Bounded LRU of parsed pages, keyed by request URL.
pub struct DocumentCache {
    entries: Cache<String, Arc<Document>>,
}

impl DocumentCache {
    /// Create a cache holding at most `capacity` documents.
    pub fn new(capacity: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(capacity)
            .eviction_policy(EvictionPolicy::lru())
            .build();
        Self { entries }
    }

    /// Look up a parsed document. Emits hit/miss metrics.
    pub fn get(&self, key: &str) -> Option<Arc<Document>> {
        let found = self.entries.get(key);
        let counter = if found.is_some() {
            telemetry::CACHE_HITS_TOTAL
        } else {
            telemetry::CACHE_MISSES_TOTAL
        };
        metrics::counter!(counter, "tier" => "document").increment(1);
        found
    }

    pub fn insert(&self, key: &str, document: Arc<Document>) {
        self.entries.insert(key.to_string(), document);
    }

    /// Number of documents currently held.
    pub fn len(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evict everything.
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }
}

impl Default for DocumentCache {
    fn default() -> Self {
        Self::new(DEFAULT_DOCUMENT_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    #[test]
    fn document_exposes_parsed_tree() {
        let doc = Document::parse("u", "<p class='x'>hello</p>");
        let sel = Selector::parse("p.x").unwrap();
        let text = doc.with(|html| html.select(&sel).next().map(|e| e.text().collect::<String>()));
        assert_eq!(text.as_deref(), Some("hello"));
        assert_eq!(doc.url(), "u");
    }

    #[test]
    fn hit_returns_same_handle() {
        let cache = DocumentCache::new(10);
        let doc = Arc::new(Document::parse("u", "<p/>"));
        cache.insert("u", Arc::clone(&doc));
        assert!(Arc::ptr_eq(&cache.get("u").unwrap(), &doc));
        assert!(cache.get("other").is_none());
    }

    #[test]
    fn capacity_is_enforced() {
        let cache = DocumentCache::new(2);
        for i in 0..10 {
            let key = format!("u{i}");
            cache.insert(&key, Arc::new(Document::parse(key.clone(), "<p/>")));
        }
        assert!(cache.len() <= 2);
    }
}
