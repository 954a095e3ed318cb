//! Shared fixtures: an in-memory site served through a counting transport.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use enmet::{CacheConfig, Enmet, EnmetError, HttpResponse, Result, Transport};

pub const BASE_URL: &str = "https://ma.test";

/// Serves canned pages by URL and records every request.
#[derive(Default)]
pub struct FixtureTransport {
    pages: Mutex<HashMap<String, String>>,
    redirects: Mutex<HashMap<String, String>>,
    offline: Mutex<bool>,
    requests: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl FixtureTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The Megadeth corner of the site.
    pub fn site() -> Arc<Self> {
        let transport = Self::new();
        transport.page("bands/_/138", include_str!("../fixtures/band_138.html"));
        transport.page("band/read-more/id/138", include_str!("../fixtures/band_info_138.html"));
        transport.page(
            "band/discography/id/138/tab/all",
            include_str!("../fixtures/discography_138.html"),
        );
        transport.page(
            "band/ajax-recommendations/id/138/showMoreSimilar/1",
            include_str!("../fixtures/recommendations_138.html"),
        );
        transport.page("albums/_/_/547", include_str!("../fixtures/album_547.html"));
        transport.page("albums/_/_/548", include_str!("../fixtures/album_548.html"));
        transport.page("albums/_/_/900", include_str!("../fixtures/album_900.html"));
        transport.page("artists/_/184", include_str!("../fixtures/artist_184.html"));
        transport.page("artist/read-more/id/184", include_str!("../fixtures/artist_bio_184.html"));
        transport.page(
            "release/ajax-view-lyrics/id/5001",
            include_str!("../fixtures/lyrics_5001.html"),
        );
        transport.page("search/advanced/", include_str!("../fixtures/advanced_search.html"));
        transport.page(
            "search/ajax-advanced/searching/bands",
            include_str!("../fixtures/search_bands.json"),
        );
        transport.page(
            "search/ajax-advanced/searching/albums/",
            include_str!("../fixtures/search_albums.json"),
        );
        transport.redirect("band/random", "bands/Megadeth/138");
        transport
    }

    pub fn page(&self, resource: &str, body: &str) {
        self.pages.lock().insert(url(resource), body.to_string());
    }

    pub fn redirect(&self, resource: &str, target: &str) {
        self.redirects.lock().insert(url(resource), url(target));
    }

    /// Fail every request at the transport level from now on.
    pub fn go_offline(&self) {
        *self.offline.lock() = true;
    }

    /// Number of requests that reached this transport.
    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn calls_to(&self, resource: &str) -> usize {
        let target = url(resource);
        self.requests.lock().iter().filter(|(u, _)| *u == target).count()
    }

    /// Query parameters of the most recent request.
    pub fn last_query(&self) -> Vec<(String, String)> {
        self.requests
            .lock()
            .last()
            .map(|(_, query)| query.clone())
            .unwrap_or_default()
    }
}

impl Transport for FixtureTransport {
    fn get(&self, url: &str, query: &[(String, String)]) -> Result<HttpResponse> {
        self.requests.lock().push((url.to_string(), query.to_vec()));
        if *self.offline.lock() {
            return Err(EnmetError::Http(format!("connection refused: {url}")));
        }
        if let Some(target) = self.redirects.lock().get(url) {
            return Ok(HttpResponse::ok(target.clone(), ""));
        }
        match self.pages.lock().get(url) {
            Some(body) => Ok(HttpResponse::ok(url, body.clone())),
            None => Ok(HttpResponse {
                url: url.to_string(),
                status: 404,
                headers: Vec::new(),
                body: "Not found".to_string(),
            }),
        }
    }
}

pub fn url(resource: &str) -> String {
    format!("{BASE_URL}/{resource}")
}

/// Session over `transport` with an unthrottled in-memory response cache.
pub fn session(transport: &Arc<FixtureTransport>) -> Enmet {
    session_with_cache(transport, CacheConfig::memory())
}

pub fn session_with_cache(transport: &Arc<FixtureTransport>, cache: CacheConfig) -> Enmet {
    Enmet::builder()
        .base_url(BASE_URL)
        .query_rate(0.0)
        .response_cache(cache)
        .transport(Arc::clone(transport) as Arc<dyn Transport>)
        .build()
        .expect("session builds")
}
