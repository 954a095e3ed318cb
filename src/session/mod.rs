//! The session context: fetcher, identity registry and catalogs.
//!
//! An [`Enmet`] is a cheap handle; clones share everything. All entity
//! construction goes through it, so every entity of one session lives in
//! the same registry and reads through the same caches.

mod builder;

pub use builder::EnmetBuilder;

use std::fmt;
use std::sync::Arc;

use scraper::Html;
use tracing::debug;

use crate::cache::CacheConfig;
use crate::catalog::{Countries, Country};
use crate::entities::{
    Album, AlbumArtist, AlbumArtistHints, AlbumHints, Artist, Band, BandHints, Disc, LineupArtist,
    LineupHints, SimilarBand, Track, TrackInit, validate_id,
};
use crate::fetch::{FetchStats, PageFetcher, PageKind};
use crate::pages::url_to_id;
use crate::registry::{EntityKey, EntityKind, Registry};
use crate::Result;

struct Inner {
    fetcher: PageFetcher,
    registry: Registry,
    countries: Countries,
}

/// Handle to a catalog session.
#[derive(Clone)]
pub struct Enmet {
    inner: Arc<Inner>,
}

impl Enmet {
    /// Create a new builder for configuring a session.
    pub fn builder() -> EnmetBuilder {
        EnmetBuilder::new()
    }

    /// Session with default settings: public site, sqlite response cache.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub(crate) fn from_fetcher(fetcher: PageFetcher) -> Self {
        Self {
            inner: Arc::new(Inner {
                fetcher,
                registry: Registry::new(),
                countries: Countries::new(),
            }),
        }
    }

    pub fn fetcher(&self) -> &PageFetcher {
        &self.inner.fetcher
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    /// Run an extractor on page `kind` of entity `id`.
    pub(crate) fn extract<R>(
        &self,
        kind: PageKind,
        id: &str,
        extractor: impl FnOnce(&Html) -> Result<R>,
    ) -> Result<R> {
        debug!(?kind, %id, "extracting");
        self.inner.fetcher.document(kind, id)?.with(extractor)
    }

    // ---- identified entities ------------------------------------------

    pub fn band(&self, id: &str) -> Result<Arc<Band>> {
        self.band_with(id, BandHints::default())
    }

    /// Band `id`, pre-filling the hinted fields if it is not live yet.
    pub fn band_with(&self, id: &str, hints: BandHints) -> Result<Arc<Band>> {
        let id = validate_id("band", id)?;
        let key = EntityKey::identified(EntityKind::Band, id.as_str());
        self.inner
            .registry
            .get_or_create(key, || Ok(Band::new(self.clone(), id, hints)))
    }

    pub fn album(&self, id: &str) -> Result<Arc<Album>> {
        self.album_with(id, AlbumHints::default())
    }

    pub fn album_with(&self, id: &str, hints: AlbumHints) -> Result<Arc<Album>> {
        let id = validate_id("album", id)?;
        let key = EntityKey::identified(EntityKind::Album, id.as_str());
        self.inner
            .registry
            .get_or_create(key, || Ok(Album::new(self.clone(), id, hints)))
    }

    pub fn artist(&self, id: &str) -> Result<Arc<Artist>> {
        let id = validate_id("artist", id)?;
        let key = EntityKey::identified(EntityKind::Artist, id.as_str());
        self.inner
            .registry
            .get_or_create(key, || Ok(Artist::new(self.clone(), id)))
    }

    /// Track `id` with its tracklist data.
    pub fn track(&self, id: &str, init: TrackInit) -> Result<Arc<Track>> {
        let id = validate_id("track", id)?;
        let key = EntityKey::identified(EntityKind::Track, id.as_str());
        self.inner
            .registry
            .get_or_create(key, || Ok(Track::new(self.clone(), id, init)))
    }

    // ---- contextual entities ------------------------------------------

    /// Disc `index` (0-based) of album `album_id`.
    pub fn disc(&self, album_id: &str, index: usize) -> Result<Arc<Disc>> {
        let album_id = validate_id("album", album_id)?;
        let key = EntityKey::contextual(EntityKind::Disc, album_id.as_str(), index);
        self.inner
            .registry
            .get_or_create(key, || Ok(Disc::new(self.clone(), album_id, index)))
    }

    /// Artist `artist_id` as a member of band `band_id`.
    pub fn lineup_artist(
        &self,
        artist_id: &str,
        band_id: &str,
        hints: LineupHints,
    ) -> Result<Arc<LineupArtist>> {
        let artist_id = validate_id("artist", artist_id)?;
        let band_id = validate_id("band", band_id)?;
        let key = EntityKey::contextual(EntityKind::LineupArtist, artist_id.as_str(), &band_id);
        self.inner.registry.get_or_create(key, || {
            Ok(LineupArtist::new(self.clone(), artist_id, band_id, hints))
        })
    }

    /// Artist `artist_id` as credited on album `album_id`.
    pub fn album_artist(
        &self,
        artist_id: &str,
        album_id: &str,
        hints: AlbumArtistHints,
    ) -> Result<Arc<AlbumArtist>> {
        let artist_id = validate_id("artist", artist_id)?;
        let album_id = validate_id("album", album_id)?;
        let key = EntityKey::contextual(EntityKind::AlbumArtist, artist_id.as_str(), &album_id);
        self.inner.registry.get_or_create(key, || {
            Ok(AlbumArtist::new(self.clone(), artist_id, album_id, hints))
        })
    }

    /// Band `band_id` as recommended for band `similar_to_id`.
    ///
    /// `hints` are handed to the band itself when it is first materialized.
    pub fn similar_band(
        &self,
        band_id: &str,
        similar_to_id: &str,
        score: Option<u32>,
        hints: BandHints,
    ) -> Result<Arc<SimilarBand>> {
        let band_id = validate_id("band", band_id)?;
        let similar_to_id = validate_id("band", similar_to_id)?;
        let key = EntityKey::contextual(EntityKind::SimilarBand, band_id.as_str(), &similar_to_id);
        self.inner.registry.get_or_create(key, || {
            Ok(SimilarBand::new(
                self.clone(),
                band_id,
                similar_to_id,
                score,
                hints,
            ))
        })
    }

    // ---- sampling ------------------------------------------------------

    /// A band picked by the site at random. Never cached.
    pub fn random_band(&self) -> Result<Arc<Band>> {
        let url = self.inner.fetcher.resolve_redirect("band/random")?;
        debug!(%url, "random band");
        self.band(&url_to_id(&url))
    }

    // ---- caches --------------------------------------------------------

    /// Active response cache configuration.
    pub fn cache_config(&self) -> CacheConfig {
        self.inner.fetcher.cache_config()
    }

    /// Replace the response cache. See [`PageFetcher::set_cache_config`].
    pub fn set_cache_config(&self, config: CacheConfig) -> Result<CacheConfig> {
        self.inner.fetcher.set_cache_config(config)
    }

    pub fn stats(&self) -> FetchStats {
        self.inner.fetcher.stats()
    }

    /// Number of live entities in the registry.
    pub fn live_entities(&self) -> usize {
        self.inner.registry.live_count()
    }

    // ---- countries -----------------------------------------------------

    /// Country catalog, loaded on first call.
    pub fn countries(&self) -> Result<Arc<Vec<Country>>> {
        self.inner.countries.all(&self.inner.fetcher)
    }

    /// Reload the country catalog from the site.
    pub fn refresh_countries(&self) -> Result<Arc<Vec<Country>>> {
        self.inner.countries.refresh(&self.inner.fetcher)
    }

    pub fn country_by_code(&self, code: &str) -> Result<Option<Country>> {
        self.inner.countries.by_code(&self.inner.fetcher, code)
    }

    pub fn country_by_name(&self, name: &str) -> Result<Option<Country>> {
        self.inner.countries.by_name(&self.inner.fetcher, name)
    }
}

impl fmt::Debug for Enmet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Enmet")
            .field("base_url", &self.inner.fetcher.base_url())
            .finish_non_exhaustive()
    }
}
