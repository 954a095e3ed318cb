//! Document and response cache tiers as seen through entity reads.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{FixtureTransport, session, session_with_cache};
use enmet::cache::{CacheBackend, MemoryBackend};
use enmet::{BackendChoice, CacheConfig, EnmetError, PageKind};

#[test]
fn one_page_one_request_one_parse() {
    let transport = FixtureTransport::site();
    let enmet = session(&transport);
    let band = enmet.band("138").unwrap();

    band.name().unwrap();
    band.genres().unwrap();
    band.label().unwrap();
    band.lineup().unwrap();

    let stats = enmet.stats();
    assert_eq!(stats.network_requests, 1);
    assert_eq!(stats.parses, 1);
    assert_eq!(stats.document_cache_hits, 3);
}

#[test]
fn resolved_fields_do_not_touch_caches() {
    let transport = FixtureTransport::site();
    let enmet = session(&transport);
    let band = enmet.band("138").unwrap();
    band.location().unwrap();
    let before = enmet.stats();
    band.location().unwrap();
    assert_eq!(enmet.stats(), before);
}

#[test]
fn response_cache_survives_sessions() {
    let transport = FixtureTransport::site();
    let backend: Arc<dyn CacheBackend> = Arc::new(MemoryBackend::new());
    let shared = || CacheConfig::new().backend(BackendChoice::Custom(Arc::clone(&backend)));

    let first = session_with_cache(&transport, shared());
    assert_eq!(first.band("138").unwrap().name().unwrap().as_deref(), Some("Megadeth"));
    assert_eq!(transport.calls(), 1);

    let second = session_with_cache(&transport, shared());
    assert_eq!(second.band("138").unwrap().formed_in().unwrap(), Some(1983));
    assert_eq!(transport.calls(), 1, "second session must be served from the response cache");
    assert_eq!(second.stats().response_cache_hits, 1);
    assert_eq!(second.stats().parses, 1);
}

#[cfg(feature = "sqlite")]
#[test]
fn sqlite_cache_persists_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("enmet_data.sqlite");
    let transport = FixtureTransport::site();

    {
        let enmet = session_with_cache(&transport, CacheConfig::sqlite(&path));
        enmet.album("548").unwrap().name().unwrap();
        assert_eq!(enmet.fetcher().response_cache_len().unwrap(), 1);
    }
    assert!(path.exists());

    transport.go_offline();
    let enmet = session_with_cache(&transport, CacheConfig::sqlite(&path));
    assert_eq!(enmet.album("548").unwrap().year().unwrap(), Some(1986));
}

#[test]
fn disabled_cache_refetches_after_document_eviction() {
    let transport = FixtureTransport::site();
    let enmet = session_with_cache(&transport, CacheConfig::disabled());
    enmet.fetcher().document(PageKind::Band, "138").unwrap();
    enmet.fetcher().clear_documents();
    enmet.fetcher().document(PageKind::Band, "138").unwrap();
    assert_eq!(transport.calls(), 2);
}

#[test]
fn errors_are_not_cached() {
    let transport = FixtureTransport::site();
    let enmet = session(&transport);
    let missing = enmet.band("999").unwrap();

    let err = missing.name().unwrap_err();
    assert!(matches!(err, EnmetError::Status { status: 404, .. }));
    assert!(!err.is_transient());
    assert!(missing.name().is_err());
    assert_eq!(transport.calls(), 2, "a failed fetch must be retried on the next read");

    transport.page("bands/_/999", include_str!("fixtures/band_138.html"));
    assert_eq!(missing.name().unwrap().as_deref(), Some("Megadeth"));
}

#[test]
fn transport_failure_leaves_field_unresolved() {
    let transport = FixtureTransport::site();
    let enmet = session(&transport);
    transport.go_offline();
    let err = enmet.band("138").unwrap().country().unwrap_err();
    assert!(err.is_transient());
}

#[test]
fn searches_and_redirects_bypass_caches() {
    let transport = FixtureTransport::site();
    let enmet = session(&transport);
    enmet.random_band().unwrap();
    enmet.random_band().unwrap();
    assert_eq!(transport.calls_to("band/random"), 2);
    assert_eq!(enmet.fetcher().response_cache_len().unwrap(), 0);
}

#[test]
fn expired_entries_are_refetched() {
    let transport = FixtureTransport::site();
    let config = CacheConfig::memory().expire_after(Duration::ZERO);
    let enmet = session_with_cache(&transport, config);
    enmet.fetcher().document(PageKind::Album, "548").unwrap();
    enmet.fetcher().clear_documents();
    std::thread::sleep(Duration::from_millis(5));
    enmet.fetcher().document(PageKind::Album, "548").unwrap();
    assert_eq!(transport.calls(), 2);
}

#[test]
fn replacing_the_cache_takes_effect_immediately() {
    let transport = FixtureTransport::site();
    let enmet = session(&transport);
    enmet.fetcher().document(PageKind::Band, "138").unwrap();
    assert_eq!(enmet.fetcher().response_cache_len().unwrap(), 1);

    enmet.set_cache_config(CacheConfig::memory()).unwrap();
    assert!(matches!(enmet.cache_config().backend, BackendChoice::Memory));
    assert_eq!(enmet.fetcher().response_cache_len().unwrap(), 0);

    // Parsed documents outlive the swap.
    enmet.fetcher().document(PageKind::Band, "138").unwrap();
    assert_eq!(transport.calls(), 1);
}

#[test]
fn refresh_overwrites_both_tiers() {
    let transport = FixtureTransport::site();
    let enmet = session(&transport);
    enmet.fetcher().document(PageKind::Band, "138").unwrap();
    transport.page("bands/_/138", "<h1 class=\"band_name\"><a href=\"#\">Megadeth (new)</a></h1>");
    enmet.fetcher().refresh(PageKind::Band, "138").unwrap();
    assert_eq!(
        enmet.band("138").unwrap().name().unwrap().as_deref(),
        Some("Megadeth (new)")
    );
    assert_eq!(transport.calls(), 2);
}
