//! Advanced search and the country catalog.

mod common;

use std::sync::Arc;

use common::{FixtureTransport, session};
use enmet::search::{AlbumQuery, BandQuery};
use enmet::{EnmetError, ReleaseType};

fn param<'a>(query: &'a [(String, String)], key: &str) -> Option<&'a str> {
    query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

// ============================================================================
// Bands
// ============================================================================

#[test]
fn band_results_are_hinted() {
    let transport = FixtureTransport::site();
    let enmet = session(&transport);
    let bands = enmet
        .search_bands(&BandQuery::new().name("megadeth"))
        .unwrap();
    assert_eq!(bands.len(), 2);
    assert_eq!(transport.calls(), 1);

    assert_eq!(bands[0].id(), "138");
    assert_eq!(bands[1].name().unwrap().as_deref(), Some("Megadeath"));
    assert_eq!(bands[1].country().unwrap().as_deref(), Some("Poland"));
    assert_eq!(bands[1].genres().unwrap(), ["Death Metal"]);
    assert_eq!(transport.calls(), 1, "hinted fields must not fetch");

    // Unhinted fields still come from the band page.
    assert_eq!(bands[0].formed_in().unwrap(), Some(1983));
    assert_eq!(transport.calls_to("bands/_/138"), 1);
}

#[test]
fn band_results_share_identity_with_direct_lookups() {
    let transport = FixtureTransport::site();
    let enmet = session(&transport);
    let direct = enmet.band("138").unwrap();
    let found = enmet
        .search_bands(&BandQuery::new().name("megadeth").strict(true))
        .unwrap();
    assert!(Arc::ptr_eq(&direct, &found[0]));
}

#[test]
fn band_query_parameters() {
    let transport = FixtureTransport::site();
    let enmet = session(&transport);
    enmet
        .search_bands(
            &BandQuery::new()
                .name("megadeth")
                .strict(true)
                .genre("thrash")
                .formed_from(1980)
                .formed_to(1985),
        )
        .unwrap();

    let query = transport.last_query();
    assert_eq!(param(&query, "bandName"), Some("megadeth"));
    assert_eq!(param(&query, "exactBandMatch"), Some("1"));
    assert_eq!(param(&query, "genre"), Some("thrash"));
    assert_eq!(param(&query, "yearCreationFrom"), Some("1980"));
    assert_eq!(param(&query, "yearCreationTo"), Some("1985"));
    assert_eq!(param(&query, "iDisplayStart"), Some("0"));
}

#[test]
fn single_country_filter_sets_country_hint() {
    let transport = FixtureTransport::site();
    let enmet = session(&transport);
    let bands = enmet
        .search_bands(&BandQuery::new().name("megadeth").country("US"))
        .unwrap();
    assert_eq!(transport.calls_to("search/advanced/"), 1);
    // The third column holds a location under a country filter; the hint
    // comes from the catalog instead.
    assert_eq!(bands[1].country().unwrap().as_deref(), Some("United States"));
}

#[test]
fn empty_query_makes_no_request() {
    let transport = FixtureTransport::site();
    let enmet = session(&transport);
    assert!(enmet.search_bands(&BandQuery::new()).unwrap().is_empty());
    assert!(enmet.search_albums(&AlbumQuery::new()).unwrap().is_empty());
    assert_eq!(transport.calls(), 0);
}

#[test]
fn searches_are_never_cached() {
    let transport = FixtureTransport::site();
    let enmet = session(&transport);
    let query = BandQuery::new().name("megadeth");
    enmet.search_bands(&query).unwrap();
    enmet.search_bands(&query).unwrap();
    assert_eq!(transport.calls_to("search/ajax-advanced/searching/bands"), 2);
}

#[test]
fn search_failure_is_reported() {
    let transport = FixtureTransport::new();
    let enmet = session(&transport);
    let err = enmet
        .search_bands(&BandQuery::new().name("megadeth"))
        .unwrap_err();
    assert!(matches!(err, EnmetError::Status { status: 404, .. }));
}

// ============================================================================
// Albums
// ============================================================================

#[test]
fn album_results_carry_name_and_year() {
    let transport = FixtureTransport::site();
    let enmet = session(&transport);
    let albums = enmet
        .search_albums(
            &AlbumQuery::new()
                .name("peace sells")
                .band("megadeth")
                .release_type(ReleaseType::FullLength),
        )
        .unwrap();
    assert_eq!(albums.len(), 1);
    assert_eq!(albums[0].id(), "548");
    assert_eq!(albums[0].year().unwrap(), Some(1986));
    assert_eq!(
        albums[0].name().unwrap().as_deref(),
        Some("Peace Sells... but Who's Buying?")
    );
    assert_eq!(transport.calls(), 1);

    let query = transport.last_query();
    assert_eq!(param(&query, "releaseTitle"), Some("peace sells"));
    assert_eq!(param(&query, "bandName"), Some("megadeth"));
    assert_eq!(param(&query, "releaseType[]"), Some("1"));
    assert_eq!(param(&query, "releaseYearFrom"), Some("1900"));
}

// ============================================================================
// Countries
// ============================================================================

#[test]
fn countries_load_once() {
    let transport = FixtureTransport::site();
    let enmet = session(&transport);
    assert_eq!(enmet.countries().unwrap().len(), 3);
    assert_eq!(
        enmet.country_by_code("pl").unwrap().map(|c| c.name).as_deref(),
        Some("Poland")
    );
    assert_eq!(
        enmet.country_by_name("Norway").unwrap().map(|c| c.code).as_deref(),
        Some("NO")
    );
    assert!(enmet.country_by_code("XX").unwrap().is_none());
    assert_eq!(transport.calls_to("search/advanced/"), 1);

    enmet.refresh_countries().unwrap();
    assert_eq!(transport.calls_to("search/advanced/"), 2);
}
