//! Error classification and propagation.

mod common;

use common::{FixtureTransport, session};
use enmet::{EnmetError, HttpResponse};

#[test]
fn error_display() {
    let err = EnmetError::Status {
        status: 404,
        url: "https://ma.test/bands/_/1".into(),
    };
    assert_eq!(err.to_string(), "HTTP 404 from https://ma.test/bands/_/1");

    let err = EnmetError::InvalidDate("Smarch 1986".into());
    assert_eq!(err.to_string(), "invalid date: Smarch 1986");

    assert_eq!(
        EnmetError::InvalidId("band id \"x\"".into()).to_string(),
        "invalid band id \"x\""
    );
}

#[test]
fn transient_errors() {
    assert!(EnmetError::Http("reset".into()).is_transient());
    for status in [429, 500, 503] {
        let err = EnmetError::Status { status, url: String::new() };
        assert!(err.is_transient(), "{status} should be transient");
    }
    for status in [403, 404] {
        let err = EnmetError::Status { status, url: String::new() };
        assert!(!err.is_transient(), "{status} should not be transient");
    }
    assert!(!EnmetError::Parse("bad".into()).is_transient());
    assert!(!EnmetError::InvalidId("".into()).is_transient());
}

#[test]
fn status_errors_carry_the_url() {
    let response = HttpResponse {
        url: "https://ma.test/albums/_/_/1".into(),
        status: 503,
        headers: Vec::new(),
        body: String::new(),
    };
    match response.error_for_status() {
        Err(EnmetError::Status { status, url }) => {
            assert_eq!(status, 503);
            assert!(url.ends_with("/1"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[test]
fn invalid_ids_fail_before_any_request() {
    let transport = FixtureTransport::site();
    let enmet = session(&transport);
    for id in ["", "  ", "12a", "1.5", "-7"] {
        assert!(
            matches!(enmet.artist(id), Err(EnmetError::InvalidId(_))),
            "{id:?} should be rejected"
        );
    }
    assert_eq!(transport.calls(), 0);
}

#[test]
fn missing_pages_surface_as_status_errors() {
    let transport = FixtureTransport::site();
    let enmet = session(&transport);
    let album = enmet.album("1").unwrap();
    match album.name() {
        Err(EnmetError::Status { status: 404, url }) => assert!(url.ends_with("albums/_/_/1")),
        other => panic!("expected 404, got {other:?}"),
    }
}

#[test]
fn transport_errors_propagate_through_entities() {
    let transport = FixtureTransport::site();
    let enmet = session(&transport);
    transport.go_offline();
    let err = enmet.artist("184").unwrap().name().unwrap_err();
    assert!(matches!(err, EnmetError::Http(_)));
    assert!(err.is_transient());
}

#[test]
fn malformed_search_response_is_a_json_error() {
    let transport = FixtureTransport::new();
    transport.page("search/ajax-advanced/searching/bands", "<html>maintenance</html>");
    let enmet = session(&transport);
    let err = enmet
        .search_bands(&enmet::search::BandQuery::new().name("x"))
        .unwrap_err();
    assert!(matches!(err, EnmetError::Json(_)));
}
