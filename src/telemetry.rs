//! Telemetry metric name constants.
//!
//! Consumers install their own `metrics` recorder (e.g. prometheus,
//! statsd); without a recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `enmet_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `tier`: cache tier: "response" or "document"
//! - `kind`: entity kind (e.g. "band", "album_artist")
//! - `status`: outcome: "ok" or "error"

/// Network requests issued to the catalog site (cache misses and searches).
///
/// Labels: `status` ("ok" | "error").
pub const HTTP_REQUESTS_TOTAL: &str = "enmet_http_requests_total";

/// Network request duration in seconds.
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "enmet_http_request_duration_seconds";

/// Cache hits.
///
/// Labels: `tier`.
pub const CACHE_HITS_TOTAL: &str = "enmet_cache_hits_total";

/// Cache misses.
///
/// Labels: `tier`.
pub const CACHE_MISSES_TOTAL: &str = "enmet_cache_misses_total";

/// Identity registry lookups that returned a live instance.
///
/// Labels: `kind`.
pub const REGISTRY_HITS_TOTAL: &str = "enmet_registry_hits_total";

/// Identity registry lookups that constructed a new instance.
///
/// Labels: `kind`.
pub const REGISTRY_MISSES_TOTAL: &str = "enmet_registry_misses_total";
