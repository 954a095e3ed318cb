//! Enmet - typed, lazy access to the Encyclopaedia Metallum catalog
//!
//! This crate exposes bands, albums, artists and tracks as typed objects.
//! Fields are fetched on first read and then kept on the object; each
//! catalog entity has at most one live instance per session, so objects
//! reached by different paths compare identical by pointer.
//!
//! Pages go through two caches: a bounded in-memory cache of parsed
//! documents and a durable response cache (sqlite by default), so a page
//! is requested from the site at most once.
//!
//! # Example
//!
//! ```rust,no_run
//! use enmet::{Enmet, search::BandQuery};
//!
//! fn main() -> enmet::Result<()> {
//!     let enmet = Enmet::new()?;
//!
//!     let bands = enmet.search_bands(&BandQuery::new().name("megadeth").strict(true))?;
//!     let band = &bands[0];
//!     println!("{:?} from {:?}", band.name()?, band.country()?);
//!
//!     for album in band.discography()? {
//!         for disc in album.discs()? {
//!             for track in disc.tracks()? {
//!                 println!("{:>2}. {}", track.number(), track.name());
//!             }
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Cache configuration
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use enmet::{CacheConfig, Enmet};
//!
//! # fn main() -> enmet::Result<()> {
//! let enmet = Enmet::builder()
//!     .query_rate(1.0)
//!     .response_cache(CacheConfig::memory().expire_after(Duration::from_secs(3600)))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod catalog;
#[cfg(feature = "cli")]
pub mod config;
pub mod entities;
pub mod error;
pub mod fetch;
pub mod lazy;
pub mod pages;
pub mod registry;
pub mod search;
pub mod session;
pub mod telemetry;
pub mod transport;
pub mod types;

/// Package version from Cargo.toml.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-export main types at crate root
pub use cache::{BackendChoice, CacheConfig, Expiration};
pub use catalog::Country;
pub use entities::{
    Album, AlbumArtist, AlbumArtistHints, AlbumCredit, AlbumHints, Artist, Band, BandHints,
    BandRef, Disc, ExternalEntity, LineupArtist, LineupHints, Membership, SimilarBand, Track,
    TrackInit,
};
pub use error::{EnmetError, Result};
pub use fetch::{FetchStats, PageFetcher, PageKind};
pub use session::{Enmet, EnmetBuilder};
pub use transport::{HttpResponse, HttpTransport, Transport};

// Re-export all types
pub use types::{BandStatus, Link, Lyrics, LyricsStatus, PartialDate, ReleaseType, Reviews};
