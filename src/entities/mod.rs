//! Typed entity façade.
//!
//! Entities come in three flavours:
//!
//! - identified ([`Band`], [`Album`], [`Artist`], [`Track`]): keyed by the
//!   site's own id;
//! - contextual ([`Disc`], [`LineupArtist`], [`AlbumArtist`],
//!   [`SimilarBand`]): keyed by a parent id plus a discriminator;
//! - external ([`ExternalEntity`]): plain values for things the site has
//!   no page for.
//!
//! Identified and contextual entities are only ever created through
//! [`Enmet`](crate::Enmet), which deduplicates them in the registry. Every
//! field besides the identity is a [`Lazy`](crate::lazy::Lazy) slot.
//!
//! Relational fields store the ids and inline hints of what they point to
//! and hand out registry instances on every read. Entities therefore never
//! own each other, and a band and its albums can reference one another
//! without keeping each other alive.

mod album;
mod artist;
mod band;
mod track;

use std::time::Duration;

use serde::Serialize;

use crate::types::LyricsStatus;
use crate::{EnmetError, Result};

pub use album::{Album, Disc};
pub use artist::{AlbumArtist, AlbumCredit, Artist, BandRef, LineupArtist, Membership};
pub use band::{Band, SimilarBand};
pub use track::Track;

/// Check that `id` looks like a catalog id: ASCII digits only.
pub(crate) fn validate_id(kind: &str, id: &str) -> Result<String> {
    let id = id.trim();
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EnmetError::InvalidId(format!("{kind} id {id:?}")));
    }
    Ok(id.to_string())
}

/// Known band fields, e.g. from a search result row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BandHints {
    pub name: Option<String>,
    pub country: Option<String>,
    pub genres: Option<Vec<String>>,
}

impl BandHints {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Known album fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlbumHints {
    pub name: Option<String>,
    pub year: Option<i32>,
}

impl AlbumHints {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// How an artist appears in one band's lineup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineupHints {
    pub name_in_lineup: Option<String>,
    pub role: Option<String>,
}

/// How an artist is credited on one album.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlbumArtistHints {
    pub name_on_album: Option<String>,
    pub role: Option<String>,
}

/// A band credited on an album, as listed on the album page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandLink {
    pub id: String,
    pub name: String,
}

/// Tracklist data a [`Track`] is constructed from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackInit {
    /// 1-based position on its disc.
    pub number: u32,
    /// Title as listed, possibly prefixed with the band name on splits.
    pub title: String,
    pub time: Option<Duration>,
    pub lyrics: LyricsStatus,
    /// Bands of the album the track is on.
    pub bands: Vec<BandLink>,
}

/// Something without a catalog page, such as a non-metal project in an
/// artist's history. Equal when both name and role are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ExternalEntity {
    pub name: String,
    pub role: Option<String>,
}

impl ExternalEntity {
    pub fn new(name: impl Into<String>, role: Option<String>) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }
}

impl std::fmt::Display for ExternalEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
