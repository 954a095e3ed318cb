//! Small value types returned by entity fields.

use serde::Serialize;

/// Lyrics of a track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Lyrics {
    /// The track is marked instrumental.
    Instrumental,
    Text(String),
}

/// What the tracklist says about a track's lyrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum LyricsStatus {
    /// Lyrics can be fetched from the lyrics page.
    Available,
    Instrumental,
    #[default]
    Unknown,
}

/// Album review summary, e.g. "3 reviews (avg. 91%)".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reviews {
    /// Review page, absent when there are no reviews yet.
    pub url: Option<String>,
    pub summary: String,
}

/// External link listed on an artist page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Link {
    pub url: String,
    pub title: String,
}
