//! Closed value sets used on band and album pages.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::EnmetError;

/// Kind of release, as labelled on album pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ReleaseType {
    FullLength,
    LiveAlbum,
    Demo,
    Single,
    Ep,
    Video,
    BoxedSet,
    Split,
    Compilation,
    SplitVideo,
    Collaboration,
}

impl ReleaseType {
    pub const ALL: [ReleaseType; 11] = [
        Self::FullLength,
        Self::LiveAlbum,
        Self::Demo,
        Self::Single,
        Self::Ep,
        Self::Video,
        Self::BoxedSet,
        Self::Split,
        Self::Compilation,
        Self::SplitVideo,
        Self::Collaboration,
    ];

    /// Label used on the site.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullLength => "Full-length",
            Self::LiveAlbum => "Live album",
            Self::Demo => "Demo",
            Self::Single => "Single",
            Self::Ep => "EP",
            Self::Video => "Video",
            Self::BoxedSet => "Boxed set",
            Self::Split => "Split",
            Self::Compilation => "Compilation",
            Self::SplitVideo => "Split video",
            Self::Collaboration => "Collaboration",
        }
    }

    /// Numeric id used by the album search form.
    pub fn search_id(&self) -> u8 {
        match self {
            Self::FullLength => 1,
            Self::LiveAlbum => 2,
            Self::Demo => 3,
            Self::Single => 4,
            Self::Ep => 5,
            Self::Video => 6,
            Self::BoxedSet => 7,
            Self::Split => 8,
            Self::Compilation => 10,
            Self::SplitVideo => 12,
            Self::Collaboration => 13,
        }
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReleaseType {
    type Err = EnmetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| EnmetError::Parse(format!("unknown release type: {s}")))
    }
}

/// Band activity status.
///
/// The site's "Unknown" status is a placeholder and maps to no status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BandStatus {
    Active,
    OnHold,
    SplitUp,
    ChangedName,
    Disputed,
}

impl BandStatus {
    pub const ALL: [BandStatus; 5] = [
        Self::Active,
        Self::OnHold,
        Self::SplitUp,
        Self::ChangedName,
        Self::Disputed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::OnHold => "On hold",
            Self::SplitUp => "Split-up",
            Self::ChangedName => "Changed name",
            Self::Disputed => "Disputed",
        }
    }
}

impl fmt::Display for BandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BandStatus {
    type Err = EnmetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| EnmetError::Parse(format!("unknown band status: {s}")))
    }
}
