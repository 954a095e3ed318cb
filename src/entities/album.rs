use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::{AlbumArtist, AlbumArtistHints, AlbumHints, Band, BandHints, BandLink, Track, TrackInit};
use crate::fetch::PageKind;
use crate::lazy::Lazy;
use crate::pages::album::{self as page, PeopleTab};
use crate::pages::{PersonRow, disc_name, parse_duration, url_to_id};
use crate::session::Enmet;
use crate::types::{PartialDate, ReleaseType, Reviews};
use crate::Result;

/// A release: full-length, EP, demo, split and so on.
#[derive(Debug)]
pub struct Album {
    enmet: Enmet,
    id: String,
    name: Lazy<String>,
    bands: Lazy<Vec<(String, String)>>,
    release_type: Lazy<ReleaseType>,
    year: Lazy<i32>,
    release_date: Lazy<PartialDate>,
    label: Lazy<String>,
    format: Lazy<String>,
    reviews: Lazy<Reviews>,
    catalog_id: Lazy<String>,
    disc_count: Lazy<usize>,
    lineup: Lazy<Vec<PersonRow>>,
    guest_session_musicians: Lazy<Vec<PersonRow>>,
    other_staff: Lazy<Vec<PersonRow>>,
    total_time: Lazy<Duration>,
    additional_notes: Lazy<String>,
}

impl Album {
    pub(crate) fn new(enmet: Enmet, id: String, hints: AlbumHints) -> Self {
        Self {
            enmet,
            id,
            name: Lazy::hinted(hints.name),
            bands: Lazy::new(),
            release_type: Lazy::new(),
            year: Lazy::hinted(hints.year),
            release_date: Lazy::new(),
            label: Lazy::new(),
            format: Lazy::new(),
            reviews: Lazy::new(),
            catalog_id: Lazy::new(),
            disc_count: Lazy::new(),
            lineup: Lazy::new(),
            guest_session_musicians: Lazy::new(),
            other_staff: Lazy::new(),
            total_time: Lazy::new(),
            additional_notes: Lazy::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> Result<Option<String>> {
        self.name
            .get(|| self.enmet.extract(PageKind::Album, &self.id, page::name))
    }

    /// Credited bands; more than one for splits and collaborations.
    pub fn bands(&self) -> Result<Vec<Arc<Band>>> {
        let bands = self
            .bands
            .get_list(|| self.enmet.extract(PageKind::Album, &self.id, page::bands))?;
        bands
            .into_iter()
            .map(|(url, name)| self.enmet.band_with(&url_to_id(&url), BandHints::named(name)))
            .collect()
    }

    pub fn release_type(&self) -> Result<Option<ReleaseType>> {
        self.release_type.get(|| {
            let raw = self
                .enmet
                .extract(PageKind::Album, &self.id, page::release_type)?;
            Ok(raw.and_then(|s| match s.parse() {
                Ok(t) => Some(t),
                Err(e) => {
                    debug!(album = %self.id, error = %e, "unrecognized release type");
                    None
                }
            }))
        })
    }

    /// Release year: the hint if one was given, else from the release date.
    pub fn year(&self) -> Result<Option<i32>> {
        self.year
            .get(|| Ok(self.release_date()?.map(|date| date.year())))
    }

    pub fn release_date(&self) -> Result<Option<PartialDate>> {
        self.release_date.get(|| {
            let raw = self
                .enmet
                .extract(PageKind::Album, &self.id, page::release_date)?;
            Ok(raw.and_then(|s| match s.parse() {
                Ok(date) => Some(date),
                Err(e) => {
                    debug!(album = %self.id, error = %e, "unparsable release date");
                    None
                }
            }))
        })
    }

    pub fn label(&self) -> Result<Option<String>> {
        self.label
            .get(|| self.enmet.extract(PageKind::Album, &self.id, page::label))
    }

    pub fn format(&self) -> Result<Option<String>> {
        self.format
            .get(|| self.enmet.extract(PageKind::Album, &self.id, page::format))
    }

    pub fn reviews(&self) -> Result<Option<Reviews>> {
        self.reviews.get(|| {
            let raw = self.enmet.extract(PageKind::Album, &self.id, page::reviews)?;
            Ok(raw.map(|(url, summary)| Reviews { url, summary }))
        })
    }

    pub fn catalog_id(&self) -> Result<Option<String>> {
        self.catalog_id
            .get(|| self.enmet.extract(PageKind::Album, &self.id, page::catalog_id))
    }

    /// Discs, at least one.
    pub fn discs(&self) -> Result<Vec<Arc<Disc>>> {
        let count = self
            .disc_count
            .get(|| {
                let headers = self
                    .enmet
                    .extract(PageKind::Album, &self.id, page::disc_headers)?;
                Ok(Some(headers.len()))
            })?
            .unwrap_or(1);
        (0..count).map(|index| self.enmet.disc(&self.id, index)).collect()
    }

    pub fn lineup(&self) -> Result<Vec<Arc<AlbumArtist>>> {
        self.people(&self.lineup, PeopleTab::Lineup)
    }

    pub fn guest_session_musicians(&self) -> Result<Vec<Arc<AlbumArtist>>> {
        self.people(&self.guest_session_musicians, PeopleTab::Guests)
    }

    pub fn other_staff(&self) -> Result<Vec<Arc<AlbumArtist>>> {
        self.people(&self.other_staff, PeopleTab::Staff)
    }

    fn people(&self, field: &Lazy<Vec<PersonRow>>, tab: PeopleTab) -> Result<Vec<Arc<AlbumArtist>>> {
        let rows = field.get_list(|| {
            self.enmet
                .extract(PageKind::Album, &self.id, |html| page::people(html, tab))
        })?;
        rows.into_iter()
            .map(|row| {
                let hints = AlbumArtistHints {
                    name_on_album: Some(row.name),
                    role: row.role,
                };
                self.enmet.album_artist(&url_to_id(&row.url), &self.id, hints)
            })
            .collect()
    }

    /// Sum of the disc running times.
    pub fn total_time(&self) -> Result<Option<Duration>> {
        self.total_time.get(|| {
            let mut total = Duration::ZERO;
            for disc in self.discs()? {
                total += disc.total_time()?.unwrap_or_default();
            }
            Ok((!total.is_zero()).then_some(total))
        })
    }

    pub fn additional_notes(&self) -> Result<Option<String>> {
        self.additional_notes
            .get(|| self.enmet.extract(PageKind::Album, &self.id, page::additional_notes))
    }
}

/// One disc of an album, identified by album id and position.
#[derive(Debug)]
pub struct Disc {
    enmet: Enmet,
    album_id: String,
    index: usize,
    name: Lazy<String>,
    total_time: Lazy<Duration>,
    tracks: Lazy<Vec<(String, TrackInit)>>,
}

impl Disc {
    pub(crate) fn new(enmet: Enmet, album_id: String, index: usize) -> Self {
        Self {
            enmet,
            album_id,
            index,
            name: Lazy::new(),
            total_time: Lazy::new(),
            tracks: Lazy::new(),
        }
    }

    pub fn album_id(&self) -> &str {
        &self.album_id
    }

    pub fn album(&self) -> Result<Arc<Album>> {
        self.enmet.album(&self.album_id)
    }

    /// 1-based disc number.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    /// Disc title from a "Disc 2 - Title" header, if it has one.
    pub fn name(&self) -> Result<Option<String>> {
        self.name.get(|| {
            let headers = self
                .enmet
                .extract(PageKind::Album, &self.album_id, page::disc_headers)?;
            Ok(headers
                .get(self.index)
                .cloned()
                .flatten()
                .and_then(|header| disc_name(&header)))
        })
    }

    pub fn total_time(&self) -> Result<Option<Duration>> {
        self.total_time.get(|| {
            let totals = self
                .enmet
                .extract(PageKind::Album, &self.album_id, page::total_times)?;
            Ok(totals.get(self.index).and_then(|t| parse_duration(t)))
        })
    }

    /// Tracks in running order, numbered from 1.
    pub fn tracks(&self) -> Result<Vec<Arc<Track>>> {
        let tracks = self.tracks.get_list(|| {
            self.enmet.extract(PageKind::Album, &self.album_id, |html| {
                let bands: Vec<BandLink> = page::bands(html)?
                    .into_iter()
                    .map(|(url, name)| BandLink {
                        id: url_to_id(&url),
                        name,
                    })
                    .collect();
                let mut discs = page::tracks(html)?;
                if self.index >= discs.len() {
                    return Ok(Vec::new());
                }
                Ok(discs
                    .swap_remove(self.index)
                    .into_iter()
                    .map(|row| {
                        let init = TrackInit {
                            number: row.number,
                            title: row.title,
                            time: row.time.as_deref().and_then(parse_duration),
                            lyrics: row.lyrics,
                            bands: bands.clone(),
                        };
                        (row.id, init)
                    })
                    .collect())
            })
        })?;
        tracks
            .into_iter()
            .map(|(id, init)| self.enmet.track(&id, init))
            .collect()
    }
}
