use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::debug;

use super::{Album, AlbumHints, BandHints, LineupArtist, LineupHints};
use crate::fetch::PageKind;
use crate::lazy::Lazy;
use crate::pages::band::{self as page, AlbumRow, LineupTab, SimilarRow};
use crate::pages::{PersonRow, Section, normalize, page_text, url_to_id};
use crate::session::Enmet;
use crate::types::BandStatus;
use crate::Result;

/// A band (or a solo artist performing as one).
#[derive(Debug)]
pub struct Band {
    enmet: Enmet,
    id: String,
    name: Lazy<String>,
    country: Lazy<String>,
    location: Lazy<String>,
    formed_in: Lazy<i32>,
    years_active: Lazy<Vec<String>>,
    genres: Lazy<Vec<String>>,
    status: Lazy<BandStatus>,
    lyrical_themes: Lazy<Vec<String>>,
    label: Lazy<String>,
    lineup: Lazy<Vec<PersonRow>>,
    past_members: Lazy<Vec<PersonRow>>,
    live_musicians: Lazy<Vec<PersonRow>>,
    discography: Lazy<Vec<AlbumRow>>,
    similar_artists: Lazy<Vec<SimilarRow>>,
    info: Lazy<String>,
    last_modified: Lazy<NaiveDateTime>,
}

impl Band {
    pub(crate) fn new(enmet: Enmet, id: String, hints: BandHints) -> Self {
        Self {
            enmet,
            id,
            name: Lazy::hinted(hints.name),
            country: Lazy::hinted(hints.country),
            location: Lazy::new(),
            formed_in: Lazy::new(),
            years_active: Lazy::new(),
            genres: Lazy::hinted_list(hints.genres),
            status: Lazy::new(),
            lyrical_themes: Lazy::new(),
            label: Lazy::new(),
            lineup: Lazy::new(),
            past_members: Lazy::new(),
            live_musicians: Lazy::new(),
            discography: Lazy::new(),
            similar_artists: Lazy::new(),
            info: Lazy::new(),
            last_modified: Lazy::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> Result<Option<String>> {
        self.name
            .get(|| self.enmet.extract(PageKind::Band, &self.id, page::name))
    }

    /// Country of origin, by its display name.
    pub fn country(&self) -> Result<Option<String>> {
        self.country
            .get(|| self.enmet.extract(PageKind::Band, &self.id, page::country))
    }

    pub fn location(&self) -> Result<Option<String>> {
        self.location
            .get(|| self.enmet.extract(PageKind::Band, &self.id, page::location))
    }

    pub fn formed_in(&self) -> Result<Option<i32>> {
        self.formed_in
            .get(|| self.enmet.extract(PageKind::Band, &self.id, page::formed_in))
    }

    pub fn years_active(&self) -> Result<Vec<String>> {
        self.years_active
            .get_list(|| self.enmet.extract(PageKind::Band, &self.id, page::years_active))
    }

    pub fn genres(&self) -> Result<Vec<String>> {
        self.genres
            .get_list(|| self.enmet.extract(PageKind::Band, &self.id, page::genres))
    }

    pub fn status(&self) -> Result<Option<BandStatus>> {
        self.status.get(|| {
            let raw = self.enmet.extract(PageKind::Band, &self.id, page::status)?;
            Ok(raw.and_then(|s| match s.parse() {
                Ok(status) => Some(status),
                Err(e) => {
                    debug!(band = %self.id, error = %e, "unrecognized status");
                    None
                }
            }))
        })
    }

    pub fn lyrical_themes(&self) -> Result<Vec<String>> {
        self.lyrical_themes
            .get_list(|| self.enmet.extract(PageKind::Band, &self.id, page::lyrical_themes))
    }

    /// Current label, or the last one if the band is no longer active.
    pub fn label(&self) -> Result<Option<String>> {
        self.label
            .get(|| self.enmet.extract(PageKind::Band, &self.id, page::label))
    }

    /// Current members.
    pub fn lineup(&self) -> Result<Vec<Arc<LineupArtist>>> {
        self.members(&self.lineup, LineupTab::Current)
    }

    pub fn past_members(&self) -> Result<Vec<Arc<LineupArtist>>> {
        self.members(&self.past_members, LineupTab::Past)
    }

    pub fn live_musicians(&self) -> Result<Vec<Arc<LineupArtist>>> {
        self.members(&self.live_musicians, LineupTab::Live)
    }

    fn members(
        &self,
        field: &Lazy<Vec<PersonRow>>,
        tab: LineupTab,
    ) -> Result<Vec<Arc<LineupArtist>>> {
        let rows = field.get_list(|| {
            self.enmet
                .extract(PageKind::Band, &self.id, |html| page::lineup(html, tab))
        })?;
        rows.into_iter()
            .map(|row| {
                let hints = LineupHints {
                    name_in_lineup: Some(row.name),
                    role: row.role,
                };
                self.enmet
                    .lineup_artist(&url_to_id(&row.url), &self.id, hints)
            })
            .collect()
    }

    /// Every release, in the order the discography tab lists them.
    pub fn discography(&self) -> Result<Vec<Arc<Album>>> {
        let rows = self
            .discography
            .get_list(|| self.enmet.extract(PageKind::Discography, &self.id, page::discography))?;
        rows.into_iter()
            .map(|row| {
                let hints = AlbumHints {
                    name: Some(row.name),
                    year: row.year,
                };
                self.enmet.album_with(&url_to_id(&row.url), hints)
            })
            .collect()
    }

    /// Bands the site recommends as similar to this one.
    pub fn similar_artists(&self) -> Result<Vec<Arc<SimilarBand>>> {
        let rows = self.similar_artists.get_list(|| {
            self.enmet
                .extract(PageKind::Recommendations, &self.id, page::similar_artists)
        })?;
        rows.into_iter()
            .map(|row| {
                let hints = BandHints {
                    name: Some(row.name),
                    country: row.country,
                    genres: Some(row.genres),
                };
                self.enmet
                    .similar_band(&url_to_id(&row.url), &self.id, row.score, hints)
            })
            .collect()
    }

    /// Band comment, from the read-more page when the band page truncates it.
    pub fn info(&self) -> Result<Option<String>> {
        self.info.get(|| {
            match self.enmet.extract(PageKind::Band, &self.id, page::info)? {
                Section::Inline(info) => Ok(Some(info)),
                Section::ReadMore => {
                    let full = self
                        .enmet
                        .extract(PageKind::BandInfo, &self.id, |html| Ok(page_text(html)))?;
                    Ok(normalize(Some(full)))
                }
                Section::Absent => Ok(None),
            }
        })
    }

    /// When the band's page was last edited.
    pub fn last_modified(&self) -> Result<Option<NaiveDateTime>> {
        self.last_modified
            .get(|| self.enmet.extract(PageKind::Band, &self.id, page::last_modified))
    }
}

/// A band recommended as similar to another, with its score.
///
/// Identified by the pair of band ids. Reads of band fields go through
/// [`SimilarBand::band`].
#[derive(Debug)]
pub struct SimilarBand {
    enmet: Enmet,
    band_id: String,
    similar_to_id: String,
    hints: BandHints,
    score: Lazy<u32>,
}

impl SimilarBand {
    pub(crate) fn new(
        enmet: Enmet,
        band_id: String,
        similar_to_id: String,
        score: Option<u32>,
        hints: BandHints,
    ) -> Self {
        Self {
            enmet,
            band_id,
            similar_to_id,
            hints,
            score: Lazy::hinted(score),
        }
    }

    pub fn band_id(&self) -> &str {
        &self.band_id
    }

    pub fn similar_to_id(&self) -> &str {
        &self.similar_to_id
    }

    /// The recommended band.
    pub fn band(&self) -> Result<Arc<Band>> {
        self.enmet.band_with(&self.band_id, self.hints.clone())
    }

    /// The band the recommendation was made for.
    pub fn similar_to(&self) -> Result<Arc<Band>> {
        self.enmet.band(&self.similar_to_id)
    }

    /// Number of user votes for the recommendation.
    pub fn score(&self) -> Result<Option<u32>> {
        self.score.get(|| {
            let rows = self.enmet.extract(
                PageKind::Recommendations,
                &self.similar_to_id,
                page::similar_artists,
            )?;
            Ok(rows
                .into_iter()
                .find(|row| url_to_id(&row.url) == self.band_id)
                .and_then(|row| row.score))
        })
    }
}
