use std::sync::Arc;

use super::{
    Album, AlbumArtistHints, AlbumHints, Band, BandHints, ExternalEntity, LineupHints,
};
use crate::fetch::PageKind;
use crate::lazy::Lazy;
use crate::pages::artist::{self as page, BandTab, Extended, MembershipRow};
use crate::pages::{PersonRow, Section, album, band, normalize, page_text, url_to_id};
use crate::session::Enmet;
use crate::types::Link;
use crate::Result;

/// A musician or other person with a catalog page.
#[derive(Debug)]
pub struct Artist {
    enmet: Enmet,
    id: String,
    name: Lazy<String>,
    real_full_name: Lazy<String>,
    age: Lazy<String>,
    place_of_birth: Lazy<String>,
    gender: Lazy<String>,
    biography: Lazy<String>,
    trivia: Lazy<String>,
    active_bands: Lazy<Vec<MembershipRow>>,
    past_bands: Lazy<Vec<MembershipRow>>,
    guest_session: Lazy<Vec<MembershipRow>>,
    misc_staff: Lazy<Vec<MembershipRow>>,
    links: Lazy<Vec<Link>>,
}

/// The band side of a membership: a catalog band or an external project.
#[derive(Debug, Clone)]
pub enum BandRef {
    Band(Arc<Band>),
    External(ExternalEntity),
}

impl BandRef {
    pub fn name(&self) -> Result<Option<String>> {
        match self {
            Self::Band(band) => band.name(),
            Self::External(external) => Ok(Some(external.name.clone())),
        }
    }
}

/// An album an artist is credited on within one membership.
#[derive(Debug, Clone)]
pub struct AlbumCredit {
    pub album: Arc<Album>,
    pub role: Option<String>,
    pub name_on_album: String,
}

/// One entry of an artist's band history.
#[derive(Debug, Clone)]
pub struct Membership {
    pub band: BandRef,
    pub role: Option<String>,
    pub name_in_lineup: String,
    pub albums: Vec<AlbumCredit>,
}

impl Artist {
    pub(crate) fn new(enmet: Enmet, id: String) -> Self {
        Self {
            enmet,
            id,
            name: Lazy::new(),
            real_full_name: Lazy::new(),
            age: Lazy::new(),
            place_of_birth: Lazy::new(),
            gender: Lazy::new(),
            biography: Lazy::new(),
            trivia: Lazy::new(),
            active_bands: Lazy::new(),
            past_bands: Lazy::new(),
            guest_session: Lazy::new(),
            misc_staff: Lazy::new(),
            links: Lazy::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> Result<Option<String>> {
        self.name
            .get(|| self.enmet.extract(PageKind::Artist, &self.id, page::name))
    }

    pub fn real_full_name(&self) -> Result<Option<String>> {
        self.real_full_name
            .get(|| self.enmet.extract(PageKind::Artist, &self.id, page::real_full_name))
    }

    /// Age as displayed, e.g. "54 (born Dec 12th, 1969)".
    pub fn age(&self) -> Result<Option<String>> {
        self.age
            .get(|| self.enmet.extract(PageKind::Artist, &self.id, page::age))
    }

    pub fn place_of_birth(&self) -> Result<Option<String>> {
        self.place_of_birth
            .get(|| self.enmet.extract(PageKind::Artist, &self.id, page::place_of_birth))
    }

    pub fn gender(&self) -> Result<Option<String>> {
        self.gender
            .get(|| self.enmet.extract(PageKind::Artist, &self.id, page::gender))
    }

    pub fn biography(&self) -> Result<Option<String>> {
        self.extended(&self.biography, Extended::Biography, PageKind::ArtistBiography)
    }

    pub fn trivia(&self) -> Result<Option<String>> {
        self.extended(&self.trivia, Extended::Trivia, PageKind::ArtistTrivia)
    }

    fn extended(&self, field: &Lazy<String>, which: Extended, full: PageKind) -> Result<Option<String>> {
        field.get(|| {
            match self
                .enmet
                .extract(PageKind::Artist, &self.id, |html| page::extended(html, which))?
            {
                Section::Inline(text) => Ok(Some(text)),
                Section::ReadMore => {
                    let text = self.enmet.extract(full, &self.id, |html| Ok(page_text(html)))?;
                    Ok(normalize(Some(text)))
                }
                Section::Absent => Ok(None),
            }
        })
    }

    pub fn active_bands(&self) -> Result<Vec<Membership>> {
        self.memberships(&self.active_bands, BandTab::Active)
    }

    pub fn past_bands(&self) -> Result<Vec<Membership>> {
        self.memberships(&self.past_bands, BandTab::Past)
    }

    pub fn guest_session(&self) -> Result<Vec<Membership>> {
        self.memberships(&self.guest_session, BandTab::Guest)
    }

    pub fn misc_staff(&self) -> Result<Vec<Membership>> {
        self.memberships(&self.misc_staff, BandTab::Misc)
    }

    fn memberships(&self, field: &Lazy<Vec<MembershipRow>>, tab: BandTab) -> Result<Vec<Membership>> {
        let rows = field.get_list(|| {
            self.enmet
                .extract(PageKind::Artist, &self.id, |html| page::band_tab(html, tab))
        })?;
        rows.into_iter().map(|row| self.membership(row)).collect()
    }

    fn membership(&self, row: MembershipRow) -> Result<Membership> {
        let band = match &row.band_url {
            Some(url) => BandRef::Band(
                self.enmet
                    .band_with(&url_to_id(url), BandHints::named(row.band_name.clone()))?,
            ),
            None => BandRef::External(ExternalEntity::new(row.band_name.clone(), row.role.clone())),
        };
        let albums = row
            .albums
            .into_iter()
            .map(|credit| {
                let album = self
                    .enmet
                    .album_with(&url_to_id(&credit.url), AlbumHints::named(credit.name))?;
                Ok(AlbumCredit {
                    album,
                    role: credit.role,
                    name_on_album: credit.name_on_album,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Membership {
            band,
            role: row.role,
            name_in_lineup: row.name_in_lineup,
            albums,
        })
    }

    /// Official and unofficial links from the artist's links tab.
    pub fn links(&self) -> Result<Vec<Link>> {
        self.links.get_list(|| {
            let links = self.enmet.extract(PageKind::ArtistLinks, &self.id, page::links)?;
            Ok(links
                .into_iter()
                .map(|(url, title)| Link { url, title })
                .collect())
        })
    }
}

/// An artist as a member of one band.
///
/// Identified by the artist and band ids. Artist fields are read through
/// [`LineupArtist::artist`].
#[derive(Debug)]
pub struct LineupArtist {
    enmet: Enmet,
    artist_id: String,
    band_id: String,
    name_in_lineup: Lazy<String>,
    role: Lazy<String>,
}

impl LineupArtist {
    pub(crate) fn new(enmet: Enmet, artist_id: String, band_id: String, hints: LineupHints) -> Self {
        Self {
            enmet,
            artist_id,
            band_id,
            name_in_lineup: Lazy::hinted(hints.name_in_lineup),
            role: Lazy::hinted(hints.role),
        }
    }

    pub fn artist_id(&self) -> &str {
        &self.artist_id
    }

    pub fn band_id(&self) -> &str {
        &self.band_id
    }

    pub fn artist(&self) -> Result<Arc<Artist>> {
        self.enmet.artist(&self.artist_id)
    }

    pub fn band(&self) -> Result<Arc<Band>> {
        self.enmet.band(&self.band_id)
    }

    /// Name the artist goes by in this band.
    pub fn name_in_lineup(&self) -> Result<Option<String>> {
        self.name_in_lineup
            .get(|| Ok(self.row()?.map(|row| row.name)))
    }

    pub fn role(&self) -> Result<Option<String>> {
        self.role.get(|| Ok(self.row()?.and_then(|row| row.role)))
    }

    fn row(&self) -> Result<Option<PersonRow>> {
        self.enmet.extract(PageKind::Band, &self.band_id, |html| {
            for tab in band::LineupTab::ALL {
                let found = band::lineup(html, tab)?
                    .into_iter()
                    .find(|row| url_to_id(&row.url) == self.artist_id);
                if found.is_some() {
                    return Ok(found);
                }
            }
            Ok(None)
        })
    }
}

/// An artist as credited on one album.
#[derive(Debug)]
pub struct AlbumArtist {
    enmet: Enmet,
    artist_id: String,
    album_id: String,
    name_on_album: Lazy<String>,
    role: Lazy<String>,
}

impl AlbumArtist {
    pub(crate) fn new(
        enmet: Enmet,
        artist_id: String,
        album_id: String,
        hints: AlbumArtistHints,
    ) -> Self {
        Self {
            enmet,
            artist_id,
            album_id,
            name_on_album: Lazy::hinted(hints.name_on_album),
            role: Lazy::hinted(hints.role),
        }
    }

    pub fn artist_id(&self) -> &str {
        &self.artist_id
    }

    pub fn album_id(&self) -> &str {
        &self.album_id
    }

    pub fn artist(&self) -> Result<Arc<Artist>> {
        self.enmet.artist(&self.artist_id)
    }

    pub fn album(&self) -> Result<Arc<Album>> {
        self.enmet.album(&self.album_id)
    }

    pub fn name_on_album(&self) -> Result<Option<String>> {
        self.name_on_album
            .get(|| Ok(self.row()?.map(|row| row.name)))
    }

    pub fn role(&self) -> Result<Option<String>> {
        self.role.get(|| Ok(self.row()?.and_then(|row| row.role)))
    }

    fn row(&self) -> Result<Option<PersonRow>> {
        self.enmet.extract(PageKind::Album, &self.album_id, |html| {
            for tab in album::PeopleTab::ALL {
                let found = album::people(html, tab)?
                    .into_iter()
                    .find(|row| url_to_id(&row.url) == self.artist_id);
                if found.is_some() {
                    return Ok(found);
                }
            }
            Ok(None)
        })
    }
}
