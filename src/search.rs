//! Advanced search over bands and albums.
//!
//! Searches always hit the site; results are never cached. Each row becomes
//! a registry entity pre-filled with what the row shows.

use std::sync::Arc;

use scraper::Html;
use tracing::{debug, info};

use crate::entities::{Album, AlbumHints, Band, BandHints};
use crate::pages::{link, split_by_sep, url_to_id};
use crate::session::Enmet;
use crate::types::{PartialDate, ReleaseType};
use crate::Result;

const BAND_SEARCH: &str = "search/ajax-advanced/searching/bands";
const ALBUM_SEARCH: &str = "search/ajax-advanced/searching/albums/";

/// Album years are always sent so that result rows carry a release date.
const EARLIEST_YEAR: i32 = 1900;
const LATEST_YEAR: i32 = 2999;

/// Band search criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BandQuery {
    name: Option<String>,
    strict: bool,
    genre: Option<String>,
    countries: Vec<String>,
    formed_from: Option<i32>,
    formed_to: Option<i32>,
}

impl BandQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Match the name exactly instead of by substring.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    /// Restrict to a country, by ISO code. May be given several times.
    pub fn country(mut self, code: impl Into<String>) -> Self {
        self.countries.push(code.into());
        self
    }

    pub fn formed_from(mut self, year: i32) -> Self {
        self.formed_from = Some(year);
        self
    }

    pub fn formed_to(mut self, year: i32) -> Self {
        self.formed_to = Some(year);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        push(&mut params, "bandName", self.name.as_deref());
        if self.strict {
            params.push(("exactBandMatch".to_string(), "1".to_string()));
        }
        push(&mut params, "genre", self.genre.as_deref());
        for code in &self.countries {
            params.push(("country[]".to_string(), code.clone()));
        }
        push(&mut params, "yearCreationFrom", self.formed_from.map(|y| y.to_string()).as_deref());
        push(&mut params, "yearCreationTo", self.formed_to.map(|y| y.to_string()).as_deref());
        params
    }
}

/// Album search criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlbumQuery {
    name: Option<String>,
    strict: bool,
    band: Option<String>,
    band_strict: bool,
    year_from: Option<i32>,
    month_from: Option<u32>,
    year_to: Option<i32>,
    month_to: Option<u32>,
    genre: Option<String>,
    release_types: Vec<ReleaseType>,
}

impl AlbumQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn band(mut self, band: impl Into<String>) -> Self {
        self.band = Some(band.into());
        self
    }

    pub fn band_strict(mut self, strict: bool) -> Self {
        self.band_strict = strict;
        self
    }

    pub fn from(mut self, year: i32, month: Option<u32>) -> Self {
        self.year_from = Some(year);
        self.month_from = month;
        self
    }

    pub fn to(mut self, year: i32, month: Option<u32>) -> Self {
        self.year_to = Some(year);
        self.month_to = month;
        self
    }

    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn release_type(mut self, release_type: ReleaseType) -> Self {
        self.release_types.push(release_type);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        push(&mut params, "releaseTitle", self.name.as_deref());
        if self.strict {
            params.push(("exactReleaseMatch".to_string(), "1".to_string()));
        }
        push(&mut params, "bandName", self.band.as_deref());
        if self.band_strict {
            params.push(("exactBandMatch".to_string(), "1".to_string()));
        }
        let year_from = self.year_from.unwrap_or(EARLIEST_YEAR).to_string();
        let year_to = self.year_to.unwrap_or(LATEST_YEAR).to_string();
        push(&mut params, "releaseYearFrom", Some(&year_from));
        push(&mut params, "releaseMonthFrom", self.month_from.map(|m| m.to_string()).as_deref());
        push(&mut params, "releaseYearTo", Some(&year_to));
        push(&mut params, "releaseMonthTo", self.month_to.map(|m| m.to_string()).as_deref());
        push(&mut params, "genre", self.genre.as_deref());
        for release_type in &self.release_types {
            params.push(("releaseType[]".to_string(), release_type.search_id().to_string()));
        }
        params
    }
}

fn push(params: &mut Vec<(String, String)>, key: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        params.push((key.to_string(), value.to_string()));
    }
}

/// First link inside an HTML table cell.
fn cell_link(cell: &str) -> Result<Option<(String, String)>> {
    let fragment = Html::parse_fragment(cell);
    link(fragment.root_element())
}

impl Enmet {
    /// Bands matching `query`. An empty query returns nothing without a request.
    pub fn search_bands(&self, query: &BandQuery) -> Result<Vec<Arc<Band>>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let rows = self.fetcher().search(BAND_SEARCH, &query.params())?;
        info!(count = rows.len(), "band search");

        // With a single country filter the third column shows the location.
        let fixed_country = match query.countries.as_slice() {
            [code] => self.country_by_code(code)?.map(|c| c.name),
            _ => None,
        };

        let mut bands = Vec::with_capacity(rows.len());
        for row in rows {
            let Some((url, name)) = row.first().map(|c| cell_link(c)).transpose()?.flatten() else {
                debug!(?row, "band row without link");
                continue;
            };
            let genres = row.get(1).map(|g| split_by_sep(g));
            let country = match &fixed_country {
                Some(country) => Some(country.clone()),
                None => row.get(2).map(|c| c.trim().to_string()).filter(|c| !c.is_empty()),
            };
            let hints = BandHints {
                name: Some(name.trim().to_string()),
                country,
                genres,
            };
            bands.push(self.band_with(&url_to_id(&url), hints)?);
        }
        Ok(bands)
    }

    /// Albums matching `query`. An empty query returns nothing without a request.
    pub fn search_albums(&self, query: &AlbumQuery) -> Result<Vec<Arc<Album>>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let rows = self.fetcher().search(ALBUM_SEARCH, &query.params())?;
        info!(count = rows.len(), "album search");

        let mut albums = Vec::with_capacity(rows.len());
        for row in rows {
            let Some((url, name)) = row.get(1).map(|c| cell_link(c)).transpose()?.flatten() else {
                debug!(?row, "album row without link");
                continue;
            };
            let year = row.get(3).and_then(|cell| {
                let date = cell.split('<').next().unwrap_or_default().trim();
                date.parse::<PartialDate>().ok().map(|d| d.year())
            });
            let hints = AlbumHints {
                name: Some(name.trim().to_string()),
                year,
            };
            albums.push(self.album_with(&url_to_id(&url), hints)?);
        }
        Ok(albums)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value<'a>(params: &'a [(String, String)], key: &str) -> Vec<&'a str> {
        params
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    #[test]
    fn band_params_use_site_names() {
        let params = BandQuery::new()
            .name("dummy")
            .strict(true)
            .country("PL")
            .country("NO")
            .params();
        assert_eq!(value(&params, "bandName"), ["dummy"]);
        assert_eq!(value(&params, "exactBandMatch"), ["1"]);
        assert_eq!(value(&params, "country[]"), ["PL", "NO"]);
        assert!(value(&params, "genre").is_empty());
    }

    #[test]
    fn album_years_default_to_full_range() {
        let params = AlbumQuery::new().name("dummy").params();
        assert_eq!(value(&params, "releaseYearFrom"), ["1900"]);
        assert_eq!(value(&params, "releaseYearTo"), ["2999"]);

        let params = AlbumQuery::new().name("dummy").from(1991, None).to(1992, Some(6)).params();
        assert_eq!(value(&params, "releaseYearFrom"), ["1991"]);
        assert_eq!(value(&params, "releaseYearTo"), ["1992"]);
        assert_eq!(value(&params, "releaseMonthTo"), ["6"]);
    }

    #[test]
    fn release_types_send_numeric_ids() {
        let params = AlbumQuery::new()
            .release_type(ReleaseType::FullLength)
            .release_type(ReleaseType::Compilation)
            .params();
        assert_eq!(value(&params, "releaseType[]"), ["1", "10"]);
    }

    #[test]
    fn empty_queries() {
        assert!(BandQuery::new().is_empty());
        assert!(!BandQuery::new().strict(true).is_empty());
        assert!(AlbumQuery::new().is_empty());
    }

    #[test]
    fn links_in_cells() {
        let cell = r#"<a href="https://www.metal-archives.com/bands/Megadeth/138">Megadeth</a> <!-- 5.1 -->"#;
        let (url, name) = cell_link(cell).unwrap().unwrap();
        assert_eq!(url_to_id(&url), "138");
        assert_eq!(name, "Megadeth");
        assert!(cell_link("no link").unwrap().is_none());
    }
}
