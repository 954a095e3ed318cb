//! Album page.

use scraper::{ElementRef, Html};

use super::{PersonRow, first, header_item, header_text, link, normalize, person_rows, selector, text};
use crate::Result;
use crate::types::LyricsStatus;

/// People tables on the album page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeopleTab {
    Lineup,
    Guests,
    Staff,
}

impl PeopleTab {
    pub const ALL: [PeopleTab; 3] = [Self::Lineup, Self::Guests, Self::Staff];

    fn container(&self) -> &'static str {
        match self {
            Self::Lineup => "#album_members_lineup",
            Self::Guests => "#album_members_guest",
            Self::Staff => "#album_members_misc",
        }
    }
}

pub fn name(html: &Html) -> Result<Option<String>> {
    let anchor = selector(".album_name a")?;
    Ok(normalize(html.select(&anchor).next().map(text)))
}

/// Bands credited for the album: URL and name. Several for splits.
pub fn bands(html: &Html) -> Result<Vec<(String, String)>> {
    let anchors = selector("#album_info .band_name a")?;
    Ok(html
        .select(&anchors)
        .filter_map(|a| {
            let href = a.value().attr("href")?;
            Some((href.to_string(), text(a).trim().to_string()))
        })
        .collect())
}

pub fn release_type(html: &Html) -> Result<Option<String>> {
    Ok(normalize(header_text(html, "Type:")?))
}

pub fn release_date(html: &Html) -> Result<Option<String>> {
    Ok(normalize(header_text(html, "Release date:")?))
}

pub fn catalog_id(html: &Html) -> Result<Option<String>> {
    Ok(normalize(header_text(html, "Catalog ID:")?))
}

pub fn label(html: &Html) -> Result<Option<String>> {
    Ok(normalize(header_text(html, "Label:")?))
}

pub fn format(html: &Html) -> Result<Option<String>> {
    Ok(normalize(header_text(html, "Format:")?))
}

/// Reviews link (if any) and the summary text.
pub fn reviews(html: &Html) -> Result<Option<(Option<String>, String)>> {
    let Some(dd) = header_item(html, "Reviews:")? else {
        return Ok(None);
    };
    let url = link(dd)?.map(|(href, _)| href);
    let summary = super::squash(&text(dd));
    Ok((!summary.is_empty()).then_some((url, summary)))
}

/// One tracklist row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRow {
    pub id: String,
    pub number: u32,
    pub title: String,
    pub time: Option<String>,
    pub lyrics: LyricsStatus,
}

/// Tracklist split into discs. Always at least one (possibly empty) disc.
pub fn tracks(html: &Html) -> Result<Vec<Vec<TrackRow>>> {
    let mut discs: Vec<Vec<TrackRow>> = vec![Vec::new()];
    let container = selector("#album_tabs_tracklist")?;
    let Some(container) = html.select(&container).next() else {
        return Ok(discs);
    };
    let rows = selector("tr.even, tr.odd, .discRow")?;
    let cells = selector("td")?;
    for row in container.select(&rows) {
        if row.value().classes().any(|c| c == "discRow") {
            if discs.last().is_some_and(|disc| !disc.is_empty()) {
                discs.push(Vec::new());
            }
            continue;
        }
        let tds: Vec<_> = row.select(&cells).collect();
        let Some(number_cell) = tds.first() else {
            continue;
        };
        let Some(id) = first(*number_cell, "a")?
            .and_then(|a| a.value().attr("name"))
            .map(str::to_string)
        else {
            continue;
        };
        let number_text = text(*number_cell);
        let Some(number) = number_text
            .split('.')
            .next()
            .and_then(|n| n.trim().parse().ok())
        else {
            continue;
        };
        let cell = |i: usize| tds.get(i).map(|td| text(*td).trim().to_string());
        let lyrics = match tds.get(3) {
            Some(td) => lyrics_status(*td)?,
            None => LyricsStatus::Unknown,
        };
        if let Some(disc) = discs.last_mut() {
            disc.push(TrackRow {
                id,
                number,
                title: cell(1).unwrap_or_default(),
                time: cell(2).filter(|t| !t.is_empty()),
                lyrics,
            });
        }
    }
    Ok(discs)
}

fn lyrics_status(cell: ElementRef<'_>) -> Result<LyricsStatus> {
    Ok(if first(cell, "a")?.is_some() {
        LyricsStatus::Available
    } else if first(cell, "em")?.is_some() {
        LyricsStatus::Instrumental
    } else {
        LyricsStatus::Unknown
    })
}

/// Disc header texts ("Disc 1 - Gloom"). One `None` for single-disc albums.
pub fn disc_headers(html: &Html) -> Result<Vec<Option<String>>> {
    let headers = selector(".discRow td")?;
    let names: Vec<_> = html
        .select(&headers)
        .map(|td| Some(text(td).trim().to_string()))
        .collect();
    Ok(if names.is_empty() { vec![None] } else { names })
}

/// Per-disc total times, in disc order.
pub fn total_times(html: &Html) -> Result<Vec<String>> {
    let totals = selector(".table_lyrics strong")?;
    Ok(html
        .select(&totals)
        .map(|s| text(s).trim().to_string())
        .collect())
}

pub fn people(html: &Html, tab: PeopleTab) -> Result<Vec<PersonRow>> {
    person_rows(html, tab.container())
}

pub fn additional_notes(html: &Html) -> Result<Option<String>> {
    let notes = selector("#album_tabs_notes")?;
    Ok(normalize(html.select(&notes).next().map(text)))
}
