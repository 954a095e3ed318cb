//! Band page, discography tab, read-more page and recommendations.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use scraper::Html;

use super::{
    PersonRow, Section, first, header_text, joined_children, link, normalize, normalize_list,
    person_rows, selector, split_by_sep, text,
};
use crate::Result;

static LAST_MODIFIED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4})-(\d{2})-(\d{2})\s+(\d{2}):(\d{2}):(\d{2})")
        .expect("invalid last-modified pattern")
});

/// Lineup tables on the band page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineupTab {
    Current,
    Past,
    Live,
}

impl LineupTab {
    pub const ALL: [LineupTab; 3] = [Self::Current, Self::Past, Self::Live];

    fn container(&self) -> &'static str {
        match self {
            Self::Current => "#band_tab_members_current",
            Self::Past => "#band_tab_members_past",
            Self::Live => "#band_tab_members_live",
        }
    }
}

pub fn name(html: &Html) -> Result<Option<String>> {
    let anchor = selector(".band_name a")?;
    Ok(normalize(html.select(&anchor).next().map(text)))
}

pub fn country(html: &Html) -> Result<Option<String>> {
    Ok(normalize(header_text(html, "Country of origin:")?))
}

pub fn location(html: &Html) -> Result<Option<String>> {
    Ok(normalize(header_text(html, "Location:")?))
}

pub fn status(html: &Html) -> Result<Option<String>> {
    Ok(normalize(header_text(html, "Status:")?))
}

pub fn formed_in(html: &Html) -> Result<Option<i32>> {
    Ok(normalize(header_text(html, "Formed in:")?).and_then(|year| year.parse().ok()))
}

fn header_list(html: &Html, label: &str) -> Result<Vec<String>> {
    let raw = header_text(html, label)?.unwrap_or_default();
    Ok(normalize_list(split_by_sep(&raw)))
}

pub fn years_active(html: &Html) -> Result<Vec<String>> {
    header_list(html, "Years active:")
}

pub fn genres(html: &Html) -> Result<Vec<String>> {
    header_list(html, "Genre:")
}

pub fn lyrical_themes(html: &Html) -> Result<Vec<String>> {
    header_list(html, "Lyrical themes:")
}

/// Current label, or the last one for bands that split up.
pub fn label(html: &Html) -> Result<Option<String>> {
    match normalize(header_text(html, "Current label:")?) {
        Some(label) => Ok(Some(label)),
        None => Ok(normalize(header_text(html, "Last label:")?)),
    }
}

pub fn lineup(html: &Html, tab: LineupTab) -> Result<Vec<PersonRow>> {
    person_rows(html, tab.container())
}

/// Band comment, unless it is truncated behind a "Read more" link.
pub fn info(html: &Html) -> Result<Section> {
    let comment = selector(".band_comment")?;
    let Some(comment) = html.select(&comment).next() else {
        return Ok(Section::Absent);
    };
    if first(comment, "a.btn_read_more")?.is_some() {
        return Ok(Section::ReadMore);
    }
    Ok(match normalize(Some(joined_children(comment))) {
        Some(info) => Section::Inline(info),
        None => Section::Absent,
    })
}

pub fn last_modified(html: &Html) -> Result<Option<NaiveDateTime>> {
    let cells = selector("td")?;
    let Some(cell) = html
        .select(&cells)
        .map(text)
        .find(|t| t.contains("Last modified on"))
    else {
        return Ok(None);
    };
    let Some(caps) = LAST_MODIFIED.captures(&cell) else {
        return Ok(None);
    };
    let n = |i: usize| caps[i].parse::<u32>().unwrap_or_default();
    Ok(NaiveDate::from_ymd_opt(n(1) as i32, n(2), n(3)).and_then(|d| d.and_hms_opt(n(4), n(5), n(6))))
}

/// One row of the discography tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumRow {
    pub url: String,
    pub name: String,
    pub release_type: Option<String>,
    pub year: Option<i32>,
    pub reviews: Option<(String, String)>,
}

pub fn discography(html: &Html) -> Result<Vec<AlbumRow>> {
    let rows = selector(".discog tbody tr")?;
    let cells = selector("td")?;
    let mut result = Vec::new();
    for row in html.select(&rows) {
        let tds: Vec<_> = row.select(&cells).collect();
        let Some((url, name)) = tds.first().map(|td| link(*td)).transpose()?.flatten() else {
            continue;
        };
        let cell = |i: usize| tds.get(i).map(|td| text(*td).trim().to_string());
        let reviews = match tds.get(3) {
            Some(td) => link(*td)?,
            None => None,
        };
        result.push(AlbumRow {
            url,
            name: name.trim().to_string(),
            release_type: normalize(cell(1)),
            year: cell(2).and_then(|y| y.parse().ok()),
            reviews,
        });
    }
    Ok(result)
}

/// One row of the similar-artists list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimilarRow {
    pub url: String,
    pub name: String,
    pub country: Option<String>,
    pub genres: Vec<String>,
    pub score: Option<u32>,
}

pub fn similar_artists(html: &Html) -> Result<Vec<SimilarRow>> {
    let rows = selector("#artist_list tr:not(:last-child)")?;
    let cells = selector("td")?;
    let rows: Vec<_> = html.select(&rows).collect();
    if rows
        .first()
        .is_some_and(|row| text(*row).trim().starts_with("No similar artist"))
    {
        return Ok(Vec::new());
    }
    let mut result = Vec::new();
    for row in rows {
        let tds: Vec<_> = row.select(&cells).collect();
        if tds.len() < 4 {
            continue;
        }
        let Some((url, name)) = link(tds[0])? else {
            continue;
        };
        result.push(SimilarRow {
            url,
            name: name.trim().to_string(),
            country: normalize(Some(text(tds[1]))),
            genres: normalize_list(split_by_sep(&text(tds[2]))),
            score: text(tds[3]).trim().parse().ok(),
        });
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"
        <h1 class="band_name"><a href="https://x/bands/Black_Sabbath/99">Black Sabbath</a></h1>
        <div id="band_stats">
          <dl><dt>Country of origin:</dt><dd><a href="#">United Kingdom</a></dd>
              <dt>Location:</dt><dd>N/A</dd>
              <dt>Status:</dt><dd class="active">Split-up</dd>
              <dt>Formed in:</dt><dd>1968</dd></dl>
          <dl><dt>Genre:</dt><dd>Heavy/Doom Metal</dd>
              <dt>Lyrical themes:</dt><dd>N/A</dd>
              <dt>Last label:</dt><dd><a href="#">Vertigo</a></dd></dl>
          <dl><dt>Years active:</dt><dd>1968-2017</dd></dl>
        </div>
        <div class="band_comment clear">Pioneers. <b>Heavy.</b></div>
        <table><tr><td>Added on: 2002-07-19</td><td>Last modified on 2023-10-06 12:01:02</td></tr></table>
    "##;

    #[test]
    fn header_fields() {
        let html = Html::parse_document(PAGE);
        assert_eq!(name(&html).unwrap().as_deref(), Some("Black Sabbath"));
        assert_eq!(country(&html).unwrap().as_deref(), Some("United Kingdom"));
        assert_eq!(location(&html).unwrap(), None);
        assert_eq!(status(&html).unwrap().as_deref(), Some("Split-up"));
        assert_eq!(formed_in(&html).unwrap(), Some(1968));
        assert_eq!(genres(&html).unwrap(), vec!["Heavy/Doom Metal"]);
        assert!(lyrical_themes(&html).unwrap().is_empty());
        assert_eq!(label(&html).unwrap().as_deref(), Some("Vertigo"));
    }

    #[test]
    fn inline_info_and_timestamp() {
        let html = Html::parse_document(PAGE);
        assert_eq!(info(&html).unwrap(), Section::Inline("Pioneers. Heavy.".into()));
        let modified = last_modified(&html).unwrap().unwrap();
        assert_eq!(modified.to_string(), "2023-10-06 12:01:02");
    }

    #[test]
    fn read_more_is_detected() {
        let html = Html::parse_document(
            r##"<div class="band_comment">Short... <a class="btn_read_more" href="#">Read more</a></div>"##,
        );
        assert_eq!(info(&html).unwrap(), Section::ReadMore);
    }

    #[test]
    fn no_similar_artists() {
        let html = Html::parse_document(
            r#"<table id="artist_list"><tbody>
                 <tr><td colspan="4">No similar artist has been recommended yet.</td></tr>
                 <tr><td></td></tr>
               </tbody></table>"#,
        );
        assert!(similar_artists(&html).unwrap().is_empty());
    }
}
