//! Artist page, its read-more pages and the links list.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Node};

use super::{Section, first, header_text, link, normalize, selector, squash, text};
use crate::Result;

static LINEUP_ROLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)As (.+): (.+)").expect("invalid lineup role pattern"));

static ALBUM_ROLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)(.+) \(as "(.+)"\)"#).expect("invalid album role pattern"));

/// Band tabs on the artist page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandTab {
    Active,
    Past,
    Guest,
    Misc,
}

impl BandTab {
    fn container(&self) -> &'static str {
        match self {
            Self::Active => "#artist_tab_active",
            Self::Past => "#artist_tab_past",
            Self::Guest => "#artist_tab_guest",
            Self::Misc => "#artist_tab_misc",
        }
    }
}

/// Read-more sections of the artist page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extended {
    Biography,
    Trivia,
}

impl Extended {
    fn caption(&self) -> &'static str {
        match self {
            Self::Biography => "Biography",
            Self::Trivia => "Trivia",
        }
    }
}

pub fn name(html: &Html) -> Result<Option<String>> {
    let heading = selector(".band_member_name")?;
    Ok(normalize(html.select(&heading).next().map(text)))
}

pub fn real_full_name(html: &Html) -> Result<Option<String>> {
    Ok(normalize(header_text(html, "Real/full name:")?))
}

pub fn age(html: &Html) -> Result<Option<String>> {
    Ok(normalize(header_text(html, "Age:")?))
}

pub fn place_of_birth(html: &Html) -> Result<Option<String>> {
    Ok(normalize(header_text(html, "Place of birth:")?.map(|s| squash(&s))))
}

pub fn gender(html: &Html) -> Result<Option<String>> {
    Ok(normalize(header_text(html, "Gender:")?))
}

/// Biography or trivia: the text between its `<h2>` caption and the next one.
pub fn extended(html: &Html, which: Extended) -> Result<Section> {
    let comment = selector("#member_content .band_comment")?;
    let Some(comment) = html.select(&comment).next() else {
        return Ok(Section::Absent);
    };
    let caption = comment.children().filter_map(ElementRef::wrap).find(|e| {
        e.value().name() == "h2" && text(*e).trim() == which.caption()
    });
    let Some(caption) = caption else {
        return Ok(Section::Absent);
    };

    let mut parts = Vec::new();
    for node in caption.next_siblings() {
        match node.value() {
            Node::Text(t) => parts.push(t.trim().to_string()),
            Node::Element(element) => {
                let Some(element_ref) = ElementRef::wrap(node) else {
                    continue;
                };
                let content = text(element_ref).trim().to_string();
                if content == "Read more" {
                    return Ok(Section::ReadMore);
                }
                if element.name() == "h2" {
                    break;
                }
                parts.push(content);
            }
            _ => {}
        }
    }
    let joined = parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    Ok(match normalize(Some(joined)) {
        Some(section) => Section::Inline(section),
        None => Section::Absent,
    })
}

/// An album credit inside a band section of the artist page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumCreditRow {
    pub url: String,
    pub name: String,
    pub role: Option<String>,
    pub name_on_album: String,
}

/// A band section: one band (or non-catalog project) the artist played in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipRow {
    /// `None` for projects without a catalog page.
    pub band_url: Option<String>,
    pub band_name: String,
    pub role: Option<String>,
    pub name_in_lineup: String,
    pub albums: Vec<AlbumCreditRow>,
}

pub fn band_tab(html: &Html, tab: BandTab) -> Result<Vec<MembershipRow>> {
    let artist_name = name(html)?.unwrap_or_default();
    let sections = selector(&format!("{} div.member_in_band", tab.container()))?;
    let rows = selector("table tr")?;
    let cells = selector("td")?;

    let mut result = Vec::new();
    for section in html.select(&sections) {
        let Some(band) = first(section, ".member_in_band_name")? else {
            continue;
        };
        let (band_url, band_name) = match link(band)? {
            Some((url, name)) => (Some(url), name),
            None => (None, text(band)),
        };

        let role_text = first(section, ".member_in_band_role")?
            .map(|e| squash(&text(e)))
            .unwrap_or_default();
        let (role, name_in_lineup) = match LINEUP_ROLE.captures(&role_text) {
            Some(caps) => (Some(caps[2].trim().to_string()), caps[1].trim().to_string()),
            None => (
                Some(role_text).filter(|r| !r.is_empty()),
                artist_name.clone(),
            ),
        };

        let mut albums = Vec::new();
        for row in section.select(&rows) {
            if text(row).contains("show all") {
                continue;
            }
            let tds: Vec<_> = row.select(&cells).collect();
            let Some((url, album_name)) = tds.get(1).map(|td| link(*td)).transpose()?.flatten()
            else {
                continue;
            };
            let credit = tds
                .get(2)
                .map(|td| squash(&text(*td)))
                .unwrap_or_default();
            let (role, name_on_album) = match ALBUM_ROLE.captures(&credit) {
                Some(caps) => (Some(caps[1].trim().to_string()), caps[2].trim().to_string()),
                None => (Some(credit).filter(|c| !c.is_empty()), name_in_lineup.clone()),
            };
            albums.push(AlbumCreditRow {
                url,
                name: album_name.trim().to_string(),
                role,
                name_on_album,
            });
        }

        result.push(MembershipRow {
            band_url,
            band_name: band_name.trim().to_string(),
            role,
            name_in_lineup,
            albums,
        });
    }
    Ok(result)
}

/// Every link on the links list page: URL and title.
pub fn links(html: &Html) -> Result<Vec<(String, String)>> {
    let anchors = selector("a")?;
    Ok(html
        .select(&anchors)
        .filter_map(|a| {
            let href = a.value().attr("href")?;
            Some((href.to_string(), text(a).trim().to_string()))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"
        <h1 class="band_member_name">Ozzy Osbourne</h1>
        <div id="member_info"><dl>
          <dt>Real/full name:</dt><dd>John Michael Osbourne</dd>
          <dt>Age:</dt><dd>75 (born Dec 3rd, 1948)</dd>
          <dt>Place of birth:</dt><dd>United Kingdom (Aston,
             Birmingham, England)</dd>
          <dt>Gender:</dt><dd>Male</dd>
        </dl></div>
        <div id="member_content"><div class="band_comment">
          <h2>Biography</h2>
          Born in Aston.
          <p>Joined Black Sabbath.</p>
          <h2>Trivia</h2>
          <p>Short trivia...</p>
          <a href="#" class="btn_read_more">Read more</a>
        </div></div>
        <div id="artist_tab_active">
          <div class="member_in_band">
            <h3 class="member_in_band_name"><a href="https://x/bands/Ozzy_Osbourne/1">Ozzy Osbourne</a></h3>
            <p class="member_in_band_role">Vocals (1979-present)</p>
            <table>
              <tr><td>1980</td><td><a href="https://x/albums/a/b/50">Blizzard of Ozz</a></td><td>Vocals</td></tr>
            </table>
          </div>
          <div class="member_in_band">
            <h3 class="member_in_band_name">Solo project</h3>
            <p class="member_in_band_role">As The Prince: Vocals</p>
            <table>
              <tr><td>1999</td><td><a href="https://x/albums/a/b/60">Prince</a></td><td>Vocals (as "Madman")</td></tr>
              <tr><td colspan="3"><a href="#">show all</a></td></tr>
            </table>
          </div>
        </div>
    "##;

    #[test]
    fn header_fields() {
        let html = Html::parse_document(PAGE);
        assert_eq!(name(&html).unwrap().as_deref(), Some("Ozzy Osbourne"));
        assert_eq!(real_full_name(&html).unwrap().as_deref(), Some("John Michael Osbourne"));
        assert_eq!(
            place_of_birth(&html).unwrap().as_deref(),
            Some("United Kingdom (Aston, Birmingham, England)")
        );
        assert_eq!(gender(&html).unwrap().as_deref(), Some("Male"));
    }

    #[test]
    fn extended_sections() {
        let html = Html::parse_document(PAGE);
        assert_eq!(
            extended(&html, Extended::Biography).unwrap(),
            Section::Inline("Born in Aston. Joined Black Sabbath.".into())
        );
        assert_eq!(extended(&html, Extended::Trivia).unwrap(), Section::ReadMore);
    }

    #[test]
    fn band_sections_with_aliases() {
        let html = Html::parse_document(PAGE);
        let active = band_tab(&html, BandTab::Active).unwrap();
        assert_eq!(active.len(), 2);

        assert_eq!(active[0].band_url.as_deref(), Some("https://x/bands/Ozzy_Osbourne/1"));
        assert_eq!(active[0].name_in_lineup, "Ozzy Osbourne");
        assert_eq!(active[0].albums[0].name_on_album, "Ozzy Osbourne");

        assert_eq!(active[1].band_url, None);
        assert_eq!(active[1].band_name, "Solo project");
        assert_eq!(active[1].role.as_deref(), Some("Vocals"));
        assert_eq!(active[1].name_in_lineup, "The Prince");
        assert_eq!(active[1].albums.len(), 1);
        assert_eq!(active[1].albums[0].role.as_deref(), Some("Vocals"));
        assert_eq!(active[1].albums[0].name_on_album, "Madman");

        assert!(band_tab(&html, BandTab::Past).unwrap().is_empty());
    }
}
