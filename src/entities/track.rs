use std::sync::Arc;
use std::time::Duration;

use super::{Band, BandHints, BandLink, TrackInit};
use crate::fetch::PageKind;
use crate::lazy::Lazy;
use crate::pages::{normalize, page_text};
use crate::session::Enmet;
use crate::types::{Lyrics, LyricsStatus};
use crate::Result;

/// One track of a disc.
///
/// Everything but the lyrics comes from the tracklist the track was first
/// seen in.
#[derive(Debug)]
pub struct Track {
    enmet: Enmet,
    id: String,
    number: u32,
    title: String,
    time: Option<Duration>,
    lyrics_status: LyricsStatus,
    bands: Vec<BandLink>,
    lyrics: Lazy<Lyrics>,
}

impl Track {
    pub(crate) fn new(enmet: Enmet, id: String, init: TrackInit) -> Self {
        let lyrics = match init.lyrics {
            LyricsStatus::Instrumental => Lazy::resolved(Some(Lyrics::Instrumental)),
            LyricsStatus::Unknown => Lazy::resolved(None),
            LyricsStatus::Available => Lazy::new(),
        };
        Self {
            enmet,
            id,
            number: init.number,
            title: init.title,
            time: init.time,
            lyrics_status: init.lyrics,
            bands: init.bands,
            lyrics,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// 1-based position on its disc.
    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn time(&self) -> Option<Duration> {
        self.time
    }

    /// Title exactly as the tracklist shows it.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn lyrics_status(&self) -> LyricsStatus {
        self.lyrics_status
    }

    /// Track name without the band prefix splits put in front of it.
    pub fn name(&self) -> &str {
        match self.prefix_band() {
            Some((_, rest)) => rest,
            None => &self.title,
        }
    }

    /// Performing band: the album's only band, or on splits the band the
    /// title is prefixed with. `None` if a split title names no band.
    pub fn band(&self) -> Result<Option<Arc<Band>>> {
        let link = match self.bands.as_slice() {
            [] => return Ok(None),
            [only] => only,
            _ => match self.prefix_band() {
                Some((link, _)) => link,
                None => return Ok(None),
            },
        };
        self.enmet
            .band_with(&link.id, BandHints::named(link.name.clone()))
            .map(Some)
    }

    /// Lyrics, fetched on first read when the tracklist links them.
    pub fn lyrics(&self) -> Result<Option<Lyrics>> {
        self.lyrics.get(|| {
            let text = self
                .enmet
                .extract(PageKind::Lyrics, &self.id, |html| Ok(page_text(html)))?;
            Ok(normalize(Some(text)).map(Lyrics::Text))
        })
    }

    fn prefix_band(&self) -> Option<(&BandLink, &str)> {
        if self.bands.len() < 2 {
            return None;
        }
        self.bands.iter().find_map(|link| {
            let rest = self.title.strip_prefix(link.name.as_str())?;
            let rest = rest.trim_start().strip_prefix("- ")?;
            Some((link, rest.trim_start()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{HttpResponse, Transport};

    struct Offline;

    impl Transport for Offline {
        fn get(&self, url: &str, _query: &[(String, String)]) -> Result<HttpResponse> {
            Err(crate::EnmetError::Http(format!("offline: {url}")))
        }
    }

    fn session() -> Enmet {
        Enmet::builder()
            .transport(Arc::new(Offline))
            .response_cache(crate::cache::CacheConfig::disabled())
            .build()
            .unwrap()
    }

    fn link(id: &str, name: &str) -> BandLink {
        BandLink {
            id: id.into(),
            name: name.into(),
        }
    }

    fn track(bands: Vec<BandLink>, title: &str, lyrics: LyricsStatus) -> Track {
        let init = TrackInit {
            number: 1,
            title: title.into(),
            time: None,
            lyrics,
            bands,
        };
        Track::new(session(), "1".into(), init)
    }

    #[test]
    fn split_titles_lose_band_prefix() {
        let t = track(
            vec![link("1", "Darkthrone"), link("2", "Satyricon")],
            "Satyricon - Mother North",
            LyricsStatus::Unknown,
        );
        assert_eq!(t.name(), "Mother North");
        assert_eq!(t.band().unwrap().unwrap().id(), "2");
    }

    #[test]
    fn single_band_title_is_kept() {
        let t = track(vec![link("1", "Darkthrone")], "Darkthrone - Live", LyricsStatus::Unknown);
        assert_eq!(t.name(), "Darkthrone - Live");
        assert_eq!(t.band().unwrap().unwrap().id(), "1");
    }

    #[test]
    fn unprefixed_split_track_has_no_band() {
        let t = track(
            vec![link("1", "A"), link("2", "B")],
            "Intro",
            LyricsStatus::Unknown,
        );
        assert_eq!(t.name(), "Intro");
        assert!(t.band().unwrap().is_none());
    }

    #[test]
    fn lyrics_without_a_page_do_not_fetch() {
        let t = track(Vec::new(), "Intro", LyricsStatus::Instrumental);
        assert_eq!(t.lyrics().unwrap(), Some(Lyrics::Instrumental));
        let t = track(Vec::new(), "Intro", LyricsStatus::Unknown);
        assert_eq!(t.lyrics().unwrap(), None);
    }

    #[test]
    fn lyrics_fetch_errors_surface() {
        let t = track(Vec::new(), "Song", LyricsStatus::Available);
        assert!(t.lyrics().is_err());
    }
}
