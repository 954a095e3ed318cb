//! Country catalog.
//!
//! The site's country list changes over time, so it is read from the
//! advanced-search form instead of being compiled in. It is loaded on first
//! use and kept until [`Countries::refresh`] is called.

use std::sync::Arc;

use parking_lot::RwLock;
use scraper::Html;
use serde::Serialize;
use tracing::debug;

use crate::fetch::{PageFetcher, PageKind};
use crate::pages::{selector, text};
use crate::Result;

/// A country known to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Country {
    /// Two-letter code used by search requests.
    pub code: String,
    /// Display name used on band pages.
    pub name: String,
}

/// Lazily loaded, closed set of countries.
#[derive(Default)]
pub struct Countries {
    entries: RwLock<Option<Arc<Vec<Country>>>>,
}

impl Countries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.entries.read().is_some()
    }

    /// All countries, loading them on first call.
    pub fn all(&self, fetcher: &PageFetcher) -> Result<Arc<Vec<Country>>> {
        if let Some(entries) = self.entries.read().as_ref() {
            return Ok(Arc::clone(entries));
        }
        let mut slot = self.entries.write();
        if let Some(entries) = slot.as_ref() {
            return Ok(Arc::clone(entries));
        }
        let document = fetcher.document(PageKind::AdvancedSearch, "")?;
        let entries = Arc::new(document.with(parse)?);
        debug!(count = entries.len(), "country catalog loaded");
        *slot = Some(Arc::clone(&entries));
        Ok(entries)
    }

    /// Reload from the site, bypassing every cache tier.
    pub fn refresh(&self, fetcher: &PageFetcher) -> Result<Arc<Vec<Country>>> {
        let document = fetcher.refresh(PageKind::AdvancedSearch, "")?;
        let entries = Arc::new(document.with(parse)?);
        debug!(count = entries.len(), "country catalog refreshed");
        *self.entries.write() = Some(Arc::clone(&entries));
        Ok(entries)
    }

    pub fn by_code(&self, fetcher: &PageFetcher, code: &str) -> Result<Option<Country>> {
        Ok(self
            .all(fetcher)?
            .iter()
            .find(|c| c.code.eq_ignore_ascii_case(code))
            .cloned())
    }

    pub fn by_name(&self, fetcher: &PageFetcher, name: &str) -> Result<Option<Country>> {
        Ok(self
            .all(fetcher)?
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
            .cloned())
    }
}

/// Options of the country selector.
fn parse(html: &Html) -> Result<Vec<Country>> {
    let options = selector("select#country option")?;
    Ok(html
        .select(&options)
        .filter_map(|option| {
            let code = option.value().attr("value")?.trim();
            let name = text(option).trim().to_string();
            (!code.is_empty() && !name.is_empty()).then(|| Country {
                code: code.to_string(),
                name,
            })
        })
        .collect())
}
