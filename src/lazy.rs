//! Lazily resolved entity fields.
//!
//! Each non-identity field is a [`Lazy`] slot with three explicit states.
//! `Empty` is a resolved state: the page was read and had nothing (or a
//! placeholder) for the field. It is never confused with `Unresolved`.
//!
//! The slot's mutex is held while resolving, so concurrent readers of one
//! field wait for a single resolution instead of fetching twice. A failed
//! resolution leaves the slot `Unresolved`; the next read tries again.

use parking_lot::Mutex;

use crate::Result;

/// State of one lazily resolved field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Slot<T> {
    #[default]
    Unresolved,
    Empty,
    Value(T),
}

impl<T> Slot<T> {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unresolved)
    }
}

impl<T> From<Option<T>> for Slot<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Value(v),
            None => Self::Empty,
        }
    }
}

/// A field resolved at most once.
#[derive(Debug)]
pub struct Lazy<T> {
    slot: Mutex<Slot<T>>,
}

impl<T: Clone> Lazy<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot::Unresolved),
        }
    }

    /// Pre-resolve from a construction hint; `None` leaves the field lazy.
    pub fn hinted(hint: Option<T>) -> Self {
        Self {
            slot: Mutex::new(hint.map_or(Slot::Unresolved, Slot::Value)),
        }
    }

    /// Already resolved to `value`.
    pub fn resolved(value: Option<T>) -> Self {
        Self {
            slot: Mutex::new(value.into()),
        }
    }

    /// Current state without resolving.
    pub fn peek(&self) -> Slot<T> {
        self.slot.lock().clone()
    }

    pub fn is_resolved(&self) -> bool {
        self.slot.lock().is_resolved()
    }

    /// Value of a scalar field, resolving it on first read.
    pub fn get<F>(&self, resolve: F) -> Result<Option<T>>
    where
        F: FnOnce() -> Result<Option<T>>,
    {
        let mut slot = self.slot.lock();
        if let Slot::Unresolved = *slot {
            *slot = resolve()?.into();
        }
        Ok(match &*slot {
            Slot::Value(v) => Some(v.clone()),
            _ => None,
        })
    }
}

impl<T: Clone> Default for Lazy<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U: Clone> Lazy<Vec<U>> {
    /// Pre-resolve a list field from a hint; an empty hint resolves to `Empty`.
    pub fn hinted_list(hint: Option<Vec<U>>) -> Self {
        match hint {
            Some(items) => Self::resolved((!items.is_empty()).then_some(items)),
            None => Self::new(),
        }
    }

    /// Value of a list field, resolving it on first read.
    ///
    /// An empty list resolves to `Empty`.
    pub fn get_list<F>(&self, resolve: F) -> Result<Vec<U>>
    where
        F: FnOnce() -> Result<Vec<U>>,
    {
        self.get(|| {
            let items = resolve()?;
            Ok((!items.is_empty()).then_some(items))
        })
        .map(Option::unwrap_or_default)
    }
}
