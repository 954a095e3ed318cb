//! Identity registry: one live object per catalog entity.
//!
//! Maps an [`EntityKey`] to a weak handle of the live instance. A lookup
//! that finds a live instance returns it and ignores whatever construction
//! hints came with the request (first writer wins). Otherwise the
//! constructor runs and its result is registered.
//!
//! The registry never keeps an entity alive: once the last `Arc` is
//! dropped the entry is dead, and the next request for that key constructs
//! a fresh object. Dead entries are swept when the map has doubled since
//! the previous sweep.
//!
//! The map lock is held across the constructor, which is what makes
//! concurrent requests for one key converge on a single instance.
//! Constructors therefore must not call back into the registry.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::debug;

use crate::telemetry;
use crate::Result;

/// Minimum map size before dead entries are swept.
const SWEEP_FLOOR: usize = 64;

/// Kinds of registry-managed entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Band,
    Album,
    Artist,
    Track,
    Disc,
    LineupArtist,
    AlbumArtist,
    SimilarBand,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Band => "band",
            Self::Album => "album",
            Self::Artist => "artist",
            Self::Track => "track",
            Self::Disc => "disc",
            Self::LineupArtist => "lineup_artist",
            Self::AlbumArtist => "album_artist",
            Self::SimilarBand => "similar_band",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What makes two construction requests refer to the same entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityKey {
    /// Entity with its own catalog id.
    Identified { kind: EntityKind, id: String },
    /// Entity that only exists relative to a parent (e.g. disc 2 of album X).
    Contextual {
        kind: EntityKind,
        parent: String,
        discriminator: String,
    },
}

impl EntityKey {
    pub fn identified(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::Identified {
            kind,
            id: id.into(),
        }
    }

    pub fn contextual(
        kind: EntityKind,
        parent: impl Into<String>,
        discriminator: impl fmt::Display,
    ) -> Self {
        Self::Contextual {
            kind,
            parent: parent.into(),
            discriminator: discriminator.to_string(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Identified { kind, .. } | Self::Contextual { kind, .. } => *kind,
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identified { kind, id } => write!(f, "{kind}:{id}"),
            Self::Contextual {
                kind,
                parent,
                discriminator,
            } => write!(f, "{kind}:{parent}/{discriminator}"),
        }
    }
}

type Handle = Weak<dyn Any + Send + Sync>;

struct Entries {
    map: HashMap<EntityKey, Handle>,
    swept_at: usize,
}

/// Weak-valued map from identity key to live entity.
pub struct Registry {
    entries: Mutex<Entries>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Entries {
                map: HashMap::new(),
                swept_at: 0,
            }),
        }
    }

    /// Return the live instance for `key`, or build and register one.
    ///
    /// `construct` runs only on a miss, under the registry lock; it must
    /// not touch the registry. Its error is returned unchanged and nothing
    /// is registered.
    pub fn get_or_create<T, F>(&self, key: EntityKey, construct: F) -> Result<Arc<T>>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> Result<T>,
    {
        let kind = key.kind().as_str();
        let mut entries = self.entries.lock();

        if let Some(live) = entries.map.get(&key).and_then(Weak::upgrade) {
            if let Ok(instance) = live.downcast::<T>() {
                debug!(%key, "cached get");
                metrics::counter!(telemetry::REGISTRY_HITS_TOTAL, "kind" => kind).increment(1);
                return Ok(instance);
            }
        }

        debug!(%key, "uncached get");
        metrics::counter!(telemetry::REGISTRY_MISSES_TOTAL, "kind" => kind).increment(1);
        let instance = Arc::new(construct()?);
        let erased: Arc<dyn Any + Send + Sync> = instance.clone();
        entries.map.insert(key, Arc::downgrade(&erased));
        entries.sweep_if_grown();
        Ok(instance)
    }

    /// Live instance for `key`, if any.
    pub fn get<T: Any + Send + Sync>(&self, key: &EntityKey) -> Option<Arc<T>> {
        let live = self.entries.lock().map.get(key).and_then(Weak::upgrade)?;
        live.downcast::<T>().ok()
    }

    /// Whether a live instance exists for `key`.
    pub fn contains(&self, key: &EntityKey) -> bool {
        self.entries
            .lock()
            .map
            .get(key)
            .is_some_and(|handle| handle.strong_count() > 0)
    }

    /// Number of live instances.
    pub fn live_count(&self) -> usize {
        self.entries
            .lock()
            .map
            .values()
            .filter(|handle| handle.strong_count() > 0)
            .count()
    }

    /// Remove entries whose instance has been dropped.
    pub fn sweep(&self) {
        self.entries.lock().sweep();
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Entries {
    fn sweep(&mut self) {
        let before = self.map.len();
        self.map.retain(|_, handle| handle.strong_count() > 0);
        self.swept_at = self.map.len();
        debug!(removed = before - self.map.len(), live = self.map.len(), "registry swept");
    }

    fn sweep_if_grown(&mut self) {
        if self.map.len() >= SWEEP_FLOOR.max(self.swept_at * 2) {
            self.sweep();
        }
    }
}
