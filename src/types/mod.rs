//! Scalar and value types exposed by entity fields.

mod date;
mod release;
mod values;

pub use date::PartialDate;
pub use release::{BandStatus, ReleaseType};
pub use values::{Link, Lyrics, LyricsStatus, Reviews};
