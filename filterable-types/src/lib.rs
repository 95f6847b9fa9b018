//! Core type definitions for filterable sectioned results.
//!
//! This crate defines the plain data types shared by the diff engine and the
//! results controller:
//! - [`Position`]: a (section, item) address into a sectioned collection
//! - [`Change`] and [`ChangeKind`]: structural change events
//! - [`Collection`] and [`Shape`]: flat or sectioned input/output data
//!
//! Records themselves are opaque and generic; nothing here inspects them.

mod change;
mod collection;
mod position;

pub use change::{Change, ChangeKind};
pub use collection::{Collection, Sections, Shape};
pub use position::Position;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by addressing and lookup operations.
///
/// All variants are contract violations by the caller. Nothing here is
/// transient, so there is no retry classification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("position {position} is out of range")]
    OutOfRange { position: Position },

    #[error("section {index} is out of range ({len} sections)")]
    SectionOutOfRange { index: usize, len: usize },

    #[error("key lookup requires a key extractor")]
    MissingKeyExtractor,

    #[error("{operation} requires sectioned data")]
    NotSectioned { operation: &'static str },
}

impl Error {
    /// Returns true for errors caused by calling an operation the current
    /// configuration or data shape does not support.
    #[must_use]
    pub fn is_precondition_violation(&self) -> bool {
        matches!(self, Self::MissingKeyExtractor | Self::NotSectioned { .. })
    }

    /// Returns true for errors caused by addressing a missing slot.
    #[must_use]
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange { .. } | Self::SectionOutOfRange { .. })
    }
}
