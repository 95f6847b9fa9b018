//! Structural change events.
//!
//! A [`Change`] describes one unit of difference between a previously
//! rendered collection and its new state. Changes are produced by the diff
//! engine for a single transaction and handed to a sink; nothing retains
//! them afterwards.
//!
//! Positions follow batch-update conventions: `old` positions address the
//! collection as it was before the transaction, `new` positions address it
//! as it is after.

use crate::Position;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a change, shared by item-level and section-level events.
///
/// Sections only ever use [`ChangeKind::Insert`] and [`ChangeKind::Delete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ChangeKind {
    Insert = 1,
    Delete = 2,
    Move = 3,
    Update = 4,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Insert => "insert",
            Self::Delete => "delete",
            Self::Move => "move",
            Self::Update => "update",
        };
        f.write_str(name)
    }
}

/// A single structural change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum Change<T> {
    /// A record appeared at `new`.
    Insert { record: T, new: Position },

    /// The record previously at `old` is gone.
    Delete { record: T, old: Position },

    /// The record at `old` now lives at `new`.
    ///
    /// The record carried is the new version; a move that also changed
    /// content is not reported again as an update.
    Move { record: T, old: Position, new: Position },

    /// The record at `old` kept its place but its content changed.
    Update { record: T, old: Position },

    /// A section was inserted at `index` of the new collection.
    SectionInsert { index: usize },

    /// The section at `index` of the old collection was removed.
    SectionDelete { index: usize },
}

impl<T> Change<T> {
    /// Returns the kind of this change.
    #[must_use]
    pub fn kind(&self) -> ChangeKind {
        match self {
            Self::Insert { .. } | Self::SectionInsert { .. } => ChangeKind::Insert,
            Self::Delete { .. } | Self::SectionDelete { .. } => ChangeKind::Delete,
            Self::Move { .. } => ChangeKind::Move,
            Self::Update { .. } => ChangeKind::Update,
        }
    }

    /// Returns true for section-level changes.
    #[must_use]
    pub fn is_section_change(&self) -> bool {
        matches!(self, Self::SectionInsert { .. } | Self::SectionDelete { .. })
    }

    /// Returns the section index of a section-level change.
    #[must_use]
    pub fn section_index(&self) -> Option<usize> {
        match self {
            Self::SectionInsert { index } | Self::SectionDelete { index } => Some(*index),
            _ => None,
        }
    }

    /// Returns the record carried by an item-level change.
    #[must_use]
    pub fn record(&self) -> Option<&T> {
        match self {
            Self::Insert { record, .. }
            | Self::Delete { record, .. }
            | Self::Move { record, .. }
            | Self::Update { record, .. } => Some(record),
            Self::SectionInsert { .. } | Self::SectionDelete { .. } => None,
        }
    }

    /// Position in the old collection, absent for inserts.
    #[must_use]
    pub fn old_position(&self) -> Option<Position> {
        match self {
            Self::Delete { old, .. } | Self::Move { old, .. } | Self::Update { old, .. } => {
                Some(*old)
            }
            _ => None,
        }
    }

    /// Position in the new collection, absent for deletes and updates.
    #[must_use]
    pub fn new_position(&self) -> Option<Position> {
        match self {
            Self::Insert { new, .. } | Self::Move { new, .. } => Some(*new),
            _ => None,
        }
    }
}
