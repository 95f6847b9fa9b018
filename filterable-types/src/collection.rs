//! Flat and sectioned collection shapes.

use serde::{Deserialize, Serialize};

/// The normalized two-level form every collection is stored in.
pub type Sections<T> = Vec<Vec<T>>;

/// Whether data was supplied as one flat list or as a list of sections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    #[default]
    Flat,
    Sectioned,
}

/// Collection data in the shape a client supplies or expects back.
///
/// Flat data normalizes to exactly one section, and converting back yields
/// the same shape that was put in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", content = "data", rename_all = "lowercase")]
pub enum Collection<T> {
    Flat(Vec<T>),
    Sectioned(Sections<T>),
}

impl<T> Collection<T> {
    /// Wraps a flat list of records.
    #[must_use]
    pub fn flat(records: Vec<T>) -> Self {
        Self::Flat(records)
    }

    /// Wraps a list of sections.
    #[must_use]
    pub fn sectioned(sections: Sections<T>) -> Self {
        Self::Sectioned(sections)
    }

    /// Rebuilds a collection of the given shape from normalized sections.
    ///
    /// For [`Shape::Flat`] all sections are concatenated; normalized flat
    /// data only ever has one.
    #[must_use]
    pub fn from_sections(shape: Shape, sections: Sections<T>) -> Self {
        match shape {
            Shape::Flat => Self::Flat(sections.into_iter().flatten().collect()),
            Shape::Sectioned => Self::Sectioned(sections),
        }
    }

    /// Returns the shape of this collection.
    #[must_use]
    pub fn shape(&self) -> Shape {
        match self {
            Self::Flat(_) => Shape::Flat,
            Self::Sectioned(_) => Shape::Sectioned,
        }
    }

    /// Normalizes into sections. Flat data becomes a single section.
    #[must_use]
    pub fn into_sections(self) -> Sections<T> {
        match self {
            Self::Flat(records) => vec![records],
            Self::Sectioned(sections) => sections,
        }
    }

    /// Total number of records across all sections.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Flat(records) => records.len(),
            Self::Sectioned(sections) => sections.iter().map(Vec::len).sum(),
        }
    }

    /// Returns true if there are no records at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
