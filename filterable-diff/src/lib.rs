//! Diff engine for filterable sectioned results.
//!
//! This crate provides the pure, state-free parts of the results pipeline:
//!
//! - [`Identity`]: decides whether two records denote the same entity, either
//!   by a caller-supplied key extractor or by full equality
//! - [`Nested`] and [`flatten`]: reduce arbitrarily nested data to one list
//! - [`diff`]: compute the ordered section and item changes between two
//!   sectioned collections
//! - [`apply_changes`]: replay a change list onto a mirror of the old data
//!
//! Every change list produced by [`diff`] satisfies:
//! `apply_changes(old, &diff(old, new, identity)) == new`.

mod flatten;
mod identity;
mod reconcile;

pub use flatten::{flatten, Nested};
pub use identity::{Identity, KeyFn};
pub use reconcile::{apply_changes, diff};
