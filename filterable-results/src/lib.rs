//! Filterable, sectioned results with minimal change notifications.
//!
//! A [`FilterableResultsController`] sits between a mutable collection of
//! records and a rendering surface. Clients mutate the collection through
//! the controller; the controller applies the active [`Filter`]s, diffs the
//! visible collection before and after, and tells a [`ResultsSink`] exactly
//! which sections and records were inserted, deleted, moved or updated.
//!
//! ```
//! use filterable_results::{Collection, Filter, FilterableResultsController};
//!
//! let mut controller = FilterableResultsController::new();
//! controller.set_data(Collection::flat(vec![1, 2, 3, 4]));
//! controller.add_filter(Filter::new(|n: &i32| n % 2 == 0));
//!
//! assert_eq!(controller.number_of_items_in_section(0), Ok(2));
//! assert_eq!(controller.all_objects(), vec![1, 2, 3, 4]);
//! ```
//!
//! Mutations can be batched with [`begin_changes`] and [`end_changes`]; the
//! sink then sees one notification bracket for the whole batch.
//!
//! [`begin_changes`]: FilterableResultsController::begin_changes
//! [`end_changes`]: FilterableResultsController::end_changes

mod config;
mod controller;
mod filter;
mod filter_set;
mod sink;
mod transaction;

pub use config::ControllerConfig;
pub use controller::FilterableResultsController;
pub use filter::{Filter, Predicate};
pub use filter_set::FilterSet;
pub use sink::ResultsSink;
pub use transaction::{Batch, Closed, ReloadReason, Transaction, TransactionState};

pub use filterable_diff::Identity;
pub use filterable_types::{Change, ChangeKind, Collection, Error, Position, Result, Sections, Shape};
