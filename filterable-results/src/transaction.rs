//! Change transactions and batched delivery.
//!
//! A [`Transaction`] is a nesting counter. The outermost `begin` snapshots
//! the visible collection; nested begins only count. When the counter drops
//! back to zero the transaction closes, and the controller turns the
//! snapshot into a [`Batch`]: the pending changes between the snapshot and
//! the new visible collection, or a reload. A batch is consumed by
//! [`Batch::deliver`], so it reaches the sink exactly once.

use crate::sink::{deliver_change, ResultsSink};
use filterable_types::{Change, Sections};
use std::fmt;
use tracing::warn;

/// Where a transaction counter stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Idle,
    InTransaction { depth: usize },
}

/// Nesting counter for batched mutations.
#[derive(Debug)]
pub struct Transaction<T> {
    depth: usize,
    snapshot: Sections<T>,
    unpopulated: bool,
    shape_changed: bool,
}

/// What an outermost transaction leaves behind when it closes.
#[derive(Debug)]
pub struct Closed<T> {
    /// The visible collection as it was when the transaction opened.
    pub snapshot: Sections<T>,
    /// The closing call asked for the filters to be re-run.
    pub reapply_filters: bool,
    /// No data had been set when the transaction opened.
    pub unpopulated: bool,
    /// The raw data switched between flat and sectioned.
    pub shape_changed: bool,
}

impl<T> Default for Transaction<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Transaction<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            depth: 0,
            snapshot: Vec::new(),
            unpopulated: false,
            shape_changed: false,
        }
    }

    pub fn state(&self) -> TransactionState {
        match self.depth {
            0 => TransactionState::Idle,
            depth => TransactionState::InTransaction { depth },
        }
    }

    /// Opens a level. Returns true if this opened the outermost one, in
    /// which case `visible` was snapshotted and `populated` recorded.
    pub fn begin(&mut self, visible: &[Vec<T>], populated: bool) -> bool
    where
        T: Clone,
    {
        self.depth += 1;
        if self.depth > 1 {
            return false;
        }
        self.snapshot = visible.to_vec();
        self.unpopulated = !populated;
        self.shape_changed = false;
        true
    }

    /// Records that the raw data changed shape inside this transaction.
    pub fn mark_shape_changed(&mut self) {
        self.shape_changed = true;
    }

    /// Closes a level. Returns the closed state once the outermost level
    /// closes, `None` while still nested.
    ///
    /// Only the outermost call decides whether filters are re-run; nested
    /// calls ignore `reapply_filters`. An `end` without a matching `begin`
    /// is logged and ignored.
    pub fn end(&mut self, reapply_filters: bool) -> Option<Closed<T>> {
        if self.depth == 0 {
            warn!("transaction end without matching begin");
            return None;
        }
        self.depth -= 1;
        if self.depth > 0 {
            return None;
        }
        Some(Closed {
            snapshot: std::mem::take(&mut self.snapshot),
            reapply_filters,
            unpopulated: self.unpopulated,
            shape_changed: self.shape_changed,
        })
    }
}

/// Why a batch was collapsed into a reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadReason {
    /// The data was set for the first time, so there is no rendered state
    /// to diff.
    FirstLoad,
    /// The data switched between flat and sectioned addressing.
    ShapeChanged,
    /// The batch exceeded the configured size limit.
    TooManyChanges { count: usize, limit: usize },
}

impl fmt::Display for ReloadReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FirstLoad => f.write_str("first load"),
            Self::ShapeChanged => f.write_str("shape changed"),
            Self::TooManyChanges { count, limit } => {
                write!(f, "{count} changes exceed limit of {limit}")
            }
        }
    }
}

/// The notifications one closed transaction produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch<T> {
    changes: Vec<Change<T>>,
    reload: Option<ReloadReason>,
}

impl<T> Batch<T> {
    /// A batch of granular changes, already in delivery order.
    #[must_use]
    pub fn changes(changes: Vec<Change<T>>) -> Self {
        Self {
            changes,
            reload: None,
        }
    }

    /// A reload; carries no granular changes.
    #[must_use]
    pub fn reload(reason: ReloadReason) -> Self {
        Self {
            changes: Vec::new(),
            reload: Some(reason),
        }
    }

    /// Collapses the batch into a reload if it holds more than `limit`
    /// changes.
    #[must_use]
    pub fn limited_to(self, limit: Option<usize>) -> Self {
        match limit {
            Some(limit) if self.changes.len() > limit => Self::reload(ReloadReason::TooManyChanges {
                count: self.changes.len(),
                limit,
            }),
            _ => self,
        }
    }

    pub fn reload_reason(&self) -> Option<ReloadReason> {
        self.reload
    }

    pub fn is_reload(&self) -> bool {
        self.reload.is_some()
    }

    /// Granular changes; empty for reloads.
    pub fn pending(&self) -> &[Change<T>] {
        &self.changes
    }

    /// Returns true if delivering this batch would notify nothing.
    pub fn is_empty(&self) -> bool {
        self.reload.is_none() && self.changes.is_empty()
    }

    /// Sends the batch to the sink, consuming it.
    pub fn deliver(self, sink: &dyn ResultsSink<T>) {
        if self.reload.is_some() {
            sink.should_reload();
            return;
        }
        if self.changes.is_empty() {
            return;
        }
        sink.will_change_content();
        for change in &self.changes {
            deliver_change(sink, change);
        }
        sink.did_change_content();
    }
}
