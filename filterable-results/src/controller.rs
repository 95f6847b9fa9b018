//! The results controller.
//!
//! Owns the raw collection, the active filter set, and the visible
//! projection. Every mutation runs inside a transaction: the outermost
//! `begin` snapshots the visible collection, the outermost `end` recomputes
//! it, diffs snapshot against result and hands the batch to the sink.
//!
//! Raw and visible collections are addressed independently. For flat data
//! the section of a supplied [`Position`] is ignored and reported positions
//! always use section 0.
//!
//! While a transaction is open, raw reads see every mutation made so far but
//! visible reads (`filtered_object_at`, counts) still see the snapshot state
//! until the outermost `end`.

use crate::config::ControllerConfig;
use crate::sink::ResultsSink;
use crate::transaction::{Batch, Closed, ReloadReason, Transaction, TransactionState};
use crate::{Filter, FilterSet};
use filterable_diff::{diff, Identity, Nested};
use filterable_types::{Collection, Error, Position, Result, Sections, Shape};
use std::cmp::Ordering;
use std::hash::Hash;
use std::rc::{Rc, Weak};
use tracing::{debug, trace};

/// Filterable, sectioned results with minimal change notifications.
///
/// `K` is the identity key type. With the default `()` records are matched
/// by full equality; use [`with_key`](Self::with_key) to match by key, which
/// lets a changed version of a record replace (and update) its old one.
pub struct FilterableResultsController<T, K = ()> {
    raw: Option<Sections<T>>,
    shape: Shape,
    visible: Sections<T>,
    filters: FilterSet<T>,
    identity: Identity<T, K>,
    config: ControllerConfig,
    transaction: Transaction<T>,
    sink: Option<Weak<dyn ResultsSink<T>>>,
}

impl<T> FilterableResultsController<T, ()>
where
    T: Clone + PartialEq,
{
    /// Creates a controller matching records by full equality.
    #[must_use]
    pub fn new() -> Self {
        Self::with_identity(Identity::by_equality())
    }
}

impl<T> Default for FilterableResultsController<T, ()>
where
    T: Clone + PartialEq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, K> FilterableResultsController<T, K>
where
    T: Clone + PartialEq,
    K: Eq + Hash,
{
    /// Creates a controller matching records by the extracted key.
    #[must_use]
    pub fn with_key(key: impl Fn(&T) -> K + 'static) -> Self {
        Self::with_identity(Identity::by_key(key))
    }

    /// Creates a controller with an explicit identity policy.
    #[must_use]
    pub fn with_identity(identity: Identity<T, K>) -> Self {
        Self {
            raw: None,
            shape: Shape::Flat,
            visible: Vec::new(),
            filters: FilterSet::new(),
            identity,
            config: ControllerConfig::default(),
            transaction: Transaction::new(),
            sink: None,
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Attaches the notification sink. Only a weak reference is kept.
    pub fn set_sink<S>(&mut self, sink: &Rc<S>)
    where
        S: ResultsSink<T> + 'static,
    {
        let weak: Weak<S> = Rc::downgrade(sink);
        let weak: Weak<dyn ResultsSink<T>> = weak;
        self.sink = Some(weak);
    }

    pub fn clear_sink(&mut self) {
        self.sink = None;
    }

    fn live_sink(&self) -> Option<Rc<dyn ResultsSink<T>>> {
        self.sink.as_ref().and_then(Weak::upgrade)
    }

    // ── Transactions ─────────────────────────────────────────────

    pub fn transaction_state(&self) -> TransactionState {
        self.transaction.state()
    }

    /// Returns true once data has been set.
    pub fn has_loaded(&self) -> bool {
        self.raw.is_some()
    }

    /// Opens a (possibly nested) batch of changes.
    pub fn begin_changes(&mut self) {
        if self.transaction.begin(&self.visible, self.raw.is_some()) {
            trace!("transaction opened");
        }
    }

    /// Closes a batch level. The outermost close re-runs the filters and
    /// notifies the sink.
    pub fn end_changes(&mut self) {
        if let Some(closed) = self.transaction.end(true) {
            self.flush(closed);
        }
    }

    /// Closes a batch level. The outermost close notifies the sink without
    /// re-running the filters, whatever nested levels asked for; with no
    /// active filters the visible collection still mirrors the raw one.
    pub fn end_changes_without_filters(&mut self) {
        if let Some(closed) = self.transaction.end(false) {
            self.flush(closed);
        }
    }

    fn mutate<R>(&mut self, change: impl FnOnce(&mut Self) -> R) -> R {
        self.begin_changes();
        let result = change(self);
        self.end_changes();
        result
    }

    fn flush(&mut self, closed: Closed<T>) {
        if closed.reapply_filters || self.filters.is_empty() {
            self.visible = self
                .filters
                .apply(self.raw_sections(), self.config.retain_empty_sections);
        }

        let Some(sink) = self.live_sink() else {
            trace!("no live sink, notifications skipped");
            return;
        };

        let batch = if closed.unpopulated && self.raw.is_some() {
            Batch::reload(ReloadReason::FirstLoad)
        } else if closed.shape_changed && self.config.reload_on_shape_change {
            Batch::reload(ReloadReason::ShapeChanged)
        } else {
            Batch::changes(diff(&closed.snapshot, &self.visible, &self.identity))
                .limited_to(self.config.max_batch_changes)
        };

        if batch.is_empty() {
            trace!("transaction closed without visible changes");
            return;
        }
        match batch.reload_reason() {
            Some(reason) => debug!(%reason, "requesting reload"),
            None => debug!(changes = batch.pending().len(), "delivering changes"),
        }

        batch.deliver(&*sink);

        if self.visible.iter().all(Vec::is_empty) {
            sink.has_no_data();
        }
    }

    // ── Data ─────────────────────────────────────────────────────

    /// Replaces all data. The shape of `data` is remembered and returned by
    /// [`data`](Self::data).
    pub fn set_data(&mut self, data: impl Into<Collection<T>>) {
        let data = data.into();
        let shape = data.shape();
        self.mutate(|this| {
            if this.raw.is_some() && this.shape != shape {
                debug!(from = ?this.shape, to = ?shape, "data shape changed");
                this.transaction.mark_shape_changed();
            }
            this.shape = shape;
            this.raw = Some(data.into_sections());
        });
    }

    /// Returns the raw data in the shape it was supplied, or `None` before
    /// any data was set.
    pub fn data(&self) -> Option<Collection<T>> {
        self.raw
            .as_ref()
            .map(|sections| Collection::from_sections(self.shape, sections.clone()))
    }

    /// Returns every raw record in section order.
    pub fn all_objects(&self) -> Vec<T> {
        self.data()
            .map(|data| Nested::from(data).into_flat())
            .unwrap_or_default()
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    fn raw_sections(&self) -> &[Vec<T>] {
        self.raw.as_deref().unwrap_or(&[])
    }

    fn raw_sections_mut(&mut self) -> &mut Sections<T> {
        self.raw.get_or_insert_with(Vec::new)
    }

    fn address(&self, position: Position) -> Position {
        match self.shape {
            Shape::Flat => position.flattened(),
            Shape::Sectioned => position,
        }
    }

    /// Maps a supplied raw position to a valid stored one.
    fn checked_position(&self, position: Position) -> Result<Position> {
        let stored = self.address(position);
        self.raw_sections()
            .get(stored.section)
            .filter(|records| stored.item < records.len())
            .map(|_| stored)
            .ok_or(Error::OutOfRange { position })
    }

    fn checked_section(&self, index: usize) -> Result<()> {
        let len = self.raw_sections().len();
        if index < len {
            Ok(())
        } else {
            Err(Error::SectionOutOfRange { index, len })
        }
    }

    /// Section operations need sectioned data. A controller with no data
    /// yet adopts the sectioned shape.
    fn require_sectioned(&self, operation: &'static str) -> Result<()> {
        if self.raw.is_some() && self.shape == Shape::Flat {
            return Err(Error::NotSectioned { operation });
        }
        Ok(())
    }

    // ── Records ──────────────────────────────────────────────────

    /// Appends a record to the last section, creating one if there is none.
    pub fn add_object(&mut self, record: T) {
        self.mutate(|this| {
            let sections = this.raw_sections_mut();
            if sections.is_empty() {
                sections.push(Vec::new());
            }
            if let Some(last) = sections.last_mut() {
                last.push(record);
            }
        });
    }

    /// Appends a record to the given section. Flat data ignores `section`.
    pub fn add_object_in_section(&mut self, record: T, section: usize) -> Result<()> {
        if self.shape == Shape::Flat {
            self.add_object(record);
            return Ok(());
        }
        self.checked_section(section)?;
        self.mutate(|this| this.raw_sections_mut()[section].push(record));
        Ok(())
    }

    /// Removes the first record with the same identity. Returns the removed
    /// record, or `None` if there was none.
    pub fn remove_object(&mut self, record: &T) -> Option<T> {
        let Some(position) = self.identity.position_of(record, self.raw_sections()) else {
            debug!("remove_object: record not found");
            return None;
        };
        Some(self.remove_stored(position))
    }

    /// Removes the first record with the given key.
    pub fn remove_object_with_key(&mut self, key: &K) -> Result<Option<T>> {
        let Some(position) = self.identity.position_of_key(key, self.raw_sections())? else {
            debug!("remove_object_with_key: key not found");
            return Ok(None);
        };
        Ok(Some(self.remove_stored(position)))
    }

    /// Removes and returns the record at a raw position.
    pub fn remove_object_at(&mut self, position: Position) -> Result<T> {
        let position = self.checked_position(position)?;
        Ok(self.remove_stored(position))
    }

    fn remove_stored(&mut self, position: Position) -> T {
        self.mutate(|this| this.raw_sections_mut()[position.section].remove(position.item))
    }

    /// Replaces the first record with the same identity by `record`.
    /// Returns the replaced record.
    pub fn replace_object(&mut self, record: T) -> Option<T> {
        let Some(position) = self.identity.position_of(&record, self.raw_sections()) else {
            debug!("replace_object: record not found");
            return None;
        };
        Some(self.replace_stored(position, record))
    }

    /// Replaces the first record with the same identity as `existing` by
    /// `replacement`. Returns the replaced record.
    pub fn replace_object_with(&mut self, existing: &T, replacement: T) -> Option<T> {
        let Some(position) = self.identity.position_of(existing, self.raw_sections()) else {
            debug!("replace_object_with: record not found");
            return None;
        };
        Some(self.replace_stored(position, replacement))
    }

    /// Replaces the record at a raw position. Returns the replaced record.
    pub fn replace_object_at(&mut self, position: Position, record: T) -> Result<T> {
        let position = self.checked_position(position)?;
        Ok(self.replace_stored(position, record))
    }

    fn replace_stored(&mut self, position: Position, record: T) -> T {
        self.mutate(|this| {
            std::mem::replace(
                &mut this.raw_sections_mut()[position.section][position.item],
                record,
            )
        })
    }

    /// Replaces every record that has a counterpart; records without one
    /// are ignored. Returns how many were replaced.
    pub fn replace_objects(&mut self, records: Vec<T>) -> usize {
        self.mutate(|this| {
            let mut replaced = 0;
            for record in records {
                if this.replace_in_place(record).is_none() {
                    replaced += 1;
                }
            }
            debug!(replaced, "replace_objects");
            replaced
        })
    }

    /// Replaces every record that has a counterpart and appends the rest to
    /// the last section.
    pub fn merge_objects(&mut self, records: Vec<T>) {
        self.mutate(|this| {
            for record in records {
                if let Some(unmatched) = this.replace_in_place(record) {
                    this.last_section_mut().push(unmatched);
                }
            }
        });
    }

    /// Like [`merge_objects`](Self::merge_objects), but records without a
    /// counterpart are appended to the last section, which is then sorted
    /// with `compare`. The sort is stable, so equal records keep their
    /// relative order.
    pub fn merge_objects_sorted(&mut self, records: Vec<T>, compare: impl Fn(&T, &T) -> Ordering) {
        self.mutate(|this| {
            for record in records {
                if let Some(unmatched) = this.replace_in_place(record) {
                    this.last_section_mut().push(unmatched);
                }
            }
            if let Some(last) = this.raw.as_mut().and_then(|sections| sections.last_mut()) {
                last.sort_by(|a, b| compare(a, b));
            }
        });
    }

    /// Replaces the counterpart of `record`, handing `record` back if there
    /// is none.
    fn replace_in_place(&mut self, record: T) -> Option<T> {
        match self.identity.position_of(&record, self.raw_sections()) {
            Some(position) => {
                self.raw_sections_mut()[position.section][position.item] = record;
                None
            }
            None => Some(record),
        }
    }

    fn last_section_mut(&mut self) -> &mut Vec<T> {
        let sections = self.raw_sections_mut();
        if sections.is_empty() {
            sections.push(Vec::new());
        }
        let last = sections.len() - 1;
        &mut sections[last]
    }

    // ── Sections ─────────────────────────────────────────────────

    /// Appends a section.
    pub fn add_section(&mut self, records: Vec<T>) -> Result<()> {
        self.require_sectioned("add_section")?;
        self.mutate(|this| {
            this.shape = Shape::Sectioned;
            this.raw_sections_mut().push(records);
        });
        Ok(())
    }

    /// Inserts a section at `index`, which may equal the section count.
    pub fn insert_section(&mut self, records: Vec<T>, index: usize) -> Result<()> {
        self.require_sectioned("insert_section")?;
        let len = self.raw_sections().len();
        if index > len {
            return Err(Error::SectionOutOfRange { index, len });
        }
        self.mutate(|this| {
            this.shape = Shape::Sectioned;
            this.raw_sections_mut().insert(index, records);
        });
        Ok(())
    }

    /// Removes the first section equal to `section`.
    pub fn remove_section(&mut self, section: &[T]) -> Result<Option<Vec<T>>> {
        self.require_sectioned("remove_section")?;
        let Some(index) = self.section_index(section) else {
            debug!("remove_section: section not found");
            return Ok(None);
        };
        Ok(Some(self.mutate(|this| this.raw_sections_mut().remove(index))))
    }

    /// Replaces the first section equal to `section`. Returns the replaced
    /// section.
    pub fn replace_section(&mut self, section: &[T], records: Vec<T>) -> Result<Option<Vec<T>>> {
        self.require_sectioned("replace_section")?;
        let Some(index) = self.section_index(section) else {
            debug!("replace_section: section not found");
            return Ok(None);
        };
        Ok(Some(self.replace_section_stored(index, records)))
    }

    /// Replaces the section at `index`. Returns the replaced section.
    pub fn replace_section_at(&mut self, index: usize, records: Vec<T>) -> Result<Vec<T>> {
        self.require_sectioned("replace_section_at")?;
        self.checked_section(index)?;
        Ok(self.replace_section_stored(index, records))
    }

    fn replace_section_stored(&mut self, index: usize, records: Vec<T>) -> Vec<T> {
        self.mutate(|this| std::mem::replace(&mut this.raw_sections_mut()[index], records))
    }

    fn section_index(&self, section: &[T]) -> Option<usize> {
        self.raw_sections()
            .iter()
            .position(|existing| existing.as_slice() == section)
    }

    // ── Filters ──────────────────────────────────────────────────

    /// Adds a filter, replacing any active filter of the same group.
    ///
    /// The sink may refuse it through
    /// [`should_apply_filter`](ResultsSink::should_apply_filter). Returns
    /// true if the filter was applied.
    pub fn add_filter(&mut self, filter: Filter<T>) -> bool {
        self.mutate(|this| this.apply_filter(filter))
    }

    /// Adds several filters in one transaction. Returns how many were
    /// applied.
    pub fn add_filters(&mut self, filters: impl IntoIterator<Item = Filter<T>>) -> usize {
        self.mutate(|this| {
            filters
                .into_iter()
                .map(|filter| this.apply_filter(filter))
                .filter(|applied| *applied)
                .count()
        })
    }

    /// Removes an active filter. Returns true if it was active.
    pub fn remove_filter(&mut self, filter: &Filter<T>) -> bool {
        self.mutate(|this| this.filters.remove(filter))
    }

    /// Clears the active filters, then adds `filters`, in one transaction.
    pub fn replace_filters(&mut self, filters: impl IntoIterator<Item = Filter<T>>) -> usize {
        self.mutate(|this| {
            this.filters.clear();
            filters
                .into_iter()
                .map(|filter| this.apply_filter(filter))
                .filter(|applied| *applied)
                .count()
        })
    }

    pub fn clear_filters(&mut self) {
        self.mutate(|this| this.filters.clear());
    }

    pub fn applied_filters(&self) -> &[Filter<T>] {
        self.filters.filters()
    }

    pub fn is_filtered(&self) -> bool {
        !self.filters.is_empty()
    }

    fn apply_filter(&mut self, filter: Filter<T>) -> bool {
        let sink = self.live_sink();
        if !sink.as_ref().is_none_or(|sink| sink.should_apply_filter(&filter)) {
            debug!(title = ?filter.title(), group = ?filter.group(), "filter refused by sink");
            return false;
        }
        if let Some(replaced) = self.filters.add(filter.clone()) {
            trace!(title = ?replaced.title(), group = ?replaced.group(), "filter replaced");
        }
        if let Some(sink) = &sink {
            sink.did_apply_filter(&filter);
        }
        true
    }

    // ── Lookups ──────────────────────────────────────────────────

    /// Returns the raw record at a position.
    pub fn object_at(&self, position: Position) -> Result<&T> {
        let stored = self.checked_position(position)?;
        Ok(&self.raw_sections()[stored.section][stored.item])
    }

    /// Returns the visible record at a position.
    pub fn filtered_object_at(&self, position: Position) -> Result<&T> {
        let stored = self.address(position);
        self.visible
            .get(stored.section)
            .and_then(|records| records.get(stored.item))
            .ok_or(Error::OutOfRange { position })
    }

    /// Returns the first raw record with the given key.
    pub fn object_with_key(&self, key: &K) -> Result<Option<&T>> {
        Ok(self
            .identity
            .position_of_key(key, self.raw_sections())?
            .map(|position| &self.raw_sections()[position.section][position.item]))
    }

    /// Returns the raw position of the first record with the same identity.
    pub fn position_of_object(&self, record: &T) -> Option<Position> {
        self.identity.position_of(record, self.raw_sections())
    }

    /// Returns the raw position of the first record with the given key.
    pub fn position_of_object_with_key(&self, key: &K) -> Result<Option<Position>> {
        self.identity.position_of_key(key, self.raw_sections())
    }

    // ── Data source ──────────────────────────────────────────────

    /// Number of visible sections.
    pub fn number_of_sections(&self) -> usize {
        self.visible.len()
    }

    /// Number of visible records in a section.
    pub fn number_of_items_in_section(&self, section: usize) -> Result<usize> {
        self.visible
            .get(section)
            .map(Vec::len)
            .ok_or(Error::SectionOutOfRange {
                index: section,
                len: self.visible.len(),
            })
    }

    /// The visible collection.
    pub fn visible_sections(&self) -> &[Vec<T>] {
        &self.visible
    }

    pub fn title_for_header(&self, section: usize) -> Option<String> {
        self.live_sink()?.title_for_header(section)
    }

    pub fn title_for_footer(&self, section: usize) -> Option<String> {
        self.live_sink()?.title_for_footer(section)
    }

    pub fn section_index_title(&self, section_name: &str) -> Option<String> {
        self.live_sink()?.section_index_title(section_name)
    }
}
