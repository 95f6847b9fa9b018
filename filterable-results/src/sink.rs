//! The notification sink a rendering surface implements.

use crate::Filter;
use filterable_types::{Change, ChangeKind, Position};

/// Receives change notifications from a results controller.
///
/// The controller holds its sink weakly and never keeps it alive; once the
/// sink is dropped, notifications are skipped. Methods take `&self`, so
/// implementors that record state use interior mutability.
///
/// Per outermost transaction a sink sees either one [`should_reload`] or one
/// bracket of [`will_change_content`], object and section changes, then
/// [`did_change_content`]. Never both, and never a partial bracket.
///
/// Everything after [`should_reload`] is an optional query or informational
/// hook with a no-op default.
///
/// [`should_reload`]: ResultsSink::should_reload
/// [`will_change_content`]: ResultsSink::will_change_content
/// [`did_change_content`]: ResultsSink::did_change_content
pub trait ResultsSink<T> {
    /// A batch of granular changes is about to be delivered.
    fn will_change_content(&self);

    /// A record changed.
    ///
    /// `old` is absent for inserts. `new` is absent for deletes and updates.
    fn did_change_object(
        &self,
        record: &T,
        old: Option<Position>,
        kind: ChangeKind,
        new: Option<Position>,
    );

    /// A section was inserted or deleted.
    fn did_change_section(&self, index: usize, kind: ChangeKind);

    /// The batch is complete.
    fn did_change_content(&self);

    /// The content changed too much to describe; reload everything.
    fn should_reload(&self);

    /// Asked before a filter is added. Returning false skips the filter.
    fn should_apply_filter(&self, filter: &Filter<T>) -> bool {
        let _ = filter;
        true
    }

    /// A filter was added to the active set.
    fn did_apply_filter(&self, filter: &Filter<T>) {
        let _ = filter;
    }

    /// Title for the header of a visible section.
    fn title_for_header(&self, section: usize) -> Option<String> {
        let _ = section;
        None
    }

    /// Title for the footer of a visible section.
    fn title_for_footer(&self, section: usize) -> Option<String> {
        let _ = section;
        None
    }

    /// Index title for a named section.
    fn section_index_title(&self, section_name: &str) -> Option<String> {
        let _ = section_name;
        None
    }

    /// The visible collection has no records after a change.
    fn has_no_data(&self) {}
}

/// Forwards one change to the matching sink callback.
pub(crate) fn deliver_change<T>(sink: &dyn ResultsSink<T>, change: &Change<T>) {
    match change {
        Change::SectionInsert { index } | Change::SectionDelete { index } => {
            sink.did_change_section(*index, change.kind());
        }
        Change::Insert { record, .. }
        | Change::Delete { record, .. }
        | Change::Move { record, .. }
        | Change::Update { record, .. } => {
            sink.did_change_object(
                record,
                change.old_position(),
                change.kind(),
                change.new_position(),
            );
        }
    }
}
