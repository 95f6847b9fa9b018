//! Shared test helpers for controller tests.

#![allow(dead_code)]

use filterable_results::{ChangeKind, Filter, Position, ResultsSink};
use std::cell::RefCell;
use std::collections::HashMap;

/// One notification as a sink received it.
#[derive(Debug, Clone, PartialEq)]
pub enum Note<T> {
    Will,
    Object {
        record: T,
        old: Option<Position>,
        kind: ChangeKind,
        new: Option<Position>,
    },
    Section {
        index: usize,
        kind: ChangeKind,
    },
    Did,
    Reload,
    NoData,
    Applied(Option<String>),
}

/// Records every notification in order.
pub struct RecordingSink<T> {
    notes: RefCell<Vec<Note<T>>>,
    refused_group: Option<String>,
    headers: HashMap<usize, String>,
}

impl<T> Default for RecordingSink<T> {
    fn default() -> Self {
        Self {
            notes: RefCell::new(Vec::new()),
            refused_group: None,
            headers: HashMap::new(),
        }
    }
}

impl<T> RecordingSink<T> {
    /// A sink that refuses every filter of the given group.
    pub fn refusing(group: &str) -> Self {
        Self {
            refused_group: Some(group.to_string()),
            ..Self::default()
        }
    }

    /// A sink that titles section headers.
    pub fn with_headers(headers: &[(usize, &str)]) -> Self {
        Self {
            headers: headers
                .iter()
                .map(|(section, title)| (*section, title.to_string()))
                .collect(),
            ..Self::default()
        }
    }

    /// Drains the notifications received so far.
    pub fn take(&self) -> Vec<Note<T>> {
        std::mem::take(&mut *self.notes.borrow_mut())
    }

    fn push(&self, note: Note<T>) {
        self.notes.borrow_mut().push(note);
    }
}

impl<T: Clone> ResultsSink<T> for RecordingSink<T> {
    fn will_change_content(&self) {
        self.push(Note::Will);
    }

    fn did_change_object(
        &self,
        record: &T,
        old: Option<Position>,
        kind: ChangeKind,
        new: Option<Position>,
    ) {
        self.push(Note::Object {
            record: record.clone(),
            old,
            kind,
            new,
        });
    }

    fn did_change_section(&self, index: usize, kind: ChangeKind) {
        self.push(Note::Section { index, kind });
    }

    fn did_change_content(&self) {
        self.push(Note::Did);
    }

    fn should_reload(&self) {
        self.push(Note::Reload);
    }

    fn should_apply_filter(&self, filter: &Filter<T>) -> bool {
        self.refused_group.is_none() || filter.group() != self.refused_group.as_deref()
    }

    fn did_apply_filter(&self, filter: &Filter<T>) {
        self.push(Note::Applied(filter.title().map(str::to_string)));
    }

    fn title_for_header(&self, section: usize) -> Option<String> {
        self.headers.get(&section).cloned()
    }

    fn section_index_title(&self, section_name: &str) -> Option<String> {
        section_name.chars().next().map(|c| c.to_uppercase().to_string())
    }

    fn has_no_data(&self) {
        self.push(Note::NoData);
    }
}

pub fn insert<T>(record: T, new: (usize, usize)) -> Note<T> {
    Note::Object {
        record,
        old: None,
        kind: ChangeKind::Insert,
        new: Some(new.into()),
    }
}

pub fn delete<T>(record: T, old: (usize, usize)) -> Note<T> {
    Note::Object {
        record,
        old: Some(old.into()),
        kind: ChangeKind::Delete,
        new: None,
    }
}

pub fn update<T>(record: T, old: (usize, usize)) -> Note<T> {
    Note::Object {
        record,
        old: Some(old.into()),
        kind: ChangeKind::Update,
        new: None,
    }
}

pub fn moved<T>(record: T, old: (usize, usize), new: (usize, usize)) -> Note<T> {
    Note::Object {
        record,
        old: Some(old.into()),
        kind: ChangeKind::Move,
        new: Some(new.into()),
    }
}

/// Installs a test-friendly tracing subscriber. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
