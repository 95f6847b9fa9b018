//! Sectioned diff.
//!
//! Sections are aligned by position: surplus old sections are deleted from
//! the tail, surplus new sections are inserted at the tail. Section identity
//! is never inferred from content.
//!
//! Records are matched across the whole collection through an [`Identity`],
//! so a record may move between sections. Each old record is claimed by at
//! most one new record, in new order. Within each aligned section pair the
//! matched records forming the longest run of preserved relative order are
//! left in place; every other matched record is reported as a move. A move
//! carries the new version of the record and is never also reported as an
//! update.
//!
//! Output order: section deletes (descending), section inserts (ascending),
//! item deletes (descending old position), updates (ascending old position),
//! moves and inserts (each ascending new position).

use crate::Identity;
use filterable_types::{Change, Position};
use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::Hash;
use tracing::trace;

/// Computes the ordered changes that turn `old` into `new`.
pub fn diff<T, K>(old: &[Vec<T>], new: &[Vec<T>], identity: &Identity<T, K>) -> Vec<Change<T>>
where
    T: Clone + PartialEq,
    K: Eq + Hash,
{
    let old_flat: Vec<(Position, &T)> = enumerate(old).collect();
    let matches = match_records(&old_flat, new, identity);

    let mut claimed = vec![false; old_flat.len()];
    for old_index in matches.iter().flatten().flatten() {
        claimed[*old_index] = true;
    }

    let stable = stable_records(&old_flat, &matches, old.len());

    let mut changes = Vec::new();

    for index in (new.len()..old.len()).rev() {
        changes.push(Change::SectionDelete { index });
    }
    for index in old.len()..new.len() {
        changes.push(Change::SectionInsert { index });
    }

    let section_changes = changes.len();
    for (old_index, (position, record)) in old_flat.iter().enumerate().rev() {
        if !claimed[old_index] {
            changes.push(Change::Delete {
                record: (*record).clone(),
                old: *position,
            });
        }
    }

    let mut updates = Vec::new();
    let mut moves = Vec::new();
    let mut inserts = Vec::new();

    for (section, records) in new.iter().enumerate() {
        for (item, record) in records.iter().enumerate() {
            let new_position = Position::new(section, item);
            match matches[section][item] {
                None => inserts.push(Change::Insert {
                    record: record.clone(),
                    new: new_position,
                }),
                Some(old_index) => {
                    let (old_position, old_record) = old_flat[old_index];
                    if !stable.contains(&old_index) {
                        moves.push(Change::Move {
                            record: record.clone(),
                            old: old_position,
                            new: new_position,
                        });
                    } else if old_record != record {
                        updates.push((
                            old_position,
                            Change::Update {
                                record: record.clone(),
                                old: old_position,
                            },
                        ));
                    }
                }
            }
        }
    }

    updates.sort_by_key(|(position, _)| *position);

    trace!(
        sections_before = old.len(),
        sections_after = new.len(),
        deletes = changes.len() - section_changes,
        updates = updates.len(),
        moves = moves.len(),
        inserts = inserts.len(),
        "computed sectioned diff"
    );

    changes.extend(updates.into_iter().map(|(_, change)| change));
    changes.extend(moves);
    changes.extend(inserts);
    changes
}

/// Replays `changes` onto a copy of `old`.
///
/// Positions are read with batch-update semantics: deletes, updates and the
/// source of moves address `old`; inserts and the target of moves address
/// the result. Useful for sinks that keep a mirror of rendered content.
pub fn apply_changes<T: Clone>(old: &[Vec<T>], changes: &[Change<T>]) -> Vec<Vec<T>> {
    let mut removed = HashSet::new();
    let mut replaced = HashMap::new();
    let mut deleted_sections = HashSet::new();
    let mut inserted_sections = Vec::new();
    let mut placed = HashMap::new();

    for change in changes {
        match change {
            Change::Delete { old, .. } => {
                removed.insert(*old);
            }
            Change::Move { record, old, new } => {
                removed.insert(*old);
                placed.insert(*new, record.clone());
            }
            Change::Update { record, old } => {
                replaced.insert(*old, record.clone());
            }
            Change::Insert { record, new } => {
                placed.insert(*new, record.clone());
            }
            Change::SectionDelete { index } => {
                deleted_sections.insert(*index);
            }
            Change::SectionInsert { index } => inserted_sections.push(*index),
        }
    }

    let mut survivors: Vec<VecDeque<T>> = old
        .iter()
        .enumerate()
        .filter(|(section, _)| !deleted_sections.contains(section))
        .map(|(section, records)| {
            records
                .iter()
                .enumerate()
                .filter_map(|(item, record)| {
                    let position = Position::new(section, item);
                    if removed.contains(&position) {
                        return None;
                    }
                    Some(replaced.get(&position).unwrap_or(record).clone())
                })
                .collect()
        })
        .collect();

    inserted_sections.sort_unstable();
    for index in inserted_sections {
        let index = index.min(survivors.len());
        survivors.insert(index, VecDeque::new());
    }

    survivors
        .into_iter()
        .enumerate()
        .map(|(section, mut kept)| {
            let incoming = placed.keys().filter(|p| p.section == section).count();
            let total = kept.len() + incoming;
            let mut records = Vec::with_capacity(total);
            for item in 0..total {
                let position = Position::new(section, item);
                match placed.remove(&position) {
                    Some(record) => records.push(record),
                    None => match kept.pop_front() {
                        Some(record) => records.push(record),
                        None => break,
                    },
                }
            }
            records
        })
        .collect()
}

fn enumerate<T>(sections: &[Vec<T>]) -> impl Iterator<Item = (Position, &T)> {
    sections.iter().enumerate().flat_map(|(section, records)| {
        records
            .iter()
            .enumerate()
            .map(move |(item, record)| (Position::new(section, item), record))
    })
}

/// For every new record, the flat index of the old record it claimed.
fn match_records<T, K>(
    old_flat: &[(Position, &T)],
    new: &[Vec<T>],
    identity: &Identity<T, K>,
) -> Vec<Vec<Option<usize>>>
where
    T: PartialEq,
    K: Eq + Hash,
{
    if identity.is_keyed() {
        let mut by_key: HashMap<K, VecDeque<usize>> = HashMap::new();
        for (old_index, (_, record)) in old_flat.iter().enumerate() {
            if let Some(key) = identity.key_of(record) {
                by_key.entry(key).or_default().push_back(old_index);
            }
        }
        new.iter()
            .map(|records| {
                records
                    .iter()
                    .map(|record| {
                        identity
                            .key_of(record)
                            .and_then(|key| by_key.get_mut(&key))
                            .and_then(VecDeque::pop_front)
                    })
                    .collect()
            })
            .collect()
    } else {
        let mut claimed = vec![false; old_flat.len()];
        new.iter()
            .map(|records| {
                records
                    .iter()
                    .map(|record| {
                        let found = old_flat
                            .iter()
                            .enumerate()
                            .position(|(old_index, (_, candidate))| {
                                !claimed[old_index] && *candidate == record
                            })?;
                        claimed[found] = true;
                        Some(found)
                    })
                    .collect()
            })
            .collect()
    }
}

/// Old flat indices of matched records that keep their place.
fn stable_records<T>(
    old_flat: &[(Position, &T)],
    matches: &[Vec<Option<usize>>],
    old_sections: usize,
) -> HashSet<usize> {
    let mut stable = HashSet::new();
    for (section, matched) in matches.iter().enumerate().take(old_sections) {
        let candidates: Vec<usize> = matched
            .iter()
            .flatten()
            .copied()
            .filter(|old_index| old_flat[*old_index].0.section == section)
            .collect();
        let items: Vec<usize> = candidates
            .iter()
            .map(|old_index| old_flat[*old_index].0.item)
            .collect();
        stable.extend(
            longest_increasing_subsequence(&items)
                .into_iter()
                .map(|i| candidates[i]),
        );
    }
    stable
}

/// Indices into `seq` of one longest strictly increasing subsequence.
fn longest_increasing_subsequence(seq: &[usize]) -> Vec<usize> {
    // tails[len - 1] is the index in `seq` ending the best run of length `len`.
    let mut tails: Vec<usize> = Vec::new();
    let mut previous = vec![None; seq.len()];
    for (i, value) in seq.iter().enumerate() {
        let slot = tails.partition_point(|&t| seq[t] < *value);
        if slot > 0 {
            previous[i] = Some(tails[slot - 1]);
        }
        if slot == tails.len() {
            tails.push(i);
        } else {
            tails[slot] = i;
        }
    }
    let mut run = Vec::with_capacity(tails.len());
    let mut cursor = tails.last().copied();
    while let Some(i) = cursor {
        run.push(i);
        cursor = previous[i];
    }
    run.reverse();
    run
}
