//! Sibling order allocation.
//!
//! # Responsibility
//! - Pick the append position for a node entering a sibling group.
//! - Turn a caller-supplied id sequence into dense `0..N` assignments.
//! - Check that a reorder request names exactly the live sibling group.
//!
//! # Invariants
//! - After `reindex`, the group's orders are exactly `{0, 1, ..., N-1}`.
//! - Membership is checked before any assignment is produced by callers;
//!   nothing here mutates state.

use std::collections::HashSet;
use std::hash::Hash;

/// Append position for a sibling group whose current maximum is `max_order`.
///
/// Returns `0` for an empty group.
pub fn next_order(max_order: Option<i64>) -> i64 {
    max_order.map_or(0, |max| max.saturating_add(1).max(0))
}

/// Dense assignments in the given sequence order, 0-based.
pub fn reindex<Id: Copy>(ordered_ids: &[Id]) -> Vec<(Id, i64)> {
    ordered_ids
        .iter()
        .enumerate()
        .map(|(position, id)| (*id, position as i64))
        .collect()
}

/// Differences between a requested sequence and the live sibling group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipMismatch<Id> {
    /// Live members absent from the request.
    pub missing: Vec<Id>,
    /// Requested ids that are not live members of the group.
    pub unexpected: Vec<Id>,
    /// Ids listed more than once.
    pub duplicated: Vec<Id>,
}

impl<Id> MembershipMismatch<Id> {
    fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty() && self.duplicated.is_empty()
    }
}

/// Verifies `requested` is a permutation of `live`.
///
/// Output lists keep the order in which ids were first seen.
pub fn check_membership<Id>(requested: &[Id], live: &[Id]) -> Result<(), MembershipMismatch<Id>>
where
    Id: Copy + Eq + Hash,
{
    let live_set: HashSet<Id> = live.iter().copied().collect();
    let mut seen = HashSet::with_capacity(requested.len());
    let mut mismatch = MembershipMismatch {
        missing: Vec::new(),
        unexpected: Vec::new(),
        duplicated: Vec::new(),
    };

    for id in requested {
        if !seen.insert(*id) {
            if !mismatch.duplicated.contains(id) {
                mismatch.duplicated.push(*id);
            }
            continue;
        }
        if !live_set.contains(id) {
            mismatch.unexpected.push(*id);
        }
    }
    mismatch.missing = live.iter().copied().filter(|id| !seen.contains(id)).collect();

    if mismatch.is_empty() {
        Ok(())
    } else {
        Err(mismatch)
    }
}

/// Moves the element at `from` to `to`, shifting the rest. Out-of-range
/// indexes leave the slice untouched.
pub fn move_index<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from >= items.len() || to >= items.len() || from == to {
        return;
    }
    let item = items.remove(from);
    items.insert(to, item);
}
