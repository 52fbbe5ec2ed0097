//! Conservative diffing between an old snapshot and a proposed new sequence.

use crate::record::ChangeRecord;
use std::fmt;
use std::sync::Arc;

/// Update-equality policy: decides whether a matched pair counts as changed.
///
/// Matching and update classification use separate equality notions on
/// purpose. A type whose `PartialEq` cannot see nested mutations can pick
/// [`UpdatePolicy::AlwaysChanged`] and trade spurious Updated records for the
/// guarantee that no real update is ever missed.
#[derive(Clone)]
pub enum UpdatePolicy<T> {
    /// `PartialEq` decides; equal pairs are Unchanged.
    Structural,
    /// Every matched pair is reported Updated.
    AlwaysChanged,
    /// Caller-supplied comparer returning `true` when the pair is unchanged.
    Custom(Arc<dyn Fn(&T, &T) -> bool + Send + Sync>),
}

impl<T: PartialEq> UpdatePolicy<T> {
    fn is_unchanged(&self, old: &T, new: &T) -> bool {
        match self {
            UpdatePolicy::Structural => old == new,
            UpdatePolicy::AlwaysChanged => false,
            UpdatePolicy::Custom(same) => same(old, new),
        }
    }
}

impl<T> fmt::Debug for UpdatePolicy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdatePolicy::Structural => write!(f, "Structural"),
            UpdatePolicy::AlwaysChanged => write!(f, "AlwaysChanged"),
            UpdatePolicy::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Compute per-item change records between `old` and `new`.
///
/// Every element of `new` is paired against `old` with `match_eq`,
/// first-available-match in sequence order, each old element consumed at most
/// once. Matched pairs classify as Unchanged or Updated (carrying the new
/// value) per `update`; unmatched new elements are Added; unmatched old
/// elements are Removed.
///
/// Output order: records for `new` in its order, then Removed records in
/// old-sequence order.
pub fn diff<T, M>(old: &[T], new: &[T], match_eq: M, update: &UpdatePolicy<T>) -> Vec<ChangeRecord<T>>
where
    T: Clone + PartialEq,
    M: Fn(&T, &T) -> bool,
{
    let mut consumed = vec![false; old.len()];
    let mut records = Vec::with_capacity(old.len() + new.len());

    for item in new {
        let matched = old
            .iter()
            .enumerate()
            .find(|&(index, candidate)| !consumed[index] && match_eq(candidate, item));

        match matched {
            Some((index, candidate)) => {
                consumed[index] = true;
                if update.is_unchanged(candidate, item) {
                    records.push(ChangeRecord::unchanged(item.clone()));
                } else {
                    records.push(ChangeRecord::updated(item.clone()));
                }
            }
            None => records.push(ChangeRecord::added(item.clone())),
        }
    }

    for (index, item) in old.iter().enumerate() {
        if !consumed[index] {
            records.push(ChangeRecord::removed(item.clone()));
        }
    }

    records
}

/// [`diff`] with `PartialEq` as the match equality.
pub fn diff_by_eq<T>(old: &[T], new: &[T], update: &UpdatePolicy<T>) -> Vec<ChangeRecord<T>>
where
    T: Clone + PartialEq,
{
    diff(old, new, |a, b| a == b, update)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ChangeKind;

    fn kinds<T>(records: &[ChangeRecord<T>]) -> Vec<ChangeKind> {
        records.iter().map(|r| r.kind).collect()
    }

    #[test]
    fn test_identical_sequences_are_unchanged() {
        let records = diff_by_eq(&[1, 2, 3], &[1, 2, 3], &UpdatePolicy::Structural);

        assert_eq!(
            kinds(&records),
            vec![ChangeKind::Unchanged, ChangeKind::Unchanged, ChangeKind::Unchanged]
        );
    }

    #[test]
    fn test_added_and_removed() {
        let records = diff_by_eq(&["a", "b"], &["b", "c"], &UpdatePolicy::Structural);

        assert_eq!(
            records,
            vec![
                ChangeRecord::unchanged("b"),
                ChangeRecord::added("c"),
                ChangeRecord::removed("a"),
            ]
        );
    }

    #[test]
    fn test_always_changed_reports_matches_as_updated() {
        let records = diff_by_eq(&[1, 2], &[1, 2], &UpdatePolicy::AlwaysChanged);

        assert_eq!(kinds(&records), vec![ChangeKind::Updated, ChangeKind::Updated]);
    }

    #[test]
    fn test_custom_comparer_decides_update() {
        // Match on the key (first tuple field), compare the payload.
        let old = [(1, "x"), (2, "y")];
        let new = [(1, "x"), (2, "z")];
        let policy = UpdatePolicy::Custom(Arc::new(|a: &(i32, &str), b: &(i32, &str)| a.1 == b.1));

        let records = diff(&old, &new, |a, b| a.0 == b.0, &policy);
        assert_eq!(kinds(&records), vec![ChangeKind::Unchanged, ChangeKind::Updated]);
    }

    #[test]
    fn test_duplicates_consumed_at_most_once() {
        // One old `1` cannot satisfy both new `1`s.
        let records = diff_by_eq(&[1], &[1, 1], &UpdatePolicy::Structural);

        assert_eq!(kinds(&records), vec![ChangeKind::Unchanged, ChangeKind::Added]);
    }

    #[test]
    fn test_surplus_old_duplicates_are_removed() {
        let records = diff_by_eq(&[1, 1, 1], &[1], &UpdatePolicy::Structural);

        assert_eq!(
            kinds(&records),
            vec![ChangeKind::Unchanged, ChangeKind::Removed, ChangeKind::Removed]
        );
    }

    #[test]
    fn test_first_available_match_wins() {
        // Loose matching: both new items match both old items; pairing must be
        // first-available in sequence order.
        let old = [(1, "a"), (1, "b")];
        let new = [(1, "c"), (1, "d")];

        let records = diff(&old, &new, |a, b| a.0 == b.0, &UpdatePolicy::AlwaysChanged);
        assert_eq!(
            records,
            vec![ChangeRecord::updated((1, "c")), ChangeRecord::updated((1, "d"))]
        );
    }

    #[test]
    fn test_empty_old_is_all_added() {
        let records = diff_by_eq(&[], &[1, 2], &UpdatePolicy::Structural);
        assert_eq!(kinds(&records), vec![ChangeKind::Added, ChangeKind::Added]);
    }

    #[test]
    fn test_empty_new_is_all_removed() {
        let records = diff_by_eq(&[1, 2], &[], &UpdatePolicy::Structural);
        assert_eq!(kinds(&records), vec![ChangeKind::Removed, ChangeKind::Removed]);
    }
}
