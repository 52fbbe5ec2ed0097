//! Change records describing one item's fate between two snapshots.

use serde::{Deserialize, Serialize};

/// Classification of a single item in a diff.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    /// Present in the new sequence with no match in the old one.
    Added,
    /// Matched an old element but counts as changed under the update policy.
    Updated,
    /// Present in the old sequence with no match in the new one.
    Removed,
    /// Matched an old element and counts as unchanged. Filtered out of
    /// notifications.
    Unchanged,
}

/// A tagged `(kind, item)` pair. Produced by the differ or by direct mutation
/// paths, consumed once by a notification dispatch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord<T> {
    pub kind: ChangeKind,
    pub item: T,
}

impl<T> ChangeRecord<T> {
    pub fn added(item: T) -> Self {
        Self {
            kind: ChangeKind::Added,
            item,
        }
    }

    /// An update record carries the new value.
    pub fn updated(item: T) -> Self {
        Self {
            kind: ChangeKind::Updated,
            item,
        }
    }

    pub fn removed(item: T) -> Self {
        Self {
            kind: ChangeKind::Removed,
            item,
        }
    }

    pub fn unchanged(item: T) -> Self {
        Self {
            kind: ChangeKind::Unchanged,
            item,
        }
    }

    /// Whether subscribers should see this record.
    pub fn is_change(&self) -> bool {
        self.kind != ChangeKind::Unchanged
    }

    pub fn into_item(self) -> T {
        self.item
    }
}
