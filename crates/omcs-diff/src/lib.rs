//! Change records and conservative diffing for the Larimar observable mirror
//! collection store.
//!
//! [`diff`] converts a bulk replacement into a precise stream of per-item
//! [`ChangeRecord`]s, parameterized by two equality notions: a match equality
//! that pairs old and new items, and an [`UpdatePolicy`] that decides whether
//! a matched pair counts as changed. Correctness (never missing an update) is
//! prioritized over precision (never emitting a spurious one).

pub mod diff;
pub mod record;

pub use diff::{diff, diff_by_eq, UpdatePolicy};
pub use record::{ChangeKind, ChangeRecord};
