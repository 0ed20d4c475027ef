//! Project identity and the [`IndexVec`] type alias.

use smallvec::SmallVec;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique [`ProjectId`] allocation.
static PROJECT_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique per-instance identifier for a project.
///
/// Allocated from a monotonic atomic counter via [`ProjectId::next`]. Every
/// entity handle carries the id of the project that created it, so a handle
/// from one project is rejected by every other project even when the two
/// graphs have the same shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectId(u64);

impl ProjectId {
    /// Allocate a fresh, unique project ID. Thread-safe.
    pub fn next() -> Self {
        Self(PROJECT_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An integer index vector: block offsets, block shapes, global indices.
///
/// Uses `SmallVec<[i64; 4]>` to stay on the stack for manifolds of up to
/// four dimensions. Higher-dimensional manifolds spill to the heap.
pub type IndexVec = SmallVec<[i64; 4]>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_ids_are_unique() {
        let a = ProjectId::next();
        let b = ProjectId::next();
        assert_ne!(a, b);
        assert!(b > a);
    }
}
