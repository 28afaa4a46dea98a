use std::collections::{BTreeMap, BTreeSet};

use super::MAX_SEATS;

/// One venue's seat plane: which seats are free, and who owns the rest.
///
/// Invariants, enforced by every mutating method on [`crate::engine::ReservationEngine`]:
/// - `free` and the union of `owned`'s values are disjoint and together cover `0..MAX_SEATS`.
/// - no value set in `owned` is ever empty; an emptied entry is removed.
#[derive(Debug)]
pub struct Theatre {
    pub(crate) free: BTreeSet<u32>,
    pub(crate) owned: BTreeMap<String, BTreeSet<u32>>,
}

impl Theatre {
    pub(crate) fn new() -> Self {
        Theatre { free: (0..MAX_SEATS).collect(), owned: BTreeMap::new() }
    }

    pub(crate) fn owned_by(&self, uid: &str) -> BTreeSet<u32> {
        self.owned.get(uid).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_theatre_starts_fully_free() {
        let t = Theatre::new();
        assert_eq!(t.free.len(), MAX_SEATS as usize);
        assert!(t.owned.is_empty());
    }
}
