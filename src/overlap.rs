//! The overlap cache (`spec.md` §4 component table, §6 "Overlap cache
//! (input)"). Overlaps are collapsed into one tagged record — the
//! "inheritance to tagged variants" design note (`spec.md` §9) applies
//! here too: there is no subclass hierarchy distinguishing containment
//! overlaps from dovetail overlaps, just one struct with helper methods.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::read_info::ReadId;

/// `{a_iid, b_iid, a_hang, b_hang, flipped, erate}` per `spec.md` §6.
/// Stored once per `(a, b)` pair and indexed from both ends; `a_hang`/
/// `b_hang` are always expressed with `a` as the read that owns this
/// entry (see `OverlapCache::overlaps_from`, which flips the record when
/// returning it from `b`'s perspective).
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Overlap {
    pub a: ReadId,
    pub b: ReadId,
    pub a_hang: i32,
    pub b_hang: i32,
    pub flipped: bool,
    pub erate: f32,
}

impl Overlap {
    /// `trueLength(a) - max(0,a_hang) + min(0,b_hang)` (`spec.md` §6).
    pub fn length(&self, true_length_a: u32) -> i64 {
        true_length_a as i64 - self.a_hang.max(0) as i64 + self.b_hang.min(0) as i64
    }

    pub fn is_containment(&self) -> bool {
        self.a_hang >= 0 && self.b_hang <= 0
    }

    /// The same overlap, viewed from `b`'s side: `a`/`b` swap and hangs
    /// negate, since a positive a-hang (A extends left of B) becomes,
    /// from B's perspective, a negative hang on the new "a" read.
    pub fn flip(&self) -> Overlap {
        Overlap {
            a: self.b,
            b: self.a,
            a_hang: -self.a_hang,
            b_hang: -self.b_hang,
            flipped: self.flipped,
            erate: self.erate,
        }
    }
}

/// Indexed in-memory overlap store, queried by read id. Built once from
/// a flat overlap stream and never mutated afterward: read-only after
/// construction, freely shared. Unlike a sliding `RecordBuffer` that
/// holds only a window and must be refilled, this cache retains every
/// overlap for the lifetime of the run, so memory use is O(total
/// overlaps).
#[derive(Clone, Debug, Default)]
pub struct OverlapCache {
    by_read: HashMap<ReadId, Vec<Overlap>>,
}

impl OverlapCache {
    /// Build the cache from an unordered overlap stream. Each input
    /// overlap is indexed under both `a` and `b`, with hangs expressed
    /// relative to whichever read is being queried.
    pub fn new(overlaps: impl IntoIterator<Item = Overlap>) -> Self {
        let mut by_read: HashMap<ReadId, Vec<Overlap>> = HashMap::new();
        for ovl in overlaps {
            by_read.entry(ovl.a).or_default().push(ovl);
            by_read.entry(ovl.b).or_default().push(ovl.flip());
        }
        OverlapCache { by_read }
    }

    /// All overlaps with `read` as the "a" side, i.e. as seen from `read`.
    pub fn overlaps_from(&self, read: ReadId) -> &[Overlap] {
        self.by_read.get(&read).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn overlap_between(&self, a: ReadId, b: ReadId) -> Option<Overlap> {
        self.overlaps_from(a).iter().copied().find(|o| o.b == b)
    }

    pub fn len(&self) -> usize {
        self.by_read.values().map(|v| v.len()).sum::<usize>() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ovl(a: ReadId, b: ReadId, a_hang: i32, b_hang: i32) -> Overlap {
        Overlap {
            a,
            b,
            a_hang,
            b_hang,
            flipped: false,
            erate: 0.01,
        }
    }

    #[test]
    fn overlap_length_matches_spec_formula() {
        let o = ovl(1, 2, 200, -200);
        assert_eq!(o.length(1000), 1000 - 200 + (-200));
    }

    #[test]
    fn flip_negates_hangs_and_swaps_ends() {
        let o = ovl(1, 2, 200, -50);
        let f = o.flip();
        assert_eq!(f.a, 2);
        assert_eq!(f.b, 1);
        assert_eq!(f.a_hang, -200);
        assert_eq!(f.b_hang, 50);
    }

    #[test]
    fn cache_indexes_both_directions() {
        let cache = OverlapCache::new(vec![ovl(1, 2, 200, -200)]);
        assert_eq!(cache.overlaps_from(1).len(), 1);
        assert_eq!(cache.overlaps_from(2).len(), 1);
        assert_eq!(cache.overlap_between(2, 1).unwrap().a_hang, -200);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn containment_predicate() {
        assert!(ovl(1, 2, 200, -200).is_containment());
        assert!(!ovl(1, 2, 200, 200).is_containment());
    }
}
