//! `TigVector`: the sole owning structure for every `Unitig` (`spec.md`
//! §4.1, §9 design note "every cross-entity reference is a small integer
//! id"). Slot 0 is always empty, mirroring `ReadInfo`'s slot-0
//! convention and the C++ original's 1-based `tigID`.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::overlap::OverlapCache;
use crate::read_info::{ReadId, ReadInfo};
use crate::tig::unitig::Unitig;

#[derive(Clone, Debug, Default)]
pub struct TigVector {
    tigs: Vec<Option<Unitig>>,
    /// `read -> tig id`, 0 if the read is unplaced.
    in_unitig: Vec<u32>,
    /// `read -> index in that tig's ufpath`.
    read_path_idx: Vec<usize>,
}

impl TigVector {
    pub fn new(num_reads: usize) -> Self {
        TigVector {
            tigs: vec![None],
            in_unitig: vec![0; num_reads + 1],
            read_path_idx: vec![0; num_reads + 1],
        }
    }

    fn ensure_read_capacity(&mut self, read: ReadId) {
        if read as usize >= self.in_unitig.len() {
            self.in_unitig.resize(read as usize + 1, 0);
            self.read_path_idx.resize(read as usize + 1, 0);
        }
    }

    /// `newUnitig()` (`spec.md` §4.1): allocates the next free slot,
    /// reusing a deleted one if available.
    pub fn new_unitig(&mut self) -> u32 {
        for (id, slot) in self.tigs.iter_mut().enumerate().skip(1) {
            if slot.is_none() {
                *slot = Some(Unitig::new(id as u32));
                return id as u32;
            }
        }
        let id = self.tigs.len() as u32;
        self.tigs.push(Some(Unitig::new(id)));
        id
    }

    pub fn delete_unitig(&mut self, tig_id: u32) {
        if let Some(slot) = self.tigs.get_mut(tig_id as usize) {
            if let Some(tig) = slot.take() {
                for node in &tig.ufpath {
                    self.in_unitig[node.ident as usize] = 0;
                }
            }
        }
    }

    pub fn get(&self, tig_id: u32) -> Option<&Unitig> {
        self.tigs.get(tig_id as usize).and_then(|s| s.as_ref())
    }

    pub fn get_mut(&mut self, tig_id: u32) -> Option<&mut Unitig> {
        self.tigs.get_mut(tig_id as usize).and_then(|s| s.as_mut())
    }

    /// Re-derives the `registerRead` reverse maps from a tig's current
    /// `ufpath`. Call after any placement that mutates a `Unitig`
    /// directly through `get_mut`.
    pub fn register_read(&mut self, tig_id: u32) {
        let positions: Vec<(ReadId, usize)> = match self.get(tig_id) {
            Some(tig) => tig
                .ufpath
                .iter()
                .enumerate()
                .map(|(idx, n)| (n.ident, idx))
                .collect(),
            None => return,
        };
        for (read, idx) in positions {
            self.ensure_read_capacity(read);
            self.in_unitig[read as usize] = tig_id;
            self.read_path_idx[read as usize] = idx;
        }
    }

    /// `inUnitig(readId)` (`spec.md` §4.1). 0 means unplaced.
    pub fn in_unitig(&self, read: ReadId) -> u32 {
        self.in_unitig.get(read as usize).copied().unwrap_or(0)
    }

    /// `ufpathIdx(readId)` (`spec.md` §4.1).
    pub fn ufpath_idx(&self, read: ReadId) -> usize {
        self.read_path_idx.get(read as usize).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.tigs.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Unitig> {
        self.tigs.iter().skip(1).filter_map(|s| s.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Unitig> {
        self.tigs.iter_mut().skip(1).filter_map(|s| s.as_mut())
    }

    /// Supplemented from `original_source/AS_BAT_Unitig.C`'s
    /// arrival-rate coverage statistic: mean distance between
    /// consecutive read starts along a tig, converted to expected
    /// coverage depth. Run across unitigs with `rayon` since each tig's
    /// estimate is independent (`spec.md` §5 data-parallel fleet ops).
    pub fn compute_arrival_rate(&self, reads: &ReadInfo) -> HashMap<u32, f64> {
        self.tigs
            .par_iter()
            .enumerate()
            .filter_map(|(id, slot)| {
                let tig = slot.as_ref()?;
                if tig.ufpath.len() < 2 {
                    return Some((id as u32, 0.0));
                }
                let mut starts: Vec<i64> = tig.ufpath.iter().map(|n| n.position.min()).collect();
                starts.sort_unstable();
                let gaps: i64 = starts.windows(2).map(|w| w[1] - w[0]).sum();
                let mean_gap = gaps as f64 / (starts.len() - 1) as f64;
                let mean_read_len = tig
                    .ufpath
                    .iter()
                    .map(|n| reads.length(n.ident) as f64)
                    .sum::<f64>()
                    / tig.ufpath.len() as f64;
                let covstat = if mean_gap > 0.0 {
                    mean_read_len / mean_gap
                } else {
                    f64::INFINITY
                };
                Some((id as u32, covstat))
            })
            .collect()
    }

    /// Supplemented from `original_source/AS_BAT_Unitig.C`'s per-tig
    /// error-profile report: mean overlap error rate between
    /// consecutive dovetail-adjacent reads.
    pub fn compute_error_profiles(&self, overlaps: &OverlapCache) -> HashMap<u32, f32> {
        self.tigs
            .par_iter()
            .enumerate()
            .filter_map(|(id, slot)| {
                let tig = slot.as_ref()?;
                let mut path = tig.ufpath.clone();
                path.sort_by_key(|n| n.position.min());
                let mut total = 0.0f64;
                let mut count = 0u32;
                for w in path.windows(2) {
                    if let Some(ovl) = overlaps.overlap_between(w[0].ident, w[1].ident) {
                        total += ovl.erate as f64;
                        count += 1;
                    }
                }
                let mean = if count > 0 { (total / count as f64) as f32 } else { 0.0 };
                Some((id as u32, mean))
            })
            .collect()
    }

    /// `SPEC_FULL.md` §4.7: flags a unitig `isRepeat` when its coverage
    /// stat (`log2(arrivalRate / globalArrivalRate)`) falls below
    /// `cutoff`, the low-confidence-unique-placement signal
    /// `AS_BAT_Unitig.C`'s `computeCoverageStat` uses.
    pub fn classify_repeats(&mut self, arrival_rates: &HashMap<u32, f64>, cutoff: f64) {
        let nonzero: Vec<f64> = arrival_rates.values().copied().filter(|v| v.is_finite() && *v > 0.0).collect();
        let global = if nonzero.is_empty() { 0.0 } else { nonzero.iter().sum::<f64>() / nonzero.len() as f64 };

        for tig in self.iter_mut() {
            let rate = arrival_rates.get(&tig.id).copied().unwrap_or(0.0);
            let covstat = if global > 0.0 && rate > 0.0 { (rate / global).log2() } else { 0.0 };
            tig.is_repeat = covstat < cutoff;
        }
    }

    /// `SPEC_FULL.md` §4.7: flags a short unitig `isBubble` when enough
    /// of its reads mate into the same other, non-singleton unitig,
    /// grounded in `AS_BAT_MateBubble.C`'s `popMateBubbles`: a short tig
    /// whose external mate links cluster on one other unitig is a
    /// candidate second path around that unitig. `min_mate_links` mirrors
    /// the original's hardcoded "more than 3 mates" threshold.
    pub fn classify_bubbles(&mut self, reads: &ReadInfo, max_bubble_length: i64, min_mate_links: usize) {
        let mut bubble_ids = Vec::new();

        for tig in self.iter().filter(|t| !t.ufpath.is_empty() && t.length <= max_bubble_length) {
            let mut external_targets: Vec<u32> = Vec::new();

            for node in &tig.ufpath {
                let mate = reads.mate_id(node.ident);
                if mate == 0 {
                    continue;
                }
                let mate_tig = self.in_unitig(mate);
                if mate_tig == 0 || mate_tig == tig.id {
                    continue;
                }
                let mate_tig_is_singleton = self.get(mate_tig).map(|t| t.ufpath.len() < 2).unwrap_or(true);
                if mate_tig_is_singleton {
                    continue;
                }
                external_targets.push(mate_tig);
            }

            if external_targets.is_empty() {
                continue;
            }
            external_targets.sort_unstable();

            let mut run_start = 0;
            let mut flagged = false;
            for i in 1..=external_targets.len() {
                if i == external_targets.len() || external_targets[i] != external_targets[run_start] {
                    if i - run_start > min_mate_links {
                        flagged = true;
                        break;
                    }
                    run_start = i;
                }
            }

            if flagged {
                bubble_ids.push(tig.id);
            }
        }

        for id in bubble_ids {
            if let Some(tig) = self.get_mut(id) {
                tig.is_bubble = true;
            }
        }
    }

    pub fn report_error_profiles(&self, overlaps: &OverlapCache) -> String {
        let profiles = self.compute_error_profiles(overlaps);
        let mut ids: Vec<&u32> = profiles.keys().collect();
        ids.sort();
        let mut out = String::new();
        for id in ids {
            out.push_str(&format!("tig {}\tmeanErate {:.4}\n", id, profiles[id]));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tig::node::{Position, UfNode};

    #[test]
    fn new_unitig_reuses_deleted_slots() {
        let mut v = TigVector::new(4);
        let a = v.new_unitig();
        let b = v.new_unitig();
        v.delete_unitig(a);
        let c = v.new_unitig();
        assert_eq!(a, c);
        assert_ne!(b, c);
    }

    #[test]
    fn register_read_updates_reverse_maps() {
        let mut v = TigVector::new(2);
        let id = v.new_unitig();
        v.get_mut(id)
            .unwrap()
            .add_read(UfNode::new(1, Position::new(0, 100)), 0, false);
        v.register_read(id);
        assert_eq!(v.in_unitig(1), id);
        assert_eq!(v.ufpath_idx(1), 0);
    }

    #[test]
    fn delete_unitig_clears_placed_reads() {
        let mut v = TigVector::new(2);
        let id = v.new_unitig();
        v.get_mut(id)
            .unwrap()
            .add_read(UfNode::new(1, Position::new(0, 100)), 0, false);
        v.register_read(id);
        v.delete_unitig(id);
        assert_eq!(v.in_unitig(1), 0);
        assert!(v.get(id).is_none());
    }

    #[test]
    fn slot_zero_never_allocated() {
        let v = TigVector::new(1);
        assert!(v.get(0).is_none());
    }

    #[test]
    fn classify_bubbles_flags_short_tig_whose_mates_cluster_on_one_host() {
        use crate::read_info::ReadRecord;

        // 4 reads in the short candidate tig, each mated to a read that
        // lands in the same other (non-singleton) unitig: enough external
        // mate links clustering on one host to exceed min_mate_links=3.
        let reads = ReadInfo::new(vec![
            ReadRecord { id: 1, length: 100, mate_id: 11, library_id: 1, ignore: false },
            ReadRecord { id: 2, length: 100, mate_id: 12, library_id: 1, ignore: false },
            ReadRecord { id: 3, length: 100, mate_id: 13, library_id: 1, ignore: false },
            ReadRecord { id: 4, length: 100, mate_id: 14, library_id: 1, ignore: false },
            ReadRecord { id: 11, length: 100, mate_id: 1, library_id: 1, ignore: false },
            ReadRecord { id: 12, length: 100, mate_id: 2, library_id: 1, ignore: false },
            ReadRecord { id: 13, length: 100, mate_id: 3, library_id: 1, ignore: false },
            ReadRecord { id: 14, length: 100, mate_id: 4, library_id: 1, ignore: false },
        ]);

        let mut v = TigVector::new(14);
        let bubble = v.new_unitig();
        {
            let t = v.get_mut(bubble).unwrap();
            t.add_read(UfNode::new(1, Position::new(0, 100)), 0, false);
            t.add_read(UfNode::new(2, Position::new(100, 200)), 0, false);
            t.add_read(UfNode::new(3, Position::new(200, 300)), 0, false);
            t.add_read(UfNode::new(4, Position::new(300, 400)), 0, false);
        }
        v.register_read(bubble);

        // Host spans more than max_bubble_length, so it is excluded from
        // bubble candidacy by the length filter regardless of how its own
        // mates cluster back onto the short tig.
        let host = v.new_unitig();
        {
            let t = v.get_mut(host).unwrap();
            t.add_read(UfNode::new(11, Position::new(0, 400)), 0, false);
            t.add_read(UfNode::new(12, Position::new(400, 800)), 0, false);
            t.add_read(UfNode::new(13, Position::new(800, 1200)), 0, false);
            t.add_read(UfNode::new(14, Position::new(1200, 1600)), 0, false);
        }
        v.register_read(host);

        v.classify_bubbles(&reads, 1000, 3);
        assert!(v.get(bubble).unwrap().is_bubble);
        assert!(!v.get(host).unwrap().is_bubble);
    }

    #[test]
    fn classify_bubbles_leaves_tig_alone_when_mate_links_stay_below_threshold() {
        use crate::read_info::ReadRecord;

        let reads = ReadInfo::new(vec![
            ReadRecord { id: 1, length: 100, mate_id: 11, library_id: 1, ignore: false },
            ReadRecord { id: 2, length: 100, mate_id: 0, library_id: 1, ignore: false },
            ReadRecord { id: 11, length: 100, mate_id: 1, library_id: 1, ignore: false },
            ReadRecord { id: 12, length: 100, mate_id: 0, library_id: 1, ignore: false },
        ]);

        let mut v = TigVector::new(12);
        let candidate = v.new_unitig();
        {
            let t = v.get_mut(candidate).unwrap();
            t.add_read(UfNode::new(1, Position::new(0, 100)), 0, false);
            t.add_read(UfNode::new(2, Position::new(100, 200)), 0, false);
        }
        v.register_read(candidate);

        let host = v.new_unitig();
        {
            let t = v.get_mut(host).unwrap();
            t.add_read(UfNode::new(11, Position::new(0, 100)), 0, false);
            t.add_read(UfNode::new(12, Position::new(100, 200)), 0, false);
        }
        v.register_read(host);

        v.classify_bubbles(&reads, 1000, 3);
        assert!(!v.get(candidate).unwrap().is_bubble);
    }

    #[test]
    fn classify_repeats_flags_low_coverage_tigs() {
        let mut v = TigVector::new(2);
        let a = v.new_unitig();
        let b = v.new_unitig();
        let mut rates = HashMap::new();
        rates.insert(a, 10.0);
        rates.insert(b, 0.5);

        v.classify_repeats(&rates, -1.0);
        assert!(!v.get(a).unwrap().is_repeat);
        assert!(v.get(b).unwrap().is_repeat);
    }
}
