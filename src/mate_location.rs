//! `MateLocation` / `evaluateMates` (`spec.md` §4.5): per-unitig mate
//! classification and positional badness arrays.

use std::collections::HashMap;

use crate::config::Config;
use crate::insert_sizes::InsertSizes;
use crate::read_info::{ReadId, ReadInfo};
use crate::tig::node::UfNode;
use crate::tig::TigVector;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MateClass {
    Happy,
    Compressed,
    Stretched,
    Outtie,
    Anti,
    Normal,
    GoodExternal,
    BadExternalFwd,
    BadExternalRev,
}

/// One entry in the per-unitig mate table (`spec.md` §4.5): populated in
/// two passes over `ufpath`, the first read of a pair creating a
/// half-entry and the mate's pass completing it.
#[derive(Clone, Debug)]
pub struct MateTableEntry {
    pub frg1: ReadId,
    pub pos1_bgn: i64,
    pub pos1_end: i64,
    pub tig1: u32,
    pub frg2: ReadId,
    pub pos2_bgn: i64,
    pub pos2_end: i64,
    pub tig2: u32,
    pub is_grumpy: bool,
}

#[derive(Clone, Debug, Default)]
pub struct MateLocation {
    entries: HashMap<ReadId, MateTableEntry>,
}

impl MateLocation {
    /// Scans every unitig's `ufpath` twice. The first read of a mate
    /// pair encountered creates a half entry (tig2/pos2 left at the
    /// read's own placement); the mate's encounter, possibly in another
    /// unitig, completes it.
    pub fn build(tigs: &TigVector, reads: &ReadInfo) -> Self {
        let mut entries: HashMap<ReadId, MateTableEntry> = HashMap::new();

        for tig in tigs.iter() {
            for node in &tig.ufpath {
                let mate = reads.mate_id(node.ident);
                if mate == 0 {
                    continue;
                }
                record_half(&mut entries, node, tig.id, mate);
            }
        }

        let mut loc = MateLocation { entries };
        loc.rebuild_index();
        loc
    }

    fn rebuild_index(&mut self) {
        let mut ordered: Vec<(ReadId, MateTableEntry)> = self.entries.drain().collect();
        ordered.sort_by_key(|(id, _)| *id);
        self.entries = ordered.into_iter().collect();
    }

    pub fn get(&self, read: ReadId) -> Option<&MateTableEntry> {
        self.entries.get(&read)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn record_half(entries: &mut HashMap<ReadId, MateTableEntry>, node: &UfNode, tig_id: u32, mate: ReadId) {
    if let Some(existing) = entries.get_mut(&mate) {
        existing.frg2 = node.ident;
        existing.pos2_bgn = node.position.bgn;
        existing.pos2_end = node.position.end;
        existing.tig2 = tig_id;
        return;
    }
    entries.entry(node.ident).or_insert(MateTableEntry {
        frg1: node.ident,
        pos1_bgn: node.position.bgn,
        pos1_end: node.position.end,
        tig1: tig_id,
        frg2: 0,
        pos2_bgn: 0,
        pos2_end: 0,
        tig2: 0,
        is_grumpy: false,
    });
}

#[derive(Clone, Debug, Default)]
pub struct MateStats {
    pub happy: u64,
    pub compressed: u64,
    pub stretched: u64,
    pub outtie: u64,
    pub anti: u64,
    pub normal: u64,
    pub good_external: u64,
    pub bad_external_fwd: u64,
    pub bad_external_rev: u64,
}

#[derive(Clone, Debug, Default)]
pub struct TigPositionalArrays {
    pub good: Vec<u32>,
    pub bad_fwd: Vec<u32>,
    pub bad_rev: Vec<u32>,
}

impl TigPositionalArrays {
    fn new(length: i64) -> Self {
        let len = length.max(0) as usize;
        TigPositionalArrays { good: vec![0; len], bad_fwd: vec![0; len], bad_rev: vec![0; len] }
    }

    fn bump(arr: &mut [u32], lo: i64, hi: i64) {
        let lo = lo.max(0) as usize;
        let hi = (hi.max(0) as usize).min(arr.len());
        for slot in arr.iter_mut().take(hi).skip(lo) {
            *slot = slot.saturating_add(1);
        }
    }

    fn bump_good(&mut self, lo: i64, hi: i64) {
        Self::bump(&mut self.good, lo, hi);
    }

    fn bump_bad_fwd(&mut self, lo: i64, hi: i64) {
        Self::bump(&mut self.bad_fwd, lo, hi);
    }

    fn bump_bad_rev(&mut self, lo: i64, hi: i64) {
        Self::bump(&mut self.bad_rev, lo, hi);
    }
}

#[derive(Clone, Debug, Default)]
pub struct EvaluateMatesResult {
    pub per_tig: HashMap<u32, MateStats>,
    pub positions: HashMap<u32, TigPositionalArrays>,
}

/// Thresholds derived from a library's mean/stddev (`spec.md` §4.5).
struct Thresholds {
    bad_min_intra: f64,
    bad_max_intra: f64,
    bad_max_inter: f64,
}

fn thresholds(stats: &crate::insert_sizes::LibraryStats) -> Thresholds {
    Thresholds {
        bad_min_intra: stats.mean - 5.0 * stats.stddev,
        bad_max_intra: stats.mean + 5.0 * stats.stddev,
        bad_max_inter: stats.mean + 3.0 * stats.stddev,
    }
}

pub fn evaluate_mates(
    tigs: &TigVector,
    reads: &ReadInfo,
    insert_sizes: &InsertSizes,
    _config: &Config,
) -> EvaluateMatesResult {
    let mut result = EvaluateMatesResult::default();
    for tig in tigs.iter() {
        result.per_tig.insert(tig.id, MateStats::default());
        result.positions.insert(tig.id, TigPositionalArrays::new(tig.length));
    }

    for tig in tigs.iter() {
        for node in &tig.ufpath {
            let mate = reads.mate_id(node.ident);
            if mate == 0 || mate <= node.ident {
                continue;
            }
            let mate_tig_id = tigs.in_unitig(mate);
            if mate_tig_id == 0 {
                continue;
            }
            let lib_stats = insert_sizes.get(reads.library_id(node.ident)).copied();

            if mate_tig_id == tig.id {
                let mate_idx = match tig.path_position(mate) {
                    Some(idx) => idx,
                    None => continue,
                };
                let mate_node = tig.ufpath[mate_idx];
                classify_intra_tig(node, &mate_node, tig.is_circular, lib_stats.as_ref(), &mut result, tig.id);
            } else {
                classify_inter_tig(node, tig.length, lib_stats.as_ref(), &mut result, tig.id);
            }
        }
    }

    result
}

fn classify_intra_tig(
    a: &UfNode,
    b: &UfNode,
    is_circular: bool,
    stats: Option<&crate::insert_sizes::LibraryStats>,
    result: &mut EvaluateMatesResult,
    tig_id: u32,
) {
    let same_orientation = a.position.is_forward() == b.position.is_forward();
    if same_orientation {
        let class = if a.position.is_forward() { MateClass::Normal } else { MateClass::Anti };
        bump_stat(result, tig_id, class);
        return;
    }

    let (fwd, rev) = if a.position.is_forward() { (a, b) } else { (b, a) };

    if rev.position.min() < fwd.position.min() {
        if is_circular {
            if let Some(s) = stats {
                let t = thresholds(s);
                let wrap = (fwd.position.min() + (rev.position.max())) as f64;
                if wrap >= t.bad_min_intra && wrap <= t.bad_max_intra {
                    bump_stat(result, tig_id, MateClass::Happy);
                    if let Some(arr) = result.positions.get_mut(&tig_id) {
                        arr.bump_good(rev.position.min(), fwd.position.max());
                    }
                    return;
                }
            }
        }
        bump_stat(result, tig_id, MateClass::Outtie);
        if let Some(arr) = result.positions.get_mut(&tig_id) {
            arr.bump_bad_rev(rev.position.max(), rev.position.max() + 1);
        }
        return;
    }

    let insert = (rev.position.bgn - fwd.position.bgn).abs() as f64;
    let class = match stats {
        None => MateClass::Happy,
        Some(s) => {
            let t = thresholds(s);
            if insert < t.bad_min_intra {
                MateClass::Compressed
            } else if insert > t.bad_max_intra {
                MateClass::Stretched
            } else {
                MateClass::Happy
            }
        }
    };
    bump_stat(result, tig_id, class);
    if let Some(arr) = result.positions.get_mut(&tig_id) {
        match class {
            MateClass::Happy => arr.bump_good(fwd.position.min(), rev.position.max()),
            MateClass::Compressed => arr.bump_bad_fwd(fwd.position.max(), rev.position.min().max(fwd.position.max())),
            MateClass::Stretched => arr.bump_bad_rev(fwd.position.max(), rev.position.min()),
            _ => {}
        }
    }
}

fn classify_inter_tig(
    node: &UfNode,
    local_tig_length: i64,
    stats: Option<&crate::insert_sizes::LibraryStats>,
    result: &mut EvaluateMatesResult,
    tig_id: u32,
) {
    let forward = node.position.is_forward();
    let distance_to_end =
        if forward { local_tig_length - node.position.max() } else { node.position.min() };

    let bad = match stats {
        None => false,
        Some(s) => {
            let t = thresholds(s);
            t.bad_max_inter < distance_to_end as f64
        }
    };

    let class = if bad {
        if forward {
            MateClass::BadExternalFwd
        } else {
            MateClass::BadExternalRev
        }
    } else {
        MateClass::GoodExternal
    };
    bump_stat(result, tig_id, class);

    if bad {
        if let Some(arr) = result.positions.get_mut(&tig_id) {
            if forward {
                arr.bump_bad_fwd(node.position.max(), local_tig_length);
            } else {
                arr.bump_bad_rev(0, node.position.min());
            }
        }
    }
}

fn bump_stat(result: &mut EvaluateMatesResult, tig_id: u32, class: MateClass) {
    let stats = result.per_tig.entry(tig_id).or_default();
    match class {
        MateClass::Happy => stats.happy += 1,
        MateClass::Compressed => stats.compressed += 1,
        MateClass::Stretched => stats.stretched += 1,
        MateClass::Outtie => stats.outtie += 1,
        MateClass::Anti => stats.anti += 1,
        MateClass::Normal => stats.normal += 1,
        MateClass::GoodExternal => stats.good_external += 1,
        MateClass::BadExternalFwd => stats.bad_external_fwd += 1,
        MateClass::BadExternalRev => stats.bad_external_rev += 1,
    }
}

/// Contiguous runs where `bad_fwd[i] + bad_rev[i] >= threshold`, used as
/// split candidates (`spec.md` §4.5). Skipped if more than 25% of the
/// unitig's positions are bad, since at that density no single split
/// point is informative.
pub fn find_peak_bad_regions(arrays: &TigPositionalArrays, threshold: u32) -> Vec<(usize, usize)> {
    let len = arrays.good.len().max(arrays.bad_fwd.len()).max(arrays.bad_rev.len());
    if len == 0 {
        return Vec::new();
    }

    let bad_count = (0..len)
        .filter(|&i| {
            arrays.bad_fwd.get(i).copied().unwrap_or(0) + arrays.bad_rev.get(i).copied().unwrap_or(0) >= threshold
        })
        .count();
    if bad_count * 4 > len {
        return Vec::new();
    }

    let mut regions = Vec::new();
    let mut run_start: Option<usize> = None;
    for i in 0..len {
        let bad = arrays.bad_fwd.get(i).copied().unwrap_or(0) + arrays.bad_rev.get(i).copied().unwrap_or(0) >= threshold;
        match (bad, run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(s)) => {
                regions.push((s, i));
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = run_start {
        regions.push((s, len));
    }
    regions
}
