//! `InsertSizes` (`spec.md` §4.4): per-library insert-size estimation
//! from the current unitig layout, with a trimmed-mean / 5-stddev
//! outlier cut.

use std::collections::HashMap;

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::read_info::ReadInfo;
use crate::tig::TigVector;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LibraryStats {
    pub mean: f64,
    pub stddev: f64,
    pub samples: usize,
    pub valid: bool,
}

impl Default for LibraryStats {
    fn default() -> Self {
        LibraryStats { mean: 0.0, stddev: 0.0, samples: 0, valid: false }
    }
}

#[derive(Clone, Debug, Default)]
pub struct InsertSizes {
    per_library: HashMap<u32, LibraryStats>,
}

impl InsertSizes {
    /// Scans every unitig for innie mate pairs wholly contained in one
    /// unitig, then fits a trimmed-mean/stddev per library.
    pub fn compute(tigs: &TigVector, reads: &ReadInfo, config: &Config) -> Self {
        let mut observations: HashMap<u32, Vec<f64>> = HashMap::new();

        for tig in tigs.iter() {
            for node in &tig.ufpath {
                let mate = reads.mate_id(node.ident);
                if mate == 0 || mate <= node.ident {
                    continue;
                }
                if tigs.in_unitig(mate) != tig.id {
                    continue;
                }
                let mate_idx = match tig.path_position(mate) {
                    Some(idx) => idx,
                    None => continue,
                };
                let mate_node = tig.ufpath[mate_idx];

                let (fwd, rev) = if node.position.is_forward() {
                    (node, &mate_node)
                } else {
                    (&mate_node, node)
                };
                if !fwd.position.is_forward() || rev.position.is_forward() {
                    continue; // not an innie pair
                }
                if rev.position.min() < fwd.position.min() {
                    continue; // outtie, not counted here
                }

                let insert = (rev.position.bgn - fwd.position.bgn).abs() as f64;
                if insert > 0.0 {
                    observations
                        .entry(reads.library_id(node.ident))
                        .or_default()
                        .push(insert);
                }
            }
        }

        let mut per_library = HashMap::new();
        for (lib, mut obs) in observations {
            if obs.len() < config.min_library_samples {
                per_library.insert(
                    lib,
                    LibraryStats { mean: 0.0, stddev: 0.0, samples: obs.len(), valid: false },
                );
                continue;
            }

            obs.sort_by(|a, b| a.partial_cmp(b).unwrap());
            let median = percentile(&obs, 0.5);
            let q1 = percentile(&obs, 0.25);
            let q3 = percentile(&obs, 0.75);
            let approx_std = (median - q1).max(q3 - median);
            let lo = median - 5.0 * approx_std;
            let hi = median + 5.0 * approx_std;

            let trimmed: Vec<f64> = obs.into_iter().filter(|&x| x >= lo && x <= hi).collect();
            let mean = trimmed.iter().sum::<f64>() / trimmed.len() as f64;
            let variance =
                trimmed.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / trimmed.len() as f64;

            per_library.insert(
                lib,
                LibraryStats { mean, stddev: variance.sqrt(), samples: trimmed.len(), valid: true },
            );
        }

        info!("InsertSizes: estimated {} librar(y/ies)", per_library.len());
        InsertSizes { per_library }
    }

    /// Builds an `InsertSizes` directly from known per-library stats,
    /// bypassing `compute`. Used by downstream modules' tests that need
    /// fixed mean/stddev without a synthetic unitig layout.
    #[cfg(test)]
    pub(crate) fn from_parts(per_library: HashMap<u32, LibraryStats>) -> Self {
        InsertSizes { per_library }
    }

    pub fn get(&self, library_id: u32) -> Option<&LibraryStats> {
        self.per_library.get(&library_id)
    }

    pub fn libraries(&self) -> impl Iterator<Item = (&u32, &LibraryStats)> {
        self.per_library.iter()
    }
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = (p * (sorted.len() - 1) as f64).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::read_info::ReadRecord;
    use crate::tig::node::{Position, UfNode};

    #[test]
    fn estimates_mean_and_stddev_from_innie_pairs() {
        let mut records = Vec::new();
        let mut tigs = TigVector::new(40);
        let id = tigs.new_unitig();
        let tig = tigs.get_mut(id).unwrap();

        for i in 0..20u32 {
            let a = i * 2 + 1;
            let b = a + 1;
            records.push(ReadRecord { id: a, length: 500, mate_id: b, library_id: 1, ignore: false });
            records.push(ReadRecord { id: b, length: 500, mate_id: a, library_id: 1, ignore: false });
            let base = i as i64 * 5000;
            tig.add_read(UfNode::new(a, Position::new(base, base + 500)), 0, false);
            tig.add_read(UfNode::new(b, Position::new(base + 2200, base + 1700)), 0, false);
        }
        tigs.register_read(id);
        let reads = ReadInfo::new(records);

        let config = Config::default();
        let sizes = InsertSizes::compute(&tigs, &reads, &config);
        let stats = sizes.get(1).unwrap();
        assert!(stats.valid);
        assert!((stats.mean - 2200.0).abs() < 1.0);
        assert!(stats.stddev < 1.0);
    }

    #[test]
    fn library_with_too_few_samples_is_invalid() {
        let mut tigs = TigVector::new(2);
        let id = tigs.new_unitig();
        tigs.get_mut(id).unwrap().add_read(UfNode::new(1, Position::new(0, 500)), 0, false);
        tigs.get_mut(id).unwrap().add_read(UfNode::new(2, Position::new(2200, 1700)), 0, false);
        tigs.register_read(id);
        let reads = ReadInfo::new(vec![
            ReadRecord { id: 1, length: 500, mate_id: 2, library_id: 1, ignore: false },
            ReadRecord { id: 2, length: 500, mate_id: 1, library_id: 1, ignore: false },
        ]);

        let config = Config::default();
        let sizes = InsertSizes::compute(&tigs, &reads, &config);
        assert!(!sizes.get(1).unwrap().valid);
    }
}
