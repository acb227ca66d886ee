//! `Context`: bundles `ReadInfo`, `OverlapCache`, `BestOverlapGraph`,
//! `InsertSizes`, and `Config` behind one owned struct, replacing the
//! process-wide globals (`FI`, `OG`, `OC`, `IS`, `logFile`) that
//! `original_source/src/AS_BAT` uses (`spec.md` §9 design note).
//!
//! `ReadInfo` itself stays immutable (`spec.md` §5); the "mark read
//! ignored" side effect that `promoteToSingleton` needs is carried here
//! as an overlay set instead, since rebuilding the whole `ReadInfo`
//! table for one flag flip would defeat its read-only-after-construction
//! contract.

use std::collections::HashSet;

use derive_builder::Builder;

use crate::best_overlap_graph::BestOverlapGraph;
use crate::config::Config;
use crate::insert_sizes::InsertSizes;
use crate::overlap::OverlapCache;
use crate::read_info::{ReadId, ReadInfo};

#[derive(Builder)]
#[builder(pattern = "owned")]
pub struct Context {
    pub reads: ReadInfo,
    pub overlaps: OverlapCache,
    pub graph: BestOverlapGraph,
    pub config: Config,
    #[builder(default)]
    pub insert_sizes: InsertSizes,
    #[builder(default)]
    ignored: HashSet<ReadId>,
}

impl Context {
    /// True if `read` was marked ignored at construction time or by a
    /// later `mark_ignored` call (`spec.md` §4.3.5).
    pub fn is_ignored(&self, read: ReadId) -> bool {
        self.reads.is_ignored(read) || self.ignored.contains(&read)
    }

    pub fn mark_ignored(&mut self, reads: impl IntoIterator<Item = ReadId>) {
        self.ignored.extend(reads);
    }

    pub fn ignored_count(&self) -> usize {
        self.ignored.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::read_info::ReadRecord;

    #[test]
    fn mark_ignored_overlays_without_mutating_read_info() {
        let reads = ReadInfo::new(vec![ReadRecord { id: 1, length: 500, mate_id: 0, library_id: 1, ignore: false }]);
        let mut ctx = ContextBuilder::default()
            .reads(reads)
            .overlaps(OverlapCache::default())
            .graph(BestOverlapGraph::new(1))
            .config(Config::default())
            .build()
            .unwrap();

        assert!(!ctx.is_ignored(1));
        ctx.mark_ignored(vec![1]);
        assert!(ctx.is_ignored(1));
        assert!(!ctx.reads.is_ignored(1));
    }
}
