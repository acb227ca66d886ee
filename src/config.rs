use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Bitset of diagnostic log categories named in `spec.md` §6. Plain
/// associated `u32` constants rather than a `bitflags!`-generated type,
/// since the set is small and fixed and the crate does not otherwise
/// depend on the `bitflags` crate.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFlags(pub u32);

impl LogFlags {
    pub const INTERSECTION_BREAKING: u32 = 1 << 0;
    pub const MATE_SPLIT_ANALYSIS: u32 = 1 << 1;
    pub const MATE_SPLIT_COVERAGE_PLOT: u32 = 1 << 2;
    pub const PLACE_FRAG: u32 = 1 << 3;
    pub const SET_PARENT_AND_HANG: u32 = 1 << 4;
    pub const HAPPINESS: u32 = 1 << 5;
    pub const INITIAL_CONTAINED_PLACEMENT: u32 = 1 << 6;

    pub fn is_set(&self, flag: u32) -> bool {
        self.0 & flag != 0
    }

    pub fn set(&mut self, flag: u32) {
        self.0 |= flag;
    }
}

/// Numeric thresholds shared by the placement algorithms and the
/// post-processing passes. Collected here instead of hardcoded at each
/// call site, the way varlociraptor collects its spurious-rate and
/// window options into `SampleBuilder` fields rather than scattering
/// literals through `model::sample`.
#[derive(Clone, Debug, Serialize, Deserialize, Builder)]
#[builder(pattern = "owned")]
pub struct Config {
    /// Minimum dovetail overlap, in bases, required between adjacent
    /// reads in a unitig path (invariant 7 of `spec.md` §3).
    #[builder(default = "40")]
    pub min_overlap_len: i64,

    /// An invading tig shorter than this many bases cannot absorb a
    /// break point during intersection splitting (`spec.md` §4.3.4).
    #[builder(default = "500")]
    pub min_break_length: i64,

    /// An invading tig with fewer reads than this cannot absorb a break
    /// point during intersection splitting (`spec.md` §4.3.4).
    #[builder(default = "2")]
    pub min_break_frags: usize,

    /// Promote unplaced nonzero-length reads to singleton unitigs
    /// (`-enablePromoteToSingleton`) instead of marking them ignored.
    #[builder(default = "false")]
    pub enable_promote_to_singleton: bool,

    /// Run the intersection-split pass (`-enableIntersectionBreaking`).
    #[builder(default = "false")]
    pub enable_intersection_breaking: bool,

    /// Maximum error rate accepted when the best-overlap graph selected
    /// an edge (`-eGraphErate`); stored here so `setParentAndHang`'s
    /// thickest-overlap tie-break can prefer the lower-erate overlap
    /// among equal-length candidates.
    #[builder(default = "0.05")]
    pub e_graph_erate: f64,

    /// Maximum error rate accepted for an overlap to be usable at all
    /// (`-eOverlap`).
    #[builder(default = "0.12")]
    pub e_overlap: f64,

    /// Reads per output partition target (`-B`); partitions may exceed
    /// this only when a single unitig alone is larger than the target.
    #[builder(default = "2500")]
    pub reads_per_partition: usize,

    /// Coverage-stat threshold below which a unitig is flagged
    /// `isRepeat` (`SPEC_FULL.md` §4.7).
    #[builder(default = "5.0")]
    pub repeat_covstat_cutoff: f64,

    /// A unitig no longer than this many bases is a bubble candidate
    /// (`SPEC_FULL.md` §4.7's two-path bubble shape).
    #[builder(default = "1000")]
    pub bubble_max_length: i64,

    /// A bubble candidate needs more than this many mate links into the
    /// same other unitig to be flagged `isBubble`; mirrors
    /// `AS_BAT_MateBubble.C`'s hardcoded "more than 3 mates" threshold.
    #[builder(default = "3")]
    pub bubble_mate_threshold: usize,

    /// Bitset of enabled diagnostic log categories (`spec.md` §6).
    #[builder(default)]
    pub log_flags: LogFlags,

    /// A library with fewer mated-pair observations than this is marked
    /// invalid rather than given an estimated mean/stddev (`spec.md`
    /// §4.4 "Mark a library invalid if too few mated reads").
    #[builder(default = "10")]
    pub min_library_samples: usize,

    /// Threshold (per-base bad-mate count) below which a region counts
    /// toward a peak-bad run (`spec.md` §4.5).
    #[builder(default = "1")]
    pub peak_bad_threshold: u32,
}

impl Default for Config {
    fn default() -> Self {
        ConfigBuilder::default().build().unwrap()
    }
}
