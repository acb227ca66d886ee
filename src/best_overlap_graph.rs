//! The best-overlap graph (`spec.md` §2 component table: "Per-read best
//! 5' edge, best 3' edge, best container"). Construction of the graph
//! (tie-breaking among many candidate overlaps) is external to this
//! core per `spec.md` §1/§6 — `BestOverlapGraph` here is the read-only
//! query surface the core consumes, built once and shared like
//! varlociraptor's `AlignmentProperties`.

use serde::{Deserialize, Serialize};

use crate::read_info::ReadId;

/// A best dovetail edge off one end of a read (`spec.md` §6).
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BestEdge {
    pub frag_id: ReadId,
    /// `true` if the edge attaches to the peer's 3' end, `false` for 5'.
    pub frag_3p: bool,
    pub a_hang: i32,
    pub b_hang: i32,
    pub erate: f32,
}

impl BestEdge {
    pub fn is_none(&self) -> bool {
        self.frag_id == 0
    }

    pub const NONE: BestEdge = BestEdge {
        frag_id: 0,
        frag_3p: false,
        a_hang: 0,
        b_hang: 0,
        erate: 0.0,
    };

    /// Overlap length used to decide which of two edges is "thicker"
    /// (`spec.md` §4.2.4): `|read| + min(0,bhang) - max(0,ahang)`.
    pub fn thickness(&self, read_length: u32) -> i64 {
        read_length as i64 + self.b_hang.min(0) as i64 - self.a_hang.max(0) as i64
    }
}

/// A best containment edge (`spec.md` §6).
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BestContainment {
    pub container: ReadId,
    pub is_contained: bool,
    pub same_orientation: bool,
    pub a_hang: i32,
    pub b_hang: i32,
}

impl BestContainment {
    pub const NONE: BestContainment = BestContainment {
        container: 0,
        is_contained: false,
        same_orientation: true,
        a_hang: 0,
        b_hang: 0,
    };
}

#[derive(Copy, Clone, Debug, Default)]
struct BestEdges {
    edge5: Option<BestEdge>,
    edge3: Option<BestEdge>,
    containment: Option<BestContainment>,
}

/// Per-read best 5'/3' edge and best container, indexed by read id.
#[derive(Clone, Debug, Default)]
pub struct BestOverlapGraph {
    by_read: Vec<BestEdges>,
}

impl BestOverlapGraph {
    pub fn new(num_reads: usize) -> Self {
        BestOverlapGraph {
            by_read: vec![BestEdges::default(); num_reads + 1],
        }
    }

    pub fn set_best_edge_5p(&mut self, read: ReadId, edge: BestEdge) {
        self.ensure_capacity(read);
        self.by_read[read as usize].edge5 = Some(edge);
    }

    pub fn set_best_edge_3p(&mut self, read: ReadId, edge: BestEdge) {
        self.ensure_capacity(read);
        self.by_read[read as usize].edge3 = Some(edge);
    }

    pub fn set_best_containment(&mut self, read: ReadId, containment: BestContainment) {
        self.ensure_capacity(read);
        self.by_read[read as usize].containment = Some(containment);
    }

    fn ensure_capacity(&mut self, read: ReadId) {
        if read as usize >= self.by_read.len() {
            self.by_read.resize(read as usize + 1, BestEdges::default());
        }
    }

    /// `bestEdge(readId, end3p)` (`spec.md` §6). Returns `BestEdge::NONE`
    /// if there is no edge off that end.
    pub fn best_edge(&self, read: ReadId, end_3p: bool) -> BestEdge {
        self.by_read
            .get(read as usize)
            .and_then(|e| if end_3p { e.edge3 } else { e.edge5 })
            .unwrap_or(BestEdge::NONE)
    }

    /// `bestContainer(readId)` (`spec.md` §6).
    pub fn best_containment(&self, read: ReadId) -> BestContainment {
        self.by_read
            .get(read as usize)
            .and_then(|e| e.containment)
            .unwrap_or(BestContainment::NONE)
    }

    pub fn has_any_edge(&self, read: ReadId) -> bool {
        let e = self.by_read.get(read as usize);
        e.map(|e| e.edge5.is_some() || e.edge3.is_some())
            .unwrap_or(false)
    }
}
