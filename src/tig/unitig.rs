//! `Unitig` coordinate algebra (`spec.md` §4.2): `addRead`, both
//! `placeFrag` overloads, `addAndPlaceFrag`, `reverseComplement`, `sort`.

use std::collections::HashMap;

use log::warn;

use crate::best_overlap_graph::{BestContainment, BestEdge};
use crate::read_info::{ReadId, ReadInfo};
use crate::tig::node::{Position, UfNode};

#[derive(Clone, Debug, Default)]
pub struct Unitig {
    pub id: u32,
    pub length: i64,
    pub ufpath: Vec<UfNode>,
    pub is_unassembled: bool,
    pub is_repeat: bool,
    pub is_circular: bool,
    pub is_bubble: bool,
    pub circular_length: i64,
    /// Local read -> path-index lookup, mirrored by `TigVector`'s global
    /// reverse map but kept here too since the placement algorithms need
    /// it while operating on a single `Unitig` in isolation.
    path_index: HashMap<ReadId, usize>,
}

impl Unitig {
    pub fn new(id: u32) -> Self {
        Unitig {
            id,
            length: 0,
            ufpath: Vec::new(),
            is_unassembled: false,
            is_repeat: false,
            is_circular: false,
            is_bubble: false,
            circular_length: 0,
            path_index: HashMap::new(),
        }
    }

    pub fn path_position(&self, read: ReadId) -> Option<usize> {
        self.path_index.get(&read).copied()
    }

    fn rebuild_path_index(&mut self) {
        self.path_index.clear();
        for (idx, node) in self.ufpath.iter().enumerate() {
            self.path_index.insert(node.ident, idx);
        }
    }

    /// `spec.md` §4.2.1. Appends `node` (at `node.position + offset`),
    /// shifting the whole unitig right if the shifted position would
    /// start below zero.
    pub fn add_read(&mut self, mut node: UfNode, offset: i64, verbose: bool) {
        node.position = node.position.shifted(offset);

        if node.position.min() < 0 {
            let shift = -node.position.min();
            for n in self.ufpath.iter_mut() {
                n.position = n.position.shifted(shift);
            }
            node.position = node.position.shifted(shift);
            self.length += shift;
            if verbose {
                log::debug!(
                    "unitig {}: shifted by {} to keep read {} non-negative",
                    self.id,
                    shift,
                    node.ident
                );
            }
        }

        self.length = self.length.max(node.position.max());
        let idx = self.ufpath.len();
        self.path_index.insert(node.ident, idx);
        self.ufpath.push(node);

        if verbose {
            log::debug!(
                "unitig {}: added read {} at [{}, {})",
                self.id,
                node.ident,
                node.position.min(),
                node.position.max()
            );
        }
    }

    /// `spec.md` §4.2.2: place `frag` as a containee of an already-placed
    /// container read. Returns `false` (and logs a warning) if the
    /// container is not in this unitig.
    pub fn place_contained(
        &mut self,
        reads: &ReadInfo,
        frag_id: ReadId,
        containment: BestContainment,
        verbose: bool,
    ) -> bool {
        let p_idx = match self.path_position(containment.container) {
            Some(idx) => idx,
            None => {
                warn!(
                    "placeFrag: container {} for read {} not in unitig {}",
                    containment.container, frag_id, self.id
                );
                return false;
            }
        };
        let p = self.ufpath[p_idx];
        let container_true_len = reads.length(p.ident).max(1) as f64;
        let scale = p.position.len() as f64 / container_true_len;

        let (ahang, bhang) = if p.position.is_forward() {
            (containment.a_hang, containment.b_hang)
        } else {
            (-containment.b_hang, -containment.a_hang)
        };

        // Forward container: ahang drives bgn, bhang drives end. Reverse
        // container: the roles swap (bhang drives bgn, ahang drives end)
        // even before the orientation swap below is applied.
        let (mut bgn, mut end) = if p.position.is_forward() {
            (p.position.bgn as f64 + ahang as f64 * scale, p.position.end as f64 + bhang as f64 * scale)
        } else {
            (p.position.bgn as f64 + bhang as f64 * scale, p.position.end as f64 + ahang as f64 * scale)
        };
        if !containment.same_orientation {
            std::mem::swap(&mut bgn, &mut end);
        }

        // Length correction: recenter so the placed span averages the
        // raw projection against the containee's true length, then
        // clamp inside the container (spec.md §4.2.2 step 5).
        let frag_true_len = reads.length(frag_id) as f64;
        let placed_span = (end - bgn).abs();
        let avg_len = (placed_span + frag_true_len) / 2.0;
        let center = (bgn + end) / 2.0;
        let sign = if end >= bgn { 1.0 } else { -1.0 };
        bgn = center - sign * avg_len / 2.0;
        end = center + sign * avg_len / 2.0;

        let (pmin, pmax) = (p.position.min() as f64, p.position.max() as f64);
        bgn = bgn.clamp(pmin, pmax);
        end = end.clamp(pmin, pmax);

        let node = UfNode {
            ident: frag_id,
            contained: containment.container,
            parent: containment.container,
            ahang,
            bhang,
            position: Position::new(bgn.round() as i64, end.round() as i64),
            containment_depth: p.containment_depth + 1,
        };

        if verbose {
            log::debug!(
                "placeFrag: contained read {} under container {} at [{}, {})",
                frag_id,
                containment.container,
                node.position.min(),
                node.position.max()
            );
        }

        self.add_read(node, 0, verbose);
        true
    }

    /// `spec.md` §4.2.3: dovetail placement from a single best-edge.
    /// `frag_end_5p` is `true` when `edge` is the new fragment's 5'-end
    /// edge, `false` for its 3'-end edge; `peer_idx` is the peer's
    /// position in this unitig's `ufpath`.
    fn dovetail_candidate(
        &self,
        reads: &ReadInfo,
        frag_id: ReadId,
        peer_idx: usize,
        edge: BestEdge,
        frag_end_5p: bool,
    ) -> UfNode {
        let p = self.ufpath[peer_idx];
        let p_forward = p.position.is_forward();
        let peer_true_len = reads.length(p.ident).max(1) as f64;
        let scale = p.position.len() as f64 / peer_true_len;
        let direction = if p_forward { 1.0 } else { -1.0 };

        let peer_attach_3p = edge.frag_3p;
        let p_near = if peer_attach_3p {
            p.position.end
        } else {
            p.position.bgn
        };

        // spec.md §4.2.3 step 2: intra-parent hang scaled by
        // |P.position|/trueLength(P), inter-parent component left at 1.0
        // (the a-hang already captures the full offset here, there is no
        // separate inter-parent term for a simple dovetail edge).
        let frag_near = p_near as f64 - direction * edge.a_hang as f64 * scale;
        let true_len = reads.length(frag_id) as f64;

        let (bgn, end) = if frag_end_5p {
            (frag_near, frag_near + direction * true_len)
        } else {
            (frag_near - direction * true_len, frag_near)
        };

        // Alternate formulation, named in the fragment's own terms: if
        // frag_end_5p the near coordinate is frag's 5' (bgn), otherwise
        // it is frag's 3' (end) -- bgn/end always carry 5'/3' regardless
        // of final orientation (spec.md §3).
        let (mut bgn, mut end) = if frag_end_5p { (bgn, end) } else { (end, bgn) };

        // spec.md §4.2.3 step 4: enforce the dovetail relation, clamping
        // by +-1 and warning on violation.
        let frag_min = bgn.min(end);
        let p_min = p.position.min() as f64;
        let p_max = p.position.max() as f64;
        if frag_min < p_min {
            if !(bgn.max(end) < p_max) {
                warn!(
                    "placeFrag: dovetail relation violated placing read {} before read {}; clamping",
                    frag_id, p.ident
                );
                let clamped = p_max - 1.0;
                if bgn >= end {
                    bgn = clamped;
                } else {
                    end = clamped;
                }
            }
        } else if !(bgn.max(end) > p_max) {
            warn!(
                "placeFrag: dovetail relation violated placing read {} after read {}; clamping",
                frag_id, p.ident
            );
            let clamped = p_max + 1.0;
            if bgn >= end {
                bgn = clamped;
            } else {
                end = clamped;
            }
        }

        let is_reverse = if frag_end_5p {
            (p_forward && !peer_attach_3p) || (!p_forward && peer_attach_3p)
        } else {
            (p_forward && peer_attach_3p) || (!p_forward && !peer_attach_3p)
        };
        debug_assert_eq!(is_reverse, end < bgn, "orientation rule disagrees with projected coordinates");

        UfNode {
            ident: frag_id,
            contained: 0,
            parent: p.ident,
            ahang: edge.a_hang,
            bhang: edge.b_hang,
            position: Position::new(bgn.round() as i64, end.round() as i64),
            containment_depth: 0,
        }
    }

    /// `spec.md` §4.2.3. Either edge may be `None` or reference a read
    /// outside this unitig (pass `None` for those too). Returns `true`
    /// if at least one edge produced a placement.
    pub fn place_dovetail(
        &mut self,
        reads: &ReadInfo,
        frag_id: ReadId,
        edge5: Option<(usize, BestEdge)>,
        edge3: Option<(usize, BestEdge)>,
        verbose: bool,
    ) -> bool {
        let candidate5 = edge5
            .filter(|(_, e)| !e.is_none())
            .map(|(idx, e)| self.dovetail_candidate(reads, frag_id, idx, e, true));
        let candidate3 = edge3
            .filter(|(_, e)| !e.is_none())
            .map(|(idx, e)| self.dovetail_candidate(reads, frag_id, idx, e, false));

        let chosen = match (candidate5, candidate3) {
            (Some(c5), Some(c3)) => {
                if c5.position != c3.position && verbose {
                    log::debug!(
                        "placeFrag: 5' and 3' edges disagree for read {} ([{:?}] vs [{:?}]); preferring the 5' edge",
                        frag_id, c5.position, c3.position
                    );
                }
                Some(c5)
            }
            (Some(c5), None) => Some(c5),
            (None, Some(c3)) => Some(c3),
            (None, None) => None,
        };

        match chosen {
            Some(node) => {
                self.add_read(node, 0, verbose);
                true
            }
            None => false,
        }
    }

    /// `spec.md` §4.2.4: pick the thicker of the two edges and place
    /// with it alone. Ties (`blen5 == blen3`) go to the 3' edge, per the
    /// strict `<` comparison in the original (`spec.md` §9 open
    /// questions: preserved deliberately, not a bug).
    pub fn add_and_place_frag(
        &mut self,
        reads: &ReadInfo,
        frag_id: ReadId,
        edge5: Option<(usize, BestEdge)>,
        edge3: Option<(usize, BestEdge)>,
        verbose: bool,
    ) -> bool {
        let frag_len = reads.length(frag_id);
        let blen5 = edge5
            .filter(|(_, e)| !e.is_none())
            .map(|(_, e)| e.thickness(frag_len));
        let blen3 = edge3
            .filter(|(_, e)| !e.is_none())
            .map(|(_, e)| e.thickness(frag_len));

        let use5 = match (blen5, blen3) {
            (Some(b5), Some(b3)) => b5 < b3,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => return false,
        };

        if use5 {
            self.place_dovetail(reads, frag_id, edge5, None, verbose)
        } else {
            self.place_dovetail(reads, frag_id, None, edge3, verbose)
        }
    }

    /// `spec.md` §4.2.5. Reverse-complements every coordinate in place.
    pub fn reverse_complement(&mut self, do_sort: bool) {
        for n in self.ufpath.iter_mut() {
            n.position = Position::new(self.length - n.position.bgn, self.length - n.position.end);
        }
        if do_sort {
            self.sort();
        } else {
            self.ufpath.reverse();
            self.rebuild_path_index();
        }
    }

    /// `spec.md` §4.2.6. Stable sort by `(min asc, max desc,
    /// containment_depth asc)`.
    pub fn sort(&mut self) {
        self.ufpath.sort_by_key(|n| n.sort_key());
        self.rebuild_path_index();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::read_info::{ReadInfo, ReadRecord};

    fn reads(lens: &[(ReadId, u32)]) -> ReadInfo {
        ReadInfo::new(
            lens.iter()
                .map(|&(id, length)| ReadRecord {
                    id,
                    length,
                    mate_id: 0,
                    library_id: 1,
                    ignore: false,
                })
                .collect(),
        )
    }

    #[test]
    fn scenario_a_containment_placement() {
        let reads = reads(&[(1, 1000), (2, 600)]);
        let mut u = Unitig::new(1);
        u.add_read(UfNode::new(1, Position::new(0, 1000)), 0, false);

        let containment = BestContainment {
            container: 1,
            is_contained: true,
            same_orientation: true,
            a_hang: 200,
            b_hang: -200,
        };
        assert!(u.place_contained(&reads, 2, containment, false));

        let idx = u.path_position(2).unwrap();
        let node = u.ufpath[idx];
        assert_eq!(node.parent, 1);
        assert_eq!(node.ahang, 200);
        assert_eq!(node.bhang, -200);
        assert_eq!(node.containment_depth, 1);
        assert!(node.position.min() >= 0);
        assert!(node.position.max() <= 1000);
        // approximately (200, 800): length-corrected average of the raw
        // projection (200..800, span 600) and the true length (600).
        assert_eq!(node.position.min(), 200);
        assert_eq!(node.position.max(), 800);
    }

    #[test]
    fn scenario_b_dovetail_placement() {
        let reads = reads(&[(1, 1000), (2, 1000)]);
        let mut u = Unitig::new(1);
        u.add_read(UfNode::new(1, Position::new(0, 1000)), 0, false);

        let edge = BestEdge {
            frag_id: 1,
            frag_3p: true,
            a_hang: 200,
            b_hang: 200,
            erate: 0.01,
        };
        let p_idx = u.path_position(1).unwrap();
        assert!(u.place_dovetail(&reads, 2, Some((p_idx, edge)), None, false));

        let idx = u.path_position(2).unwrap();
        let node = u.ufpath[idx];
        assert_eq!(node.position, Position::new(800, 1800));
        assert_eq!(u.length, 1800);
        assert_eq!(node.parent, 1);
    }

    #[test]
    fn containment_of_same_length_stays_inside_container() {
        let reads = reads(&[(1, 1000), (2, 1000)]);
        let mut u = Unitig::new(1);
        u.add_read(UfNode::new(1, Position::new(0, 1000)), 0, false);
        let containment = BestContainment {
            container: 1,
            is_contained: true,
            same_orientation: true,
            a_hang: 0,
            b_hang: 0,
        };
        assert!(u.place_contained(&reads, 2, containment, false));
        let node = u.ufpath[u.path_position(2).unwrap()];
        assert!(node.position.min() >= 0);
        assert!(node.position.max() <= 1000);
    }

    #[test]
    fn containment_under_reverse_container_swaps_hang_roles() {
        let reads = reads(&[(1, 1000), (2, 600)]);
        let mut u = Unitig::new(1);
        u.add_read(UfNode::new(1, Position::new(1000, 0)), 0, false);

        let containment = BestContainment {
            container: 1,
            is_contained: true,
            same_orientation: true,
            a_hang: 200,
            b_hang: -200,
        };
        assert!(u.place_contained(&reads, 2, containment, false));

        let idx = u.path_position(2).unwrap();
        let node = u.ufpath[idx];
        assert_eq!(node.parent, 1);
        assert!(node.position.min() >= 0);
        assert!(node.position.max() <= 1000);
        // bhang drives bgn and ahang drives end under a reverse container,
        // the mirror image of scenario_a_containment_placement's (200, 800).
        assert_eq!(node.position.bgn, 800);
        assert_eq!(node.position.end, 200);
    }

    #[test]
    fn place_contained_fails_when_container_absent() {
        let reads = reads(&[(1, 1000), (2, 600)]);
        let mut u = Unitig::new(1);
        let containment = BestContainment {
            container: 1,
            is_contained: true,
            same_orientation: true,
            a_hang: 200,
            b_hang: -200,
        };
        assert!(!u.place_contained(&reads, 2, containment, false));
    }

    #[test]
    fn add_read_shifts_whole_unitig_left_extension() {
        let mut u = Unitig::new(1);
        u.add_read(UfNode::new(1, Position::new(0, 1000)), 0, false);
        u.add_read(UfNode::new(2, Position::new(-300, 200)), 0, false);

        for n in &u.ufpath {
            assert!(n.position.min() >= 0);
        }
        assert_eq!(u.path_position(1).map(|i| u.ufpath[i].position), Some(Position::new(300, 1300)));
        assert_eq!(u.path_position(2).map(|i| u.ufpath[i].position), Some(Position::new(0, 500)));
    }

    #[test]
    fn sort_orders_containers_before_containees_and_is_idempotent() {
        let mut u = Unitig::new(1);
        u.ufpath.push(UfNode {
            ident: 2,
            contained: 1,
            parent: 1,
            ahang: 0,
            bhang: 0,
            position: Position::new(100, 400),
            containment_depth: 1,
        });
        u.ufpath.push(UfNode::new(1, Position::new(0, 1000)));
        u.sort();
        assert_eq!(u.ufpath[0].ident, 1);
        assert_eq!(u.ufpath[1].ident, 2);
        let before = u.ufpath.clone();
        u.sort();
        assert_eq!(u.ufpath, before);
    }

    #[test]
    fn reverse_complement_twice_restores_layout() {
        let mut u = Unitig::new(1);
        u.add_read(UfNode::new(1, Position::new(0, 1000)), 0, false);
        u.add_read(UfNode::new(2, Position::new(800, 1800)), 0, false);
        let original = u.ufpath.clone();

        u.reverse_complement(false);
        u.reverse_complement(false);

        assert_eq!(u.ufpath, original);
    }
}
