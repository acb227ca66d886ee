//! `placeZombies` (`spec.md` §4.3.2): resurrect reads the contain pass
//! could not place (circular containments) as singleton unitigs.

use log::info;

use crate::read_info::ReadInfo;
use crate::tig::node::{Position, UfNode};
use crate::tig::TigVector;

pub fn place_zombies(tigs: &mut TigVector, reads: &ReadInfo, verbose: bool) -> usize {
    let mut count = 0;

    for read in reads.live_ids().collect::<Vec<_>>() {
        if tigs.in_unitig(read) != 0 {
            continue;
        }
        let length = reads.length(read) as i64;
        let id = tigs.new_unitig();
        tigs.get_mut(id)
            .expect("just allocated")
            .add_read(UfNode::new(read, Position::new(0, length)), 0, verbose);
        tigs.register_read(id);
        count += 1;
    }

    if count > 0 {
        info!("placeZombies: resurrected {} unplaced read(s) as singletons", count);
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::read_info::ReadRecord;

    #[test]
    fn unplaced_reads_become_singletons_at_origin() {
        let reads = ReadInfo::new(vec![ReadRecord { id: 1, length: 300, mate_id: 0, library_id: 1, ignore: false }]);
        let mut tigs = TigVector::new(1);

        let count = place_zombies(&mut tigs, &reads, false);
        assert_eq!(count, 1);

        let tig_id = tigs.in_unitig(1);
        assert_ne!(tig_id, 0);
        let tig = tigs.get(tig_id).unwrap();
        assert_eq!(tig.ufpath[0].position.min(), 0);
        assert_eq!(tig.ufpath[0].position.max(), 300);
    }

    #[test]
    fn already_placed_reads_are_left_alone() {
        let reads = ReadInfo::new(vec![ReadRecord { id: 1, length: 300, mate_id: 0, library_id: 1, ignore: false }]);
        let mut tigs = TigVector::new(1);
        let id = tigs.new_unitig();
        tigs.get_mut(id).unwrap().add_read(UfNode::new(1, Position::new(0, 300)), 0, false);
        tigs.register_read(id);

        let count = place_zombies(&mut tigs, &reads, false);
        assert_eq!(count, 0);
        assert_eq!(tigs.len(), 1);
    }
}
