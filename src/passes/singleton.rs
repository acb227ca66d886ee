//! `promoteToSingleton` (`spec.md` §4.3.5).
//!
//! `ReadInfo` is read-only after construction (`spec.md` §5), so the
//! "mark ignore" branch cannot mutate it directly; instead this returns
//! the ids that should be folded into an ignore overlay by the caller.

use log::info;

use crate::config::Config;
use crate::read_info::{ReadId, ReadInfo};
use crate::tig::node::{Position, UfNode};
use crate::tig::TigVector;

pub fn promote_to_singleton(
    tigs: &mut TigVector,
    reads: &ReadInfo,
    config: &Config,
    verbose: bool,
) -> (usize, Vec<ReadId>) {
    let mut promoted = 0;
    let mut newly_ignored = Vec::new();

    for read in reads.live_ids().collect::<Vec<_>>() {
        if tigs.in_unitig(read) != 0 {
            continue;
        }
        if config.enable_promote_to_singleton {
            let length = reads.length(read) as i64;
            let id = tigs.new_unitig();
            tigs.get_mut(id)
                .expect("just allocated")
                .add_read(UfNode::new(read, Position::new(0, length)), 0, verbose);
            tigs.register_read(id);
            promoted += 1;
        } else {
            newly_ignored.push(read);
        }
    }

    if promoted > 0 {
        info!("promoteToSingleton: promoted {} unplaced read(s) to singletons", promoted);
    }
    if !newly_ignored.is_empty() {
        info!("promoteToSingleton: marked {} unplaced read(s) as ignored", newly_ignored.len());
    }

    (promoted, newly_ignored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::read_info::ReadRecord;

    fn reads_with_one_unplaced() -> ReadInfo {
        ReadInfo::new(vec![ReadRecord { id: 1, length: 400, mate_id: 0, library_id: 1, ignore: false }])
    }

    #[test]
    fn promotes_when_enabled() {
        let reads = reads_with_one_unplaced();
        let mut tigs = TigVector::new(1);
        let config = Config { enable_promote_to_singleton: true, ..Config::default() };

        let (promoted, ignored) = promote_to_singleton(&mut tigs, &reads, &config, false);
        assert_eq!(promoted, 1);
        assert!(ignored.is_empty());
        assert_ne!(tigs.in_unitig(1), 0);
    }

    #[test]
    fn marks_ignored_when_disabled() {
        let reads = reads_with_one_unplaced();
        let mut tigs = TigVector::new(1);
        let config = Config { enable_promote_to_singleton: false, ..Config::default() };

        let (promoted, ignored) = promote_to_singleton(&mut tigs, &reads, &config, false);
        assert_eq!(promoted, 0);
        assert_eq!(ignored, vec![1]);
        assert_eq!(tigs.in_unitig(1), 0);
    }
}
