//! Per-read metadata (`spec.md` §3, §6: "Read info (input)").
//!
//! `ReadInfo` is read-only after construction and freely shared across
//! threads (`spec.md` §5), following the same "build once, pass `&self`
//! everywhere" contract varlociraptor uses for its `AlignmentProperties`.

use serde::{Deserialize, Serialize};

pub type ReadId = u32;

/// A single read's external metadata. Deleted reads have `length == 0`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadRecord {
    pub id: ReadId,
    pub length: u32,
    pub mate_id: ReadId,
    pub library_id: u32,
    pub ignore: bool,
}

impl ReadRecord {
    pub fn is_deleted(&self) -> bool {
        self.length == 0
    }

    pub fn is_mated(&self) -> bool {
        self.mate_id != 0
    }
}

/// Dense, one-indexed table of read metadata. Index 0 is reserved so
/// that `ReadId(0)` can mean "no read", mirroring the `TigVector` slot-0
/// convention of `spec.md` §4.1.
#[derive(Clone, Debug, Default)]
pub struct ReadInfo {
    records: Vec<ReadRecord>,
}

impl ReadInfo {
    pub fn new(mut records: Vec<ReadRecord>) -> Self {
        records.sort_by_key(|r| r.id);
        let max_id = records.last().map(|r| r.id).unwrap_or(0);
        let mut table = vec![
            ReadRecord {
                id: 0,
                length: 0,
                mate_id: 0,
                library_id: 0,
                ignore: true,
            };
            max_id as usize + 1
        ];
        for r in records {
            table[r.id as usize] = r;
        }
        ReadInfo { records: table }
    }

    pub fn len(&self) -> usize {
        self.records.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: ReadId) -> Option<&ReadRecord> {
        self.records.get(id as usize).filter(|r| r.id != 0 || id == 0)
    }

    pub fn length(&self, id: ReadId) -> u32 {
        self.records.get(id as usize).map(|r| r.length).unwrap_or(0)
    }

    pub fn mate_id(&self, id: ReadId) -> ReadId {
        self.records.get(id as usize).map(|r| r.mate_id).unwrap_or(0)
    }

    pub fn library_id(&self, id: ReadId) -> u32 {
        self.records
            .get(id as usize)
            .map(|r| r.library_id)
            .unwrap_or(0)
    }

    pub fn is_ignored(&self, id: ReadId) -> bool {
        self.records.get(id as usize).map(|r| r.ignore).unwrap_or(true)
    }

    pub fn is_deleted(&self, id: ReadId) -> bool {
        self.length(id) == 0
    }

    /// All live (non-deleted) read ids, in ascending order.
    pub fn live_ids(&self) -> impl Iterator<Item = ReadId> + '_ {
        self.records
            .iter()
            .filter(|r| r.id != 0 && r.length != 0)
            .map(|r| r.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: ReadId, length: u32, mate_id: ReadId, library_id: u32) -> ReadRecord {
        ReadRecord {
            id,
            length,
            mate_id,
            library_id,
            ignore: false,
        }
    }

    #[test]
    fn slot_zero_is_reserved() {
        let info = ReadInfo::new(vec![rec(1, 1000, 0, 1)]);
        assert_eq!(info.length(0), 0);
        assert!(info.is_deleted(0));
    }

    #[test]
    fn deleted_reads_have_zero_length() {
        let info = ReadInfo::new(vec![rec(1, 1000, 0, 1), rec(2, 0, 0, 0)]);
        assert!(!info.is_deleted(1));
        assert!(info.is_deleted(2));
    }

    #[test]
    fn live_ids_skips_deleted_and_slot_zero() {
        let info = ReadInfo::new(vec![rec(1, 500, 2, 1), rec(2, 500, 1, 1), rec(3, 0, 0, 0)]);
        let ids: Vec<_> = info.live_ids().collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn unknown_id_reports_as_deleted_and_ignored() {
        let info = ReadInfo::new(vec![rec(1, 500, 0, 1)]);
        assert_eq!(info.length(99), 0);
        assert!(info.is_ignored(99));
    }
}
