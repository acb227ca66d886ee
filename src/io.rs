//! Auxiliary file formats (`spec.md` §6): newline-delimited JSON readers
//! for the three inputs this core consumes (`ReadInfo`, the overlap
//! cache, the best-overlap graph), built upstream of this crate and
//! handed in read-only.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Deserialize;

use crate::best_overlap_graph::{BestContainment, BestEdge, BestOverlapGraph};
use crate::errors::Error;
use crate::overlap::{Overlap, OverlapCache};
use crate::read_info::{ReadId, ReadInfo, ReadRecord};

fn open(path: &Path) -> Result<BufReader<File>, Error> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| Error::Io { path: path.to_path_buf(), source })
}

fn read_jsonl<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>, Error> {
    let reader = open(path)?;
    let mut out = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|source| Error::Io { path: path.to_path_buf(), source })?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: T = serde_json::from_str(line)
            .unwrap_or_else(|e| panic!("malformed record in {}: {}", path.display(), e));
        out.push(record);
    }
    Ok(out)
}

pub fn load_read_info(path: &Path) -> Result<ReadInfo, Error> {
    let records: Vec<ReadRecord> = read_jsonl(path)?;
    Ok(ReadInfo::new(records))
}

pub fn load_overlaps(path: &Path) -> Result<OverlapCache, Error> {
    let overlaps: Vec<Overlap> = read_jsonl(path)?;
    Ok(OverlapCache::new(overlaps))
}

/// One line of the best-overlap-graph input: a read id plus whichever of
/// its best 5'/3'/containment edges are present.
#[derive(Clone, Debug, Deserialize)]
struct BestEdgeRecord {
    read: ReadId,
    edge5: Option<BestEdge>,
    edge3: Option<BestEdge>,
    containment: Option<BestContainment>,
}

pub fn load_best_overlap_graph(path: &Path, num_reads: usize) -> Result<BestOverlapGraph, Error> {
    let records: Vec<BestEdgeRecord> = read_jsonl(path)?;
    let mut og = BestOverlapGraph::new(num_reads);
    for rec in records {
        if let Some(edge) = rec.edge5 {
            og.set_best_edge_5p(rec.read, edge);
        }
        if let Some(edge) = rec.edge3 {
            og.set_best_edge_3p(rec.read, edge);
        }
        if let Some(containment) = rec.containment {
            og.set_best_containment(rec.read, containment);
        }
    }
    Ok(og)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_read_info_from_jsonl() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"id":1,"length":500,"mate_id":0,"library_id":1,"ignore":false}}"#).unwrap();
        let reads = load_read_info(file.path()).unwrap();
        assert_eq!(reads.length(1), 500);
    }

    #[test]
    fn loads_overlaps_from_jsonl() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"a":1,"b":2,"a_hang":100,"b_hang":-50,"flipped":false,"erate":0.02}}"#).unwrap();
        let cache = load_overlaps(file.path()).unwrap();
        assert_eq!(cache.overlaps_from(1).len(), 1);
    }

    #[test]
    fn missing_file_reports_io_error() {
        let err = load_read_info(Path::new("/nonexistent/reads.jsonl")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
