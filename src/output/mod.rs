//! Output (`spec.md` §4.6, §6): the tig-store `MultiAlign`/`IntMultiPos`
//! stream, `.iidmap`, `.partitioning`, `.partitioningInfo`,
//! `.unused.ovl`, and the `.cga.0` length/coverage-stat/arrival-rate
//! histograms.
//!
//! The `MultiAlign` stream is written through `utils::worker_pool`
//! (`SPEC_FULL.md` §5): one thread walks the tig vector and hands each
//! unitig's already-built record to a pool of encoder threads, and the
//! calling thread writes the resulting `bincode` blobs to the tig-store
//! file strictly in tig-id order even though encoding finishes out of
//! order.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use derefable::Derefable;
use derive_builder::Builder;
use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::errors::Error;
use crate::insert_sizes::InsertSizes;
use crate::mate_location::EvaluateMatesResult;
use crate::overlap::OverlapCache;
use crate::tig::TigVector;
use crate::utils::worker_pool::{worker_pool, Orderable};

/// One placed read inside a unitig (`spec.md` §6 "tig store
/// `IntMultiPos`").
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IntMultiPos {
    pub ident: u32,
    pub contained: u32,
    pub parent: u32,
    pub ahang: i32,
    pub bhang: i32,
    pub bgn: i64,
    pub end: i64,
}

/// One unitig record (`spec.md` §6 "tig store `MultiAlign`"), enriched
/// with the coverage-stat/repeat/bubble classification of `SPEC_FULL.md`
/// §4.7.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MultiAlign {
    pub tig_id: u32,
    pub length: i64,
    pub num_frags: usize,
    pub is_unassembled: bool,
    pub is_repeat: bool,
    pub is_circular: bool,
    pub is_bubble: bool,
    pub coverage_stat: f64,
    pub reads: Vec<IntMultiPos>,
}

#[derive(new, Derefable)]
struct EncodedTig {
    index: usize,
    #[deref]
    bytes: Vec<u8>,
}

impl Orderable for EncodedTig {
    fn index(&self) -> usize {
        self.index
    }
}

#[derive(Builder)]
#[builder(pattern = "owned")]
pub struct OutputWriter {
    pub prefix: PathBuf,
    pub tig_store: PathBuf,
    pub config: Config,
}

impl OutputWriter {
    fn path(&self, extension: &str) -> PathBuf {
        let mut path = self.prefix.clone();
        let mut name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(extension);
        path.set_file_name(name);
        path
    }

    fn create(&self, path: &Path) -> Result<BufWriter<File>> {
        File::create(path)
            .map(BufWriter::new)
            .map_err(|source| Error::Io { path: path.to_path_buf(), source })
            .with_context(|| format!("creating {}", path.display()))
    }

    /// Writes every unitig's `MultiAlign` record, bincode-encoded, to
    /// `self.tig_store` in tig-id order.
    pub fn write_tig_store(&self, tigs: &TigVector, arrival_rates: &HashMap<u32, f64>) -> Result<()> {
        let global_arrival_rate = mean_nonzero(arrival_rates.values().copied());

        let records: Vec<MultiAlign> = tigs
            .iter()
            .map(|tig| build_multi_align(tig, arrival_rates, global_arrival_rate))
            .collect();

        let mut out = self.create(&self.tig_store)?;
        let workers = (0..4).map(|_| {
            |receiver: crossbeam::channel::Receiver<(usize, MultiAlign)>,
             sender: crossbeam::channel::Sender<Box<EncodedTig>>|
             -> Result<()> {
                for (idx, record) in receiver {
                    let bytes = bincode::serialize(&record)?;
                    sender.send(Box::new(EncodedTig::new(idx, bytes))).ok();
                }
                Ok(())
            }
        });

        let preprocessor = move |sender: crossbeam::channel::Sender<(usize, MultiAlign)>| -> Result<()> {
            for (idx, record) in records.into_iter().enumerate() {
                sender.send((idx, record)).ok();
            }
            Ok(())
        };

        let postprocessor = |encoded: Box<EncodedTig>| -> Result<()> {
            out.write_all(&(encoded.bytes.len() as u64).to_le_bytes())?;
            out.write_all(&encoded.bytes)?;
            Ok(())
        };

        worker_pool(preprocessor, workers, postprocessor, 64, 64)
    }

    /// Assigns every non-empty unitig a sequential IUM id and a
    /// partition, appending unitigs to the current partition until
    /// adding the next one would reach `reads_per_partition` (`spec.md`
    /// §6); a unitig larger than the target still gets its own
    /// partition rather than being split.
    fn partition_plan(&self, tigs: &TigVector) -> Vec<PartitionEntry> {
        let target = self.config.reads_per_partition;
        let mut sorted_tigs: Vec<_> = tigs.iter().filter(|t| !t.ufpath.is_empty()).collect();
        sorted_tigs.sort_by_key(|t| t.id);

        let mut entries = Vec::with_capacity(sorted_tigs.len());
        let mut partition_id = 1u32;
        let mut frag_count = 0usize;
        for (iumiid, tig) in sorted_tigs.into_iter().enumerate() {
            let nf = tig.ufpath.len();
            if frag_count + nf >= target && frag_count > 0 {
                partition_id += 1;
                frag_count = 0;
            }
            entries.push(PartitionEntry { tig_id: tig.id, iumiid: iumiid as u32, nf, partition_id });
            frag_count += nf;
        }
        entries
    }

    /// `.iidmap`: `Unitig <tigId> == IUM <iumId> (in partition <pid>
    /// with <n> frags)`, one line per non-empty unitig (`spec.md` §6).
    pub fn write_iidmap(&self, tigs: &TigVector) -> Result<()> {
        let mut out = self.create(&self.path(".iidmap"))?;
        for entry in self.partition_plan(tigs) {
            writeln!(
                out,
                "Unitig {} == IUM {} (in partition {} with {} frags)",
                entry.tig_id, entry.iumiid, entry.partition_id, entry.nf
            )?;
        }
        Ok(())
    }

    /// `.partitioning` / `.partitioningInfo`: `.partitioning` is
    /// `<partition-id>\t<read-id>`, one line per read; `.partitioningInfo`
    /// is `Partition <p> has <u> unitigs and <f> fragments.`, one line
    /// per partition (`spec.md` §6).
    pub fn write_partitioning(&self, tigs: &TigVector) -> Result<()> {
        let mut partitioning = self.create(&self.path(".partitioning"))?;
        let mut info = self.create(&self.path(".partitioningInfo"))?;

        let plan = self.partition_plan(tigs);
        let partition_of: HashMap<u32, u32> = plan.iter().map(|e| (e.tig_id, e.partition_id)).collect();

        let mut unitigs_per_partition: HashMap<u32, usize> = HashMap::new();
        let mut frags_per_partition: HashMap<u32, usize> = HashMap::new();
        for entry in &plan {
            *unitigs_per_partition.entry(entry.partition_id).or_insert(0) += 1;
            *frags_per_partition.entry(entry.partition_id).or_insert(0) += entry.nf;
        }

        let mut sorted_tigs: Vec<_> = tigs.iter().filter(|t| !t.ufpath.is_empty()).collect();
        sorted_tigs.sort_by_key(|t| t.id);
        for tig in sorted_tigs {
            let partition_id = partition_of[&tig.id];
            for node in &tig.ufpath {
                writeln!(partitioning, "{}\t{}", partition_id, node.ident)?;
            }
        }

        if unitigs_per_partition.is_empty() {
            writeln!(info, "Partition 1 has 0 unitigs and 0 fragments.")?;
        } else {
            let mut partition_ids: Vec<&u32> = unitigs_per_partition.keys().collect();
            partition_ids.sort();
            for p in partition_ids {
                writeln!(info, "Partition {} has {} unitigs and {} fragments.", p, unitigs_per_partition[p], frags_per_partition[p])?;
            }
        }
        Ok(())
    }

    /// `.unused.ovl`: overlaps whose endpoints are both placed but which
    /// were not used as a parent/hang edge by `setParentAndHang`
    /// (`spec.md` §6 "diagnostic: overlaps never used in the final
    /// layout").
    pub fn write_unused_ovl(&self, tigs: &TigVector, overlaps: &OverlapCache) -> Result<()> {
        let mut out = self.create(&self.path(".unused.ovl"))?;
        for tig in tigs.iter() {
            for node in &tig.ufpath {
                for ovl in overlaps.overlaps_from(node.ident) {
                    let used = node.parent == ovl.b;
                    if !used {
                        writeln!(out, "{}\t{}\t{}\t{}", ovl.a, ovl.b, ovl.a_hang, ovl.b_hang)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// `.cga.0`: a JSON header describing the run, followed by plain-text
    /// histograms of unitig length, coverage-stat, and arrival-rate
    /// (`spec.md` §6).
    pub fn write_cga_histogram(
        &self,
        tigs: &TigVector,
        arrival_rates: &HashMap<u32, f64>,
        mates: &EvaluateMatesResult,
        insert_sizes: &InsertSizes,
    ) -> Result<()> {
        let mut out = self.create(&self.path(".cga.0"))?;

        let header = CgaHeader {
            num_unitigs: tigs.len(),
            num_libraries: insert_sizes.libraries().count(),
            happy_total: mates.per_tig.values().map(|s| s.happy).sum(),
        };
        writeln!(out, "{}", serde_json::to_string(&header)?)?;

        writeln!(out, "length")?;
        let mut length_buckets: HashMap<i64, u32> = HashMap::new();
        for tig in tigs.iter() {
            *length_buckets.entry(tig.length / 1000).or_insert(0) += 1;
        }
        write_histogram(&mut out, &length_buckets, "kb")?;

        let global_arrival_rate = mean_nonzero(arrival_rates.values().copied());

        writeln!(out, "coverage_stat")?;
        let mut covstat_buckets: HashMap<i64, u32> = HashMap::new();
        for tig in tigs.iter() {
            let arrival_rate = arrival_rates.get(&tig.id).copied().unwrap_or(0.0);
            let bucket = coverage_stat(arrival_rate, global_arrival_rate).floor() as i64;
            *covstat_buckets.entry(bucket).or_insert(0) += 1;
        }
        write_histogram(&mut out, &covstat_buckets, "")?;

        writeln!(out, "arrival_rate")?;
        let mut arrival_buckets: HashMap<i64, u32> = HashMap::new();
        for tig in tigs.iter() {
            let arrival_rate = arrival_rates.get(&tig.id).copied().unwrap_or(0.0);
            *arrival_buckets.entry(arrival_rate.floor() as i64).or_insert(0) += 1;
        }
        write_histogram(&mut out, &arrival_buckets, "")?;

        Ok(())
    }
}

fn write_histogram(out: &mut impl Write, buckets: &HashMap<i64, u32>, unit: &str) -> Result<()> {
    let mut keys: Vec<&i64> = buckets.keys().collect();
    keys.sort();
    for k in keys {
        writeln!(out, "{}{}\t{}", k, unit, buckets[k])?;
    }
    Ok(())
}

#[derive(Serialize)]
struct CgaHeader {
    num_unitigs: usize,
    num_libraries: usize,
    happy_total: u64,
}

struct PartitionEntry {
    tig_id: u32,
    iumiid: u32,
    nf: usize,
    partition_id: u32,
}

fn build_multi_align(
    tig: &crate::tig::Unitig,
    arrival_rates: &HashMap<u32, f64>,
    global_arrival_rate: f64,
) -> MultiAlign {
    let arrival_rate = arrival_rates.get(&tig.id).copied().unwrap_or(0.0);
    let coverage_stat = coverage_stat(arrival_rate, global_arrival_rate);

    let reads = tig
        .ufpath
        .iter()
        .map(|n| IntMultiPos {
            ident: n.ident,
            contained: n.contained,
            parent: n.parent,
            ahang: n.ahang,
            bhang: n.bhang,
            bgn: n.position.bgn,
            end: n.position.end,
        })
        .collect();

    MultiAlign {
        tig_id: tig.id,
        length: tig.length,
        num_frags: tig.ufpath.len(),
        is_unassembled: tig.is_unassembled,
        is_repeat: tig.is_repeat,
        is_circular: tig.is_circular,
        is_bubble: tig.is_bubble,
        coverage_stat,
        reads,
    }
}

fn coverage_stat(arrival_rate: f64, global_arrival_rate: f64) -> f64 {
    if global_arrival_rate > 0.0 && arrival_rate > 0.0 {
        (arrival_rate / global_arrival_rate).log2()
    } else {
        0.0
    }
}

fn mean_nonzero(values: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values {
        if v.is_finite() && v > 0.0 {
            sum += v;
            count += 1;
        }
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
