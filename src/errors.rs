use std::path::PathBuf;

use thiserror::Error;

/// Fatal conditions: configuration mistakes and I/O failures. Recoverable
/// per-read/per-unitig degeneracies are reported via `log::warn!` and a
/// `bool` return instead (see `spec.md` §7).
#[derive(Error, Debug)]
pub enum Error {
    #[error("output prefix must be given with -o")]
    MissingOutputPrefix,
    #[error("tig-store path must be given with -T")]
    MissingTigStorePath,
    #[error("reads-per-partition (-B) must be at least 1, got {value}")]
    InvalidPartitionSize { value: usize },
    #[error("overlap error-rate threshold (-eOverlap) must be in [0.0, 1.0], got {value}")]
    InvalidOverlapErate { value: f64 },
    #[error("graph error-rate threshold (-eGraphErate) must be in [0.0, 1.0], got {value}")]
    InvalidGraphErate { value: f64 },
    #[error("could not open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("read {read_id} was placed in unitig {first} and then again in unitig {second}")]
    ReadPlacedTwice {
        read_id: u32,
        first: u32,
        second: u32,
    },
    #[error("unitig {tig_id} has a node extending past its length ({length})")]
    LayoutExceedsLength { tig_id: u32, length: i64 },
    #[error("tig vector block table is exhausted; cannot allocate a new unitig")]
    OutOfCapacity,
}
