// Copyright 2026 The Bogart Authors.
// Licensed under the GNU General Public License v3.0
// (https://opensource.org/licenses/GPL-3.0). This file may not be
// copied, modified, or distributed except according to those terms.

//! Command-line surface (`spec.md` §6): flags for output locations, the
//! three newline-delimited-JSON inputs, and the tunables `spec.md`
//! names (`-B`, `-enablePromoteToSingleton`, `-enableIntersectionBreaking`,
//! `-eGraphErate`, `-eOverlap`), parsed with `structopt` the way the
//! teacher parses its own `Varlociraptor` options.

use std::path::PathBuf;

use log::info;
use structopt::StructOpt;

use crate::config::ConfigBuilder;
use crate::context::ContextBuilder;
use crate::errors::Error;
use crate::insert_sizes::InsertSizes;
use crate::io;
use crate::mate_location;
use crate::output::OutputWriterBuilder;
use crate::passes;
use crate::tig::TigVector;

#[derive(Debug, StructOpt, Clone)]
#[structopt(
    name = "bogart",
    about = "Turns read-to-read overlap evidence into unitigs and evaluates mate-pair happiness over the resulting layout."
)]
pub struct Bogart {
    #[structopt(short = "o", long = "output-prefix", parse(from_os_str), help = "Output prefix for the generated files.")]
    pub output_prefix: Option<PathBuf>,

    #[structopt(short = "T", long = "tig-store", parse(from_os_str), help = "Path to write the tig store to.")]
    pub tig_store: Option<PathBuf>,

    #[structopt(long = "reads", parse(from_os_str), help = "Read info input, newline-delimited JSON.")]
    pub reads: PathBuf,

    #[structopt(long = "overlaps", parse(from_os_str), help = "Overlap cache input, newline-delimited JSON.")]
    pub overlaps: PathBuf,

    #[structopt(long = "best-edges", parse(from_os_str), help = "Best-overlap-graph input, newline-delimited JSON.")]
    pub best_edges: PathBuf,

    #[structopt(short = "B", long = "reads-per-partition", help = "Target reads per output partition.")]
    pub reads_per_partition: Option<usize>,

    #[structopt(long = "enablePromoteToSingleton", help = "Promote unplaced reads to singleton unitigs instead of ignoring them.")]
    pub enable_promote_to_singleton: bool,

    #[structopt(long = "enableIntersectionBreaking", help = "Split a unitig at invading best-edge evidence from another unitig.")]
    pub enable_intersection_breaking: bool,

    #[structopt(long = "eGraphErate", help = "Maximum error rate accepted for a best-overlap-graph edge.")]
    pub e_graph_erate: Option<f64>,

    #[structopt(long = "eOverlap", help = "Maximum error rate accepted for an overlap.")]
    pub e_overlap: Option<f64>,

    #[structopt(short = "v", long, help = "Enable verbose/debug logging.")]
    pub verbose: bool,
}

impl Default for Bogart {
    fn default() -> Self {
        Bogart::from_iter(vec!["--help"])
    }
}

/// Validates `opt` into a `Config`, runs the full unitigger pipeline,
/// and writes every output (`spec.md` §4, §6). Returns whichever
/// `Error` variant describes the first problem found; I/O and
/// pipeline work always happens in one straight pass, matching
/// `spec.md` §7's "fatal conditions abort, recoverable ones are logged
/// and skipped" split.
pub fn run(opt: Bogart) -> anyhow::Result<()> {
    let output_prefix = opt.output_prefix.clone().ok_or(Error::MissingOutputPrefix)?;
    let tig_store = opt.tig_store.clone().ok_or(Error::MissingTigStorePath)?;

    if let Some(value) = opt.reads_per_partition {
        if value < 1 {
            return Err(Error::InvalidPartitionSize { value }.into());
        }
    }
    if let Some(value) = opt.e_overlap {
        if !(0.0..=1.0).contains(&value) {
            return Err(Error::InvalidOverlapErate { value }.into());
        }
    }
    if let Some(value) = opt.e_graph_erate {
        if !(0.0..=1.0).contains(&value) {
            return Err(Error::InvalidGraphErate { value }.into());
        }
    }

    let mut config_builder = ConfigBuilder::default()
        .enable_promote_to_singleton(opt.enable_promote_to_singleton)
        .enable_intersection_breaking(opt.enable_intersection_breaking);
    if let Some(value) = opt.reads_per_partition {
        config_builder = config_builder.reads_per_partition(value);
    }
    if let Some(value) = opt.e_graph_erate {
        config_builder = config_builder.e_graph_erate(value);
    }
    if let Some(value) = opt.e_overlap {
        config_builder = config_builder.e_overlap(value);
    }
    let config = config_builder
        .build()
        .expect("every required field was either set above or carries a builder default");

    let reads = io::load_read_info(&opt.reads)?;
    let overlaps = io::load_overlaps(&opt.overlaps)?;
    let graph = io::load_best_overlap_graph(&opt.best_edges, reads.len())?;

    let mut ctx = ContextBuilder::default()
        .reads(reads)
        .overlaps(overlaps)
        .graph(graph)
        .config(config)
        .build()
        .expect("reads, overlaps, graph, and config were all just supplied");

    let mut tigs = TigVector::new(ctx.reads.len());

    passes::layout::build_initial_layout(&mut tigs, &ctx.reads, &ctx.graph, opt.verbose);
    passes::contain::place_contains_using_best_overlaps(&mut tigs, &ctx.reads, &ctx.graph, opt.verbose);
    passes::zombie::place_zombies(&mut tigs, &ctx.reads, opt.verbose);
    passes::discontinuity::split_discontinuous_unitigs(&mut tigs, &ctx.reads, &ctx.config, opt.verbose);
    if ctx.config.enable_intersection_breaking {
        passes::intersection::break_unitigs(&mut tigs, &ctx.reads, &ctx.graph, &ctx.config, opt.verbose);
    }
    let (_, newly_ignored) = passes::singleton::promote_to_singleton(&mut tigs, &ctx.reads, &ctx.config, opt.verbose);
    ctx.mark_ignored(newly_ignored);
    passes::parent_hang::set_parent_and_hang(&mut tigs, &ctx.reads, &ctx.overlaps, opt.verbose);

    ctx.insert_sizes = InsertSizes::compute(&tigs, &ctx.reads, &ctx.config);
    let mates = mate_location::evaluate_mates(&tigs, &ctx.reads, &ctx.insert_sizes, &ctx.config);

    let arrival_rates = tigs.compute_arrival_rate(&ctx.reads);
    tigs.classify_repeats(&arrival_rates, ctx.config.repeat_covstat_cutoff);
    tigs.classify_bubbles(&ctx.reads, ctx.config.bubble_max_length, ctx.config.bubble_mate_threshold);

    let writer = OutputWriterBuilder::default()
        .prefix(output_prefix)
        .tig_store(tig_store)
        .config(ctx.config.clone())
        .build()
        .expect("prefix, tig_store, and config were all just supplied");

    writer.write_tig_store(&tigs, &arrival_rates)?;
    writer.write_iidmap(&tigs)?;
    writer.write_partitioning(&tigs)?;
    writer.write_unused_ovl(&tigs, &ctx.overlaps)?;
    writer.write_cga_histogram(&tigs, &arrival_rates, &mates, &ctx.insert_sizes)?;

    info!(
        "bogart: wrote {} unitig(s) covering {} read(s); {} read(s) marked ignored",
        tigs.len(),
        tigs.iter().map(|t| t.ufpath.len()).sum::<usize>(),
        ctx.ignored_count(),
    );

    Ok(())
}
