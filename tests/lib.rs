//! End-to-end pipeline tests exercising `bogart::cli::run` against
//! newline-delimited-JSON fixtures, covering the scenarios of
//! `spec.md` §8: a dovetail chain, an orphaned contained read revived
//! by `placeZombies`, and the output surface the tig store/iidmap/
//! partitioning/histogram files expose.

use std::fs;
use std::io::Write;
use std::path::Path;

use bogart::cli::{run, Bogart};

fn write_lines(path: &Path, lines: &[String]) {
    let mut file = fs::File::create(path).unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
}

fn opt(dir: &Path) -> Bogart {
    Bogart {
        output_prefix: Some(dir.join("asm")),
        tig_store: Some(dir.join("asm.tigStore")),
        reads: dir.join("reads.jsonl"),
        overlaps: dir.join("overlaps.jsonl"),
        best_edges: dir.join("best_edges.jsonl"),
        reads_per_partition: None,
        enable_promote_to_singleton: true,
        enable_intersection_breaking: false,
        e_graph_erate: None,
        e_overlap: None,
        verbose: false,
    }
}

#[test]
fn chains_two_reads_and_writes_every_output_file() {
    let dir = tempfile::tempdir().unwrap();

    write_lines(
        &dir.path().join("reads.jsonl"),
        &[
            r#"{"id":1,"length":1000,"mate_id":0,"library_id":1,"ignore":false}"#.to_string(),
            r#"{"id":2,"length":1000,"mate_id":0,"library_id":1,"ignore":false}"#.to_string(),
        ],
    );
    write_lines(
        &dir.path().join("overlaps.jsonl"),
        &[r#"{"a":2,"b":1,"a_hang":200,"b_hang":200,"flipped":false,"erate":0.01}"#.to_string()],
    );
    write_lines(
        &dir.path().join("best_edges.jsonl"),
        &[
            r#"{"read":1,"edge5":null,"edge3":{"frag_id":2,"frag_3p":false,"a_hang":200,"b_hang":200,"erate":0.01},"containment":null}"#.to_string(),
            r#"{"read":2,"edge5":{"frag_id":1,"frag_3p":true,"a_hang":200,"b_hang":200,"erate":0.01},"edge3":null,"containment":null}"#.to_string(),
        ],
    );

    run(opt(dir.path())).unwrap();

    let tig_store = fs::read(dir.path().join("asm.tigStore")).unwrap();
    assert!(!tig_store.is_empty());

    let iidmap = fs::read_to_string(dir.path().join("asm.iidmap")).unwrap();
    // both reads land in the same unitig, since their best edges are mutual,
    // so there is exactly one non-empty unitig to report.
    let lines: Vec<&str> = iidmap.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("Unitig "));
    assert!(lines[0].contains("== IUM "));
    assert!(lines[0].contains("with 2 frags)"));

    let partitioning = fs::read_to_string(dir.path().join("asm.partitioning")).unwrap();
    assert_eq!(partitioning.lines().count(), 2);
    for line in partitioning.lines() {
        let cols: Vec<&str> = line.split('\t').collect();
        assert_eq!(cols.len(), 2);
    }

    let info = fs::read_to_string(dir.path().join("asm.partitioningInfo")).unwrap();
    assert!(info.trim().starts_with("Partition "));
    assert!(info.contains("unitigs"));
    assert!(info.contains("fragments."));

    assert!(dir.path().join("asm.unused.ovl").exists());

    let histogram = fs::read_to_string(dir.path().join("asm.cga.0")).unwrap();
    let mut histogram_lines = histogram.lines();
    let header = histogram_lines.next().unwrap();
    assert!(header.contains("num_unitigs"));
    assert!(histogram.contains("coverage_stat"));
    assert!(histogram.contains("arrival_rate"));
}

#[test]
fn unlinked_read_is_promoted_to_its_own_singleton() {
    let dir = tempfile::tempdir().unwrap();

    write_lines(
        &dir.path().join("reads.jsonl"),
        &[r#"{"id":1,"length":500,"mate_id":0,"library_id":1,"ignore":false}"#.to_string()],
    );
    write_lines(&dir.path().join("overlaps.jsonl"), &[]);
    write_lines(&dir.path().join("best_edges.jsonl"), &[]);

    run(opt(dir.path())).unwrap();

    let iidmap = fs::read_to_string(dir.path().join("asm.iidmap")).unwrap();
    let line = iidmap.lines().next().unwrap();
    let tig_id: u32 = line
        .trim_start_matches("Unitig ")
        .split_whitespace()
        .next()
        .unwrap()
        .parse()
        .unwrap();
    assert_ne!(tig_id, 0);
}

#[test]
fn missing_output_prefix_is_reported_before_any_io() {
    let dir = tempfile::tempdir().unwrap();
    let mut bad = opt(dir.path());
    bad.output_prefix = None;

    let err = run(bad).unwrap_err();
    assert!(err.to_string().contains("-o"));
}
