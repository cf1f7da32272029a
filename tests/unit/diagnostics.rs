//! Pipeline counters

use std::sync::atomic::Ordering;

use protomap::diagnostics::{flag_enabled, MapDiagnostics};
use protomap::{map, MapOptions, ThreadScratch};

use super::helpers::{build_index, random_protein, rng, single_exon};

#[test]
fn test_flag_values() {
    assert!(flag_enabled(Some("1")));
    assert!(flag_enabled(Some("TRUE")));
    assert!(flag_enabled(Some("true")));
    assert!(!flag_enabled(Some("0")));
    assert!(!flag_enabled(Some("yes")));
    assert!(!flag_enabled(Some("")));
    assert!(!flag_enabled(None));
}

#[test]
fn test_record_accumulates_queries() {
    let gene = single_exon(61);
    let index = build_index(&[("chr1", gene.genome)]);
    let opt = MapOptions::default();
    let mut scratch = ThreadScratch::new();
    let hit = map(&index, &opt, "hit", &gene.protein, &mut scratch);
    let miss = map(&index, &opt, "miss", &random_protein(&mut rng(1061), 50), &mut scratch);

    let diag = MapDiagnostics::default();
    diag.record(&hit);
    diag.record(&miss);
    assert_eq!(diag.queries.load(Ordering::Relaxed), 2);
    assert_eq!(diag.queries_mapped.load(Ordering::Relaxed), 1);
    assert_eq!(diag.regions.load(Ordering::Relaxed), hit.regions.len());
    assert_eq!(diag.regions_primary.load(Ordering::Relaxed), 1);
    assert_eq!(diag.anchors_truncated.load(Ordering::Relaxed), 0);
    assert_eq!(
        diag.anchors.load(Ordering::Relaxed),
        hit.stats.n_anchors + miss.stats.n_anchors
    );
    assert_eq!(diag.dp_cells_max.load(Ordering::Relaxed), hit.stats.dp_cells_max.max(miss.stats.dp_cells_max));
}
