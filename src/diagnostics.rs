//! Pipeline counters
//!
//! Enabled via the PROTOMAP_DIAGNOSTICS environment variable. The mapper
//! returns per-query [`QueryStats`]; the driver folds them into one
//! [`MapDiagnostics`] shared by all workers and prints it at the end.

use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use crate::error::Degradation;
use crate::mapper::{MapOutput, QueryStats};

/// Check if diagnostics are enabled via environment variable
pub fn diagnostics_enabled() -> bool {
    flag_enabled(std::env::var("PROTOMAP_DIAGNOSTICS").ok().as_deref())
}

/// `"1"` or `"true"` in any case turns a switch on; anything else, or no
/// value, leaves it off.
pub fn flag_enabled(value: Option<&str>) -> bool {
    value.is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

#[derive(Default)]
pub struct MapDiagnostics {
    pub queries: AtomicUsize,
    pub queries_mapped: AtomicUsize,
    // seeding
    pub kmers: AtomicUsize,
    pub kmers_over_cap: AtomicUsize,
    pub anchors: AtomicUsize,
    pub anchors_truncated: AtomicUsize,
    pub anchors_prefiltered: AtomicUsize,
    // chaining
    pub chains: AtomicUsize,
    pub anchors_refined: AtomicUsize,
    // alignment
    pub chains_aligned: AtomicUsize,
    pub chains_too_large: AtomicUsize,
    pub chains_unaligned: AtomicUsize,
    pub dp_cells: AtomicUsize,
    pub dp_cells_max: AtomicUsize,
    // output
    pub regions: AtomicUsize,
    pub regions_primary: AtomicUsize,
}

impl MapDiagnostics {
    pub fn record(&self, out: &MapOutput) {
        let s: &QueryStats = &out.stats;
        let add = |c: &AtomicUsize, v: usize| {
            c.fetch_add(v, AtomicOrdering::Relaxed);
        };
        add(&self.queries, 1);
        if !out.regions.is_empty() {
            add(&self.queries_mapped, 1);
        }
        add(&self.kmers, s.n_kmers);
        add(&self.kmers_over_cap, s.n_over_cap);
        add(&self.anchors, s.n_anchors);
        add(&self.anchors_prefiltered, s.n_prefiltered);
        add(&self.chains, s.n_chains);
        add(&self.anchors_refined, s.n_refined);
        add(&self.chains_aligned, s.n_aligned);
        add(&self.dp_cells, s.dp_cells);
        self.dp_cells_max.fetch_max(s.dp_cells_max, AtomicOrdering::Relaxed);
        for d in &out.degradations {
            match d {
                Degradation::AnchorsTruncated { .. } => add(&self.anchors_truncated, 1),
                Degradation::ChainTooLarge { .. } => add(&self.chains_too_large, 1),
                Degradation::NoAlignment { .. } => add(&self.chains_unaligned, 1),
            }
        }
        add(&self.regions, out.regions.len());
        add(&self.regions_primary, out.regions.iter().filter(|r| r.is_primary()).count());
    }

    pub fn print_summary(&self) {
        let get = |c: &AtomicUsize| c.load(AtomicOrdering::Relaxed);
        eprintln!("\n=== protomap Pipeline Diagnostics ===");
        eprintln!("Queries:");
        eprintln!("  Total:                      {}", get(&self.queries));
        eprintln!("  With regions:               {}", get(&self.queries_mapped));
        eprintln!("Seed Stage:");
        eprintln!("  Sampled k-mers:             {}", get(&self.kmers));
        eprintln!("  Over occurrence cap:        {}", get(&self.kmers_over_cap));
        eprintln!("  Anchors:                    {}", get(&self.anchors));
        eprintln!("  Queries with anchor cap:    {}", get(&self.anchors_truncated));
        eprintln!("  Dropped as isolated:        {}", get(&self.anchors_prefiltered));
        eprintln!("Chaining Stage:");
        eprintln!("  Chains selected:            {}", get(&self.chains));
        eprintln!("  Anchors added in gaps:      {}", get(&self.anchors_refined));
        eprintln!("Alignment Stage:");
        eprintln!("  Chains aligned:             {}", get(&self.chains_aligned));
        eprintln!("  Skipped (DP too large):     {}", get(&self.chains_too_large));
        eprintln!("  No positive alignment:      {}", get(&self.chains_unaligned));
        let aligned = get(&self.chains_aligned);
        if aligned > 0 {
            eprintln!(
                "  DP cells per chain:         {:.1} (max {})",
                get(&self.dp_cells) as f64 / aligned as f64,
                get(&self.dp_cells_max)
            );
        }
        eprintln!("Output:");
        eprintln!("  Regions:                    {}", get(&self.regions));
        eprintln!("  Primary regions:            {}", get(&self.regions_primary));
        eprintln!("=====================================\n");
    }
}
