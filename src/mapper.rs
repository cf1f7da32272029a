//! Per-query mapping pipeline
//!
//! anchors -> (isolated anchor filter) -> chains -> selection -> gap
//! re-seeding -> splice alignment -> region assembly. Every call is
//! independent; all scratch memory comes from the caller's
//! [`ThreadScratch`].

use std::cell::RefCell;

use bio::io::fasta;
use log::{debug, trace};
use rayon::prelude::*;
use rayon::ThreadPool;

use crate::align::{align_chain, Alignment};
use crate::chain::dp::chain_anchors;
use crate::chain::select::{prefilter_isolated, select_chains};
use crate::chain::ChainConfig;
use crate::config::MapOptions;
use crate::error::Degradation;
use crate::index::KmerIndex;
use crate::post::{assemble_regions, AlignmentRegion};
use crate::scratch::ThreadScratch;
use crate::seed::{collect_anchors, refine_chain, RefineParams};
use crate::utils::alphabet::{encode_protein, reduce};

/// Work counts of one query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryStats {
    pub n_kmers: usize,
    pub n_over_cap: usize,
    /// anchors found, counted before the anchor cap
    pub n_anchors: usize,
    /// anchors dropped by the isolated-anchor filter
    pub n_prefiltered: usize,
    pub n_chains: usize,
    /// anchors added by gap re-seeding
    pub n_refined: usize,
    pub n_aligned: usize,
    pub dp_cells: usize,
    pub dp_cells_max: usize,
}

/// Result of mapping one query
#[derive(Debug, Clone, PartialEq)]
pub struct MapOutput {
    pub qlen: usize,
    pub regions: Vec<AlignmentRegion>,
    pub degradations: Vec<Degradation>,
    pub stats: QueryStats,
}

/// Map one protein. `qseq` is ASCII; unknown letters count as X.
pub fn map(
    index: &KmerIndex,
    opt: &MapOptions,
    qname: &str,
    qseq: &[u8],
    scratch: &mut ThreadScratch,
) -> MapOutput {
    scratch.reset();
    let mut stats = QueryStats::default();
    let mut degradations = Vec::new();
    encode_protein(qseq, &mut scratch.qcodes);
    scratch.qred.extend(scratch.qcodes.iter().map(|&c| reduce(c)));
    let qlen = scratch.qcodes.len();

    let report = collect_anchors(index, &scratch.qred, opt.max_occ, opt.max_ava, &mut scratch.anchors);
    stats.n_kmers = report.n_kmers;
    stats.n_over_cap = report.n_over_cap;
    stats.n_anchors = report.n_anchors;
    if let Some(d) = report.truncated {
        debug!("{}: {}", qname, d);
        degradations.push(d);
    }

    if !opt.flags.no_pre_chain {
        let before = scratch.anchors.len();
        prefilter_isolated(&mut scratch.anchors, opt.max_gap, opt.max_intron, opt.max_chn_iter);
        stats.n_prefiltered = before - scratch.anchors.len();
    }

    let cfg = ChainConfig::from(opt);
    let chains = chain_anchors(&scratch.anchors, &cfg, &mut scratch.chain);
    let mut chains = select_chains(chains, qname, opt.mask_level, opt.mask_len, opt.best_n);
    stats.n_chains = chains.len();
    trace!("{}: {} anchors, {} chains", qname, scratch.anchors.len(), chains.len());

    let store = index.store();
    let code = index.genetic_code();
    let mut aligned: Vec<Option<Alignment>> = Vec::with_capacity(chains.len());
    if !opt.flags.no_align {
        let params = RefineParams {
            kmer2: opt.kmer2,
            max_gap_nt: opt.max_intron as u64,
            diag_tol: 3 * opt.dp_bw as i64,
        };
        for (i, chain) in chains.iter_mut().enumerate() {
            stats.n_refined +=
                refine_chain(chain, store, code, &scratch.qred, &params, &mut scratch.refine);
            match align_chain(store, code, opt, chain, i, &scratch.qcodes, &mut scratch.align) {
                Ok(aln) => {
                    stats.n_aligned += 1;
                    stats.dp_cells += aln.cells;
                    stats.dp_cells_max = stats.dp_cells_max.max(aln.cells);
                    aligned.push(Some(aln));
                }
                Err(d) => {
                    debug!("{}: {}", qname, d);
                    degradations.push(d);
                    aligned.push(None);
                }
            }
        }
    }

    let regions = assemble_regions(&chains, aligned, qlen, store, opt);
    MapOutput {
        qlen,
        regions,
        degradations,
        stats,
    }
}

thread_local! {
    /// Scratch of the current worker, reused across queries and batches
    static SCRATCH: RefCell<ThreadScratch> = RefCell::new(ThreadScratch::new());
}

/// Map a batch of records on the workers of `pool`. Each worker thread
/// owns one scratch for its lifetime. Output order follows `records`.
pub fn map_batch(
    pool: &ThreadPool,
    index: &KmerIndex,
    opt: &MapOptions,
    records: &[fasta::Record],
) -> Vec<MapOutput> {
    pool.install(|| {
        records
            .par_iter()
            .map(|rec| SCRATCH.with(|s| map(index, opt, rec.id(), rec.seq(), &mut s.borrow_mut())))
            .collect()
    })
}
