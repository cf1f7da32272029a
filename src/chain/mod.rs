//! Anchor chaining
//!
//! Anchors on one contig strand are chained by a DP that scores each link
//! with the cheaper of two gap classes: an indel (near the diagonal) or an
//! intron (target-only gap up to `max_intron`). Chains are then ordered
//! deterministically and overlapping ones are marked secondary.

pub mod dp;
pub mod select;

use crate::config::MapOptions;
use crate::seed::Anchor;

/// Chaining parameters
#[derive(Debug, Clone, Copy)]
pub struct ChainConfig {
    pub max_gap: i32,
    pub max_intron: i32,
    pub bw: i32,
    pub max_iter: usize,
    pub max_skip: usize,
    pub min_cnt: usize,
    pub min_score: i32,
    pub gap_open: f32,
    pub gap_ext: f32,
    pub intron_open: f32,
    pub coef_log: f32,
    /// treat every target gap as an indel
    pub no_splice: bool,
}

impl Default for ChainConfig {
    fn default() -> Self {
        ChainConfig::from(&MapOptions::default())
    }
}

impl From<&MapOptions> for ChainConfig {
    fn from(opt: &MapOptions) -> Self {
        ChainConfig {
            max_gap: opt.max_gap,
            max_intron: opt.max_intron,
            bw: opt.bw,
            max_iter: opt.max_chn_iter,
            max_skip: opt.max_chn_max_skip,
            min_cnt: opt.min_chn_cnt,
            min_score: opt.min_chn_sc,
            gap_open: opt.chn_gap_open,
            gap_ext: opt.chn_gap_ext,
            intron_open: opt.chn_intron_open,
            coef_log: opt.chn_coef_log,
            no_splice: opt.flags.no_splice,
        }
    }
}

/// A colinear run of anchors on one contig strand
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    pub vid: u32,
    pub score: i32,
    /// residues covered by anchors, overlaps counted once
    pub ungapped: i32,
    /// ordered by query and target, both strictly increasing
    pub anchors: Vec<Anchor>,
    /// query span `[qs, qe)` in residues
    pub qs: u32,
    pub qe: u32,
    /// strand-local target span `[ts, te)` in nt
    pub ts: u64,
    pub te: u64,
    /// tie-break hash over query name and locus
    pub hash: u32,
    /// index of the primary this chain is secondary to; own index if primary
    pub parent: usize,
    pub n_sub: u32,
    /// best score among chains masked by this one
    pub subsc: i32,
}

impl Chain {
    pub fn new(vid: u32, score: i32, anchors: Vec<Anchor>) -> Self {
        let mut c = Chain {
            vid,
            score,
            ungapped: 0,
            anchors,
            qs: 0,
            qe: 0,
            ts: 0,
            te: 0,
            hash: 0,
            parent: 0,
            n_sub: 0,
            subsc: 0,
        };
        c.update_spans();
        c
    }

    /// Recompute spans and the ungapped score after the anchor list changed
    pub fn update_spans(&mut self) {
        let (Some(first), Some(last)) = (self.anchors.first(), self.anchors.last()) else {
            return;
        };
        self.qs = first.qpos;
        self.ts = first.tpos;
        self.qe = self.anchors.iter().map(|a| a.qend()).max().unwrap_or(last.qend());
        self.te = self.anchors.iter().map(|a| a.tend()).max().unwrap_or(last.tend());
        let mut covered = 0u32;
        let mut reach = 0u32;
        for a in &self.anchors {
            let start = a.qpos.max(reach);
            if a.qend() > start {
                covered += a.qend() - start;
            }
            reach = reach.max(a.qend());
        }
        self.ungapped = covered as i32;
    }

    #[inline]
    pub fn cid(&self) -> u32 {
        self.vid >> 1
    }

    #[inline]
    pub fn rev(&self) -> bool {
        self.vid & 1 == 1
    }

    #[inline]
    pub fn qlen(&self) -> u32 {
        self.qe - self.qs
    }

    /// Whether every consecutive anchor pair strictly increases in both
    /// query and target
    pub fn is_colinear(&self) -> bool {
        self.anchors
            .windows(2)
            .all(|w| w[0].vid == w[1].vid && w[0].qpos < w[1].qpos && w[0].tpos < w[1].tpos)
    }
}

/// Overlap length of two half-open intervals
#[inline]
pub fn calculate_overlap(start1: u32, end1: u32, start2: u32, end2: u32) -> u32 {
    let start = start1.max(start2);
    let end = end1.min(end2);
    end.saturating_sub(start)
}
