//! Splice-aware chain alignment
//!
//! A chain is aligned inside a genomic window around it: bases are
//! extracted and translated, splice signals scored, a band laid along the
//! anchors, then the DP is filled, traced back and compacted into exons.

pub mod band;
pub mod exon;
pub mod ops;
pub mod result;
pub mod signal;
pub mod splice_dp;
pub mod traceback;

pub use ops::{cigar_string, Op, OpKind};
pub use result::{ExtraDetail, Feature, FeatureKind};

use band::{build_bands, BandParams, Guide, RowBand};
use splice_dp::{best_outside, DpBuffers, DpProblem};

use crate::chain::Chain;
use crate::config::MapOptions;
use crate::error::Degradation;
use crate::sequence::SequenceStore;
use crate::utils::alphabet::AA_X;
use crate::utils::genetic_code::GeneticCode;

/// Reusable per-thread aligner arrays
#[derive(Debug, Default)]
pub struct AlignBuffers {
    g: Vec<u8>,
    aa3: Vec<u8>,
    donor: Vec<i32>,
    acc: Vec<i32>,
    guides: Vec<Guide>,
    bands: Vec<RowBand>,
    dp: DpBuffers,
}

impl AlignBuffers {
    pub fn clear(&mut self) {
        self.g.clear();
        self.aa3.clear();
        self.donor.clear();
        self.acc.clear();
        self.guides.clear();
        self.bands.clear();
        self.dp.clear();
    }

    pub fn capacity_bytes(&self) -> usize {
        self.g.capacity()
            + self.aa3.capacity()
            + (self.donor.capacity() + self.acc.capacity()) * 4
            + self.guides.capacity() * std::mem::size_of::<Guide>()
            + self.bands.capacity() * std::mem::size_of::<RowBand>()
            + self.dp.capacity_bytes()
    }
}

/// One aligned chain
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    pub qs: u32,
    pub qe: u32,
    /// strand-local target span, stop codon included
    pub ts: u64,
    pub te: u64,
    /// forward-strand target span
    pub vs: u64,
    pub ve: u64,
    /// forward-strand order
    pub features: Vec<Feature>,
    pub detail: ExtraDetail,
    /// DP cells in the band
    pub cells: usize,
}

/// Strand-local window `[ws, we)` around `chain`
pub fn chain_window(chain: &Chain, qlen: usize, clen: u64, opt: &MapOptions) -> (u64, u64) {
    let reach = opt.max_ext as u64 + 3 * opt.dp_bw as u64;
    let (Some(first), Some(last)) = (chain.anchors.first(), chain.anchors.last()) else {
        return (0, 0);
    };
    let ws = first.tpos.saturating_sub(3 * first.qpos as u64 + reach);
    let tail = 3 * (qlen as u64).saturating_sub(last.qend() as u64);
    let we = (last.tend() + tail + reach + 3).min(clen);
    (ws, we.max(ws))
}

fn collect_guides(chain: &Chain, ws: u64, guides: &mut Vec<Guide>) {
    guides.clear();
    let anchors = &chain.anchors;
    for (k, a) in anchors.iter().enumerate() {
        guides.push(Guide { q: a.qpos, t: (a.tpos - ws) as i64 });
        let end = Guide { q: a.qend(), t: (a.tend() - ws) as i64 };
        match anchors.get(k + 1) {
            Some(next) if end.q < next.qpos && a.tend() < next.tpos => guides.push(end),
            Some(_) => {}
            None => guides.push(end),
        }
    }
}

/// Align query codes `q` against the window of `chain`, the `idx`-th chain
/// of the query.
pub fn align_chain(
    store: &SequenceStore,
    code: &GeneticCode,
    opt: &MapOptions,
    chain: &Chain,
    idx: usize,
    q: &[u8],
    buf: &mut AlignBuffers,
) -> Result<Alignment, Degradation> {
    let (cid, rev) = (chain.cid(), chain.rev());
    let clen = store.contig(cid).len;
    let (ws, we) = chain_window(chain, q.len(), clen, opt);
    store.extract(cid, rev, ws, we, &mut buf.g);
    let g = &buf.g;
    buf.aa3.clear();
    buf.aa3.extend((0..g.len()).map(|x| {
        if x + 3 <= g.len() {
            code.translate(g[x], g[x + 1], g[x + 2])
        } else {
            AA_X
        }
    }));
    signal::fill_signals(store, cid, rev, ws, g, opt, &mut buf.donor, &mut buf.acc);

    collect_guides(chain, ws, &mut buf.guides);
    let params = BandParams {
        bw: 3 * opt.dp_bw as i64,
        max_ext: opt.max_ext as i64,
        flank: opt.max_intron_flank as i64,
        slack: chain.anchors.iter().map(|a| a.len).max().unwrap_or(0) as i64,
    };
    let cells = build_bands(&buf.guides, q.len(), g.len() as u32, &params, &mut buf.bands);
    if cells > opt.max_dp_cells {
        return Err(Degradation::ChainTooLarge { chain: idx, cells });
    }
    if cells == 0 {
        return Err(Degradation::NoAlignment { chain: idx });
    }

    let p = DpProblem {
        q,
        g,
        aa3: &buf.aa3,
        donor: &buf.donor,
        acc: &buf.acc,
        bands: &buf.bands,
        code,
    };
    let end = splice_dp::fill(&p, opt, &mut buf.dp).ok_or(Degradation::NoAlignment { chain: idx })?;
    let path = traceback::traceback(&p, &buf.dp, end.i, end.j);
    if path.ops.is_empty() {
        return Err(Degradation::NoAlignment { chain: idx });
    }
    let exon::Compacted {
        mut features,
        mut detail,
        t_end,
    } = exon::compact(&p, opt, &path.ops, path.i0, path.j0);
    detail.dp_score = end.score;
    detail.dp_max = end.dp_max;
    detail.dp_max2 = best_outside(&buf.dp, path.j0, t_end);

    let span_end = features.last().map_or(t_end as u64, |f| f.ve);
    for f in features.iter_mut() {
        (f.vs, f.ve) = store.to_forward(cid, rev, ws + f.vs, ws + f.ve);
    }
    if rev {
        features.reverse();
    }
    let (ts, te) = (ws + path.j0 as u64, ws + span_end);
    let (vs, ve) = store.to_forward(cid, rev, ts, te);
    Ok(Alignment {
        qs: path.i0 as u32,
        qe: end.i as u32,
        ts,
        te,
        vs,
        ve,
        features,
        detail,
        cells,
    })
}
