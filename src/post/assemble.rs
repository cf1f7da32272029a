//! Region assembly
//!
//! Aligned chains become regions. While assembling, `id` is the chain index
//! and `parent` the chain index of the primary; final ids are assigned after
//! filtering and ordering.

use super::filter::{filter_by_coverage, filter_by_primary_ratio, filter_by_similarity};
use super::AlignmentRegion;
use crate::align::Alignment;
use crate::chain::Chain;
use crate::config::MapOptions;
use crate::sequence::SequenceStore;

fn from_chain(idx: usize, chain: &Chain) -> AlignmentRegion {
    AlignmentRegion {
        id: idx,
        parent: chain.parent,
        n_sub: chain.n_sub,
        subsc: chain.subsc,
        score: chain.score,
        chain_score: chain.score,
        chain_ungapped: chain.ungapped,
        n_anchors: chain.anchors.len(),
        hash: chain.hash,
        cid: chain.cid(),
        rev: chain.rev(),
        qs: chain.qs,
        qe: chain.qe,
        vs: 0,
        ve: 0,
        features: Vec::new(),
        detail: None,
    }
}

/// Point every secondary whose primary has no region at its best surviving
/// sibling, which becomes primary itself. Regions are in chain order, so
/// the first sibling found is the best.
fn promote_orphans(regions: &mut [AlignmentRegion]) {
    let mut promoted: Vec<(usize, usize)> = Vec::new();
    for k in 0..regions.len() {
        let parent = regions[k].parent;
        if regions[k].is_primary() || regions.iter().any(|r| r.id == parent) {
            continue;
        }
        match promoted.iter().find(|&&(old, _)| old == parent) {
            Some(&(_, new)) => regions[k].parent = new,
            None => {
                let id = regions[k].id;
                regions[k].parent = id;
                promoted.push((parent, id));
            }
        }
    }
}

/// Build the final region list of one query.
///
/// `aligned[i]` is the alignment of `chains[i]`, `None` when it failed.
/// With `no_align` the chains themselves are reported.
pub fn assemble_regions(
    chains: &[Chain],
    aligned: Vec<Option<Alignment>>,
    qlen: usize,
    store: &SequenceStore,
    opt: &MapOptions,
) -> Vec<AlignmentRegion> {
    let mut regions = Vec::with_capacity(chains.len());
    if opt.flags.no_align {
        for (i, c) in chains.iter().enumerate() {
            let mut r = from_chain(i, c);
            (r.vs, r.ve) = store.to_forward(c.cid(), c.rev(), c.ts, c.te);
            regions.push(r);
        }
    } else {
        for (i, (c, aln)) in chains.iter().zip(aligned).enumerate() {
            let Some(aln) = aln else {
                continue;
            };
            let mut r = from_chain(i, c);
            r.score = aln.detail.dp_score;
            r.qs = aln.qs;
            r.qe = aln.qe;
            r.vs = aln.vs;
            r.ve = aln.ve;
            r.features = aln.features;
            r.detail = Some(aln.detail);
            regions.push(r);
        }
    }

    let regions = filter_by_similarity(regions, opt.out_sim);
    let mut regions = filter_by_coverage(regions, qlen, opt.out_cov);
    promote_orphans(&mut regions);
    let mut regions = filter_by_primary_ratio(regions, opt.pri_ratio);

    regions.sort_by(|a, b| {
        b.is_primary()
            .cmp(&a.is_primary())
            .then(b.score.cmp(&a.score))
            .then(a.hash.cmp(&b.hash))
            .then(a.cid.cmp(&b.cid))
            .then(a.vs.cmp(&b.vs))
    });
    regions.truncate(opt.out_n);

    // chain index -> final id
    let ids: Vec<(usize, usize)> = regions.iter().enumerate().map(|(k, r)| (r.id, k)).collect();
    for r in regions.iter_mut() {
        let old_parent = r.parent;
        r.parent = ids
            .iter()
            .find(|&&(old, _)| old == old_parent)
            .map_or(usize::MAX, |&(_, new)| new);
    }
    for (k, r) in regions.iter_mut().enumerate() {
        r.id = k;
        if r.parent == usize::MAX {
            r.parent = k;
        }
    }
    regions
}
