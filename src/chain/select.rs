//! Chain pre-filtering, ordering and overlap masking

use super::{calculate_overlap, Chain};
use crate::seed::Anchor;
use crate::utils::hash::{hash32, hash_str};

/// Drop anchors that have no partner on the same contig strand within
/// `max_gap` residues on the query and `max_intron` nt on the target.
/// Isolated anchors can never form a chain of two or more.
pub fn prefilter_isolated(anchors: &mut Vec<Anchor>, max_gap: i32, max_intron: i32, max_iter: usize) {
    let n = anchors.len();
    if n < 2 {
        anchors.clear();
        return;
    }
    let mut keep = vec![false; n];
    for i in 0..n {
        let ai = anchors[i];
        for (step, j) in (i + 1..n).enumerate() {
            let aj = anchors[j];
            if aj.vid != ai.vid || aj.tpos - ai.tpos > max_intron as u64 || step >= max_iter {
                break;
            }
            let dq = (aj.qpos as i64 - ai.qpos as i64).abs();
            if dq > 0 && dq <= max_gap as i64 && aj.tpos > ai.tpos {
                keep[i] = true;
                keep[j] = true;
            }
        }
    }
    let mut k = 0;
    anchors.retain(|_| {
        k += 1;
        keep[k - 1]
    });
}

/// Tie-break hash of a chain: query name combined with its locus
pub fn chain_hash(qname_hash: u32, chain: &Chain) -> u32 {
    hash32(qname_hash ^ (chain.ts as u32) ^ chain.vid.rotate_left(16))
}

/// Order chains and mark secondaries.
///
/// Chains are sorted by score (descending), then hash, contig strand and
/// target start, so repeated runs order ties identically. A chain whose
/// query span overlaps an earlier primary by more than `mask_level` of the
/// shorter span (or by more than `mask_len` residues) becomes a secondary of
/// that primary. All primaries and the first `best_n` secondaries are kept;
/// `parent` indices refer to positions in the returned order.
pub fn select_chains(
    mut chains: Vec<Chain>,
    qname: &str,
    mask_level: f32,
    mask_len: i32,
    best_n: usize,
) -> Vec<Chain> {
    let qh = hash_str(qname);
    for c in chains.iter_mut() {
        c.hash = chain_hash(qh, c);
    }
    chains.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(a.hash.cmp(&b.hash))
            .then(a.vid.cmp(&b.vid))
            .then(a.ts.cmp(&b.ts))
    });

    let mut primaries: Vec<usize> = Vec::new();
    for i in 0..chains.len() {
        let (qs, qe, score) = (chains[i].qs, chains[i].qe, chains[i].score);
        let mut parent = i;
        for &p in &primaries {
            let ol = calculate_overlap(qs, qe, chains[p].qs, chains[p].qe);
            let min_len = (qe - qs).min(chains[p].qlen());
            if ol as f32 > mask_level * min_len as f32 || ol as i64 > mask_len as i64 {
                parent = p;
                break;
            }
        }
        chains[i].parent = parent;
        if parent == i {
            primaries.push(i);
        } else {
            let p = &mut chains[parent];
            p.n_sub += 1;
            p.subsc = p.subsc.max(score);
        }
    }

    // keep primaries and the best secondaries, then reindex parents
    let mut n_sec = 0usize;
    let mut new_index = vec![usize::MAX; chains.len()];
    let mut kept = 0usize;
    for (i, c) in chains.iter().enumerate() {
        let keep = if c.parent == i {
            true
        } else if n_sec < best_n {
            n_sec += 1;
            true
        } else {
            false
        };
        if keep {
            new_index[i] = kept;
            kept += 1;
        }
    }
    let mut out = Vec::with_capacity(kept);
    for (i, mut c) in chains.into_iter().enumerate() {
        if new_index[i] != usize::MAX {
            c.parent = new_index[c.parent];
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(vid: u32, score: i32, qs: u32, ts: u64, n: u32) -> Chain {
        let anchors = (0..n)
            .map(|i| Anchor { vid, tpos: ts + 18 * i as u64, qpos: qs + 6 * i, len: 6, occ: 1 })
            .collect();
        Chain::new(vid, score, anchors)
    }

    #[test]
    fn test_prefilter_drops_isolated() {
        let mut anchors = vec![
            Anchor { vid: 0, tpos: 10, qpos: 0, len: 6, occ: 1 },
            Anchor { vid: 0, tpos: 40, qpos: 10, len: 6, occ: 1 },
            Anchor { vid: 0, tpos: 900_000, qpos: 20, len: 6, occ: 1 },
            Anchor { vid: 2, tpos: 5, qpos: 3, len: 6, occ: 1 },
        ];
        prefilter_isolated(&mut anchors, 1000, 200_000, 5000);
        assert_eq!(anchors.len(), 2);
        assert!(anchors.iter().all(|a| a.vid == 0 && a.tpos < 100));
    }

    #[test]
    fn test_overlapping_chain_becomes_secondary() {
        let chains = vec![
            chain(0, 50, 0, 1000, 5),
            chain(2, 80, 0, 5000, 5),
            chain(0, 30, 100, 20_000, 5),
        ];
        let out = select_chains(chains, "q1", 0.5, i32::MAX, 10);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].score, 80);
        assert_eq!(out[0].parent, 0);
        assert_eq!(out[0].n_sub, 1);
        assert_eq!(out[0].subsc, 50);
        assert_eq!(out[1].score, 50);
        assert_eq!(out[1].parent, 0);
        // disjoint query span stays primary
        assert_eq!(out[2].parent, 2);
    }

    #[test]
    fn test_best_n_caps_secondaries() {
        let chains = (0..5).map(|i| chain(0, 100 - i, 0, 1000 * i as u64, 5)).collect();
        let out = select_chains(chains, "q", 0.5, i32::MAX, 2);
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|c| c.parent == 0));
    }

    #[test]
    fn test_order_is_deterministic_for_ties() {
        let mk = || vec![chain(0, 40, 0, 1000, 5), chain(0, 40, 0, 9000, 5), chain(2, 40, 0, 7, 5)];
        let a = select_chains(mk(), "same", 0.5, i32::MAX, 10);
        let mut rev = mk();
        rev.reverse();
        let b = select_chains(rev, "same", 0.5, i32::MAX, 10);
        let key = |v: &[Chain]| v.iter().map(|c| (c.vid, c.ts)).collect::<Vec<_>>();
        assert_eq!(key(&a), key(&b));
    }
}
