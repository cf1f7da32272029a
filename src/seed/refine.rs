//! Re-seeding inside chain gaps
//!
//! Between consecutive chain anchors the query and target gaps are scanned
//! again with the shorter `kmer2` over all three target frames. A new hit is
//! kept when it lies near the diagonal of one of the two flanking anchors and
//! extends the run colinearly. The extra anchors only guide the DP band.

use rustc_hash::FxHashMap;

use super::Anchor;
use crate::chain::Chain;
use crate::index::KmerIter;
use crate::sequence::SequenceStore;
use crate::utils::alphabet::reduce;
use crate::utils::genetic_code::GeneticCode;

#[derive(Debug, Default)]
pub struct RefineBuffers {
    bases: Vec<u8>,
    aa: Vec<u8>,
    qmap: FxHashMap<u64, Vec<u32>>,
    cand: Vec<Anchor>,
    added: Vec<Anchor>,
}

impl RefineBuffers {
    pub fn clear(&mut self) {
        self.bases.clear();
        self.aa.clear();
        self.qmap.clear();
        self.cand.clear();
        self.added.clear();
    }

    pub fn capacity_bytes(&self) -> usize {
        self.bases.capacity()
            + self.aa.capacity()
            + self.qmap.capacity() * 32
            + (self.cand.capacity() + self.added.capacity()) * std::mem::size_of::<Anchor>()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RefineParams {
    pub kmer2: u8,
    /// target gaps longer than this are left alone
    pub max_gap_nt: u64,
    /// distance (nt) from a flanking diagonal within which hits are kept
    pub diag_tol: i64,
}

#[inline]
fn diag(qpos: u32, tpos: u64) -> i64 {
    tpos as i64 - 3 * qpos as i64
}

/// Add `kmer2` anchors inside the gaps of `chain`. Returns the number added.
pub fn refine_chain(
    chain: &mut Chain,
    store: &SequenceStore,
    code: &GeneticCode,
    qred: &[u8],
    params: &RefineParams,
    buf: &mut RefineBuffers,
) -> usize {
    let k2 = params.kmer2 as u32;
    if k2 == 0 || chain.anchors.len() < 2 {
        return 0;
    }
    buf.added.clear();
    let (cid, rev) = (chain.cid(), chain.rev());
    for w in 0..chain.anchors.len() - 1 {
        let a = chain.anchors[w];
        let b = chain.anchors[w + 1];
        let (qs, qe) = (a.qend(), b.qpos);
        let (ts, te) = (a.tend(), b.tpos);
        if qe < qs + 2 * k2 || te < ts + 3 * k2 as u64 || te - ts > params.max_gap_nt {
            continue;
        }

        buf.qmap.clear();
        for (i, kmer) in KmerIter::new(&qred[qs as usize..qe as usize], params.kmer2) {
            buf.qmap.entry(kmer).or_default().push(qs + i as u32);
        }
        if buf.qmap.is_empty() {
            continue;
        }

        buf.cand.clear();
        store.extract(cid, rev, ts, te, &mut buf.bases);
        let (da, db) = (diag(a.qpos, a.tpos), diag(b.qpos, b.tpos));
        for frame in 0..3usize {
            buf.aa.clear();
            let mut i = frame;
            while i + 3 <= buf.bases.len() {
                buf.aa.push(reduce(code.translate(buf.bases[i], buf.bases[i + 1], buf.bases[i + 2])));
                i += 3;
            }
            for (i, kmer) in KmerIter::new(&buf.aa, params.kmer2) {
                let Some(qlist) = buf.qmap.get(&kmer) else {
                    continue;
                };
                let tpos = ts + (frame + 3 * i) as u64;
                for &qpos in qlist {
                    let d = diag(qpos, tpos);
                    if (d - da).abs() > params.diag_tol && (d - db).abs() > params.diag_tol {
                        continue;
                    }
                    if qpos + k2 > qe || tpos + 3 * k2 as u64 > te {
                        continue;
                    }
                    buf.cand.push(Anchor { vid: chain.vid, tpos, qpos, len: k2, occ: 0 });
                }
            }
        }

        // greedy colinear pick, non-overlapping on both sequences
        buf.cand.sort_unstable_by_key(|c| (c.tpos, c.qpos));
        let (mut last_qe, mut last_te) = (qs, ts);
        for c in &buf.cand {
            if c.qpos >= last_qe && c.tpos >= last_te {
                buf.added.push(*c);
                last_qe = c.qend();
                last_te = c.tend();
            }
        }
    }

    let n = buf.added.len();
    if n > 0 {
        chain.anchors.extend_from_slice(&buf.added);
        chain.anchors.sort_unstable_by_key(|a| (a.qpos, a.tpos));
        chain.update_spans();
    }
    n
}
