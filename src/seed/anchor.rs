//! Query k-mers to index hits
//!
//! Every overlapping k-mer of the reduced query is looked up in the index;
//! each surviving occurrence becomes an [`Anchor`]. K-mers above the
//! occurrence cap contribute nothing. Anchors are sorted by
//! `(vid, tpos, qpos)` and duplicates removed.

use crate::error::Degradation;
use crate::index::{KmerIndex, KmerIter};

/// One seed hit
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Anchor {
    /// `cid << 1 | rev`
    pub vid: u32,
    /// strand-local nt of the first codon
    pub tpos: u64,
    /// query residue of the first k-mer residue
    pub qpos: u32,
    /// k-mer length in residues
    pub len: u32,
    /// occurrences of the seeding k-mer in the index
    pub occ: u32,
}

impl Anchor {
    #[inline]
    pub fn cid(&self) -> u32 {
        self.vid >> 1
    }

    #[inline]
    pub fn rev(&self) -> bool {
        self.vid & 1 == 1
    }

    #[inline]
    pub fn qend(&self) -> u32 {
        self.qpos + self.len
    }

    #[inline]
    pub fn tend(&self) -> u64 {
        self.tpos + 3 * self.len as u64
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnchorReport {
    /// query k-mers that passed sampling
    pub n_kmers: usize,
    /// k-mers dropped by the occurrence cap
    pub n_over_cap: usize,
    /// distinct anchors found, before the `max_ava` cap
    pub n_anchors: usize,
    pub truncated: Option<Degradation>,
}

/// Collect anchors for the reduced-alphabet query `qred` into `anchors`.
pub fn collect_anchors(
    index: &KmerIndex,
    qred: &[u8],
    max_occ: u32,
    max_ava: usize,
    anchors: &mut Vec<Anchor>,
) -> AnchorReport {
    anchors.clear();
    let k = index.options().kmer;
    let mut report = AnchorReport::default();
    for (qpos, kmer) in KmerIter::new(qred, k) {
        if index.slot(kmer).is_none() {
            continue;
        }
        report.n_kmers += 1;
        let Some(hits) = index.lookup(kmer, max_occ) else {
            if !index.occurrences(kmer).is_empty() {
                report.n_over_cap += 1;
            }
            continue;
        };
        for &packed in hits {
            let Some(hit) = index.decode(packed) else {
                continue;
            };
            anchors.push(Anchor {
                vid: hit.cid << 1 | hit.rev as u32,
                tpos: hit.pos,
                qpos: qpos as u32,
                len: k as u32,
                occ: hits.len() as u32,
            });
        }
    }
    anchors.sort_unstable();
    anchors.dedup_by_key(|a| (a.vid, a.tpos, a.qpos));

    let total = anchors.len();
    report.n_anchors = total;
    if total > max_ava {
        // rarer seeds first, position breaks ties
        anchors.sort_unstable_by_key(|a| (a.occ, a.vid, a.tpos, a.qpos));
        anchors.truncate(max_ava);
        anchors.sort_unstable();
        report.truncated = Some(Degradation::AnchorsTruncated {
            kept: max_ava,
            total,
        });
    }
    report
}
