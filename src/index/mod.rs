//! Blocked k-mer index over the six-frame translated genome
//!
//! Every ORF of at least `min_aa_len` residues is cut into overlapping
//! k-mers over the reduced alphabet. A k-mer is packed into `4 * kmer` bits,
//! hashed with an invertible hash `h`, and sampled: only k-mers with
//! `(h >> bbit) & (2^mod_bit - 1) == 0` are kept. The low `bbit` bits choose
//! the block; the remaining bits are the key stored in that block.
//!
//! Storage is a compressed sparse layout:
//! - `block_off[b]..block_off[b + 1]` is the key range of block `b`
//! - keys are sorted within a block
//! - `key_start[i]..key_start[i + 1]` is the position range of key `i`
//!
//! A position packs `(contig offset + strand-local nt) << 1 | rev`, where the
//! strand-local nt is the first base of the k-mer's first codon.

pub mod build;
pub mod io;

use crate::config::IndexOptions;
use crate::sequence::SequenceStore;
use crate::utils::alphabet::{BITS_PER_AA, REDUCED_BREAK};
use crate::utils::genetic_code::GeneticCode;
use crate::utils::hash::hash64;

pub struct KmerIndex {
    opt: IndexOptions,
    store: SequenceStore,
    code: GeneticCode,
    block_off: Vec<u64>,
    keys: Vec<u32>,
    key_start: Vec<u64>,
    positions: Vec<u64>,
}

/// Summary of the k-mer table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub n_blocks: usize,
    pub n_keys: usize,
    pub n_positions: usize,
    /// keys whose occurrence count exceeds the cap
    pub n_over_cap: usize,
    pub max_occ: usize,
}

/// A hit position decoded into contig coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitPos {
    pub cid: u32,
    pub rev: bool,
    /// strand-local nt of the first codon
    pub pos: u64,
}

impl KmerIndex {
    pub(crate) fn from_parts(
        opt: IndexOptions,
        store: SequenceStore,
        code: GeneticCode,
        block_off: Vec<u64>,
        keys: Vec<u32>,
        key_start: Vec<u64>,
        positions: Vec<u64>,
    ) -> Self {
        KmerIndex {
            opt,
            store,
            code,
            block_off,
            keys,
            key_start,
            positions,
        }
    }

    pub fn options(&self) -> &IndexOptions {
        &self.opt
    }

    pub fn store(&self) -> &SequenceStore {
        &self.store
    }

    pub fn genetic_code(&self) -> &GeneticCode {
        &self.code
    }

    #[inline]
    pub fn kmer_mask(&self) -> u64 {
        kmer_mask(self.opt.kmer)
    }

    /// Block and key of a packed k-mer, or `None` when sampling drops it
    #[inline]
    pub fn slot(&self, kmer: u64) -> Option<(usize, u32)> {
        sampled_slot(kmer, &self.opt)
    }

    /// All positions of `kmer`, without the occurrence cap
    pub fn occurrences(&self, kmer: u64) -> &[u64] {
        let Some((block, key)) = self.slot(kmer) else {
            return &[];
        };
        let lo = self.block_off[block] as usize;
        let hi = self.block_off[block + 1] as usize;
        match self.keys[lo..hi].binary_search(&key) {
            Ok(i) => {
                let i = lo + i;
                &self.positions[self.key_start[i] as usize..self.key_start[i + 1] as usize]
            }
            Err(_) => &[],
        }
    }

    /// Positions of `kmer`, or `None` when it is absent or occurs more than
    /// `max_occ` times. Over-represented k-mers are dropped entirely.
    #[inline]
    pub fn lookup(&self, kmer: u64, max_occ: u32) -> Option<&[u64]> {
        let occ = self.occurrences(kmer);
        if occ.is_empty() || occ.len() > max_occ as usize {
            None
        } else {
            Some(occ)
        }
    }

    /// Decode a stored position
    pub fn decode(&self, packed: u64) -> Option<HitPos> {
        let rev = packed & 1 == 1;
        let (cid, pos) = self.store.locate(packed >> 1)?;
        Some(HitPos { cid, rev, pos })
    }

    pub fn stats(&self, max_occ: u32) -> IndexStats {
        let mut stats = IndexStats {
            n_blocks: self.block_off.len().saturating_sub(1),
            n_keys: self.keys.len(),
            n_positions: self.positions.len(),
            ..IndexStats::default()
        };
        for w in self.key_start.windows(2) {
            let n = (w[1] - w[0]) as usize;
            stats.max_occ = stats.max_occ.max(n);
            if n > max_occ as usize {
                stats.n_over_cap += 1;
            }
        }
        stats
    }

    pub fn heap_bytes(&self) -> usize {
        self.store.heap_bytes()
            + self.block_off.capacity() * 8
            + self.keys.capacity() * 4
            + self.key_start.capacity() * 8
            + self.positions.capacity() * 8
    }

    pub fn set_splice_scores(&mut self, path: &std::path::Path, cap: f32) -> crate::error::MapResult<usize> {
        self.store.load_splice_scores(path, cap)
    }

    pub(crate) fn tables(&self) -> (&[u64], &[u32], &[u64], &[u64]) {
        (&self.block_off, &self.keys, &self.key_start, &self.positions)
    }
}

#[inline]
pub fn kmer_mask(k: u8) -> u64 {
    (1u64 << (k as u32 * BITS_PER_AA)) - 1
}

#[inline]
pub(crate) fn sampled_slot(kmer: u64, opt: &IndexOptions) -> Option<(usize, u32)> {
    let h = hash64(kmer, kmer_mask(opt.kmer));
    let rest = h >> opt.bbit;
    if rest & ((1u64 << opt.mod_bit) - 1) != 0 {
        return None;
    }
    Some(((h & ((1u64 << opt.bbit) - 1)) as usize, rest as u32))
}

/// Iterator over the packed k-mers of a reduced-alphabet sequence. Yields
/// `(start, kmer)` for every window free of break symbols.
pub struct KmerIter<'a> {
    seq: &'a [u8],
    k: usize,
    mask: u64,
    pos: usize,
    run: usize,
    kmer: u64,
}

impl<'a> KmerIter<'a> {
    pub fn new(seq: &'a [u8], k: u8) -> Self {
        KmerIter {
            seq,
            k: k as usize,
            mask: kmer_mask(k),
            pos: 0,
            run: 0,
            kmer: 0,
        }
    }
}

impl Iterator for KmerIter<'_> {
    type Item = (usize, u64);

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.seq.len() {
            let c = self.seq[self.pos];
            self.pos += 1;
            if c >= REDUCED_BREAK {
                self.run = 0;
                self.kmer = 0;
                continue;
            }
            self.kmer = (self.kmer << BITS_PER_AA | c as u64) & self.mask;
            self.run += 1;
            if self.run >= self.k {
                return Some((self.pos - self.k, self.kmer));
            }
        }
        None
    }
}
