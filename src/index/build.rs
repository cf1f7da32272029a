//! Parallel index construction
//!
//! Contigs are split into length-balanced groups, one per worker. Each worker
//! translates its contigs and fills per-block buckets of `(key, position)`.
//! Buckets are then merged block by block and sorted, so the final table does
//! not depend on the number of threads.

use log::{debug, info};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::ops::Range;
use std::time::Instant;

use super::{sampled_slot, KmerIndex, KmerIter};
use crate::config::IndexOptions;
use crate::error::{MapError, MapResult};
use crate::sequence::SequenceStore;
use crate::utils::alphabet::{reduce, REDUCED_STOP};
use crate::utils::genetic_code::GeneticCode;

type Buckets = Vec<Vec<(u32, u64)>>;

/// Split contigs into at most `n` contiguous groups of similar total length
fn partition(store: &SequenceStore, n: usize) -> Vec<Range<usize>> {
    let contigs = store.contigs();
    let target = store.total_len().div_ceil(n.max(1) as u64).max(1);
    let mut groups = Vec::with_capacity(n);
    let mut start = 0;
    let mut acc = 0u64;
    for (i, c) in contigs.iter().enumerate() {
        acc += c.len;
        if acc >= target {
            groups.push(start..i + 1);
            start = i + 1;
            acc = 0;
        }
    }
    if start < contigs.len() {
        groups.push(start..contigs.len());
    }
    groups
}

/// Reduced-alphabet translation of one frame of a strand
fn translate_frame(code: &GeneticCode, bases: &[u8], frame: usize, out: &mut Vec<u8>) {
    out.clear();
    let mut i = frame;
    while i + 3 <= bases.len() {
        out.push(reduce(code.translate(bases[i], bases[i + 1], bases[i + 2])));
        i += 3;
    }
}

fn index_group(
    store: &SequenceStore,
    code: &GeneticCode,
    opt: &IndexOptions,
    group: Range<usize>,
) -> Buckets {
    let n_blocks = 1usize << opt.bbit;
    let mut buckets: Buckets = vec![Vec::new(); n_blocks];
    let mut bases = Vec::new();
    let mut aa = Vec::new();
    for cid in group {
        let contig = store.contig(cid as u32);
        for rev in [false, true] {
            store.extract(cid as u32, rev, 0, contig.len, &mut bases);
            for frame in 0..3 {
                translate_frame(code, &bases, frame, &mut aa);
                let mut orf_start = 0;
                while orf_start < aa.len() {
                    let orf_end = aa[orf_start..]
                        .iter()
                        .position(|&c| c == REDUCED_STOP)
                        .map_or(aa.len(), |p| orf_start + p);
                    if orf_end - orf_start >= opt.min_aa_len as usize {
                        for (i, kmer) in KmerIter::new(&aa[orf_start..orf_end], opt.kmer) {
                            let Some((block, key)) = sampled_slot(kmer, opt) else {
                                continue;
                            };
                            let local = (frame + 3 * (orf_start + i)) as u64;
                            let pos = (contig.offset + local) << 1 | rev as u64;
                            buckets[block].push((key, pos));
                        }
                    }
                    orf_start = orf_end + 1;
                }
            }
        }
    }
    buckets
}

struct MergedBlock {
    keys: Vec<u32>,
    counts: Vec<u64>,
    positions: Vec<u64>,
}

fn merge_block(parts: &[Buckets], block: usize) -> MergedBlock {
    let total: usize = parts.iter().map(|p| p[block].len()).sum();
    let mut all = Vec::with_capacity(total);
    for p in parts {
        all.extend_from_slice(&p[block]);
    }
    all.sort_unstable();
    let mut merged = MergedBlock {
        keys: Vec::new(),
        counts: Vec::new(),
        positions: Vec::with_capacity(total),
    };
    for (key, pos) in all {
        if merged.keys.last() != Some(&key) {
            merged.keys.push(key);
            merged.counts.push(0);
        }
        if let Some(c) = merged.counts.last_mut() {
            *c += 1;
        }
        merged.positions.push(pos);
    }
    merged
}

impl KmerIndex {
    /// Build an index over `store` with `n_threads` workers.
    pub fn build(store: SequenceStore, opt: &IndexOptions, n_threads: usize) -> MapResult<Self> {
        opt.check()?;
        let code = GeneticCode::try_from_id(opt.trans_code)
            .ok_or_else(|| MapError::config(format!("unsupported genetic code {}", opt.trans_code)))?;
        let n_threads = n_threads.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .build()
            .map_err(|e| MapError::config(format!("thread pool: {}", e)))?;

        let start = Instant::now();
        let groups = partition(&store, n_threads);
        debug!("indexing {} contigs in {} groups", store.n_contigs(), groups.len());

        let n_blocks = 1usize << opt.bbit;
        let merged: Vec<MergedBlock> = pool.install(|| {
            let parts: Vec<Buckets> = groups
                .into_par_iter()
                .map(|g| index_group(&store, &code, opt, g))
                .collect();
            (0..n_blocks)
                .into_par_iter()
                .map(|b| merge_block(&parts, b))
                .collect()
        });

        let n_keys: usize = merged.iter().map(|m| m.keys.len()).sum();
        let n_pos: usize = merged.iter().map(|m| m.positions.len()).sum();
        let mut block_off = Vec::with_capacity(n_blocks + 1);
        let mut keys = Vec::with_capacity(n_keys);
        let mut key_start = Vec::with_capacity(n_keys + 1);
        let mut positions = Vec::with_capacity(n_pos);
        block_off.push(0u64);
        key_start.push(0u64);
        for m in merged {
            keys.extend_from_slice(&m.keys);
            for c in m.counts {
                let last = key_start.last().copied().unwrap_or(0);
                key_start.push(last + c);
            }
            positions.extend_from_slice(&m.positions);
            block_off.push(keys.len() as u64);
        }

        info!(
            "indexed {} k-mers at {} positions in {:.2}s",
            keys.len(),
            positions.len(),
            start.elapsed().as_secs_f64()
        );
        Ok(KmerIndex::from_parts(
            opt.clone(),
            store,
            code,
            block_off,
            keys,
            key_start,
            positions,
        ))
    }
}
