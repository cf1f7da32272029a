//! Splice signal scores over a DP window
//!
//! `donor[x]` scores an intron whose first base is window position `x`;
//! `acc[a]` scores an intron whose last base is `a`. Both combine the
//! dinucleotide model with external site scores when the store has them.

use crate::config::{MapOptions, SpliceModel};
use crate::sequence::SequenceStore;

const NON_CANONICAL: i32 = -20;

/// Model score of a donor starting with bases `b0 b1`
#[inline]
pub fn donor_model(model: SpliceModel, b0: u8, b1: u8) -> i32 {
    match (model, b0, b1) {
        (SpliceModel::Off, _, _) => 0,
        (_, 2, 3) => 0,
        (_, 2, 1) => -8,
        (SpliceModel::Extended, 0, 3) => -12,
        _ => NON_CANONICAL,
    }
}

/// Model score of an acceptor ending with bases `b0 b1`
#[inline]
pub fn acceptor_model(model: SpliceModel, b0: u8, b1: u8) -> i32 {
    match (model, b0, b1) {
        (SpliceModel::Off, _, _) => 0,
        (_, 0, 2) => 0,
        (SpliceModel::Extended, 0, 1) => -12,
        _ => NON_CANONICAL,
    }
}

/// Scaled and clipped bonus for an external site score
#[inline]
pub fn external_bonus(score: f32, opt: &MapOptions) -> i32 {
    let b = (score * opt.sp_scale).round() as i32;
    b.clamp(-opt.sp_max_bonus, opt.sp_max_bonus)
}

/// Fill `donor` and `acc` for the window `g` that starts at strand-local
/// position `ws` of contig `cid`.
pub fn fill_signals(
    store: &SequenceStore,
    cid: u32,
    rev: bool,
    ws: u64,
    g: &[u8],
    opt: &MapOptions,
    donor: &mut Vec<i32>,
    acc: &mut Vec<i32>,
) {
    let n = g.len();
    donor.clear();
    acc.clear();
    donor.resize(n + 1, NON_CANONICAL);
    acc.resize(n + 1, NON_CANONICAL);
    let model = opt.sp_model;
    for x in 0..n {
        donor[x] = if x + 1 < n {
            donor_model(model, g[x], g[x + 1])
        } else if model == SpliceModel::Off {
            0
        } else {
            NON_CANONICAL
        };
        acc[x] = if x >= 1 {
            acceptor_model(model, g[x - 1], g[x])
        } else if model == SpliceModel::Off {
            0
        } else {
            NON_CANONICAL
        };
    }

    let Some(table) = store.splice_table() else {
        return;
    };
    if !table.has_strand(cid, rev) {
        return;
    }
    // sites without data are penalized once the strand has any
    for x in 0..n {
        donor[x] += opt.sp_null_bonus;
        acc[x] += opt.sp_null_bonus;
    }
    let end = ws + n as u64;
    for site in table.range(cid, rev, false, ws, end) {
        let x = (site.pos - ws) as usize;
        donor[x] += external_bonus(site.score, opt) - opt.sp_null_bonus;
    }
    for site in table.range(cid, rev, true, ws, end) {
        let a = (site.pos - ws) as usize;
        acc[a] += external_bonus(site.score, opt) - opt.sp_null_bonus;
    }
}
