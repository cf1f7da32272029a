//! Exon compaction
//!
//! Splits a DP path at its introns into [`Feature`]s and totals the
//! per-alignment counts. Coordinates stay window-relative here.

use super::ops::{Op, OpKind};
use super::result::{ExtraDetail, Feature, FeatureKind};
use super::splice_dp::DpProblem;
use crate::config::MapOptions;
use crate::utils::alphabet::{code_to_aa, nt2_to_ascii, AA_STOP};

/// Compacted path with window coordinates
#[derive(Debug, Clone)]
pub struct Compacted {
    pub features: Vec<Feature>,
    pub detail: ExtraDetail,
    /// window column after the last aligned base
    pub t_end: u32,
}

fn dinucleotide(g: &[u8], at: usize) -> Option<[u8; 2]> {
    (at + 2 <= g.len()).then(|| [nt2_to_ascii(g[at]), nt2_to_ascii(g[at + 1])])
}

struct Totals<'o> {
    opt: &'o MapOptions,
    feat: Feature,
    trans: Option<String>,
}

impl Totals<'_> {
    fn residue(&mut self, q: u8, aa: u8) {
        let sc = self.opt.mat.score(q, aa);
        let f = &mut self.feat;
        f.score += sc;
        f.blen += 1;
        if q == aa {
            f.n_iden += 1;
        }
        if sc > 0 {
            f.n_plus += 1;
        }
        if aa == AA_STOP {
            f.n_stop += 1;
        }
        if let Some(s) = self.trans.as_mut() {
            s.push(code_to_aa(aa) as char);
        }
    }

    fn gap(&mut self, n: u32) {
        self.feat.score -= self.opt.go + self.opt.ge * n as i32;
        self.feat.blen += n;
    }
}

/// Split `ops` (starting at query residue `i0`, window column `j0`) into
/// features and collect the alignment totals.
pub fn compact(p: &DpProblem, opt: &MapOptions, ops: &[Op], i0: usize, j0: u32) -> Compacted {
    let g = p.g;
    let mut t = j0 as usize;
    let mut qi = i0;
    let mut split: Option<(usize, u8)> = None;
    let mut features = Vec::new();
    let mut first = Feature::new(FeatureKind::Cds);
    first.qs = i0 as u32;
    first.vs = t as u64;
    let mut acc = Totals {
        opt,
        feat: first,
        trans: opt.flags.show_trans.then(String::new),
    };

    for op in ops {
        match op.kind {
            OpKind::Match | OpKind::Mismatch => {
                for _ in 0..op.len {
                    let aa = match split.take() {
                        Some((c, 1)) => {
                            let aa = p.code.translate(g[c], g[t], g[t + 1]);
                            t += 2;
                            aa
                        }
                        Some((c, _)) => {
                            let aa = p.code.translate(g[c], g[c + 1], g[t]);
                            t += 1;
                            aa
                        }
                        None => {
                            let aa = p.aa3[t];
                            t += 3;
                            aa
                        }
                    };
                    acc.residue(p.q[qi], aa);
                    qi += 1;
                }
            }
            OpKind::Insertion => {
                acc.gap(op.len);
                if let Some(s) = acc.trans.as_mut() {
                    s.extend(std::iter::repeat('-').take(op.len as usize));
                }
                qi += op.len as usize;
            }
            OpKind::Deletion => {
                acc.gap(op.len);
                for _ in 0..op.len {
                    if let Some(s) = acc.trans.as_mut() {
                        s.push(code_to_aa(p.aa3[t]).to_ascii_lowercase() as char);
                    }
                    t += 3;
                }
            }
            OpKind::Frameshift => {
                acc.feat.score -= opt.fs;
                acc.feat.n_fs += 1;
                t += op.len as usize;
            }
            OpKind::Intron { phase } => {
                let d = t + phase as usize;
                let a = d + op.len as usize;
                let mut next = Feature::new(FeatureKind::Cds);
                next.qs = qi as u32;
                next.vs = a as u64;
                next.phase = (3 - phase) % 3;
                next.acceptor = dinucleotide(g, a - 2);
                next.acceptor_score = p.acc[a - 1];
                let mut done = std::mem::replace(&mut acc.feat, next);
                done.qe = qi as u32;
                done.ve = d as u64;
                done.donor = dinucleotide(g, d);
                done.donor_score = p.donor[d];
                features.push(done);
                split = (phase > 0).then_some((t, phase));
                t = a;
            }
        }
    }
    let mut last = acc.feat;
    last.qe = qi as u32;
    last.ve = t as u64;
    features.push(last);

    let mut detail = ExtraDetail::new(ops.to_vec());
    for f in &features {
        detail.n_fs += f.n_fs;
        detail.n_stop += f.n_stop;
        detail.n_iden += f.n_iden;
        detail.n_plus += f.n_plus;
        detail.blen += f.blen;
    }
    detail.translation = acc.trans;

    let t_end = t;
    let stop_next = t_end + 3 <= g.len() && p.aa3[t_end] == AA_STOP;
    if qi == p.q.len() && stop_next {
        let mut stop = Feature::new(FeatureKind::Stop);
        stop.vs = t_end as u64;
        stop.ve = t_end as u64 + 3;
        stop.qs = qi as u32;
        stop.qe = qi as u32;
        features.push(stop);
    }
    detail.dist_stop = (t_end..g.len().saturating_sub(2))
        .step_by(3)
        .find(|&x| p.aa3[x] == AA_STOP)
        .map(|x| (x - t_end) as u32);
    detail.dist_start = dist_start(p, j0 as usize);

    Compacted {
        features,
        detail,
        t_end: t_end as u32,
    }
}

/// Distance back from `j0` to the nearest in-frame ATG that is not behind
/// an in-frame stop
fn dist_start(p: &DpProblem, j0: usize) -> Option<u32> {
    let g = p.g;
    let mut x = j0 as i64;
    while x >= 0 {
        let xu = x as usize;
        if xu + 3 <= g.len() {
            if g[xu..xu + 3] == [0, 3, 2] {
                return Some((j0 - xu) as u32);
            }
            if p.aa3[xu] == AA_STOP {
                return None;
            }
        }
        x -= 3;
    }
    None
}
