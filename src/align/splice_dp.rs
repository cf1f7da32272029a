//! Banded protein-to-genome DP with introns and frameshifts
//!
//! `H[i][j]` is the best score of an alignment that ends after `i` query
//! residues and `j` window bases, at a codon boundary. Only two rows of
//! scores are live at any time; every cell keeps one traceback byte and
//! intron cells also keep the column the intron was opened from.

use rustc_hash::FxHashMap;

use super::band::RowBand;
use super::traceback::{
    E_EXT, F_EXT, SRC_E, SRC_F, SRC_FS1, SRC_FS2, SRC_INTRON0, SRC_MATCH, SRC_START,
};
use crate::config::MapOptions;
use crate::utils::alphabet::AA_STOP;
use crate::utils::genetic_code::GeneticCode;

/// Score of an unreachable or pruned cell
pub const NEG: i32 = i32::MIN / 4;

/// A cell value: the score in the high 32 bits minus a tie penalty in
/// the low 32 bits, `FS_UNIT` per frameshift and `STOP_UNIT` per
/// translated stop. Equal scores thus rank by fewer frameshifts, then by
/// fewer stops.
type Packed = i64;

const NEG_P: Packed = (NEG as i64) << 32;
const FS_UNIT: Packed = 1 << 16;
const STOP_UNIT: Packed = 1;

#[inline]
fn pack(score: i32) -> Packed {
    (score as i64) << 32
}

#[inline]
fn unpack(v: Packed) -> i32 {
    ((v + (1 << 32) - 1) >> 32) as i32
}

/// Everything the DP reads
pub struct DpProblem<'a> {
    /// query residue codes
    pub q: &'a [u8],
    /// window bases, 2-bit
    pub g: &'a [u8],
    /// `aa3[x]` translates `g[x..x+3]`
    pub aa3: &'a [u8],
    pub donor: &'a [i32],
    pub acc: &'a [i32],
    pub bands: &'a [RowBand],
    pub code: &'a GeneticCode,
}

/// Best end cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DpEnd {
    /// cell score plus the end bonus when the whole query was consumed
    pub score: i32,
    pub i: usize,
    pub j: u32,
    /// best cell score anywhere
    pub dp_max: i32,
}

#[derive(Debug, Default)]
pub struct DpBuffers {
    h: Vec<Packed>,
    e: Vec<Packed>,
    f: Vec<Packed>,
    hp: Vec<Packed>,
    ep: Vec<Packed>,
    pub(crate) tb: Vec<u8>,
    /// cell -> donor-side column of the intron ending there
    pub(crate) introns: FxHashMap<usize, u32>,
    /// best end score per column
    pub(crate) col_best: Vec<i32>,
}

impl DpBuffers {
    pub fn clear(&mut self) {
        self.h.clear();
        self.e.clear();
        self.f.clear();
        self.hp.clear();
        self.ep.clear();
        self.tb.clear();
        self.introns.clear();
        self.col_best.clear();
    }

    pub fn capacity_bytes(&self) -> usize {
        (self.h.capacity() + self.e.capacity() + self.f.capacity() + self.hp.capacity() + self.ep.capacity()) * 8
            + self.col_best.capacity() * 4
            + self.tb.capacity()
            + self.introns.capacity() * 16
    }
}

#[inline]
pub fn intron_len_cost(len: i64, coef: f32) -> i32 {
    (coef * (len.max(1) as f32).log2()).round() as i32
}

fn reset_row<T: Copy>(v: &mut Vec<T>, w: usize, fill: T) {
    v.clear();
    v.resize(w, fill);
}

/// Substitution value of `q` against translated `aa`
#[inline]
fn residue_value(opt: &MapOptions, q: u8, aa: u8) -> Packed {
    let v = pack(opt.mat.score(q, aa));
    if aa == AA_STOP {
        v - STOP_UNIT
    } else {
        v
    }
}

/// Fill the band and return the best end cell, or `None` when no cell
/// scores above zero.
///
/// Among cells of equal score the one reached with fewer frameshifts wins,
/// then the one with fewer stops. Remaining ties keep the earlier
/// transition in the order match, deletion, insertion, intron,
/// frameshift, so a path is extended rather than restarted, and the
/// earliest end cell is reported.
pub fn fill(p: &DpProblem, opt: &MapOptions, buf: &mut DpBuffers) -> Option<DpEnd> {
    let m = p.q.len();
    let bands = p.bands;
    let wlen = p.g.len();
    let (Some(first), Some(last)) = (bands.first(), bands.last()) else {
        return None;
    };
    buf.tb.clear();
    buf.tb.resize(last.off + last.width(), SRC_START);
    buf.introns.clear();
    reset_row(&mut buf.col_best, wlen + 1, NEG);

    let splicing = !opt.flags.no_splice;
    let min_intron = opt.min_intron as i64;
    let (go, ge) = (pack(opt.go), pack(opt.ge));
    let fs = pack(opt.fs) + FS_UNIT;

    reset_row(&mut buf.hp, first.width(), pack(opt.end_bonus));
    reset_row(&mut buf.ep, first.width(), NEG_P);
    let mut best_global = opt.end_bonus;
    let mut dp_max = NEG;
    // (packed end value, row, column)
    let mut end: Option<(Packed, usize, u32)> = None;

    for i in 1..=m.min(bands.len() - 1) {
        let band = bands[i];
        let prev = bands[i - 1];
        let w = band.width();
        reset_row(&mut buf.h, w, NEG_P);
        reset_row(&mut buf.e, w, NEG_P);
        reset_row(&mut buf.f, w, NEG_P);
        let qi = p.q[i - 1];
        let io0 = opt.intron_open(i, m);
        let io_split = opt.intron_open(i - 1, m);

        // running intron maxima: (value, column opened from)
        let mut run0 = (NEG_P, 0u32);
        let mut k0 = 0usize;
        let mut runp = [(NEG_P, 0u32); 2];
        let mut kp = 0usize;
        let mut alive = false;

        for k in 0..w {
            let j = band.col(k) as i64;
            let ju = j as usize;

            let (mut e, mut e_ext) = (NEG_P, false);
            if let Some(pk) = prev.index(j) {
                let open = buf.hp[pk] - go - ge;
                let ext = buf.ep[pk] - ge;
                (e, e_ext) = if ext > open { (ext, true) } else { (open, false) };
            }
            let (mut fv, mut f_ext) = (NEG_P, false);
            if let Some(ck) = band.index(j - 3) {
                let open = buf.h[ck] - go - ge;
                let ext = buf.f[ck] - ge;
                (fv, f_ext) = if ext > open { (ext, true) } else { (open, false) };
            }

            let mut hv = NEG_P;
            let mut src = SRC_START;
            let mut from = 0u32;
            if let Some(pk) = prev.index(j - 3) {
                let mv = buf.hp[pk] + residue_value(opt, qi, p.aa3[ju - 3]);
                if mv > hv {
                    (hv, src) = (mv, SRC_MATCH);
                }
            }
            if fv > hv {
                (hv, src) = (fv, SRC_F);
            }
            if e > hv {
                (hv, src) = (e, SRC_E);
            }
            if splicing {
                while k0 < k && (band.col(k0) as i64) <= j - min_intron {
                    let d = band.col(k0);
                    let v = buf.h[k0] + pack(p.donor[d as usize]);
                    if v > run0.0 {
                        run0 = (v, d);
                    }
                    k0 += 1;
                }
                if run0.0 > NEG_P {
                    let (sc, d) = run0;
                    let v = sc + pack(p.acc[ju - 1] - io0 - intron_len_cost(j - d as i64, opt.ie_coef));
                    if v > hv {
                        (hv, src, from) = (v, SRC_INTRON0, d);
                    }
                }
                let pw = prev.width();
                while kp < pw && (prev.col(kp) as i64) <= j - 3 - min_intron {
                    let c = prev.col(kp) as usize;
                    for (ph, run) in runp.iter_mut().enumerate() {
                        let at = c + ph + 1;
                        if at < wlen {
                            let v = buf.hp[kp] + pack(p.donor[at]);
                            if v > run.0 {
                                *run = (v, c as u32);
                            }
                        }
                    }
                    kp += 1;
                }
                for (ph, &(sc, c)) in runp.iter().enumerate() {
                    if sc <= NEG_P {
                        continue;
                    }
                    let phase = ph + 1;
                    let a = ju + phase - 4;
                    let c = c as usize;
                    let aa = match phase {
                        1 => p.code.translate(p.g[c], p.g[a + 1], p.g[a + 2]),
                        _ => p.code.translate(p.g[c], p.g[c + 1], p.g[a + 1]),
                    };
                    let len = (ju - 3 - c) as i64;
                    let v = sc
                        + pack(p.acc[a] - io_split - intron_len_cost(len, opt.ie_coef))
                        + residue_value(opt, qi, aa);
                    if v > hv {
                        (hv, src, from) = (v, SRC_INTRON0 + phase as u8, c as u32);
                    }
                }
            }
            if let Some(ck) = band.index(j - 1) {
                let v = buf.h[ck] - fs;
                if v > hv {
                    (hv, src) = (v, SRC_FS1);
                }
            }
            if let Some(ck) = band.index(j - 2) {
                let v = buf.h[ck] - fs;
                if v > hv {
                    (hv, src) = (v, SRC_FS2);
                }
            }
            if hv < 0 {
                (hv, src) = (0, SRC_START);
            }

            let floor = best_global - opt.xdrop;
            if unpack(hv) < floor {
                hv = NEG_P;
                src = SRC_START;
            }
            if unpack(e) < floor {
                (e, e_ext) = (NEG_P, false);
            }
            if unpack(fv) < floor {
                (fv, f_ext) = (NEG_P, false);
            }
            buf.h[k] = hv;
            buf.e[k] = e;
            buf.f[k] = fv;

            let cell = band.off + k;
            let mut t = src;
            if e_ext {
                t |= E_EXT;
            }
            if f_ext {
                t |= F_EXT;
            }
            buf.tb[cell] = t;
            if src >= SRC_INTRON0 {
                buf.introns.insert(cell, from);
            }

            if hv == NEG_P && e == NEG_P && fv == NEG_P {
                continue;
            }
            alive = true;
            if hv == NEG_P {
                continue;
            }
            let score = unpack(hv);
            best_global = best_global.max(score);
            dp_max = dp_max.max(score);
            let end_v = hv + if i == m { pack(opt.end_bonus) } else { 0 };
            if end.map_or(true, |(b, _, _)| end_v > b) {
                end = Some((end_v, i, j as u32));
            }
            let end_sc = unpack(end_v);
            if end_sc > buf.col_best[ju] {
                buf.col_best[ju] = end_sc;
            }
        }
        if !alive {
            break;
        }
        std::mem::swap(&mut buf.h, &mut buf.hp);
        std::mem::swap(&mut buf.e, &mut buf.ep);
    }

    let (v, i, j) = end?;
    let score = unpack(v);
    (score > 0).then_some(DpEnd { score, i, j, dp_max })
}

/// Best end score in a column outside `[j0, j1]`
pub fn best_outside(buf: &DpBuffers, j0: u32, j1: u32) -> i32 {
    buf.col_best
        .iter()
        .enumerate()
        .filter(|&(j, _)| (j as u32) < j0 || (j as u32) > j1)
        .map(|(_, &s)| s)
        .max()
        .filter(|&s| s > NEG)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::band::{build_bands, BandParams, Guide};
    use crate::utils::alphabet::{aa_to_code, nt4_to_nt2, nt_to_nt4};

    fn encode(nt: &[u8]) -> Vec<u8> {
        nt.iter().map(|&c| nt4_to_nt2(nt_to_nt4(c))).collect()
    }

    fn translate_all(g: &[u8], code: &GeneticCode) -> Vec<u8> {
        (0..g.len())
            .map(|x| {
                if x + 3 <= g.len() {
                    code.translate(g[x], g[x + 1], g[x + 2])
                } else {
                    crate::utils::alphabet::AA_X
                }
            })
            .collect()
    }

    fn run(q: &str, nt: &[u8], guides: &[Guide], opt: &MapOptions) -> (Option<DpEnd>, DpBuffers) {
        let q: Vec<u8> = q.bytes().map(aa_to_code).collect();
        let g = encode(nt);
        let code = GeneticCode::default();
        let aa3 = translate_all(&g, &code);
        let zero = vec![0; g.len() + 1];
        let mut bands = Vec::new();
        let params = BandParams { bw: 12, max_ext: 30, flank: 60, slack: 0 };
        build_bands(guides, q.len(), g.len() as u32, &params, &mut bands);
        let p = DpProblem {
            q: &q,
            g: &g,
            aa3: &aa3,
            donor: &zero,
            acc: &zero,
            bands: &bands,
            code: &code,
        };
        let mut buf = DpBuffers::default();
        let end = fill(&p, opt, &mut buf);
        (end, buf)
    }

    #[test]
    fn test_exact_match_reaches_query_end() {
        // M K W Y C H
        let nt = b"GGGATGAAATGGTATTGCCATGGG";
        let guides = [Guide { q: 0, t: 3 }, Guide { q: 6, t: 21 }];
        let opt = MapOptions::default();
        let (end, _) = run("MKWYCH", nt, &guides, &opt);
        let end = end.expect("alignment");
        assert_eq!(end.i, 6);
        assert_eq!(end.j, 21);
        let raw: i32 = [5, 5, 11, 7, 9, 8].iter().sum();
        assert_eq!(end.score, opt.end_bonus + raw + opt.end_bonus);
        assert_eq!(end.dp_max, opt.end_bonus + raw);
    }

    #[test]
    fn test_no_positive_cell() {
        let nt = b"CCCCCCCCCCCCCCCCCC";
        let guides = [Guide { q: 0, t: 0 }, Guide { q: 3, t: 9 }];
        let mut opt = MapOptions::default();
        opt.end_bonus = 0;
        let (end, _) = run("WWW", nt, &guides, &opt);
        assert!(end.is_none());
    }

    #[test]
    fn test_intron_len_cost() {
        assert_eq!(intron_len_cost(1024, 1.4), 14);
        assert_eq!(intron_len_cost(1, 1.4), 0);
    }
}
