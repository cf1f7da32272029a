//! Traceback bytes and path recovery
//!
//! Each DP cell stores one byte. The low four bits name the transition that
//! produced `H`; bit 4 is set when `E` extended the previous row's `E`, bit
//! 5 when `F` extended the `F` three columns back.

use super::ops::{push_op, Op, OpKind};
use super::splice_dp::{DpBuffers, DpProblem};

pub const SRC_START: u8 = 0;
pub const SRC_MATCH: u8 = 1;
pub const SRC_E: u8 = 2;
pub const SRC_F: u8 = 3;
pub const SRC_FS1: u8 = 4;
pub const SRC_FS2: u8 = 5;
/// phase `p` introns use `SRC_INTRON0 + p`
pub const SRC_INTRON0: u8 = 6;
pub const SRC_MASK: u8 = 0x0f;
pub const E_EXT: u8 = 0x10;
pub const F_EXT: u8 = 0x20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    H,
    E,
    F,
}

/// Recovered path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    pub ops: Vec<Op>,
    /// first query residue
    pub i0: usize,
    /// first window column
    pub j0: u32,
}

#[inline]
fn residue_kind(q: u8, aa: u8) -> OpKind {
    if q == aa {
        OpKind::Match
    } else {
        OpKind::Mismatch
    }
}

/// Walk back from the end cell `(i, j)` to the local start.
pub fn traceback(p: &DpProblem, buf: &DpBuffers, mut i: usize, j: u32) -> Path {
    let mut ops = Vec::new();
    let mut j = j as i64;
    let mut state = State::H;
    loop {
        let band = &p.bands[i];
        let Some(k) = band.index(j) else {
            break;
        };
        let cell = band.off + k;
        let t = buf.tb[cell];
        match state {
            State::E => {
                push_op(&mut ops, OpKind::Insertion, 1);
                if t & E_EXT == 0 {
                    state = State::H;
                }
                i -= 1;
            }
            State::F => {
                push_op(&mut ops, OpKind::Deletion, 1);
                if t & F_EXT == 0 {
                    state = State::H;
                }
                j -= 3;
            }
            State::H => match t & SRC_MASK {
                SRC_MATCH => {
                    let aa = p.aa3[(j - 3) as usize];
                    push_op(&mut ops, residue_kind(p.q[i - 1], aa), 1);
                    i -= 1;
                    j -= 3;
                }
                SRC_E => state = State::E,
                SRC_F => state = State::F,
                SRC_FS1 => {
                    push_op(&mut ops, OpKind::Frameshift, 1);
                    j -= 1;
                }
                SRC_FS2 => {
                    push_op(&mut ops, OpKind::Frameshift, 2);
                    j -= 2;
                }
                SRC_INTRON0 => {
                    let Some(&d) = buf.introns.get(&cell) else {
                        break;
                    };
                    push_op(&mut ops, OpKind::Intron { phase: 0 }, (j - d as i64) as u32);
                    j = d as i64;
                }
                src if src > SRC_INTRON0 && src <= SRC_INTRON0 + 2 => {
                    let Some(&c) = buf.introns.get(&cell) else {
                        break;
                    };
                    let phase = src - SRC_INTRON0;
                    let (ju, cu) = (j as usize, c as usize);
                    let a = ju + phase as usize - 4;
                    let aa = match phase {
                        1 => p.code.translate(p.g[cu], p.g[a + 1], p.g[a + 2]),
                        _ => p.code.translate(p.g[cu], p.g[cu + 1], p.g[a + 1]),
                    };
                    push_op(&mut ops, residue_kind(p.q[i - 1], aa), 1);
                    push_op(&mut ops, OpKind::Intron { phase }, (ju - 3 - cu) as u32);
                    i -= 1;
                    j = c as i64;
                }
                _ => break,
            },
        }
    }
    ops.reverse();
    Path {
        ops,
        i0: i,
        j0: j as u32,
    }
}
