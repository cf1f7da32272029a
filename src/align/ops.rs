//! Alignment operations
//!
//! Target consumption per op:
//! - `Match`/`Mismatch` of `n` residues: `3n` nt, except that the first
//!   residue after an `Intron` of phase `p > 0` consumes only `3 - p`
//! - `Insertion` (query residues without codons): none
//! - `Deletion` of `n` codons: `3n` nt
//! - `Frameshift` of `n` nt: `n`
//! - `Intron` of phase `p` and length `L`: `p + L`, the `p` bases being the
//!   head of the codon split by the intron

use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Match,
    Mismatch,
    Insertion,
    Deletion,
    Frameshift,
    Intron { phase: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Op {
    pub kind: OpKind,
    pub len: u32,
}

impl Op {
    pub fn new(kind: OpKind, len: u32) -> Self {
        Op { kind, len }
    }

    /// Query residues consumed
    pub fn query_len(&self) -> u32 {
        match self.kind {
            OpKind::Match | OpKind::Mismatch | OpKind::Insertion => self.len,
            _ => 0,
        }
    }

    fn code(&self) -> char {
        match self.kind {
            OpKind::Match | OpKind::Mismatch => 'M',
            OpKind::Insertion => 'I',
            OpKind::Deletion => 'D',
            OpKind::Frameshift => 'F',
            OpKind::Intron { phase: 0 } => 'N',
            OpKind::Intron { phase: 1 } => 'U',
            OpKind::Intron { .. } => 'V',
        }
    }
}

/// Append `op`, merging it into the previous run when both are residue or
/// gap runs of the same kind. Frameshifts and introns are never merged.
pub fn push_op(ops: &mut Vec<Op>, kind: OpKind, len: u32) {
    if let Some(last) = ops.last_mut() {
        let mergeable = matches!(
            kind,
            OpKind::Match | OpKind::Mismatch | OpKind::Insertion | OpKind::Deletion
        );
        if mergeable && last.kind == kind {
            last.len += len;
            return;
        }
    }
    ops.push(Op::new(kind, len));
}

/// Total target nt consumed by `ops`
pub fn target_len(ops: &[Op]) -> u64 {
    let mut t = 0u64;
    let mut split = 0u64;
    for op in ops {
        match op.kind {
            OpKind::Match | OpKind::Mismatch => {
                t += 3 * op.len as u64 - split;
                split = 0;
            }
            OpKind::Deletion => t += 3 * op.len as u64,
            OpKind::Frameshift => t += op.len as u64,
            OpKind::Insertion => {}
            OpKind::Intron { phase } => {
                t += phase as u64 + op.len as u64;
                split = phase as u64;
            }
        }
    }
    t
}

pub fn query_len(ops: &[Op]) -> u32 {
    ops.iter().map(Op::query_len).sum()
}

/// Compact op string; matches and mismatches print together as `M`
pub fn cigar_string(ops: &[Op]) -> String {
    let mut s = String::with_capacity(ops.len() * 4);
    let mut pending: Option<(char, u32)> = None;
    for op in ops {
        let c = op.code();
        match pending {
            Some((pc, n)) if pc == c && c == 'M' => pending = Some((pc, n + op.len)),
            Some((pc, n)) => {
                let _ = write!(s, "{}{}", n, pc);
                pending = Some((c, op.len));
            }
            None => pending = Some((c, op.len)),
        }
    }
    if let Some((c, n)) = pending {
        let _ = write!(s, "{}{}", n, c);
    }
    s
}
