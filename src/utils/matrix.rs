//! BLOSUM62 scoring matrix
//!
//! Residues are in matrix order `ARNDCQEGHILKMFPSTWYVBJZX*` (see
//! [`crate::utils::alphabet`]). The matrix used by the aligner is a copy of
//! BLOSUM62 whose stop row and column are rewritten from the frameshift
//! penalty, so that translating through an in-frame stop costs the same as a
//! frameshift.

use crate::utils::alphabet::{AA_SIZE, AA_STOP};

/// Size of BLOSUM62 matrix (25x25)
pub const BLOSUM62_SIZE: usize = 25;

/// BLOSUM62 in order ARNDCQEGHILKMFPSTWYVBJZX*
pub static BLOSUM62: [i8; BLOSUM62_SIZE * BLOSUM62_SIZE] = [
    //       A,  R,  N,  D,  C,  Q,  E,  G,  H,  I,  L,  K,  M,  F,  P,  S,  T,  W,  Y,  V,  B,  J,  Z,  X,  *
    /*A*/    4, -1, -2, -2,  0, -1, -1,  0, -2, -1, -1, -1, -1, -2, -1,  1,  0, -3, -2,  0, -2, -1, -1, -1, -4,
    /*R*/   -1,  5,  0, -2, -3,  1,  0, -2,  0, -3, -2,  2, -1, -3, -2, -1, -1, -3, -2, -3, -1, -2,  0, -1, -4,
    /*N*/   -2,  0,  6,  1, -3,  0,  0,  0,  1, -3, -3,  0, -2, -3, -2,  1,  0, -4, -2, -3,  4, -3,  0, -1, -4,
    /*D*/   -2, -2,  1,  6, -3,  0,  2, -1, -1, -3, -4, -1, -3, -3, -1,  0, -1, -4, -3, -3,  4, -3,  1, -1, -4,
    /*C*/    0, -3, -3, -3,  9, -3, -4, -3, -3, -1, -1, -3, -1, -2, -3, -1, -1, -2, -2, -1, -3, -1, -3, -1, -4,
    /*Q*/   -1,  1,  0,  0, -3,  5,  2, -2,  0, -3, -2,  1,  0, -3, -1,  0, -1, -2, -1, -2,  0, -2,  4, -1, -4,
    /*E*/   -1,  0,  0,  2, -4,  2,  5, -2,  0, -3, -3,  1, -2, -3, -1,  0, -1, -3, -2, -2,  1, -3,  4, -1, -4,
    /*G*/    0, -2,  0, -1, -3, -2, -2,  6, -2, -4, -4, -2, -3, -3, -2,  0, -2, -2, -3, -3, -1, -4, -2, -1, -4,
    /*H*/   -2,  0,  1, -1, -3,  0,  0, -2,  8, -3, -3, -1, -2, -1, -2, -1, -2, -2,  2, -3,  0, -3,  0, -1, -4,
    /*I*/   -1, -3, -3, -3, -1, -3, -3, -4, -3,  4,  2, -3,  1,  0, -3, -2, -1, -3, -1,  3, -3,  3, -3, -1, -4,
    /*L*/   -1, -2, -3, -4, -1, -2, -3, -4, -3,  2,  4, -2,  2,  0, -3, -2, -1, -2, -1,  1, -4,  3, -3, -1, -4,
    /*K*/   -1,  2,  0, -1, -3,  1,  1, -2, -1, -3, -2,  5, -1, -3, -1,  0, -1, -3, -2, -2,  0, -3,  1, -1, -4,
    /*M*/   -1, -1, -2, -3, -1,  0, -2, -3, -2,  1,  2, -1,  5,  0, -2, -1, -1, -1, -1,  1, -3,  2, -1, -1, -4,
    /*F*/   -2, -3, -3, -3, -2, -3, -3, -3, -1,  0,  0, -3,  0,  6, -4, -2, -2,  1,  3, -1, -3,  0, -3, -1, -4,
    /*P*/   -1, -2, -2, -1, -3, -1, -1, -2, -2, -3, -3, -1, -2, -4,  7, -1, -1, -4, -3, -2, -2, -3, -1, -1, -4,
    /*S*/    1, -1,  1,  0, -1,  0,  0,  0, -1, -2, -2,  0, -1, -2, -1,  4,  1, -3, -2, -2,  0, -2,  0, -1, -4,
    /*T*/    0, -1,  0, -1, -1, -1, -1, -2, -2, -1, -1, -1, -1, -2, -1,  1,  5, -2, -2,  0, -1, -1, -1, -1, -4,
    /*W*/   -3, -3, -4, -4, -2, -2, -3, -2, -2, -3, -2, -3, -1,  1, -4, -3, -2, 11,  2, -3, -4, -2, -2, -1, -4,
    /*Y*/   -2, -2, -2, -3, -2, -1, -2, -3,  2, -1, -1, -2, -1,  3, -3, -2, -2,  2,  7, -1, -3, -1, -2, -1, -4,
    /*V*/    0, -3, -3, -3, -1, -2, -2, -3, -3,  3,  1, -2,  1, -1, -2, -2,  0, -3, -1,  4, -3,  2, -2, -1, -4,
    /*B*/   -2, -1,  4,  4, -3,  0,  1, -1,  0, -3, -4,  0, -3, -3, -2,  0, -1, -4, -3, -3,  4, -3,  0, -1, -4,
    /*J*/   -1, -2, -3, -3, -1, -2, -3, -4, -3,  3,  3, -3,  2,  0, -3, -2, -1, -2, -1,  2, -3,  3, -3, -1, -4,
    /*Z*/   -1,  0,  0,  1, -3,  4,  4, -2,  0, -3, -3,  1, -1, -3, -1,  0, -1, -2, -2, -2,  0, -3,  4, -1, -4,
    /*X*/   -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -4,
    /***/   -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4,  1,
];

/// Square substitution matrix over matrix-order residue codes
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreMatrix {
    size: usize,
    scores: Vec<i32>,
}

impl ScoreMatrix {
    pub fn blosum62() -> Self {
        ScoreMatrix {
            size: BLOSUM62_SIZE,
            scores: BLOSUM62.iter().map(|&s| s as i32).collect(),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[inline(always)]
    pub fn score(&self, a: u8, b: u8) -> i32 {
        let (a, b) = (a as usize, b as usize);
        if a >= self.size || b >= self.size {
            return self.scores[(self.size - 1) * self.size + self.size - 1];
        }
        self.scores[a * self.size + b]
    }

    /// Rewrite every score that involves a stop as `-fs`.
    pub fn set_stop_penalty(&mut self, fs: i32) {
        let stop = AA_STOP as usize;
        if stop >= self.size {
            return;
        }
        for i in 0..self.size {
            self.scores[i * self.size + stop] = -fs;
            self.scores[stop * self.size + i] = -fs;
        }
    }

    /// Largest entry on the diagonal, excluding stop
    pub fn max_match(&self) -> i32 {
        (0..self.size.min(AA_SIZE - 1))
            .map(|i| self.scores[i * self.size + i])
            .max()
            .unwrap_or(0)
    }
}

impl Default for ScoreMatrix {
    fn default() -> Self {
        ScoreMatrix::blosum62()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::alphabet::aa_to_code;

    #[test]
    fn test_blosum62_symmetric() {
        for i in 0..BLOSUM62_SIZE {
            for j in 0..BLOSUM62_SIZE {
                assert_eq!(
                    BLOSUM62[i * BLOSUM62_SIZE + j],
                    BLOSUM62[j * BLOSUM62_SIZE + i],
                    "asymmetric at ({}, {})",
                    i,
                    j
                );
            }
        }
    }

    #[test]
    fn test_known_scores() {
        let m = ScoreMatrix::blosum62();
        assert_eq!(m.score(aa_to_code(b'W'), aa_to_code(b'W')), 11);
        assert_eq!(m.score(aa_to_code(b'A'), aa_to_code(b'R')), -1);
        assert_eq!(m.score(aa_to_code(b'I'), aa_to_code(b'V')), 3);
        assert_eq!(m.max_match(), 11);
    }

    #[test]
    fn test_stop_penalty() {
        let mut m = ScoreMatrix::blosum62();
        m.set_stop_penalty(23);
        assert_eq!(m.score(aa_to_code(b'A'), AA_STOP), -23);
        assert_eq!(m.score(AA_STOP, AA_STOP), -23);
        assert_eq!(m.score(aa_to_code(b'A'), aa_to_code(b'A')), 4);
    }
}
