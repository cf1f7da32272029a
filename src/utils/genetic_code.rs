//! Genetic code translation tables
//!
//! Tables are the NCBI 64-character strings in TCAG codon order. A
//! [`GeneticCode`] also carries a lookup table indexed by 2-bit packed codons
//! (A=0, C=1, G=2, T=3) that yields residues in score matrix order, which is
//! what the index builder and the aligners translate with.

use crate::utils::alphabet::{aa_to_code, AA_STOP, AA_X};

/// Genetic code translation table
#[derive(Clone, Debug)]
pub struct GeneticCode {
    id: u8,
    pub table: [u8; 64],
    codes: [u8; 64],
}

fn ncbi_table(id: u8) -> Option<&'static [u8; 64]> {
    let table = match id {
        1 => b"FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG",
        2 => b"FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIMMTTTTNNKKSS**VVVVAAAADDEEGGGG",
        3 => b"FFLLSSSSYY**CCWWTTTTPPPPHHQQRRRRIIMMTTTTNNKKSSRRVVVVAAAADDEEGGGG",
        4 => b"FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG",
        5 => b"FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIMMTTTTNNKKSSSSVVVVAAAADDEEGGGG",
        6 => b"FFLLSSSSYYQQCC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG",
        9 => b"FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIIMTTTTNNNKSSSSVVVVAAAADDEEGGGG",
        10 => b"FFLLSSSSYY**CCCWLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG",
        11 => b"FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG",
        12 => b"FFLLSSSSYY**CC*WLLLSPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG",
        13 => b"FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIMMTTTTNNKKSSGGVVVVAAAADDEEGGGG",
        14 => b"FFLLSSSSYYY*CCWWLLLLPPPPHHQQRRRRIIIMTTTTNNNKSSSSVVVVAAAADDEEGGGG",
        16 => b"FFLLSSSSYY*LCC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG",
        21 => b"FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIMMTTTTNNNKSSSSVVVVAAAADDEEGGGG",
        22 => b"FFLLSS*SYY*LCC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG",
        23 => b"FF*LSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG",
        24 => b"FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSSKVVVVAAAADDEEGGGG",
        25 => b"FFLLSSSSYY**CCGWLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG",
        26 => b"FFLLSSSSYY**CC*WLLLAPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG",
        27 => b"FFLLSSSSYYQQCCWWLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG",
        29 => b"FFLLSSSSYYYYCC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG",
        30 => b"FFLLSSSSYYEECC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG",
        31 => b"FFLLSSSSYYEECCWWLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG",
        33 => b"FFLLSSSSYYY*CCWWLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSSKVVVVAAAADDEEGGGG",
        _ => return None,
    };
    Some(table)
}

// 2-bit base (A0 C1 G2 T3) to its rank in TCAG order
const TCAG_RANK: [usize; 4] = [2, 1, 3, 0];

impl GeneticCode {
    /// Create a genetic code from an NCBI genetic code ID, `None` if the ID
    /// is not a supported table.
    pub fn try_from_id(id: u8) -> Option<Self> {
        let table_str = ncbi_table(id)?;
        let mut table = [0u8; 64];
        table.copy_from_slice(table_str);
        let mut codes = [AA_X; 64];
        for (c0, &r0) in TCAG_RANK.iter().enumerate() {
            for (c1, &r1) in TCAG_RANK.iter().enumerate() {
                for (c2, &r2) in TCAG_RANK.iter().enumerate() {
                    codes[c0 << 4 | c1 << 2 | c2] = aa_to_code(table[r0 << 4 | r1 << 2 | r2]);
                }
            }
        }
        Some(GeneticCode { id, table, codes })
    }

    /// Whether `id` names a supported table.
    pub fn is_supported(id: u8) -> bool {
        ncbi_table(id).is_some()
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    /// Translate an ASCII codon to an ASCII amino acid
    pub fn get(&self, codon: &[u8]) -> u8 {
        if codon.len() != 3 {
            return b'X';
        }
        let mut idx = 0;
        for &b in codon {
            idx <<= 2;
            match b.to_ascii_uppercase() {
                b'T' | b'U' => idx |= 0,
                b'C' => idx |= 1,
                b'A' => idx |= 2,
                b'G' => idx |= 3,
                _ => return b'X',
            }
        }
        self.table[idx]
    }

    /// Translate three 2-bit bases into a matrix-order residue code.
    /// Any ambiguous base (code > 3) gives X.
    #[inline(always)]
    pub fn translate(&self, b0: u8, b1: u8, b2: u8) -> u8 {
        if (b0 | b1 | b2) > 3 {
            return AA_X;
        }
        self.codes[(b0 as usize) << 4 | (b1 as usize) << 2 | b2 as usize]
    }

    #[inline(always)]
    pub fn is_stop(&self, b0: u8, b1: u8, b2: u8) -> bool {
        self.translate(b0, b1, b2) == AA_STOP
    }
}

impl Default for GeneticCode {
    fn default() -> Self {
        match GeneticCode::try_from_id(1) {
            Some(code) => code,
            None => unreachable!("standard code is always present"),
        }
    }
}
