//! Nucleotide and amino acid encodings
//!
//! Genome bases are stored as 4-bit IUPAC bitmasks (A=1, C=2, G=4, T=8, so an
//! ambiguity code is the OR of the bases it stands for). Working code for the
//! aligners uses 2-bit bases (A=0, C=1, G=2, T=3) with 4 for anything
//! ambiguous.
//!
//! Residues are numbered in BLOSUM62 matrix order `ARNDCQEGHILKMFPSTWYVBJZX*`.
//! K-mers use a 13-letter reduced alphabet in 4 bits per residue; X, B, J, Z
//! and stop break k-mers.

/// BLOSUM62 matrix order
pub const AA_ORDER: &[u8; 25] = b"ARNDCQEGHILKMFPSTWYVBJZX*";
pub const AA_X: u8 = 23;
pub const AA_STOP: u8 = 24;
pub const AA_SIZE: usize = 25;

/// Bits per residue in a packed k-mer
pub const BITS_PER_AA: u32 = 4;
pub const REDUCED_BREAK: u8 = 13;
pub const REDUCED_STOP: u8 = 14;

/// 4-bit mask of an ambiguous base
pub const NT4_N: u8 = 15;
/// 2-bit code of an ambiguous base
pub const NT2_N: u8 = 4;

const fn build_nt4_table() -> [u8; 256] {
    let mut t = [NT4_N; 256];
    let pairs: [(u8, u8); 16] = [
        (b'A', 1), (b'C', 2), (b'G', 4), (b'T', 8), (b'U', 8),
        (b'R', 5), (b'Y', 10), (b'S', 6), (b'W', 9), (b'K', 12),
        (b'M', 3), (b'B', 14), (b'D', 13), (b'H', 11), (b'V', 7),
        (b'N', 15),
    ];
    let mut i = 0;
    while i < pairs.len() {
        let (c, v) = pairs[i];
        t[c as usize] = v;
        t[c.to_ascii_lowercase() as usize] = v;
        i += 1;
    }
    t
}

const fn build_aa_table() -> [u8; 256] {
    let mut t = [AA_X; 256];
    let mut i = 0;
    while i < AA_ORDER.len() {
        let c = AA_ORDER[i];
        t[c as usize] = i as u8;
        t[c.to_ascii_lowercase() as usize] = i as u8;
        i += 1;
    }
    // selenocysteine and pyrrolysine score as X
    t[b'U' as usize] = AA_X;
    t[b'O' as usize] = AA_X;
    t
}

static NT4_TABLE: [u8; 256] = build_nt4_table();
static AA_TABLE: [u8; 256] = build_aa_table();

/// 4-bit mask to 2-bit code; anything that is not a single base becomes N
static NT4_TO_NT2: [u8; 16] = [4, 0, 1, 4, 2, 4, 4, 4, 3, 4, 4, 4, 4, 4, 4, 4];

/// 4-bit mask to ASCII (upper case IUPAC)
static NT4_TO_ASCII: &[u8; 16] = b"NACMGRSVTWYHKDBN";

/// Matrix-order residue to reduced alphabet class
static REDUCED: [u8; AA_SIZE] = [
    0,  // A
    10, // R  (RK)
    8,  // N  (NQ)
    2,  // D  (DE)
    1,  // C
    8,  // Q
    2,  // E
    4,  // G
    5,  // H
    6,  // I  (IV)
    7,  // L  (LM)
    10, // K
    7,  // M
    3,  // F  (FY)
    9,  // P
    11, // S  (ST)
    11, // T
    12, // W
    3,  // Y
    6,  // V
    REDUCED_BREAK, // B
    REDUCED_BREAK, // J
    REDUCED_BREAK, // Z
    REDUCED_BREAK, // X
    REDUCED_STOP,  // *
];

#[inline(always)]
pub fn nt_to_nt4(c: u8) -> u8 {
    NT4_TABLE[c as usize]
}

#[inline(always)]
pub fn nt4_to_nt2(mask: u8) -> u8 {
    NT4_TO_NT2[(mask & 0xf) as usize]
}

#[inline(always)]
pub fn nt4_to_ascii(mask: u8) -> u8 {
    NT4_TO_ASCII[(mask & 0xf) as usize]
}

/// Complement of a 2-bit code; N stays N
#[inline(always)]
pub fn comp_nt2(c: u8) -> u8 {
    if c < 4 {
        3 - c
    } else {
        NT2_N
    }
}

#[inline(always)]
pub fn nt2_to_ascii(c: u8) -> u8 {
    match c {
        0 => b'A',
        1 => b'C',
        2 => b'G',
        3 => b'T',
        _ => b'N',
    }
}

#[inline(always)]
pub fn aa_to_code(c: u8) -> u8 {
    AA_TABLE[c as usize]
}

#[inline(always)]
pub fn code_to_aa(code: u8) -> u8 {
    AA_ORDER.get(code as usize).copied().unwrap_or(b'X')
}

#[inline(always)]
pub fn reduce(code: u8) -> u8 {
    REDUCED.get(code as usize).copied().unwrap_or(REDUCED_BREAK)
}

/// Encode an ASCII protein into matrix-order codes, appending to `out`.
/// A trailing stop is kept as a residue; it simply never seeds.
pub fn encode_protein(seq: &[u8], out: &mut Vec<u8>) {
    out.extend(seq.iter().map(|&c| aa_to_code(c)));
}
