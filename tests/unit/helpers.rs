//! Test utilities: synthetic genomes and genes
//!
//! Genes are back-translated with one fixed codon per residue; everything
//! else is random sequence from a seeded `StdRng`, so every test sees the
//! same genome on every run.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use protomap::{IndexOptions, KmerIndex, SequenceStore};

pub const RESIDUES: &[u8] = b"ARNDCQEGHILKMFPSTWYV";

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub fn codon(aa: u8) -> &'static [u8; 3] {
    match aa {
        b'A' => b"GCT",
        b'R' => b"CGT",
        b'N' => b"AAC",
        b'D' => b"GAC",
        b'C' => b"TGC",
        b'Q' => b"CAG",
        b'E' => b"GAA",
        b'G' => b"GGT",
        b'H' => b"CAC",
        b'I' => b"ATC",
        b'L' => b"CTG",
        b'K' => b"AAG",
        b'M' => b"ATG",
        b'F' => b"TTC",
        b'P' => b"CCT",
        b'S' => b"TCT",
        b'T' => b"ACC",
        b'W' => b"TGG",
        b'Y' => b"TAC",
        b'V' => b"GTT",
        _ => b"NNN",
    }
}

pub fn back_translate(protein: &[u8]) -> Vec<u8> {
    protein.iter().flat_map(|&aa| *codon(aa)).collect()
}

pub fn random_dna(rng: &mut StdRng, n: usize) -> Vec<u8> {
    (0..n).map(|_| b"ACGT"[rng.gen_range(0..4)]).collect()
}

/// Protein starting with M, no stops
pub fn random_protein(rng: &mut StdRng, n: usize) -> Vec<u8> {
    let mut p = vec![b'M'];
    p.extend((1..n).map(|_| RESIDUES[rng.gen_range(0..RESIDUES.len())]));
    p
}

pub fn revcomp(seq: &[u8]) -> Vec<u8> {
    seq.iter()
        .rev()
        .map(|&c| match c {
            b'A' => b'T',
            b'C' => b'G',
            b'G' => b'C',
            b'T' => b'A',
            other => other,
        })
        .collect()
}

/// Random contig of `len` nt with `insert` written at `pos`
pub fn contig_with(rng: &mut StdRng, len: usize, pos: usize, insert: &[u8]) -> Vec<u8> {
    let mut seq = random_dna(rng, len);
    seq[pos..pos + insert.len()].copy_from_slice(insert);
    seq
}

/// Intron of `len` nt: GT, random body, AG
pub fn intron(rng: &mut StdRng, len: usize) -> Vec<u8> {
    let mut s = b"GT".to_vec();
    s.extend(random_dna(rng, len - 4));
    s.extend_from_slice(b"AG");
    s
}

pub fn build_index(contigs: &[(&str, Vec<u8>)]) -> KmerIndex {
    let mut store = SequenceStore::new();
    for (name, seq) in contigs {
        store.push(name, seq).unwrap();
    }
    KmerIndex::build(store, &IndexOptions::default(), 2).unwrap()
}

/// One-exon gene: 50 residues at nt 100..250 of a 1000 nt contig, followed
/// by a non-stop codon
pub struct SingleExon {
    pub protein: Vec<u8>,
    pub genome: Vec<u8>,
}

pub fn single_exon(seed: u64) -> SingleExon {
    let mut r = rng(seed);
    let protein = random_protein(&mut r, 50);
    let mut cds = back_translate(&protein);
    cds.extend_from_slice(b"GCT");
    let genome = contig_with(&mut r, 1000, 100, &cds);
    SingleExon { protein, genome }
}

/// Two-exon gene with a 500 nt intron. `split` bases of the codon of
/// residue 40 stay before the intron.
pub struct TwoExon {
    pub protein: Vec<u8>,
    pub genome: Vec<u8>,
    /// forward coordinate of the first intron base
    pub donor: usize,
    /// forward coordinate of the last intron base
    pub acceptor: usize,
}

pub fn two_exon(seed: u64, split: usize) -> TwoExon {
    let mut r = rng(seed);
    let protein = random_protein(&mut r, 80);
    let intr = intron(&mut r, 500);
    place_two_exon(&mut r, protein, split, &intr)
}

/// Phase-0 two-exon gene whose residue 39 is Q (CAG) and whose intron ends
/// in CAG, so the last residue of exon 1 also matches just before the
/// acceptor.
pub fn two_exon_repeated_boundary(seed: u64) -> TwoExon {
    let mut r = rng(seed);
    let mut protein = random_protein(&mut r, 80);
    protein[39] = b'Q';
    protein[40] = b'W';
    let mut intr = intron(&mut r, 500);
    intr[497] = b'C';
    place_two_exon(&mut r, protein, 0, &intr)
}

fn place_two_exon(r: &mut StdRng, protein: Vec<u8>, split: usize, intr: &[u8]) -> TwoExon {
    let cds = back_translate(&protein);
    let cut = 40 * 3 + split;
    let mut gene = cds[..cut].to_vec();
    gene.extend_from_slice(intr);
    gene.extend_from_slice(&cds[cut..]);
    gene.extend_from_slice(b"GCT");
    let start = 200;
    let genome = contig_with(r, 1500, start, &gene);
    TwoExon {
        protein,
        genome,
        donor: start + cut,
        acceptor: start + cut + intr.len() - 1,
    }
}
