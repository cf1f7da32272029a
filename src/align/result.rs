use super::ops::{cigar_string, Op};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Cds,
    Stop,
}

/// One exon (or the stop codon following the last exon)
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub kind: FeatureKind,
    /// forward-strand span `[vs, ve)`
    pub vs: u64,
    pub ve: u64,
    /// query span `[qs, qe)`; a codon split by an intron counts in the
    /// exon that completes it
    pub qs: u32,
    pub qe: u32,
    /// bases to skip at the 5' end of the exon to reach a codon start
    pub phase: u8,
    pub n_fs: u32,
    pub n_stop: u32,
    pub score: i32,
    pub n_iden: u32,
    pub n_plus: u32,
    pub blen: u32,
    /// first two intron bases after this exon
    pub donor: Option<[u8; 2]>,
    /// last two intron bases before this exon
    pub acceptor: Option<[u8; 2]>,
    /// splice signal score charged at the donor
    pub donor_score: i32,
    pub acceptor_score: i32,
}

impl Feature {
    pub fn new(kind: FeatureKind) -> Self {
        Feature {
            kind,
            vs: 0,
            ve: 0,
            qs: 0,
            qe: 0,
            phase: 0,
            n_fs: 0,
            n_stop: 0,
            score: 0,
            n_iden: 0,
            n_plus: 0,
            blen: 0,
            donor: None,
            acceptor: None,
            donor_score: 0,
            acceptor_score: 0,
        }
    }

    pub fn qlen(&self) -> u32 {
        self.qe - self.qs
    }

    pub fn donor_str(&self) -> Option<String> {
        self.donor.map(|d| String::from_utf8_lossy(&d).into_owned())
    }

    pub fn acceptor_str(&self) -> Option<String> {
        self.acceptor.map(|a| String::from_utf8_lossy(&a).into_owned())
    }
}

/// Full alignment trace with aggregate counts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtraDetail {
    ops: Vec<Op>,
    /// end cell score, including the end bonus when the query end is reached
    pub dp_score: i32,
    /// best cell score anywhere in the band
    pub dp_max: i32,
    /// best end score outside the reported target span
    pub dp_max2: i32,
    pub n_fs: u32,
    pub n_stop: u32,
    /// nt from the alignment end to the next in-frame stop
    pub dist_stop: Option<u32>,
    /// nt from the nearest upstream in-frame ATG to the alignment start
    pub dist_start: Option<u32>,
    pub n_iden: u32,
    pub n_plus: u32,
    pub blen: u32,
    /// aligned genome translation, when requested
    pub translation: Option<String>,
}

impl ExtraDetail {
    pub fn new(ops: Vec<Op>) -> Self {
        ExtraDetail {
            ops,
            ..ExtraDetail::default()
        }
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn n_ops(&self) -> usize {
        self.ops.len()
    }

    pub fn cigar(&self) -> String {
        cigar_string(&self.ops)
    }

    pub fn n_introns(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op.kind, super::ops::OpKind::Intron { .. }))
            .count()
    }
}
