//! Turning aligned chains into reported regions

pub mod assemble;
pub mod filter;

pub use assemble::assemble_regions;

use crate::align::{ExtraDetail, Feature};

/// One reported locus of a query
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentRegion {
    pub id: usize,
    /// id of the primary this region is secondary to; `id` if primary
    pub parent: usize,
    pub n_sub: u32,
    pub subsc: i32,
    /// DP score, or the chain score when alignment was skipped
    pub score: i32,
    pub chain_score: i32,
    pub chain_ungapped: i32,
    pub n_anchors: usize,
    pub hash: u32,
    pub cid: u32,
    pub rev: bool,
    pub qs: u32,
    pub qe: u32,
    /// forward-strand span
    pub vs: u64,
    pub ve: u64,
    pub features: Vec<Feature>,
    pub detail: Option<ExtraDetail>,
}

impl AlignmentRegion {
    pub fn is_primary(&self) -> bool {
        self.id == self.parent
    }

    /// Fraction of aligned columns with a positive substitution score
    pub fn similarity(&self) -> f32 {
        match &self.detail {
            Some(d) if d.blen > 0 => d.n_plus as f32 / d.blen as f32,
            _ => 0.0,
        }
    }

    pub fn identity(&self) -> f32 {
        match &self.detail {
            Some(d) if d.blen > 0 => d.n_iden as f32 / d.blen as f32,
            _ => 0.0,
        }
    }

    /// Fraction of the query covered
    pub fn coverage(&self, qlen: usize) -> f32 {
        if qlen == 0 {
            return 0.0;
        }
        (self.qe - self.qs) as f32 / qlen as f32
    }
}
