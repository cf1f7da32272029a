//! Genome sequence storage
//!
//! This module provides the packed 4-bit genome representation, the contig
//! table and the optional per-site splice scores the aligner consults.

pub mod packed;
pub mod splice;
pub mod store;

pub use packed::PackedSeq;
pub use splice::{SpliceSite, SpliceTable};
pub use store::{Contig, SequenceStore};
