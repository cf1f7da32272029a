//! Splice-aware protein-to-genome mapping
//!
//! A genome is translated in six frames and indexed by reduced-alphabet
//! k-mers. Each query protein is seeded against the index, its anchors are
//! chained across introns, and every chain is aligned with a banded DP that
//! models introns in all three phases, frameshifts and in-frame stops.

pub mod align;
pub mod chain;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod index;
pub mod mapper;
pub mod post;
pub mod report;
pub mod scratch;
pub mod seed;
pub mod sequence;
pub mod utils;

pub use config::{IndexOptions, MapFlags, MapOptions, SpliceModel};
pub use error::{Degradation, MapError, MapResult};
pub use index::KmerIndex;
pub use mapper::{map, map_batch, MapOutput, QueryStats};
pub use post::AlignmentRegion;
pub use scratch::ThreadScratch;
pub use sequence::SequenceStore;
