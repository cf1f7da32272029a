//! Seeding: index anchors and gap re-seeding

pub mod anchor;
pub mod refine;

pub use anchor::{collect_anchors, Anchor, AnchorReport};
pub use refine::{refine_chain, RefineBuffers, RefineParams};
