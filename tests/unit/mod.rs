//! Unit test infrastructure for protomap
//!
//! Tests are organized by stage:
//! - `index` - index build, lookup and persistence
//! - `mapping` - end-to-end mapping of synthetic genes
//! - `report` - output lines
//! - `diagnostics` - pipeline counters

pub mod diagnostics;
pub mod helpers;
pub mod index;
pub mod mapping;
pub mod report;
