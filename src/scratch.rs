//! Per-worker scratch arena
//!
//! Every buffer one mapping call needs lives here so a worker thread can map
//! query after query without reallocating. A scratch is owned by exactly one
//! worker; `reset` keeps capacity.

use crate::align::AlignBuffers;
use crate::chain::dp::ChainBuffers;
use crate::seed::{Anchor, RefineBuffers};

#[derive(Debug, Default)]
pub struct ThreadScratch {
    /// query residue codes
    pub(crate) qcodes: Vec<u8>,
    /// query in the reduced alphabet
    pub(crate) qred: Vec<u8>,
    pub(crate) anchors: Vec<Anchor>,
    pub(crate) chain: ChainBuffers,
    pub(crate) refine: RefineBuffers,
    pub(crate) align: AlignBuffers,
}

impl ThreadScratch {
    pub fn new() -> Self {
        ThreadScratch::default()
    }

    /// Forget the previous query's data, keeping the allocations
    pub fn reset(&mut self) {
        self.qcodes.clear();
        self.qred.clear();
        self.anchors.clear();
        self.chain.clear();
        self.refine.clear();
        self.align.clear();
    }

    /// Bytes currently reserved by all buffers
    pub fn capacity_bytes(&self) -> usize {
        self.qcodes.capacity()
            + self.qred.capacity()
            + self.anchors.capacity() * std::mem::size_of::<Anchor>()
            + self.chain.capacity_bytes()
            + self.refine.capacity_bytes()
            + self.align.capacity_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_keeps_capacity() {
        let mut s = ThreadScratch::new();
        s.qcodes.extend_from_slice(&[1, 2, 3]);
        s.anchors.reserve(100);
        let before = s.capacity_bytes();
        s.reset();
        assert!(s.qcodes.is_empty());
        assert_eq!(s.capacity_bytes(), before);
    }
}
