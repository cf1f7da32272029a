//! 4-bit packed nucleotide sequence
//!
//! Two bases per byte, low nibble first. Each nibble is an IUPAC bitmask as
//! produced by [`crate::utils::alphabet::nt_to_nt4`].

use crate::utils::alphabet::{nt4_to_nt2, nt_to_nt4, NT4_N};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PackedSeq {
    data: Vec<u8>,
    len: u64,
}

impl PackedSeq {
    pub fn new() -> Self {
        PackedSeq::default()
    }

    pub fn with_capacity(bases: usize) -> Self {
        PackedSeq {
            data: Vec::with_capacity(bases.div_ceil(2)),
            len: 0,
        }
    }

    /// Rebuild from raw bytes as written by [`PackedSeq::as_bytes`].
    pub fn from_raw(data: Vec<u8>, len: u64) -> Option<Self> {
        if data.len() as u64 != len.div_ceil(2) {
            return None;
        }
        Some(PackedSeq { data, len })
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn push_nt4(&mut self, mask: u8) {
        let mask = mask & 0xf;
        if self.len & 1 == 0 {
            self.data.push(mask);
        } else if let Some(last) = self.data.last_mut() {
            *last |= mask << 4;
        }
        self.len += 1;
    }

    /// Append ASCII bases; anything unrecognised is stored as N.
    pub fn extend_ascii(&mut self, seq: &[u8]) {
        self.data.reserve((seq.len() + 1) / 2);
        for &c in seq {
            self.push_nt4(nt_to_nt4(c));
        }
    }

    /// 4-bit mask at `pos`; N past the end
    #[inline(always)]
    pub fn get(&self, pos: u64) -> u8 {
        if pos >= self.len {
            return NT4_N;
        }
        (self.data[(pos >> 1) as usize] >> ((pos & 1) << 2)) & 0xf
    }

    /// 2-bit code at `pos`
    #[inline(always)]
    pub fn get_nt2(&self, pos: u64) -> u8 {
        nt4_to_nt2(self.get(pos))
    }

    pub fn heap_bytes(&self) -> usize {
        self.data.capacity()
    }
}
