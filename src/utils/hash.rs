//! Integer and string hashes

/// Invertible integer hash restricted to `mask` bits.
#[inline(always)]
pub fn hash64(key: u64, mask: u64) -> u64 {
    let mut key = (!key).wrapping_add(key << 21) & mask;
    key ^= key >> 24;
    key = key.wrapping_add(key << 3).wrapping_add(key << 8) & mask;
    key ^= key >> 14;
    key = key.wrapping_add(key << 2).wrapping_add(key << 4) & mask;
    key ^= key >> 28;
    key = key.wrapping_add(key << 31) & mask;
    key
}

/// Thomas Wang's 32-bit mix
#[inline(always)]
pub fn hash32(mut key: u32) -> u32 {
    key = key.wrapping_add(!(key << 15));
    key ^= key >> 10;
    key = key.wrapping_add(key << 3);
    key ^= key >> 6;
    key = key.wrapping_add(!(key << 11));
    key ^= key >> 16;
    key
}

/// X31 string hash
pub fn hash_str(s: &str) -> u32 {
    s.bytes()
        .fold(0u32, |h, c| (h << 5).wrapping_sub(h).wrapping_add(c as u32))
}
