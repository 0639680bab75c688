//! Integer mixing functions for cache keys and hash-driven sampling

/// `MurmurHash3`-style 64-bit finalizer
///
/// Produces a well-distributed output for sequential inputs, which is what
/// lets hash-based sampling derive pixel positions directly from output
/// indices without coordination between workers.
pub const fn mix64(value: u64) -> u64 {
    let mut x = value;
    x ^= x >> 33;
    x = x.wrapping_mul(0xff51_afd7_ed55_8ccd);
    x ^= x >> 33;
    x = x.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    x ^= x >> 33;
    x
}

/// Combine a value into an accumulated hash state
///
/// Boost-style combiner used to fold heterogeneous fields into a single
/// 64-bit key.
pub const fn combine(state: u64, value: u64) -> u64 {
    mix64(state ^ value.wrapping_add(0x9e37_79b9_7f4a_7c15).wrapping_add(state << 6))
}
