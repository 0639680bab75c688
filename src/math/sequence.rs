//! Low-discrepancy sequence generation for deterministic spatial sampling

/// Radical inverse of `index` in the given base
///
/// Reverses the base-`base` digits of `index` around the radix point,
/// producing a value in [0, 1). The sequence of radical inverses for
/// consecutive indices fills the unit interval with provably even coverage
/// (Van der Corput sequence).
pub fn radical_inverse(base: u32, index: u64) -> f64 {
    let base_f = f64::from(base);
    let inv_base = 1.0 / base_f;
    let mut remaining = index;
    let mut inverse = 0.0_f64;
    let mut scale = inv_base;

    while remaining > 0 {
        let digit = remaining % u64::from(base);
        inverse += digit as f64 * scale;
        remaining /= u64::from(base);
        scale *= inv_base;
    }

    inverse
}
