//! Powers-of-tau sizing.

/// Smallest exponent served by the public ceremony mirrors; tiny circuits
/// are floored to this.
pub const MIN_POT: u32 = 2;

/// Largest exponent available from the Hermez ceremony files.
pub const MAX_POT: u32 = 28;

/// Smallest exponent `n` such that `2^n >= constraints`, floored at
/// [`MIN_POT`] for degenerate circuits.
///
/// Pure and monotonically non-decreasing in `constraints`.
pub fn estimate_pot(constraints: u64) -> u32 {
    if constraints <= 1 {
        return MIN_POT;
    }
    // ceil(log2(c)) via the bit length of c - 1.
    let exponent = u64::BITS - (constraints - 1).leading_zeros();
    exponent.max(MIN_POT)
}
