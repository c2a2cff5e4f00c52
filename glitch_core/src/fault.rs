use rand::Rng;

/// A single bit-level corruption: which byte to hit and which bits to invert.
///
/// A `Fault` is a plain value with no identity beyond its two fields; two
/// faults with equal offset and pattern are interchangeable. Applying the
/// same fault twice returns the targeted byte to its original value, since
/// the pattern is combined into the byte with XOR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fault {
    /// Index of the byte to corrupt. Checked against the target's length at
    /// application time, not at construction time.
    pub offset: usize,
    /// XOR bitmask applied to the byte at `offset`. Any of the 256 byte
    /// values is valid, including `0x00` (a recorded no-op corruption).
    pub pattern: u8,
}

impl Fault {
    pub const BIT0: u8 = 0b0000_0001;
    pub const BIT1: u8 = 0b0000_0010;
    pub const BIT2: u8 = 0b0000_0100;
    pub const BIT3: u8 = 0b0000_1000;
    pub const BIT4: u8 = 0b0001_0000;
    pub const BIT5: u8 = 0b0010_0000;
    pub const BIT6: u8 = 0b0100_0000;
    pub const BIT7: u8 = 0b1000_0000;

    /// Creates a fault that flips the lowest-order bit of the byte at `offset`.
    pub fn new(offset: usize) -> Self {
        Self {
            offset,
            pattern: Self::BIT0,
        }
    }

    /// Creates a fault with an explicit pattern, used verbatim.
    pub fn with_pattern(offset: usize, pattern: u8) -> Self {
        Self { offset, pattern }
    }

    /// Draws a fault with a uniformly random offset in `[0, len)` and exactly
    /// one uniformly chosen bit set in the pattern.
    ///
    /// # Arguments
    /// * `len`: Length of the target the fault is destined for. Must be
    ///   non-zero; callers guard the empty case before drawing.
    /// * `rng`: The random number generator making both choices.
    ///
    /// # Panics
    /// Panics if `len` is zero, since no valid offset exists.
    pub fn random<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Self {
        Self {
            offset: rng.random_range(0..len),
            pattern: 1u8 << rng.random_range(0..8),
        }
    }
}
