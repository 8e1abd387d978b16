//! Random number helpers.
//!
//! Every stochastic decision in the simulation goes through these helpers so
//! a stubbed generator pins every roll at once.

use rand::{Error, Rng, RngCore};

/// Uniform draw in `[0, 1)`.
pub fn unit<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen::<f64>()
}

/// Uniform draw in `[min, max)`.
pub fn range<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    min + unit(rng) * (max - min)
}

/// Uniform draw from a `[min, max]` pair, tolerating an inverted pair.
pub fn range_of<R: Rng + ?Sized>(rng: &mut R, bounds: [f64; 2]) -> f64 {
    let low = bounds[0].min(bounds[1]);
    let high = bounds[0].max(bounds[1]);
    range(rng, low, high)
}

/// Uniform integer in `[lo, hi]`.
pub fn int_inclusive<R: Rng + ?Sized>(rng: &mut R, lo: i64, hi: i64) -> i64 {
    let low = lo.min(hi);
    let high = lo.max(hi);
    (range(rng, low as f64, (high + 1) as f64).floor() as i64).min(high)
}

/// `true` with probability `p`.
pub fn chance<R: Rng + ?Sized>(rng: &mut R, p: f64) -> bool {
    unit(rng) < p
}

/// Uniform index into a collection of `len` items. `len` must be non-zero.
pub fn pick_index<R: Rng + ?Sized>(rng: &mut R, len: usize) -> usize {
    ((unit(rng) * len as f64).floor() as usize).min(len.saturating_sub(1))
}

/// Fisher-Yates shuffle driven by [`unit`].
pub fn shuffle<T, R: Rng + ?Sized>(rng: &mut R, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = pick_index(rng, i + 1);
        items.swap(i, j);
    }
}

/// A generator that returns the same value from every `gen::<f64>()` call.
///
/// Useful for pinning stochastic gates to their minimum (`0.0`) or maximum
/// (just below `1.0`).
#[derive(Debug, Clone, Copy)]
pub struct FixedRng {
    bits: u64,
}

impl FixedRng {
    #[must_use]
    pub fn new(value: f64) -> Self {
        let clamped = value.clamp(0.0, 1.0 - f64::EPSILON);
        let mantissa = (clamped * (1u64 << 53) as f64) as u64;
        Self {
            bits: mantissa << 11,
        }
    }
}

impl RngCore for FixedRng {
    fn next_u32(&mut self) -> u32 {
        (self.bits >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.bits
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.bits.to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_fixed_rng_pins_unit() {
        let mut low = FixedRng::new(0.0);
        assert_eq!(unit(&mut low), 0.0);
        let mut mid = FixedRng::new(0.5);
        assert_eq!(unit(&mut mid), 0.5);
        let mut high = FixedRng::new(0.999999);
        assert!((unit(&mut high) - 0.999999).abs() < 1e-12);
    }

    #[test]
    fn test_int_inclusive_extremes() {
        assert_eq!(int_inclusive(&mut FixedRng::new(0.0), 2, 4), 2);
        assert_eq!(int_inclusive(&mut FixedRng::new(0.999999), 2, 4), 4);
        assert_eq!(int_inclusive(&mut FixedRng::new(0.5), 4, 2), 3);
    }

    #[test]
    fn test_pick_index_stays_in_bounds() {
        assert_eq!(pick_index(&mut FixedRng::new(0.999999), 3), 2);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            assert!(pick_index(&mut rng, 5) < 5);
        }
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut items: Vec<u32> = (0..10).collect();
        shuffle(&mut rng, &mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_range_of_handles_inverted_pair() {
        let v = range_of(&mut FixedRng::new(0.0), [10.0, 4.0]);
        assert_eq!(v, 4.0);
    }
}
