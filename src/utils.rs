//! Utility functions for the qbattle crate

use rand::{SeedableRng, rngs::StdRng};

/// Build a generator from an optional seed, falling back to OS entropy.
pub fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// `count / total`, or 0 when `total` is 0.
///
/// # Examples
///
/// ```
/// use qbattle::utils::rate;
///
/// assert_eq!(rate(1, 4), 0.25);
/// assert_eq!(rate(3, 0), 0.0);
/// ```
pub fn rate(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let mut a = build_rng(Some(11));
        let mut b = build_rng(Some(11));
        for _ in 0..10 {
            assert_eq!(a.random::<u64>(), b.random::<u64>());
        }
    }
}
