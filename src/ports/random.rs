use rand::Rng;

/// Picks indices into fixed, non-empty lists.
#[cfg_attr(test, mockall::automock)]
pub trait RandomSource: Send + Sync {
    /// Returns an index in `0..len`, uniformly distributed. `len == 0` yields 0.
    fn pick_index(&self, len: usize) -> usize;
}

/// Thread-local RNG from `rand`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick_index(&self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        rand::rng().random_range(0..len)
    }
}

/// Always picks the same index (wrapped into range).
#[derive(Debug, Clone, Copy)]
pub struct FixedIndex(pub usize);

impl RandomSource for FixedIndex {
    fn pick_index(&self, len: usize) -> usize {
        if len == 0 { 0 } else { self.0 % len }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_random_stays_in_range() {
        for _ in 0..500 {
            assert!(ThreadRandom.pick_index(5) < 5);
        }
        assert_eq!(ThreadRandom.pick_index(1), 0);
        assert_eq!(ThreadRandom.pick_index(0), 0);
    }

    #[test]
    fn test_fixed_index_wraps() {
        assert_eq!(FixedIndex(3).pick_index(5), 3);
        assert_eq!(FixedIndex(7).pick_index(5), 2);
        assert_eq!(FixedIndex(7).pick_index(0), 0);
    }
}
