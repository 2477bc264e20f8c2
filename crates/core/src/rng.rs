use rand::{rngs::StdRng, Rng, SeedableRng};

#[derive(Debug, Clone)]
pub struct RngState {
    seed: u64,
    rng: StdRng,
}

impl RngState {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draws a seed from the OS so the run can still be reported and replayed.
    pub fn from_entropy() -> Self {
        Self::from_seed(rand::random())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform index in `0..bound`. `bound` must be non-zero.
    pub fn next_index(&mut self, bound: usize) -> usize {
        self.rng.gen_range(0..bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = RngState::from_seed(7);
        let mut b = RngState::from_seed(7);
        for _ in 0..16 {
            assert_eq!(a.next_index(9), b.next_index(9));
        }
    }

    #[test]
    fn indices_stay_in_bounds() {
        let mut rng = RngState::from_seed(99);
        for _ in 0..256 {
            assert!(rng.next_index(4) < 4);
        }
        assert_eq!(rng.seed(), 99);
    }
}
