use ndarray::ArrayView1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{PallasError, Result};
use super::Policy;

/// Uniformly random discrete actions; the network output is ignored.
#[derive(Clone, Debug)]
pub struct Random {
    num_actions: usize,
    rng: StdRng,
}

impl Random {
    pub fn new(num_actions: usize) -> Result<Self> {
        Self::with_rng(num_actions, StdRng::from_entropy())
    }

    pub fn with_seed(num_actions: usize, seed: u64) -> Result<Self> {
        Self::with_rng(num_actions, StdRng::seed_from_u64(seed))
    }

    fn with_rng(num_actions: usize, rng: StdRng) -> Result<Self> {
        if num_actions == 0 {
            return Err(PallasError::configuration("num_actions", "Random needs at least one action"));
        }
        Ok(Random { num_actions, rng })
    }

    pub fn num_actions(&self) -> usize {
        self.num_actions
    }

    /// Draw an action in `[0, num_actions)`
    pub fn sample(&mut self) -> usize {
        self.rng.gen_range(0..self.num_actions)
    }
}

impl Policy for Random {
    type Action = usize;

    fn select_action(&mut self, _action_values: ArrayView1<f32>) -> Result<usize> {
        Ok(self.sample())
    }

    fn name(&self) -> &str {
        "Random"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;

    #[test]
    fn test_random_requires_an_action() {
        assert!(matches!(Random::new(0), Err(PallasError::Configuration { .. })));
    }

    #[test]
    fn test_random_covers_range() {
        let mut policy = Random::with_seed(4, 11).unwrap();
        let mut seen = [false; 4];
        for _ in 0..200 {
            let action = policy.select_action(Array1::zeros(0).view()).unwrap();
            assert!(action < 4);
            seen[action] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_single_action() {
        let mut policy = Random::new(1).unwrap();
        assert_eq!(policy.sample(), 0);
    }
}
