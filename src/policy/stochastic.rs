use ndarray::{Array1, ArrayView1};
use rand::distributions::WeightedIndex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;

use crate::activations::stable::{softmax, softplus};
use crate::error::{PallasError, Result};
use super::Policy;

/// Samples a discrete action from the softmax of the logits.
#[derive(Clone, Debug)]
pub struct StochasticDiscrete {
    rng: StdRng,
}

impl StochasticDiscrete {
    pub fn new() -> Self {
        StochasticDiscrete { rng: StdRng::from_entropy() }
    }

    pub fn with_seed(seed: u64) -> Self {
        StochasticDiscrete { rng: StdRng::seed_from_u64(seed) }
    }

    /// Action probabilities for `logits`, normalized through log-sum-exp.
    pub fn probabilities(&self, logits: ArrayView1<f32>) -> Result<Array1<f32>> {
        if logits.is_empty() {
            return Err(PallasError::dimension_mismatch("at least one logit", "none"));
        }
        let probs = softmax(logits);
        if probs.iter().any(|p| !p.is_finite()) {
            return Err(PallasError::NumericalError(format!("logits {} give no distribution", logits)));
        }
        Ok(probs)
    }
}

impl Default for StochasticDiscrete {
    fn default() -> Self {
        Self::new()
    }
}

impl Policy for StochasticDiscrete {
    type Action = usize;

    fn select_action(&mut self, logits: ArrayView1<f32>) -> Result<usize> {
        let probs = self.probabilities(logits)?;
        let categorical = WeightedIndex::new(probs.iter())
            .map_err(|e| PallasError::NumericalError(e.to_string()))?;
        Ok(self.rng.sample(categorical))
    }

    fn name(&self) -> &str {
        "StochasticDiscrete"
    }
}

/// Gaussian policy over a continuous action box.
///
/// The network output holds the mean of every action coordinate followed by
/// one raw variance parameter shared by all coordinates. The variance is
/// `softplus(raw)`, each coordinate is sampled independently and then clipped
/// into `[low, high]`. Bounds of length 1 apply to every coordinate.
#[derive(Clone, Debug)]
pub struct StochasticContinuous {
    low: Array1<f32>,
    high: Array1<f32>,
    rng: StdRng,
}

impl StochasticContinuous {
    pub fn new(low: Array1<f32>, high: Array1<f32>) -> Result<Self> {
        Self::with_rng(low, high, StdRng::from_entropy())
    }

    pub fn with_seed(low: Array1<f32>, high: Array1<f32>, seed: u64) -> Result<Self> {
        Self::with_rng(low, high, StdRng::seed_from_u64(seed))
    }

    fn with_rng(low: Array1<f32>, high: Array1<f32>, rng: StdRng) -> Result<Self> {
        if low.is_empty() || high.is_empty() {
            return Err(PallasError::configuration("bounds", "low and high must not be empty"));
        }
        let dims = low.len().max(high.len());
        if (low.len() != dims && low.len() != 1) || (high.len() != dims && high.len() != 1) {
            return Err(PallasError::configuration(
                "bounds".to_string(),
                format!("low has {} entries but high has {}", low.len(), high.len()),
            ));
        }
        let policy = StochasticContinuous { low, high, rng };
        for i in 0..dims {
            let (lo, hi) = policy.bounds_at(i);
            if !(lo <= hi) {
                return Err(PallasError::configuration(
                    "bounds".to_string(),
                    format!("low {} exceeds high {} at coordinate {}", lo, hi, i),
                ));
            }
        }
        Ok(policy)
    }

    pub fn low(&self) -> &Array1<f32> {
        &self.low
    }

    pub fn high(&self) -> &Array1<f32> {
        &self.high
    }

    fn bounds_at(&self, i: usize) -> (f32, f32) {
        let pick = |bounds: &Array1<f32>| if bounds.len() == 1 { bounds[0] } else { bounds[i] };
        (pick(&self.low), pick(&self.high))
    }

    fn check_action_dim(&self, dims: usize) -> Result<()> {
        for bounds in [&self.low, &self.high] {
            if bounds.len() != 1 && bounds.len() != dims {
                return Err(PallasError::dimension_mismatch(
                    format!("{} action coordinates", bounds.len()),
                    format!("{} means", dims),
                ));
            }
        }
        Ok(())
    }
}

impl Policy for StochasticContinuous {
    type Action = Array1<f32>;

    fn select_action(&mut self, action_values: ArrayView1<f32>) -> Result<Array1<f32>> {
        let dims = action_values.len().saturating_sub(1);
        if dims == 0 {
            return Err(PallasError::dimension_mismatch(
                "at least one mean and a variance".to_string(),
                format!("{} values", action_values.len()),
            ));
        }
        self.check_action_dim(dims)?;

        if let Some(i) = action_values.iter().position(|v| !v.is_finite()) {
            return Err(PallasError::NumericalError(format!(
                "non-finite {} at index {}: {}",
                if i == dims { "variance parameter" } else { "mean" },
                i,
                action_values[i]
            )));
        }

        let variance = softplus(action_values[dims]);
        let noise = Normal::new(0.0f32, variance.sqrt())
            .map_err(|e| PallasError::NumericalError(e.to_string()))?;

        let mut action = Array1::zeros(dims);
        for (i, (coordinate, &mean)) in action.iter_mut().zip(action_values.iter()).enumerate() {
            let (lo, hi) = self.bounds_at(i);
            let sample: f32 = mean + self.rng.sample(noise);
            *coordinate = sample.max(lo).min(hi);
        }
        Ok(action)
    }

    fn name(&self) -> &str {
        "StochasticContinuous"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_probabilities_handle_large_logits() {
        let policy = StochasticDiscrete::with_seed(0);
        let probs = policy.probabilities(array![1000.0f32, 1000.0, -1000.0].view()).unwrap();
        assert!((probs[0] - 0.5).abs() < 1e-6);
        assert!((probs[1] - 0.5).abs() < 1e-6);
        assert!(probs[2] >= 0.0 && probs[2] < 1e-6);
    }

    #[test]
    fn test_discrete_sampling_follows_probabilities() {
        let mut policy = StochasticDiscrete::with_seed(5);
        // second action carries essentially all the mass
        let logits = array![-30.0f32, 30.0, -30.0];
        for _ in 0..100 {
            assert_eq!(policy.select_action(logits.view()).unwrap(), 1);
        }

        let uniform = array![0.0f32, 0.0];
        let ones = (0..400)
            .filter(|_| policy.select_action(uniform.view()).unwrap() == 1)
            .count();
        assert!(ones > 100 && ones < 300);
    }

    #[test]
    fn test_discrete_rejects_degenerate_logits() {
        let mut policy = StochasticDiscrete::with_seed(0);
        assert!(policy.select_action(array![f32::NAN, 1.0].view()).is_err());
        assert!(policy.select_action(ndarray::Array1::zeros(0).view()).is_err());
    }

    #[test]
    fn test_continuous_rejects_degenerate_parameters() {
        let mut policy = StochasticContinuous::with_seed(array![-1.0f32], array![1.0f32], 0).unwrap();
        assert!(matches!(
            policy.select_action(array![f32::NAN, 0.0].view()),
            Err(PallasError::NumericalError(_))
        ));
        assert!(matches!(
            policy.select_action(array![0.3f32, f32::NAN].view()),
            Err(PallasError::NumericalError(_))
        ));
        assert!(matches!(
            policy.select_action(array![0.3f32, f32::INFINITY].view()),
            Err(PallasError::NumericalError(_))
        ));
        assert!(policy.select_action(array![0.3f32, 0.0].view()).is_ok());
    }

    #[test]
    fn test_continuous_clips_into_bounds() {
        let mut policy = StochasticContinuous::with_seed(array![-1.0f32], array![1.0f32], 9).unwrap();
        // huge means and variance push samples far outside the box
        let values = array![50.0f32, -50.0, 0.0, 40.0];
        for _ in 0..100 {
            let action = policy.select_action(values.view()).unwrap();
            assert_eq!(action.len(), 3);
            assert!(action.iter().all(|&a| (-1.0..=1.0).contains(&a)));
        }
    }

    #[test]
    fn test_continuous_per_coordinate_bounds() {
        let low = array![0.0f32, -2.0];
        let high = array![0.5f32, -1.0];
        let mut policy = StochasticContinuous::with_seed(low, high, 4).unwrap();
        let action = policy.select_action(array![10.0f32, 10.0, 0.0].view()).unwrap();
        assert_eq!(action, array![0.5f32, -1.0]);

        // bounds describe two coordinates, output carries three means
        assert!(policy.select_action(array![0.0f32, 0.0, 0.0, 0.0].view()).is_err());
    }

    #[test]
    fn test_continuous_tiny_variance_stays_near_mean() {
        let mut policy = StochasticContinuous::with_seed(array![-10.0f32], array![10.0f32], 2).unwrap();
        let action = policy.select_action(array![0.25f32, -50.0].view()).unwrap();
        assert!((action[0] - 0.25).abs() < 1e-3);
    }

    #[test]
    fn test_continuous_bound_validation() {
        assert!(StochasticContinuous::new(array![1.0f32], array![-1.0f32]).is_err());
        assert!(StochasticContinuous::new(array![0.0f32, 0.0], array![1.0f32, 1.0, 1.0]).is_err());
        assert!(StochasticContinuous::new(ndarray::Array1::zeros(0), array![1.0f32]).is_err());
        assert!(StochasticContinuous::new(array![-1.0f32], array![1.0f32, 2.0]).is_ok());

        let mut policy = StochasticContinuous::new(array![-1.0f32], array![1.0f32]).unwrap();
        assert!(policy.select_action(array![0.0f32].view()).is_err());
    }
}
