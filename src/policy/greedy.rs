use ndarray::ArrayView1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{PallasError, Result};
use super::{argmax, Policy};

fn check_epsilon(name: &str, epsilon: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&epsilon) {
        return Err(PallasError::configuration(
            name.to_string(),
            format!("{} is not a probability in [0, 1]", epsilon),
        ));
    }
    Ok(())
}

/// Epsilon-greedy selection over discrete action values.
///
/// With probability `epsilon` a uniformly random action is returned,
/// otherwise the argmax. `epsilon = 0` is a purely greedy policy.
#[derive(Clone, Debug)]
pub struct EpsGreedy {
    epsilon: f32,
    rng: StdRng,
}

impl EpsGreedy {
    pub fn new(epsilon: f32) -> Result<Self> {
        Self::with_rng(epsilon, StdRng::from_entropy())
    }

    pub fn with_seed(epsilon: f32, seed: u64) -> Result<Self> {
        Self::with_rng(epsilon, StdRng::seed_from_u64(seed))
    }

    fn with_rng(epsilon: f32, rng: StdRng) -> Result<Self> {
        check_epsilon("epsilon", epsilon)?;
        Ok(EpsGreedy { epsilon, rng })
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }
}

impl Policy for EpsGreedy {
    type Action = usize;

    fn select_action(&mut self, action_values: ArrayView1<f32>) -> Result<usize> {
        let num_actions = action_values.len();
        if num_actions == 0 {
            return Err(PallasError::dimension_mismatch("at least one action value", "none"));
        }

        if self.rng.gen::<f32>() < self.epsilon {
            Ok(self.rng.gen_range(0..num_actions))
        } else {
            argmax(action_values)
                .ok_or_else(|| PallasError::NumericalError("all action values are NaN".to_string()))
        }
    }

    fn name(&self) -> &str {
        "EpsGreedy"
    }
}

/// Epsilon-greedy with epsilon interpolated linearly from `start_eps` to
/// `end_eps` over `decay_steps` training steps, then held at `end_eps`.
///
/// Epsilon only changes through [`Policy::update`].
#[derive(Clone, Debug)]
pub struct LinearDecayEpsGreedy {
    greedy: EpsGreedy,
    start_eps: f32,
    end_eps: f32,
    decay_steps: u64,
}

impl LinearDecayEpsGreedy {
    pub fn new(start_eps: f32, end_eps: f32, decay_steps: u64) -> Result<Self> {
        Self::with_greedy(start_eps, end_eps, decay_steps, EpsGreedy::new(start_eps))
    }

    pub fn with_seed(start_eps: f32, end_eps: f32, decay_steps: u64, seed: u64) -> Result<Self> {
        Self::with_greedy(start_eps, end_eps, decay_steps, EpsGreedy::with_seed(start_eps, seed))
    }

    fn with_greedy(
        start_eps: f32,
        end_eps: f32,
        decay_steps: u64,
        greedy: Result<EpsGreedy>,
    ) -> Result<Self> {
        check_epsilon("start_eps", start_eps)?;
        check_epsilon("end_eps", end_eps)?;
        if decay_steps == 0 {
            return Err(PallasError::configuration("decay_steps", "decay_steps must be positive"));
        }

        let mut policy = LinearDecayEpsGreedy {
            greedy: greedy?,
            start_eps,
            end_eps,
            decay_steps,
        };
        policy.update(0);
        Ok(policy)
    }

    pub fn epsilon(&self) -> f32 {
        self.greedy.epsilon
    }

    pub fn start_eps(&self) -> f32 {
        self.start_eps
    }

    pub fn end_eps(&self) -> f32 {
        self.end_eps
    }

    pub fn decay_steps(&self) -> u64 {
        self.decay_steps
    }
}

impl Policy for LinearDecayEpsGreedy {
    type Action = usize;

    fn select_action(&mut self, action_values: ArrayView1<f32>) -> Result<usize> {
        self.greedy.select_action(action_values)
    }

    fn update(&mut self, step: u64) {
        let weight_end = (step as f64 / self.decay_steps as f64).min(1.0);
        let weight_start = 1.0 - weight_end;
        let epsilon = self.start_eps as f64 * weight_start + self.end_eps as f64 * weight_end;
        self.greedy.epsilon = epsilon as f32;
        log::trace!("step {}: epsilon = {}", step, self.greedy.epsilon);
    }

    fn name(&self) -> &str {
        "LinearDecayEpsGreedy"
    }
}
