//! # Action-Selection Policies
//!
//! A [`Policy`] turns the network's output vector into a concrete action.
//!
//! | Policy | Input | Action |
//! |---|---|---|
//! | [`Random`] | ignored | uniform index |
//! | [`EpsGreedy`] | action values | argmax, or uniform with probability epsilon |
//! | [`LinearDecayEpsGreedy`] | action values | as `EpsGreedy`, epsilon refreshed by [`Policy::update`] |
//! | [`StochasticDiscrete`] | logits | categorical sample from the softmax |
//! | [`StochasticContinuous`] | means followed by one raw variance | clipped Gaussian sample |
//!
//! Policies own their random number generator; use `with_seed` for
//! reproducible sampling.
//!
//! ```rust
//! use pallas::policy::{EpsGreedy, Policy};
//! use ndarray::array;
//!
//! let mut greedy = EpsGreedy::with_seed(0.0, 7).unwrap();
//! let action = greedy.select_action(array![0.1f32, 0.9, 0.3].view()).unwrap();
//! assert_eq!(action, 1);
//! ```

pub mod greedy;
pub mod random;
pub mod stochastic;

pub use greedy::{EpsGreedy, LinearDecayEpsGreedy};
pub use random::Random;
pub use stochastic::{StochasticContinuous, StochasticDiscrete};

use ndarray::{Array1, ArrayView1};

use crate::error::{PallasError, Result};

/// Common contract for action selection.
pub trait Policy {
    /// The kind of action this policy produces
    type Action;

    /// Choose an action from the network output.
    fn select_action(&mut self, _action_values: ArrayView1<f32>) -> Result<Self::Action> {
        Err(PallasError::UnimplementedPolicy(self.name().to_string()))
    }

    /// Advance any step-dependent state to the global training step `step`.
    fn update(&mut self, _step: u64) {}

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Index of the largest value; ties go to the lowest index and NaN is skipped.
pub fn argmax(values: ArrayView1<f32>) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &value) in values.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}

/// Action produced by a [`PolicyWrapper`]
#[derive(Clone, Debug, PartialEq)]
pub enum SelectedAction {
    Discrete(usize),
    Continuous(Array1<f32>),
}

impl SelectedAction {
    pub fn discrete(&self) -> Option<usize> {
        match self {
            SelectedAction::Discrete(action) => Some(*action),
            SelectedAction::Continuous(_) => None,
        }
    }

    pub fn continuous(&self) -> Option<&Array1<f32>> {
        match self {
            SelectedAction::Discrete(_) => None,
            SelectedAction::Continuous(action) => Some(action),
        }
    }
}

/// Any of the policies behind one type, for configuration-driven construction.
#[derive(Clone, Debug)]
pub enum PolicyWrapper {
    Random(Random),
    EpsGreedy(EpsGreedy),
    LinearDecayEpsGreedy(LinearDecayEpsGreedy),
    StochasticDiscrete(StochasticDiscrete),
    StochasticContinuous(StochasticContinuous),
}

impl Policy for PolicyWrapper {
    type Action = SelectedAction;

    fn select_action(&mut self, action_values: ArrayView1<f32>) -> Result<SelectedAction> {
        match self {
            PolicyWrapper::Random(policy) => policy.select_action(action_values).map(SelectedAction::Discrete),
            PolicyWrapper::EpsGreedy(policy) => policy.select_action(action_values).map(SelectedAction::Discrete),
            PolicyWrapper::LinearDecayEpsGreedy(policy) => {
                policy.select_action(action_values).map(SelectedAction::Discrete)
            }
            PolicyWrapper::StochasticDiscrete(policy) => {
                policy.select_action(action_values).map(SelectedAction::Discrete)
            }
            PolicyWrapper::StochasticContinuous(policy) => {
                policy.select_action(action_values).map(SelectedAction::Continuous)
            }
        }
    }

    fn update(&mut self, step: u64) {
        match self {
            PolicyWrapper::Random(policy) => policy.update(step),
            PolicyWrapper::EpsGreedy(policy) => policy.update(step),
            PolicyWrapper::LinearDecayEpsGreedy(policy) => policy.update(step),
            PolicyWrapper::StochasticDiscrete(policy) => policy.update(step),
            PolicyWrapper::StochasticContinuous(policy) => policy.update(step),
        }
    }

    fn name(&self) -> &str {
        match self {
            PolicyWrapper::Random(policy) => policy.name(),
            PolicyWrapper::EpsGreedy(policy) => policy.name(),
            PolicyWrapper::LinearDecayEpsGreedy(policy) => policy.name(),
            PolicyWrapper::StochasticDiscrete(policy) => policy.name(),
            PolicyWrapper::StochasticContinuous(policy) => policy.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    struct Unfinished;

    impl Policy for Unfinished {
        type Action = usize;
    }

    #[test]
    fn test_default_select_action_is_unimplemented() {
        let mut policy = Unfinished;
        match policy.select_action(array![1.0f32].view()) {
            Err(PallasError::UnimplementedPolicy(name)) => assert!(name.contains("Unfinished")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_argmax_first_maximum_wins() {
        assert_eq!(argmax(array![1.0f32, 3.0, 3.0, 2.0].view()), Some(1));
        assert_eq!(argmax(array![f32::NAN, -1.0, f32::NAN].view()), Some(1));
        assert_eq!(argmax(array![f32::NAN].view()), None);
        assert_eq!(argmax(Array1::<f32>::zeros(0).view()), None);
    }

    #[test]
    fn test_wrapper_tags_actions() {
        let mut discrete = PolicyWrapper::EpsGreedy(EpsGreedy::with_seed(0.0, 1).unwrap());
        let action = discrete.select_action(array![0.0f32, 2.0].view()).unwrap();
        assert_eq!(action, SelectedAction::Discrete(1));
        assert_eq!(action.discrete(), Some(1));
        assert!(discrete.name().contains("EpsGreedy"));

        let mut continuous = PolicyWrapper::StochasticContinuous(
            StochasticContinuous::with_seed(array![-1.0f32], array![1.0f32], 1).unwrap(),
        );
        let action = continuous.select_action(array![0.0f32, 0.0, 0.0].view()).unwrap();
        assert_eq!(action.continuous().map(|a| a.len()), Some(2));
        assert_eq!(action.discrete(), None);
    }
}
