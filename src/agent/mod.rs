//! # Agent Module
//!
//! Glue between a [`QNetwork`] and a [`Policy`].
//!
//! ## Core Concepts
//!
//! - **Decision step**: the observation is evaluated by the network and the
//!   resulting vector is handed to the policy
//! - **Training step**: the global step counter is forwarded to the policy so
//!   decaying policies can refresh their exploration rate
//! - **Action value**: the value of a taken action, read through a one-hot mask
//!
//! Each worker owns its own agent; nothing is shared between agents.
//!
//! ## Example Usage
//!
//! ```rust
//! use pallas::agent::QAgent;
//! use pallas::network::build_network;
//! use pallas::policy::LinearDecayEpsGreedy;
//! use ndarray::Array3;
//!
//! let network = build_network((36, 36, 2), 4, "dqn", 16).unwrap();
//! let policy = LinearDecayEpsGreedy::with_seed(1.0, 0.0, 100, 42).unwrap();
//! let mut agent = QAgent::new(network, policy);
//!
//! agent.on_train_step(100);
//! let observation = Array3::<f32>::zeros((36, 36, 2));
//! let action = agent.act(observation.view()).unwrap();
//! assert!(action < 4);
//! ```

use ndarray::ArrayView3;

use crate::error::Result;
use crate::network::{one_hot, QNetwork};
use crate::policy::Policy;

/// A network paired with the policy that acts on its output
#[derive(Clone, Debug)]
pub struct QAgent<P: Policy> {
    network: QNetwork,
    policy: P,
}

impl<P: Policy> QAgent<P> {
    pub fn new(network: QNetwork, policy: P) -> Self {
        QAgent { network, policy }
    }

    pub fn network(&self) -> &QNetwork {
        &self.network
    }

    /// Mutable access for loading or updating weights
    pub fn network_mut(&mut self) -> &mut QNetwork {
        &mut self.network
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Evaluate the observation and let the policy pick an action
    pub fn act(&mut self, observation: ArrayView3<f32>) -> Result<P::Action> {
        let action_values = self.network.evaluate(observation)?;
        let action = self.policy.select_action(action_values.view())?;
        log::trace!("{} selected from {}", self.policy.name(), action_values);
        Ok(action)
    }

    /// Notify the policy of the global training step
    pub fn on_train_step(&mut self, step: u64) {
        self.policy.update(step);
    }

    /// Value the network assigns to taking `action` in `observation`
    pub fn action_value(&self, observation: ArrayView3<f32>, action: usize) -> Result<f32> {
        let mask = one_hot(action, self.network.num_actions())?;
        let (value, _) = self.network.train_step_value(observation, mask.view())?;
        Ok(value)
    }
}
