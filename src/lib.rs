//! # Pallas - Q-Networks and Action-Selection Policies
//!
//! Pallas builds the value-function approximators and action-selection
//! strategies of a reinforcement-learning agent that sees image observations.
//!
//! ## Key Features
//!
//! - **Q-Networks**: convolutional feature extraction, optional recurrent
//!   (frames-as-time) processing with dense, LSTM or GRU trunks, plain or
//!   dueling output heads, all selected from a compact architecture name
//! - **Masked training output**: the value of a chosen action through a
//!   one-hot mask, next to the full action-value vector
//! - **Policies**: random, epsilon-greedy, linearly decaying epsilon-greedy,
//!   softmax sampling and clipped Gaussian sampling
//! - **Numerics**: log-sum-exp softmax and a strictly positive softplus
//!
//! ## Quick Start
//!
//! ```rust
//! use pallas::network::{build_network, one_hot};
//! use pallas::policy::{EpsGreedy, Policy};
//! use ndarray::Array3;
//!
//! let network = build_network((84, 84, 4), 6, "dueling_dqn", 64).unwrap();
//! let observation = Array3::<f32>::zeros((84, 84, 4));
//!
//! // Decision step
//! let q_values = network.evaluate(observation.view()).unwrap();
//! let mut policy = EpsGreedy::new(0.05).unwrap();
//! let action = policy.select_action(q_values.view()).unwrap();
//!
//! // Training step: value of the taken action
//! let mask = one_hot(action, 6).unwrap();
//! let (value, _) = network.train_step_value(observation.view(), mask.view()).unwrap();
//! assert!((value - q_values[action]).abs() < 1e-5);
//! ```
//!
//! ## Module Organization
//!
//! - [`activations`] - Activation functions and stable softmax/softplus
//! - [`agent`] - A network paired with a policy
//! - [`builders`] - Builder patterns for convenient network construction
//! - [`config`] - Model, policy and training configuration
//! - [`error`] - Error types and result handling
//! - [`layers`] - Dense, convolutional and recurrent layers
//! - [`network`] - Architectures, feature extraction and Q-networks
//! - [`policy`] - Action-selection policies

pub mod activations;
pub mod agent;
pub mod builders;
pub mod config;
pub mod error;
pub mod layers;
pub mod network;
pub mod policy;

pub use agent::QAgent;
pub use builders::NetworkBuilder;
pub use config::{AgentConfig, ModelSpec, PolicyConfig, TrainingDefaults};
pub use error::{PallasError, Result};
pub use network::{build_network, one_hot, Architecture, QNetwork};
pub use policy::{Policy, PolicyWrapper, SelectedAction};

#[cfg(test)]
mod tests;
