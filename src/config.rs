//! Configuration for networks, policies and the training defaults.
//!
//! Everything is plain serde data. An [`AgentConfig`] can be read from JSON:
//!
//! ```rust
//! use pallas::config::{AgentConfig, PolicyConfig};
//!
//! let config = AgentConfig::from_json_str(r#"{
//!     "model": { "input_shape": [84, 84, 4], "num_actions": 6, "architecture": "dueling_dqn" },
//!     "policy": { "type": "linear_decay_eps_greedy", "start_eps": 1.0, "end_eps": 0.1, "decay_steps": 1000 }
//! }"#).unwrap();
//!
//! assert_eq!(config.model.hidden_width, 256);
//! assert_eq!(config.training.port_begin, 2220);
//! assert!(matches!(config.policy, PolicyConfig::LinearDecayEpsGreedy { .. }));
//! ```

use std::fs;
use std::path::Path;

use ndarray::Array1;
use serde::{Serialize, Deserialize};

use crate::agent::QAgent;
use crate::error::Result;
use crate::network::{Architecture, QNetwork};
use crate::policy::{
    EpsGreedy, LinearDecayEpsGreedy, PolicyWrapper, Random, StochasticContinuous, StochasticDiscrete,
};

fn default_hidden_width() -> usize {
    256
}

/// Network description; `architecture` is parsed when the config is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Observation shape `(height, width, stacked_frames)`
    pub input_shape: (usize, usize, usize),

    pub num_actions: usize,

    /// Architecture name such as `dqn` or `dueling_drqn_lstm`
    #[serde(default)]
    pub architecture: Architecture,

    /// Units in each hidden (dense or recurrent) layer
    #[serde(default = "default_hidden_width")]
    pub hidden_width: usize,
}

impl ModelSpec {
    /// Spec with the default `dqn` architecture and 256 hidden units
    pub fn new(input_shape: (usize, usize, usize), num_actions: usize) -> Self {
        ModelSpec {
            input_shape,
            num_actions,
            architecture: Architecture::default(),
            hidden_width: default_hidden_width(),
        }
    }

    pub fn with_architecture(mut self, architecture: Architecture) -> Self {
        self.architecture = architecture;
        self
    }

    pub fn with_hidden_width(mut self, hidden_width: usize) -> Self {
        self.hidden_width = hidden_width;
        self
    }

    pub fn build(&self) -> Result<QNetwork> {
        QNetwork::new(self.input_shape, self.num_actions, self.architecture, self.hidden_width)
    }
}

/// Hyperparameters for an external training loop.
///
/// Nothing in this crate reads these; they are carried so a trainer can be
/// configured from the same file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingDefaults {
    pub num_workers: usize,
    /// First port of the range used for worker coordination
    pub port_begin: u16,
    pub discount: f32,
    pub learning_rate: f32,
    pub adam_epsilon: f32,
    pub grad_clip_norm: f32,
    pub entropy_weight: f32,
    pub rollout_maxlen: usize,
    pub train_steps: u64,
    /// Training steps between checkpoints
    pub interval_save: u64,
}

impl Default for TrainingDefaults {
    fn default() -> Self {
        Self {
            num_workers: num_cpus::get(),
            port_begin: 2220,
            discount: 0.99,
            learning_rate: 1e-4,
            adam_epsilon: 1e-4,
            grad_clip_norm: 40.0,
            entropy_weight: 0.01,
            rollout_maxlen: 20,
            train_steps: 1_000_000,
            interval_save: 10_000,
        }
    }
}

/// Which policy to build, with its construction parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PolicyConfig {
    Random {
        num_actions: usize,
    },
    EpsGreedy {
        epsilon: f32,
    },
    LinearDecayEpsGreedy {
        start_eps: f32,
        end_eps: f32,
        decay_steps: u64,
    },
    StochasticDiscrete,
    StochasticContinuous {
        low: Vec<f32>,
        high: Vec<f32>,
    },
}

impl PolicyConfig {
    pub fn build(&self) -> Result<PolicyWrapper> {
        let policy = match self {
            PolicyConfig::Random { num_actions } => PolicyWrapper::Random(Random::new(*num_actions)?),
            PolicyConfig::EpsGreedy { epsilon } => PolicyWrapper::EpsGreedy(EpsGreedy::new(*epsilon)?),
            PolicyConfig::LinearDecayEpsGreedy { start_eps, end_eps, decay_steps } => {
                PolicyWrapper::LinearDecayEpsGreedy(LinearDecayEpsGreedy::new(*start_eps, *end_eps, *decay_steps)?)
            }
            PolicyConfig::StochasticDiscrete => PolicyWrapper::StochasticDiscrete(StochasticDiscrete::new()),
            PolicyConfig::StochasticContinuous { low, high } => PolicyWrapper::StochasticContinuous(
                StochasticContinuous::new(Array1::from(low.clone()), Array1::from(high.clone()))?,
            ),
        };
        Ok(policy)
    }

    /// Like [`PolicyConfig::build`] with a fixed random seed
    pub fn build_with_seed(&self, seed: u64) -> Result<PolicyWrapper> {
        let policy = match self {
            PolicyConfig::Random { num_actions } => {
                PolicyWrapper::Random(Random::with_seed(*num_actions, seed)?)
            }
            PolicyConfig::EpsGreedy { epsilon } => {
                PolicyWrapper::EpsGreedy(EpsGreedy::with_seed(*epsilon, seed)?)
            }
            PolicyConfig::LinearDecayEpsGreedy { start_eps, end_eps, decay_steps } => {
                PolicyWrapper::LinearDecayEpsGreedy(LinearDecayEpsGreedy::with_seed(
                    *start_eps,
                    *end_eps,
                    *decay_steps,
                    seed,
                )?)
            }
            PolicyConfig::StochasticDiscrete => {
                PolicyWrapper::StochasticDiscrete(StochasticDiscrete::with_seed(seed))
            }
            PolicyConfig::StochasticContinuous { low, high } => PolicyWrapper::StochasticContinuous(
                StochasticContinuous::with_seed(Array1::from(low.clone()), Array1::from(high.clone()), seed)?,
            ),
        };
        Ok(policy)
    }
}

/// Complete agent configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub model: ModelSpec,
    pub policy: PolicyConfig,
    #[serde(default)]
    pub training: TrainingDefaults,
}

impl AgentConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: AgentConfig = serde_json::from_str(json)?;
        log::debug!(
            "loaded agent config: {} network, {:?} input, {} actions",
            config.model.architecture,
            config.model.input_shape,
            config.model.num_actions
        );
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("reading agent config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build the network and policy described by this config
    pub fn build_agent(&self) -> Result<QAgent<PolicyWrapper>> {
        Ok(QAgent::new(self.model.build()?, self.policy.build()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PallasError;
    use crate::network::{Head, Topology};
    use std::io::Write;

    const CONFIG: &str = r#"{
        "model": {
            "input_shape": [36, 36, 4],
            "num_actions": 3,
            "architecture": "drqn_gru",
            "hidden_width": 32
        },
        "policy": { "type": "eps_greedy", "epsilon": 0.05 },
        "training": { "num_workers": 2, "discount": 0.9 }
    }"#;

    #[test]
    fn test_training_defaults() {
        let defaults = TrainingDefaults::default();
        assert!(defaults.num_workers >= 1);
        assert_eq!(defaults.port_begin, 2220);
        assert_eq!(defaults.discount, 0.99);
        assert_eq!(defaults.learning_rate, 1e-4);
        assert_eq!(defaults.adam_epsilon, 1e-4);
        assert_eq!(defaults.grad_clip_norm, 40.0);
        assert_eq!(defaults.entropy_weight, 0.01);
        assert_eq!(defaults.rollout_maxlen, 20);
        assert_eq!(defaults.train_steps, 1_000_000);
        assert_eq!(defaults.interval_save, 10_000);
    }

    #[test]
    fn test_parse_full_config() {
        let config = AgentConfig::from_json_str(CONFIG).unwrap();
        assert_eq!(config.model.architecture, Architecture::new(Topology::RecurrentGru, Head::Plain));
        assert_eq!(config.model.hidden_width, 32);
        assert_eq!(config.policy, PolicyConfig::EpsGreedy { epsilon: 0.05 });
        assert_eq!(config.training.num_workers, 2);
        assert_eq!(config.training.discount, 0.9);
        // unspecified training fields keep their defaults
        assert_eq!(config.training.rollout_maxlen, 20);
    }

    #[test]
    fn test_bad_architecture_fails_at_load() {
        let json = CONFIG.replace("drqn_gru", "dqn_gru");
        match AgentConfig::from_json_str(&json) {
            Err(PallasError::SerializationError(msg)) => assert!(msg.contains("dqn_gru")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CONFIG.as_bytes()).unwrap();

        let config = AgentConfig::from_path(file.path()).unwrap();
        assert_eq!(config.model.num_actions, 3);

        assert!(matches!(
            AgentConfig::from_path(file.path().with_extension("missing")),
            Err(PallasError::IoError(_))
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let config = AgentConfig {
            model: ModelSpec::new((84, 84, 4), 6).with_hidden_width(64),
            policy: PolicyConfig::StochasticContinuous { low: vec![-1.0], high: vec![1.0] },
            training: TrainingDefaults::default(),
        };
        let json = config.to_json_string().unwrap();
        assert!(json.contains("\"architecture\": \"dqn\""));
        assert_eq!(AgentConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_policy_configs_build() {
        let configs = [
            PolicyConfig::Random { num_actions: 4 },
            PolicyConfig::EpsGreedy { epsilon: 0.1 },
            PolicyConfig::LinearDecayEpsGreedy { start_eps: 1.0, end_eps: 0.0, decay_steps: 10 },
            PolicyConfig::StochasticDiscrete,
            PolicyConfig::StochasticContinuous { low: vec![0.0], high: vec![1.0] },
        ];
        for config in &configs {
            assert!(config.build().is_ok(), "{:?}", config);
            assert!(config.build_with_seed(1).is_ok(), "{:?}", config);
        }

        let invalid = PolicyConfig::LinearDecayEpsGreedy { start_eps: 1.0, end_eps: 0.0, decay_steps: 0 };
        assert!(invalid.build().is_err());
    }

    #[test]
    fn test_policy_tag_names() {
        let json = serde_json::to_string(&PolicyConfig::StochasticDiscrete).unwrap();
        assert_eq!(json, r#"{"type":"stochastic_discrete"}"#);
    }
}
