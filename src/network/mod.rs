//! # Q-Network Module
//!
//! Action-value networks for image observations of shape
//! `(height, width, stacked_frames)`.
//!
//! A network is assembled from three parts:
//!
//! - a [`FeatureExtractor`] running the three-layer convolution stack, either
//!   over the stacked frames as channels or over every frame as a time step
//! - a [`Trunk`] hidden layer (dense, LSTM or GRU)
//! - an output head, either a linear projection or the [`DuelingHead`]
//!
//! which part is used is decided by the parsed [`Architecture`].
//!
//! ## Example
//!
//! ```rust
//! use pallas::network::{build_network, one_hot};
//! use ndarray::Array3;
//!
//! let network = build_network((84, 84, 4), 6, "dueling_dqn", 32).unwrap();
//! let observation = Array3::<f32>::zeros((84, 84, 4));
//!
//! let q_values = network.evaluate(observation.view()).unwrap();
//! assert_eq!(q_values.len(), 6);
//!
//! let mask = one_hot(3, 6).unwrap();
//! let (taken, _) = network.train_step_value(observation.view(), mask.view()).unwrap();
//! assert!((taken - q_values[3]).abs() < 1e-5);
//! ```

pub mod architecture;
pub mod dueling;
pub mod extractor;
pub mod trunk;

pub use architecture::{Architecture, Head, Topology};
pub use dueling::{dueling_combine, DuelingHead};
pub use extractor::{frames_as_time_steps, FeatureExtractor, CONV_STACK, MIN_SPATIAL_SIZE};
pub use trunk::Trunk;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayView3, ArrayView4, Axis};
use serde::{Serialize, Deserialize};

use crate::activations::Activation;
use crate::error::{PallasError, Result};
use crate::layers::{DenseLayer, LayerTrait};

/// Maps trunk activations to action values.
#[derive(Serialize, Deserialize, Clone, Debug)]
enum OutputHead {
    Plain {
        hidden: Trunk,
        q_values: DenseLayer,
    },
    Dueling {
        value_hidden: Trunk,
        advantage_hidden: Trunk,
        head: DuelingHead,
    },
}

impl OutputHead {
    fn new(architecture: Architecture, feature_size: usize, hidden_width: usize, num_actions: usize) -> Result<Self> {
        let topology = architecture.topology;
        let head = match architecture.head {
            Head::Plain => OutputHead::Plain {
                hidden: Trunk::new(topology, feature_size, hidden_width)?,
                q_values: DenseLayer::new(hidden_width, num_actions, Activation::Linear)?,
            },
            Head::Dueling => OutputHead::Dueling {
                value_hidden: Trunk::new(topology, feature_size, hidden_width)?,
                advantage_hidden: Trunk::new(topology, feature_size, hidden_width)?,
                head: DuelingHead::new(hidden_width, num_actions)?,
            },
        };
        Ok(head)
    }

    fn forward(&self, features: ArrayView3<f32>) -> Result<Array2<f32>> {
        match self {
            OutputHead::Plain { hidden, q_values } => {
                let activations = hidden.forward(features)?;
                Ok(q_values.forward_batch(activations.view()))
            }
            OutputHead::Dueling { value_hidden, advantage_hidden, head } => {
                let value_stream = value_hidden.forward(features)?;
                let advantage_stream = advantage_hidden.forward(features)?;
                head.forward(value_stream.view(), advantage_stream.view())
            }
        }
    }

    fn num_parameters(&self) -> usize {
        match self {
            OutputHead::Plain { hidden, q_values } => hidden.num_parameters() + q_values.num_parameters(),
            OutputHead::Dueling { value_hidden, advantage_hidden, head } => {
                value_hidden.num_parameters() + advantage_hidden.num_parameters() + head.num_parameters()
            }
        }
    }
}

/// An action-value network.
///
/// The topology is fixed when the network is built; weights live in the
/// component layers.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct QNetwork {
    extractor: FeatureExtractor,
    output: OutputHead,
    architecture: Architecture,
    input_shape: (usize, usize, usize),
    num_actions: usize,
    hidden_width: usize,
}

impl QNetwork {
    /// Build a network for observations of `input_shape = (height, width, frames)`.
    pub fn new(
        input_shape: (usize, usize, usize),
        num_actions: usize,
        architecture: Architecture,
        hidden_width: usize,
    ) -> Result<Self> {
        if num_actions == 0 {
            return Err(PallasError::configuration("num_actions", "at least one action is required"));
        }
        if hidden_width == 0 {
            return Err(PallasError::configuration("hidden_width", "hidden width must be positive"));
        }

        let extractor = FeatureExtractor::new(input_shape, architecture.topology.is_recurrent())?;
        let output = OutputHead::new(architecture, extractor.feature_size(), hidden_width, num_actions)?;

        let network = QNetwork {
            extractor,
            output,
            architecture,
            input_shape,
            num_actions,
            hidden_width,
        };
        log::debug!(
            "built {} network: input {:?}, {} features per step, {} actions, {} parameters",
            network.architecture,
            network.input_shape,
            network.feature_size(),
            network.num_actions,
            network.num_parameters()
        );
        Ok(network)
    }

    pub fn architecture(&self) -> Architecture {
        self.architecture
    }

    pub fn input_shape(&self) -> (usize, usize, usize) {
        self.input_shape
    }

    pub fn num_actions(&self) -> usize {
        self.num_actions
    }

    pub fn hidden_width(&self) -> usize {
        self.hidden_width
    }

    /// Width of the flattened convolution output for one time step
    pub fn feature_size(&self) -> usize {
        self.extractor.feature_size()
    }

    pub fn num_parameters(&self) -> usize {
        self.extractor.num_parameters() + self.output.num_parameters()
    }

    /// Action values for one observation `(height, width, frames)`.
    pub fn evaluate(&self, observation: ArrayView3<f32>) -> Result<Array1<f32>> {
        let q_values = self.evaluate_batch(observation.insert_axis(Axis(0)))?;
        Ok(q_values.index_axis_move(Axis(0), 0))
    }

    /// Action values for a batch of observations `(batch, height, width, frames)`.
    ///
    /// Returns `(batch, num_actions)`.
    pub fn evaluate_batch(&self, observations: ArrayView4<f32>) -> Result<Array2<f32>> {
        let features = match self.architecture.topology {
            Topology::RecurrentDense => self.extractor.forward_last_step(observations)?,
            _ => self.extractor.forward(observations)?,
        };
        self.output.forward(features.view())
    }

    /// Value of the action selected by `mask` together with the full action-value vector.
    ///
    /// The scalar is the inner product of the action values with the mask, so a
    /// one-hot mask selects exactly one entry.
    pub fn train_step_value(
        &self,
        observation: ArrayView3<f32>,
        mask: ArrayView1<f32>,
    ) -> Result<(f32, Array1<f32>)> {
        self.check_mask_width(mask.len())?;
        let q_values = self.evaluate(observation)?;
        let selected = q_values.dot(&mask);
        Ok((selected, q_values))
    }

    /// Batched [`QNetwork::train_step_value`]: `masks` is `(batch, num_actions)`.
    pub fn train_step_values(
        &self,
        observations: ArrayView4<f32>,
        masks: ArrayView2<f32>,
    ) -> Result<(Array1<f32>, Array2<f32>)> {
        let batch = observations.len_of(Axis(0));
        if masks.dim() != (batch, self.num_actions) {
            return Err(PallasError::dimension_mismatch(
                format!("masks of shape {:?}", (batch, self.num_actions)),
                format!("{:?}", masks.dim()),
            ));
        }
        let q_values = self.evaluate_batch(observations)?;
        let selected = (&q_values * &masks).sum_axis(Axis(1));
        Ok((selected, q_values))
    }

    fn check_mask_width(&self, width: usize) -> Result<()> {
        if width != self.num_actions {
            return Err(PallasError::dimension_mismatch(
                format!("a mask of {} actions", self.num_actions),
                format!("{} entries", width),
            ));
        }
        Ok(())
    }
}

/// Build a network from an architecture name such as `"dueling_drqn_lstm"`.
pub fn build_network(
    input_shape: (usize, usize, usize),
    num_actions: usize,
    architecture_name: &str,
    hidden_width: usize,
) -> Result<QNetwork> {
    let architecture = Architecture::parse(architecture_name)?;
    QNetwork::new(input_shape, num_actions, architecture, hidden_width)
}

/// One-hot action mask of length `num_actions` with a 1 at `action`.
pub fn one_hot(action: usize, num_actions: usize) -> Result<Array1<f32>> {
    if action >= num_actions {
        return Err(PallasError::InvalidAction { action, max_actions: num_actions });
    }
    let mut mask = Array1::zeros(num_actions);
    mask[action] = 1.0;
    Ok(mask)
}
