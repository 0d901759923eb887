use ndarray::{s, Array2, ArrayView3, Axis};
use serde::{Serialize, Deserialize};

use crate::activations::Activation;
use crate::error::{PallasError, Result};
use crate::layers::{DenseLayer, GRULayer, LSTMLayer, LayerTrait};
use super::architecture::Topology;

/// Hidden layer between the feature extractor and an output head.
///
/// Every variant consumes a `[batch, steps, features]` sequence and yields the
/// hidden activation of the final step. The dense trunk acts on each step
/// independently, so only the final step can reach the output.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub enum Trunk {
    Dense(DenseLayer),
    Lstm(LSTMLayer),
    Gru(GRULayer),
}

impl Trunk {
    /// Build the trunk matching `topology`; all variants use ReLU activations.
    pub fn new(topology: Topology, input_size: usize, hidden_width: usize) -> Result<Self> {
        let trunk = match topology {
            Topology::Feedforward | Topology::RecurrentDense => {
                Trunk::Dense(DenseLayer::new(input_size, hidden_width, Activation::Relu)?)
            }
            Topology::RecurrentLstm => Trunk::Lstm(LSTMLayer::with_activation(
                input_size,
                hidden_width,
                false,
                Activation::Relu,
            )?),
            Topology::RecurrentGru => Trunk::Gru(GRULayer::with_activation(
                input_size,
                hidden_width,
                false,
                Activation::Relu,
            )?),
        };
        Ok(trunk)
    }

    /// `[batch, steps, features]` -> `[batch, hidden_width]`
    pub fn forward(&self, sequence: ArrayView3<f32>) -> Result<Array2<f32>> {
        let steps = sequence.len_of(Axis(1));
        if steps == 0 {
            return Err(PallasError::dimension_mismatch("a non-empty sequence", "0 steps"));
        }

        match self {
            Trunk::Dense(layer) => {
                let features = sequence.len_of(Axis(2));
                if features != layer.input_size() {
                    return Err(PallasError::dimension_mismatch(
                        format!("{} features", layer.input_size()),
                        format!("{} features", features),
                    ));
                }
                Ok(layer.forward_batch(sequence.slice(s![.., steps - 1, ..])))
            }
            Trunk::Lstm(layer) => Ok(layer.forward_sequence(sequence)?.index_axis_move(Axis(1), 0)),
            Trunk::Gru(layer) => Ok(layer.forward_sequence(sequence)?.index_axis_move(Axis(1), 0)),
        }
    }

    fn layer(&self) -> &dyn LayerTrait {
        match self {
            Trunk::Dense(layer) => layer,
            Trunk::Lstm(layer) => layer,
            Trunk::Gru(layer) => layer,
        }
    }

    pub fn hidden_width(&self) -> usize {
        self.layer().output_size()
    }

    pub fn num_parameters(&self) -> usize {
        self.layer().num_parameters()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_trunk_variants_produce_hidden_width() {
        let seq = Array3::from_elem((2, 4, 10), 0.1f32);
        for topology in [
            Topology::Feedforward,
            Topology::RecurrentDense,
            Topology::RecurrentLstm,
            Topology::RecurrentGru,
        ] {
            let trunk = Trunk::new(topology, 10, 16).unwrap();
            assert_eq!(trunk.hidden_width(), 16);
            let hidden = trunk.forward(seq.view()).unwrap();
            assert_eq!(hidden.dim(), (2, 16), "{:?}", topology);
            assert!(hidden.iter().all(|&v| v >= 0.0));
        }
    }

    #[test]
    fn test_dense_trunk_reads_final_step() {
        let trunk = Trunk::new(Topology::RecurrentDense, 3, 5).unwrap();
        let mut seq = Array3::<f32>::zeros((1, 3, 3));
        seq.slice_mut(s![0, 2, ..]).fill(1.0);
        let from_sequence = trunk.forward(seq.view()).unwrap();

        let last_only = seq.slice(s![.., 2..3, ..]).to_owned();
        let from_last = trunk.forward(last_only.view()).unwrap();
        assert_eq!(from_sequence, from_last);
    }

    #[test]
    fn test_trunk_rejects_wrong_feature_size() {
        let trunk = Trunk::new(Topology::Feedforward, 8, 4).unwrap();
        assert!(trunk.forward(Array3::zeros((1, 1, 7)).view()).is_err());
    }
}
