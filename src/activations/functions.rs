use ndarray::{Array, Dimension};
use serde::{Serialize, Deserialize};

/// An enumeration of the activation functions available to network layers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
pub enum Activation {
    #[default]
    Relu,
    Linear,
    Sigmoid,
    Tanh,
}

impl Activation {
    /// Apply the activation function to an array of any dimension in-place.
    pub fn apply<D: Dimension>(&self, input: &mut Array<f32, D>) {
        match self {
            Activation::Relu => {
                input.mapv_inplace(|v| v.max(0.0));
            }
            Activation::Linear => {}
            Activation::Sigmoid => {
                input.mapv_inplace(|v| 1.0 / (1.0 + (-v).exp()));
            }
            Activation::Tanh => {
                input.mapv_inplace(|v| v.tanh());
            }
        }
    }

    /// Apply the activation function, returning a new array.
    pub fn map<D: Dimension>(&self, input: &Array<f32, D>) -> Array<f32, D> {
        let mut output = input.clone();
        self.apply(&mut output);
        output
    }
}
