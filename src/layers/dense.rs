use ndarray::{Array1, Array2, ArrayView2};
use serde::{Serialize, Deserialize};

use crate::activations::Activation;
use crate::error::{PallasError, Result};
use super::initialization::WeightInit;
use super::traits::Layer as LayerTrait;

/// A fully connected (dense) layer
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DenseLayer {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
    pub activation: Activation,
}

impl DenseLayer {
    /// Create a new dense layer with the given input size, output size, and activation function.
    /// Weights use Xavier/Glorot uniform initialization and biases start at zero.
    pub fn new(input_size: usize, output_size: usize, activation: Activation) -> Result<Self> {
        Self::with_init(input_size, output_size, activation, &WeightInit::XavierUniform)
    }

    /// Create a new dense layer with an explicit weight initialization strategy.
    pub fn with_init(
        input_size: usize,
        output_size: usize,
        activation: Activation,
        init: &WeightInit,
    ) -> Result<Self> {
        let weights = init.initialize((input_size, output_size), input_size, output_size)?;
        let biases = Array1::zeros(output_size);
        Ok(DenseLayer {
            weights,
            biases,
            activation,
        })
    }

    pub fn with_weights(mut self, weights: Array2<f32>) -> Result<Self> {
        if weights.dim() != self.weights.dim() {
            return Err(PallasError::dimension_mismatch(
                format!("{:?}", self.weights.dim()),
                format!("{:?}", weights.dim()),
            ));
        }
        self.weights = weights;
        Ok(self)
    }

    pub fn with_biases(mut self, biases: Array1<f32>) -> Result<Self> {
        if biases.dim() != self.biases.dim() {
            return Err(PallasError::dimension_mismatch(
                format!("{}", self.biases.len()),
                format!("{}", biases.len()),
            ));
        }
        self.biases = biases;
        Ok(self)
    }
}

impl LayerTrait for DenseLayer {
    fn forward_batch(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        let mut outputs = inputs.dot(&self.weights) + &self.biases;
        self.activation.apply(&mut outputs);
        outputs
    }

    fn output_size(&self) -> usize {
        self.weights.shape()[1]
    }

    fn input_size(&self) -> usize {
        self.weights.shape()[0]
    }

    fn num_parameters(&self) -> usize {
        self.weights.len() + self.biases.len()
    }

    fn clone_box(&self) -> Box<dyn LayerTrait> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    #[test]
    fn test_dense_forward_known_weights() {
        let layer = DenseLayer::new(2, 2, Activation::Relu)
            .unwrap()
            .with_weights(array![[1.0, -1.0], [2.0, 1.0]])
            .unwrap()
            .with_biases(array![0.5, 0.0])
            .unwrap();

        let out = layer.forward(array![1.0, 1.0].view());
        assert_eq!(out, array![3.5f32, 0.0]);
    }

    #[test]
    fn test_dense_batch_shape() {
        let layer = DenseLayer::new(5, 3, Activation::Linear).unwrap();
        let out = layer.forward_batch(Array2::zeros((4, 5)).view());
        assert_eq!(out.dim(), (4, 3));
        assert_eq!(layer.num_parameters(), 18);
    }

    #[test]
    fn test_with_weights_rejects_wrong_shape() {
        let layer = DenseLayer::new(2, 2, Activation::Linear).unwrap();
        assert!(layer.with_weights(Array2::zeros((3, 2))).is_err());
    }
}
