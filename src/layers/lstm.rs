use ndarray::{s, Array1, Array2, Array3, ArrayView2, ArrayView3, Axis};
use serde::{Serialize, Deserialize};

use crate::activations::Activation;
use crate::error::{PallasError, Result};
use super::initialization::WeightInit;
use super::traits::Layer as LayerTrait;

/// LSTM (Long Short-Term Memory) layer for sequence processing
///
/// The LSTM layer carries a cell state and hidden state across time steps,
/// allowing it to learn long-term dependencies in sequential data. State starts
/// at zero on every call; nothing is carried between calls.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct LSTMLayer {
    /// Input size
    pub input_size: usize,
    /// Hidden size (number of LSTM units)
    pub hidden_size: usize,
    /// Whether to return sequences (all time steps) or just the last output
    pub return_sequences: bool,
    /// Activation for the candidate cell values and the cell output
    pub activation: Activation,

    // Weight matrices for input gate
    pub w_ii: Array2<f32>, // Input to input gate
    pub w_hi: Array2<f32>, // Hidden to input gate
    pub b_i: Array1<f32>,  // Input gate bias

    // Weight matrices for forget gate
    pub w_if: Array2<f32>, // Input to forget gate
    pub w_hf: Array2<f32>, // Hidden to forget gate
    pub b_f: Array1<f32>,  // Forget gate bias

    // Weight matrices for cell gate (candidate values)
    pub w_ig: Array2<f32>, // Input to cell gate
    pub w_hg: Array2<f32>, // Hidden to cell gate
    pub b_g: Array1<f32>,  // Cell gate bias

    // Weight matrices for output gate
    pub w_io: Array2<f32>, // Input to output gate
    pub w_ho: Array2<f32>, // Hidden to output gate
    pub b_o: Array1<f32>,  // Output gate bias
}

impl LSTMLayer {
    /// Create a new LSTM layer with a `tanh` candidate activation
    pub fn new(input_size: usize, hidden_size: usize, return_sequences: bool) -> Result<Self> {
        Self::with_activation(input_size, hidden_size, return_sequences, Activation::Tanh)
    }

    /// Create a new LSTM layer with a custom candidate/output activation
    pub fn with_activation(
        input_size: usize,
        hidden_size: usize,
        return_sequences: bool,
        activation: Activation,
    ) -> Result<Self> {
        let scale = (1.0 / (input_size + hidden_size) as f32).sqrt();
        let init = WeightInit::Uniform { min: -scale, max: scale };
        let input_weights = || init.initialize((input_size, hidden_size), input_size, hidden_size);
        let hidden_weights = || init.initialize((hidden_size, hidden_size), hidden_size, hidden_size);

        Ok(Self {
            input_size,
            hidden_size,
            return_sequences,
            activation,

            w_ii: input_weights()?,
            w_hi: hidden_weights()?,
            b_i: Array1::zeros(hidden_size),

            w_if: input_weights()?,
            w_hf: hidden_weights()?,
            b_f: Array1::ones(hidden_size), // Forget gate bias starts at 1 so early state is retained

            w_ig: input_weights()?,
            w_hg: hidden_weights()?,
            b_g: Array1::zeros(hidden_size),

            w_io: input_weights()?,
            w_ho: hidden_weights()?,
            b_o: Array1::zeros(hidden_size),
        })
    }

    /// Forward pass for a sequence
    /// Input shape: (batch_size, sequence_length, input_size)
    /// Output shape:
    ///   - If return_sequences: (batch_size, sequence_length, hidden_size)
    ///   - Else: (batch_size, 1, hidden_size)
    pub fn forward_sequence(&self, input: ArrayView3<f32>) -> Result<Array3<f32>> {
        let (batch_size, seq_len, features) = input.dim();
        if features != self.input_size {
            return Err(PallasError::dimension_mismatch(
                format!("{} features per step", self.input_size),
                format!("{} features per step", features),
            ));
        }
        if seq_len == 0 {
            return Err(PallasError::dimension_mismatch("a non-empty sequence", "0 steps"));
        }

        let mut h_t = Array2::zeros((batch_size, self.hidden_size));
        let mut c_t = Array2::zeros((batch_size, self.hidden_size));
        let mut outputs = Array3::zeros((batch_size, seq_len, self.hidden_size));

        for t in 0..seq_len {
            let x_t = input.slice(s![.., t, ..]);
            let (next_h, next_c) = self.step(x_t, h_t.view(), &c_t);
            h_t = next_h;
            c_t = next_c;
            outputs.slice_mut(s![.., t, ..]).assign(&h_t);
        }

        if self.return_sequences {
            Ok(outputs)
        } else {
            Ok(h_t.insert_axis(Axis(1)))
        }
    }

    /// One time step: returns (h_t, c_t)
    fn step(
        &self,
        x_t: ArrayView2<f32>,
        h_prev: ArrayView2<f32>,
        c_prev: &Array2<f32>,
    ) -> (Array2<f32>, Array2<f32>) {
        // i_t = sigmoid(x_t W_ii + h_{t-1} W_hi + b_i)
        let mut i_t = x_t.dot(&self.w_ii) + h_prev.dot(&self.w_hi) + &self.b_i;
        Activation::Sigmoid.apply(&mut i_t);

        // f_t = sigmoid(x_t W_if + h_{t-1} W_hf + b_f)
        let mut f_t = x_t.dot(&self.w_if) + h_prev.dot(&self.w_hf) + &self.b_f;
        Activation::Sigmoid.apply(&mut f_t);

        // g_t = act(x_t W_ig + h_{t-1} W_hg + b_g)
        let mut g_t = x_t.dot(&self.w_ig) + h_prev.dot(&self.w_hg) + &self.b_g;
        self.activation.apply(&mut g_t);

        // o_t = sigmoid(x_t W_io + h_{t-1} W_ho + b_o)
        let mut o_t = x_t.dot(&self.w_io) + h_prev.dot(&self.w_ho) + &self.b_o;
        Activation::Sigmoid.apply(&mut o_t);

        // c_t = f_t * c_{t-1} + i_t * g_t
        let c_t = &f_t * c_prev + &i_t * &g_t;

        // h_t = o_t * act(c_t)
        let h_t = &o_t * &self.activation.map(&c_t);

        (h_t, c_t)
    }
}

// A flat input is treated as a sequence of length one
impl LayerTrait for LSTMLayer {
    fn forward_batch(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        let batch_size = inputs.nrows();
        let h_prev = Array2::zeros((batch_size, self.hidden_size));
        let c_prev = Array2::zeros((batch_size, self.hidden_size));
        self.step(inputs, h_prev.view(), &c_prev).0
    }

    fn output_size(&self) -> usize {
        self.hidden_size
    }

    fn input_size(&self) -> usize {
        self.input_size
    }

    fn num_parameters(&self) -> usize {
        4 * (self.input_size * self.hidden_size + self.hidden_size * self.hidden_size + self.hidden_size)
    }

    fn clone_box(&self) -> Box<dyn LayerTrait> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lstm_output_shapes() {
        let seq = Array3::from_elem((2, 5, 3), 0.5f32);

        let last = LSTMLayer::new(3, 4, false).unwrap();
        assert_eq!(last.forward_sequence(seq.view()).unwrap().dim(), (2, 1, 4));

        let full = LSTMLayer::new(3, 4, true).unwrap();
        assert_eq!(full.forward_sequence(seq.view()).unwrap().dim(), (2, 5, 4));
    }

    #[test]
    fn test_lstm_last_step_matches_full_sequence() {
        let mut layer = LSTMLayer::new(3, 4, true).unwrap();
        let seq = Array3::from_shape_fn((1, 4, 3), |(_, t, f)| (t as f32 - f as f32) * 0.1);

        let full = layer.forward_sequence(seq.view()).unwrap();
        layer.return_sequences = false;
        let last = layer.forward_sequence(seq.view()).unwrap();

        for h in 0..4 {
            assert!((full[[0, 3, h]] - last[[0, 0, h]]).abs() < 1e-6);
        }
    }

    #[test]
    fn test_lstm_is_stateless_between_calls() {
        let layer = LSTMLayer::new(2, 3, false).unwrap();
        let seq = Array3::from_elem((1, 3, 2), 1.0f32);
        let first = layer.forward_sequence(seq.view()).unwrap();
        let second = layer.forward_sequence(seq.view()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_relu_lstm_outputs_are_non_negative() {
        let layer = LSTMLayer::with_activation(3, 8, true, Activation::Relu).unwrap();
        let seq = Array3::from_shape_fn((2, 3, 3), |(b, t, f)| (b + t) as f32 - f as f32);
        let out = layer.forward_sequence(seq.view()).unwrap();
        assert!(out.iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn test_lstm_rejects_wrong_feature_size() {
        let layer = LSTMLayer::new(3, 4, false).unwrap();
        assert!(layer.forward_sequence(Array3::zeros((1, 2, 5)).view()).is_err());
    }
}
