use ndarray::{s, Array1, Array2, Array3, ArrayView2, ArrayView3, Axis};
use serde::{Serialize, Deserialize};

use crate::activations::Activation;
use crate::error::{PallasError, Result};
use super::initialization::WeightInit;
use super::traits::Layer as LayerTrait;

/// GRU (Gated Recurrent Unit) layer for sequence processing
///
/// The GRU layer is a simplified version of LSTM with fewer parameters,
/// combining the forget and input gates into a single update gate.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct GRULayer {
    /// Input size
    pub input_size: usize,
    /// Hidden size (number of GRU units)
    pub hidden_size: usize,
    /// Whether to return sequences (all time steps) or just the last output
    pub return_sequences: bool,
    /// Activation for the candidate hidden state
    pub activation: Activation,

    // Weight matrices for reset gate
    pub w_ir: Array2<f32>, // Input to reset gate
    pub w_hr: Array2<f32>, // Hidden to reset gate
    pub b_r: Array1<f32>,  // Reset gate bias

    // Weight matrices for update gate
    pub w_iz: Array2<f32>, // Input to update gate
    pub w_hz: Array2<f32>, // Hidden to update gate
    pub b_z: Array1<f32>,  // Update gate bias

    // Weight matrices for new gate (candidate hidden state)
    pub w_in: Array2<f32>, // Input to new gate
    pub w_hn: Array2<f32>, // Hidden to new gate
    pub b_n: Array1<f32>,  // New gate bias
}

impl GRULayer {
    /// Create a new GRU layer with a `tanh` candidate activation
    pub fn new(input_size: usize, hidden_size: usize, return_sequences: bool) -> Result<Self> {
        Self::with_activation(input_size, hidden_size, return_sequences, Activation::Tanh)
    }

    /// Create a new GRU layer with a custom candidate activation
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

            w_ir: input_weights()?,
            w_hr: hidden_weights()?,
            b_r: Array1::zeros(hidden_size),

            w_iz: input_weights()?,
            w_hz: hidden_weights()?,
            b_z: Array1::zeros(hidden_size),

            w_in: input_weights()?,
            w_hn: hidden_weights()?,
            b_n: Array1::zeros(hidden_size),
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
        let mut outputs = Array3::zeros((batch_size, seq_len, self.hidden_size));

        for t in 0..seq_len {
            h_t = self.step(input.slice(s![.., t, ..]), h_t.view());
            outputs.slice_mut(s![.., t, ..]).assign(&h_t);
        }

        if self.return_sequences {
            Ok(outputs)
        } else {
            Ok(h_t.insert_axis(Axis(1)))
        }
    }

    fn step(&self, x_t: ArrayView2<f32>, h_prev: ArrayView2<f32>) -> Array2<f32> {
        // r_t = sigmoid(x_t W_ir + h_{t-1} W_hr + b_r)
        let mut r_t = x_t.dot(&self.w_ir) + h_prev.dot(&self.w_hr) + &self.b_r;
        Activation::Sigmoid.apply(&mut r_t);

        // z_t = sigmoid(x_t W_iz + h_{t-1} W_hz + b_z)
        let mut z_t = x_t.dot(&self.w_iz) + h_prev.dot(&self.w_hz) + &self.b_z;
        Activation::Sigmoid.apply(&mut z_t);

        // n_t = act(x_t W_in + (r_t * h_{t-1}) W_hn + b_n)
        let mut n_t = x_t.dot(&self.w_in) + (&r_t * &h_prev).dot(&self.w_hn) + &self.b_n;
        self.activation.apply(&mut n_t);

        // h_t = (1 - z_t) * n_t + z_t * h_{t-1}
        &(1.0 - &z_t) * &n_t + &z_t * &h_prev
    }
}

// A flat input is treated as a sequence of length one
impl LayerTrait for GRULayer {
    fn forward_batch(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        let h_prev = Array2::zeros((inputs.nrows(), self.hidden_size));
        self.step(inputs, h_prev.view())
    }

    fn output_size(&self) -> usize {
        self.hidden_size
    }

    fn input_size(&self) -> usize {
        self.input_size
    }

    fn num_parameters(&self) -> usize {
        3 * (self.input_size * self.hidden_size + self.hidden_size * self.hidden_size + self.hidden_size)
    }

    fn clone_box(&self) -> Box<dyn LayerTrait> {
        Box::new(self.clone())
    }
}
