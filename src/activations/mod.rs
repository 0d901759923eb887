//! # Activation Functions Module
//!
//! Elementwise non-linearities for network layers, plus the numerically
//! stable transforms the stochastic policies rely on.
//!
//! ## Available Activations
//!
//! - **ReLU**: `max(0, x)` - used after every convolution and hidden layer
//! - **Sigmoid**: `1 / (1 + e^(-x))` - recurrent gates
//! - **Tanh**: hyperbolic tangent - default recurrent candidate activation
//! - **Linear**: identity - output layers
//!
//! ## Stable Transforms
//!
//! - [`stable::log_sum_exp`] and [`stable::softmax`] for logits of any magnitude
//! - [`stable::softplus`] for strictly positive variance parameters
//!
//! ## Usage Example
//!
//! ```rust
//! use pallas::activations::{Activation, stable};
//! use ndarray::array;
//!
//! let mut data = array![1.0, -0.5, 0.0, 2.0];
//! Activation::Relu.apply(&mut data);
//!
//! let probs = stable::softmax(array![1000.0f32, 1001.0].view());
//! assert!((probs.sum() - 1.0).abs() < 1e-6);
//! ```

pub mod functions;
pub mod stable;

pub use functions::Activation;
