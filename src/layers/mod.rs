//! Network layers: dense, 2D convolution, and the LSTM/GRU recurrent cells.
//!
//! All layers are inference-only; weights are plain public arrays so callers
//! can load or overwrite them.

pub mod conv;
pub mod dense;
pub mod gru;
pub mod initialization;
pub mod lstm;
pub mod traits;

pub use conv::{Conv2DLayer, Conv2DLayerBuilder};
pub use dense::DenseLayer;
pub use gru::GRULayer;
pub use initialization::WeightInit;
pub use lstm::LSTMLayer;
pub use traits::Layer as LayerTrait;
