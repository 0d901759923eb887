use ndarray::{Array2, ArrayView2, Axis};
use serde::{Serialize, Deserialize};

use crate::activations::Activation;
use crate::error::{PallasError, Result};
use crate::layers::{DenseLayer, LayerTrait};

/// Combine a state value and per-action advantages into action values.
///
/// `q[b, a] = value[b, 0] + advantage[b, a] - mean_a(advantage[b, ..])`
///
/// `value` is `[batch, 1]`, `advantage` is `[batch, num_actions]`.
pub fn dueling_combine(value: ArrayView2<f32>, advantage: ArrayView2<f32>) -> Result<Array2<f32>> {
    let (batch, num_actions) = advantage.dim();
    if value.dim() != (batch, 1) {
        return Err(PallasError::dimension_mismatch(
            format!("value of shape {:?}", (batch, 1)),
            format!("{:?}", value.dim()),
        ));
    }
    if num_actions == 0 {
        return Err(PallasError::dimension_mismatch("at least one action", "0 actions"));
    }

    let mean_advantage = advantage
        .mean_axis(Axis(1))
        .ok_or_else(|| PallasError::dimension_mismatch("at least one action", "0 actions"))?;

    let mut q_values = advantage.to_owned();
    for ((mut row, &v), &mean) in q_values
        .axis_iter_mut(Axis(0))
        .zip(value.column(0).iter())
        .zip(mean_advantage.iter())
    {
        row.mapv_inplace(|adv| v + (adv - mean));
    }
    Ok(q_values)
}

/// Dueling output head: separate linear value and advantage projections
/// combined with [`dueling_combine`].
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DuelingHead {
    pub value: DenseLayer,
    pub advantage: DenseLayer,
}

impl DuelingHead {
    pub fn new(hidden_width: usize, num_actions: usize) -> Result<Self> {
        Ok(DuelingHead {
            value: DenseLayer::new(hidden_width, 1, Activation::Linear)?,
            advantage: DenseLayer::new(hidden_width, num_actions, Activation::Linear)?,
        })
    }

    /// Action values from the value-stream and advantage-stream activations,
    /// each `[batch, hidden_width]`.
    pub fn forward(
        &self,
        value_stream: ArrayView2<f32>,
        advantage_stream: ArrayView2<f32>,
    ) -> Result<Array2<f32>> {
        let value = self.value.forward_batch(value_stream);
        let advantage = self.advantage.forward_batch(advantage_stream);
        dueling_combine(value.view(), advantage.view())
    }

    pub fn num_actions(&self) -> usize {
        self.advantage.output_size()
    }

    pub fn num_parameters(&self) -> usize {
        self.value.num_parameters() + self.advantage.num_parameters()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_combine_known_values() {
        let value = array![[2.0f32], [-1.0]];
        let advantage = array![[1.0f32, 2.0, 3.0], [0.0, 0.0, 3.0]];
        let q = dueling_combine(value.view(), advantage.view()).unwrap();

        assert_eq!(q, array![[1.0f32, 2.0, 3.0], [-2.0, -2.0, 1.0]]);
    }

    #[test]
    fn test_combine_mean_equals_value() {
        let value = array![[0.75f32]];
        let advantage = array![[10.0f32, -3.0, 0.5, 7.25]];
        let q = dueling_combine(value.view(), advantage.view()).unwrap();
        let mean = q.mean_axis(Axis(1)).unwrap();
        assert!((mean[0] - 0.75).abs() < 1e-5);
    }

    #[test]
    fn test_combine_rejects_bad_shapes() {
        let advantage = array![[1.0f32, 2.0]];
        assert!(dueling_combine(array![[1.0f32, 1.0]].view(), advantage.view()).is_err());
        assert!(dueling_combine(array![[1.0f32], [2.0]].view(), advantage.view()).is_err());
    }

    #[test]
    fn test_head_forward_shape() {
        let head = DuelingHead::new(8, 5).unwrap();
        let streams = Array2::from_elem((3, 8), 0.2f32);
        let q = head.forward(streams.view(), streams.view()).unwrap();
        assert_eq!(q.dim(), (3, 5));
        assert_eq!(head.num_actions(), 5);
        assert_eq!(head.num_parameters(), 8 + 1 + 8 * 5 + 5);
    }
}
