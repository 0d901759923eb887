use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// Trait defining the forward interface shared by flat-input layers
pub trait Layer: Send + Sync {
    /// Perform forward propagation for a batch of inputs `[batch, input_size]`
    fn forward_batch(&self, inputs: ArrayView2<f32>) -> Array2<f32>;

    /// Perform forward propagation for a single input
    fn forward(&self, input: ArrayView1<f32>) -> Array1<f32> {
        let output = self.forward_batch(input.insert_axis(Axis(0)));
        output.index_axis_move(Axis(0), 0)
    }

    /// Get the output size of the layer
    fn output_size(&self) -> usize;

    /// Get the input size of the layer
    fn input_size(&self) -> usize;

    /// Number of trainable parameters
    fn num_parameters(&self) -> usize;

    /// Clone the layer into a boxed trait object
    fn clone_box(&self) -> Box<dyn Layer>;
}

impl Clone for Box<dyn Layer> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
