use ndarray::{s, Array2, Array3, Array5, ArrayView4, Axis};
use serde::{Serialize, Deserialize};

use crate::error::{PallasError, Result};
use crate::layers::{Conv2DLayer, Conv2DLayerBuilder};

/// (filters, kernel, stride) for each convolution, applied in order.
pub const CONV_STACK: [(usize, usize, usize); 3] = [(32, 8, 4), (64, 4, 2), (64, 3, 1)];

/// Smallest height/width the convolution stack accepts.
pub const MIN_SPATIAL_SIZE: usize = 36;

/// Reorder `[batch, height, width, frames]` into `[batch, frames, height, width, 1]`.
///
/// The frame axis becomes the time axis directly after the batch axis, and
/// each frame becomes a single-channel image.
pub fn frames_as_time_steps(observations: ArrayView4<f32>) -> Array5<f32> {
    observations
        .permuted_axes([0, 3, 1, 2])
        .insert_axis(Axis(4))
        .to_owned()
}

/// Convolutional feature extractor.
///
/// In feedforward mode the stacked frames are the input channels and the
/// output is a length-1 sequence. In recurrent mode the same single-channel
/// stack runs on every frame (weights shared across time) and the output has
/// one step per frame.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FeatureExtractor {
    convs: Vec<Conv2DLayer>,
    recurrent: bool,
    input_shape: (usize, usize, usize),
    feature_size: usize,
}

impl FeatureExtractor {
    /// Build the extractor for observations of shape `(height, width, frames)`.
    pub fn new(input_shape: (usize, usize, usize), recurrent: bool) -> Result<Self> {
        let (height, width, frames) = input_shape;
        if frames == 0 {
            return Err(PallasError::configuration("input_shape", "frame count must be at least 1"));
        }
        if height < MIN_SPATIAL_SIZE || width < MIN_SPATIAL_SIZE {
            return Err(PallasError::configuration(
                "input_shape".to_string(),
                format!(
                    "{}x{} is smaller than the {}x{} the convolution stack needs",
                    height, width, MIN_SPATIAL_SIZE, MIN_SPATIAL_SIZE
                ),
            ));
        }

        let mut in_channels = if recurrent { 1 } else { frames };
        let (mut out_h, mut out_w) = (height, width);
        let mut convs = Vec::with_capacity(CONV_STACK.len());
        for &(filters, kernel, stride) in CONV_STACK.iter() {
            let conv = Conv2DLayerBuilder::new(in_channels)
                .filters(filters)
                .kernel(kernel)
                .stride(stride)
                .build()?;
            // MIN_SPATIAL_SIZE guarantees every kernel fits
            (out_h, out_w) = conv.output_dims(out_h, out_w).ok_or_else(|| {
                PallasError::configuration("input_shape", "observation too small for convolution stack")
            })?;
            in_channels = filters;
            convs.push(conv);
        }

        Ok(FeatureExtractor {
            convs,
            recurrent,
            input_shape,
            feature_size: in_channels * out_h * out_w,
        })
    }

    /// Width of the flattened feature vector for one time step.
    pub fn feature_size(&self) -> usize {
        self.feature_size
    }

    /// Number of time steps in the extracted sequence.
    pub fn sequence_len(&self) -> usize {
        if self.recurrent { self.input_shape.2 } else { 1 }
    }

    pub fn is_recurrent(&self) -> bool {
        self.recurrent
    }

    pub fn convs(&self) -> &[Conv2DLayer] {
        &self.convs
    }

    pub fn num_parameters(&self) -> usize {
        self.convs.iter().map(Conv2DLayer::num_parameters).sum()
    }

    /// Extract features from `[batch, height, width, frames]` observations.
    ///
    /// Returns `[batch, sequence_len, feature_size]`.
    pub fn forward(&self, observations: ArrayView4<f32>) -> Result<Array3<f32>> {
        self.check_observations(observations)?;
        let (batch, _, _, frames) = observations.dim();

        if !self.recurrent {
            let images = observations.permuted_axes([0, 3, 1, 2]);
            let features = self.flat_features(images)?;
            return Ok(features.insert_axis(Axis(1)));
        }

        let steps = frames_as_time_steps(observations);
        let mut sequence = Array3::zeros((batch, frames, self.feature_size));
        for (t, frame) in steps.axis_iter(Axis(1)).enumerate() {
            // [batch, height, width, 1] -> [batch, 1, height, width]
            let images = frame.permuted_axes([0, 3, 1, 2]);
            let features = self.flat_features(images)?;
            sequence.index_axis_mut(Axis(1), t).assign(&features);
        }
        Ok(sequence)
    }

    /// Features of the final frame only, as a length-1 sequence
    /// `[batch, 1, feature_size]`.
    ///
    /// Equals the last step of [`FeatureExtractor::forward`] in recurrent mode.
    pub fn forward_last_step(&self, observations: ArrayView4<f32>) -> Result<Array3<f32>> {
        if !self.recurrent {
            return self.forward(observations);
        }
        self.check_observations(observations)?;
        let frames = self.input_shape.2;
        let last_frame = observations.slice_move(s![.., .., .., frames - 1..]);
        let features = self.flat_features(last_frame.permuted_axes([0, 3, 1, 2]))?;
        Ok(features.insert_axis(Axis(1)))
    }

    fn check_observations(&self, observations: ArrayView4<f32>) -> Result<()> {
        let (_, height, width, frames) = observations.dim();
        if (height, width, frames) != self.input_shape {
            return Err(PallasError::dimension_mismatch(
                format!("observations of shape {:?}", self.input_shape),
                format!("{:?}", (height, width, frames)),
            ));
        }
        Ok(())
    }

    /// Run the convolution stack on `[batch, channels, height, width]` and flatten.
    fn flat_features(&self, images: ArrayView4<f32>) -> Result<Array2<f32>> {
        let (first, rest) = self.convs.split_first().ok_or_else(|| {
            PallasError::configuration("conv_stack", "feature extractor has no convolutions")
        })?;
        let mut activations = first.forward_batch(images)?;
        for conv in rest {
            activations = conv.forward_batch(activations.view())?;
        }
        let batch = activations.len_of(Axis(0));
        Ok(activations.into_shape((batch, self.feature_size))?)
    }
}
