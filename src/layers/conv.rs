//! 2D convolution over image planes
//!
//! Inputs are laid out `[batch, channels, height, width]`. Convolutions are
//! unpadded ("valid"), so every output pixel sees a full kernel window.

use ndarray::{s, Array1, Array2, Array4, ArrayView3, ArrayView4, Axis};
use serde::{Serialize, Deserialize};

use crate::activations::Activation;
use crate::error::{PallasError, Result};
use crate::layers::initialization::WeightInit;

/// 2D Convolutional Layer
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Conv2DLayer {
    /// Convolution kernels [out_channels, in_channels, kernel_height, kernel_width]
    pub kernels: Array4<f32>,

    /// Bias terms for each output channel
    pub biases: Array1<f32>,

    /// Activation function
    pub activation: Activation,

    /// Stride for convolution
    pub stride: (usize, usize),

    /// Number of input channels
    pub in_channels: usize,

    /// Number of output channels (filters)
    pub out_channels: usize,

    /// Kernel size
    pub kernel_size: (usize, usize),
}

impl Conv2DLayer {
    /// Create a new 2D convolutional layer
    pub fn new(
        in_channels: usize,
        out_channels: usize,
        kernel_size: (usize, usize),
        stride: (usize, usize),
        activation: Activation,
    ) -> Result<Self> {
        if stride.0 == 0 || stride.1 == 0 {
            return Err(PallasError::configuration("stride", "stride must be positive"));
        }

        let weight_init = WeightInit::for_activation(&activation);
        let receptive_field = kernel_size.0 * kernel_size.1;
        let kernels = weight_init.initialize(
            (out_channels, in_channels, kernel_size.0, kernel_size.1),
            in_channels * receptive_field,
            out_channels * receptive_field,
        )?;

        Ok(Conv2DLayer {
            kernels,
            biases: Array1::zeros(out_channels),
            activation,
            stride,
            in_channels,
            out_channels,
            kernel_size,
        })
    }

    /// Spatial output size for an input of `height x width`, or `None` when
    /// the kernel does not fit.
    pub fn output_dims(&self, height: usize, width: usize) -> Option<(usize, usize)> {
        if height < self.kernel_size.0 || width < self.kernel_size.1 {
            return None;
        }
        Some((
            (height - self.kernel_size.0) / self.stride.0 + 1,
            (width - self.kernel_size.1) / self.stride.1 + 1,
        ))
    }

    /// Number of trainable parameters
    pub fn num_parameters(&self) -> usize {
        self.kernels.len() + self.biases.len()
    }

    /// Forward pass for a batch of images [batch, channels, height, width]
    pub fn forward_batch(&self, input: ArrayView4<f32>) -> Result<Array4<f32>> {
        let (batch_size, channels, in_height, in_width) = input.dim();
        if channels != self.in_channels {
            return Err(PallasError::dimension_mismatch(
                format!("{} input channels", self.in_channels),
                format!("{} input channels", channels),
            ));
        }
        let (out_height, out_width) = self.output_dims(in_height, in_width).ok_or_else(|| {
            PallasError::dimension_mismatch(
                format!("an image of at least {:?}", self.kernel_size),
                format!("{}x{}", in_height, in_width),
            )
        })?;

        let patch_len = self.in_channels * self.kernel_size.0 * self.kernel_size.1;
        let kernels = self.kernels.view().into_shape((self.out_channels, patch_len))?;
        let biases = self.biases.view().insert_axis(Axis(1));

        let mut output = Array4::zeros((batch_size, self.out_channels, out_height, out_width));
        for (b, image) in input.axis_iter(Axis(0)).enumerate() {
            let patches = self.extract_patches(image, out_height, out_width);
            // [out_channels, out_height * out_width]
            let mut response = kernels.dot(&patches.t()) + &biases;
            self.activation.apply(&mut response);
            let response = response.into_shape((self.out_channels, out_height, out_width))?;
            output.slice_mut(s![b, .., .., ..]).assign(&response);
        }

        Ok(output)
    }

    /// Unroll every kernel window into a row: [out_height * out_width, patch_len]
    fn extract_patches(
        &self,
        image: ArrayView3<f32>,
        out_height: usize,
        out_width: usize,
    ) -> Array2<f32> {
        let (kh, kw) = self.kernel_size;
        let patch_len = self.in_channels * kh * kw;
        let mut patches = Array2::zeros((out_height * out_width, patch_len));

        for oh in 0..out_height {
            for ow in 0..out_width {
                let h_start = oh * self.stride.0;
                let w_start = ow * self.stride.1;
                let window = image.slice(s![.., h_start..h_start + kh, w_start..w_start + kw]);
                let mut row = patches.row_mut(oh * out_width + ow);
                for (dst, &src) in row.iter_mut().zip(window.iter()) {
                    *dst = src;
                }
            }
        }

        patches
    }
}

/// Builder for one convolution of a stack.
///
/// Starts from the channel count of the incoming planes; square kernels and
/// strides, ReLU unless told otherwise.
#[derive(Clone, Debug)]
pub struct Conv2DLayerBuilder {
    in_channels: usize,
    filters: Option<usize>,
    kernel: Option<usize>,
    stride: usize,
    activation: Activation,
}

impl Conv2DLayerBuilder {
    pub fn new(in_channels: usize) -> Self {
        Conv2DLayerBuilder {
            in_channels,
            filters: None,
            kernel: None,
            stride: 1,
            activation: Activation::Relu,
        }
    }

    pub fn filters(mut self, filters: usize) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn kernel(mut self, size: usize) -> Self {
        self.kernel = Some(size);
        self
    }

    pub fn stride(mut self, stride: usize) -> Self {
        self.stride = stride;
        self
    }

    pub fn activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    pub fn build(self) -> Result<Conv2DLayer> {
        if self.in_channels == 0 {
            return Err(PallasError::configuration("in_channels", "a convolution needs input channels"));
        }
        let filters = self.filters.ok_or_else(|| PallasError::configuration("filters", "filter count not set"))?;
        let kernel = self.kernel.ok_or_else(|| PallasError::configuration("kernel", "kernel size not set"))?;
        if filters == 0 || kernel == 0 {
            return Err(PallasError::configuration(
                "conv".to_string(),
                format!("{} filters of size {} is empty", filters, kernel),
            ));
        }
        Conv2DLayer::new(self.in_channels, filters, (kernel, kernel), (self.stride, self.stride), self.activation)
    }
}
