use ndarray::{Array, Dimension, ShapeBuilder};
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::{StandardNormal, Uniform};

use crate::activations::Activation;
use crate::error::{PallasError, Result};

/// Weight initialization strategies
#[derive(Debug, Clone, PartialEq)]
pub enum WeightInit {
    /// Xavier/Glorot uniform, for linear and saturating activations
    XavierUniform,

    /// He/Kaiming normal, for ReLU
    HeNormal,

    /// Uniform over `[min, max)`; recurrent cells scale this by their width
    Uniform { min: f32, max: f32 },
}

impl WeightInit {
    /// Initialize a weight tensor of any shape.
    ///
    /// `fan_in` and `fan_out` are the number of inputs and outputs feeding one
    /// unit; for a convolution kernel these include the receptive field size.
    pub fn initialize<Sh, D>(&self, shape: Sh, fan_in: usize, fan_out: usize) -> Result<Array<f32, D>>
    where
        Sh: ShapeBuilder<Dim = D>,
        D: Dimension,
    {
        if fan_in == 0 || fan_out == 0 {
            return Err(PallasError::configuration(
                "fan_in/fan_out",
                "layer sizes must be positive",
            ));
        }

        let weights = match self {
            WeightInit::XavierUniform => {
                let limit = (6.0 / (fan_in + fan_out) as f32).sqrt();
                Self::uniform(shape, -limit, limit)?
            }

            WeightInit::HeNormal => {
                let std = (2.0 / fan_in as f32).sqrt();
                Self::normal(shape, std)
            }

            WeightInit::Uniform { min, max } => Self::uniform(shape, *min, *max)?,
        };

        Ok(weights)
    }

    fn uniform<Sh, D>(shape: Sh, min: f32, max: f32) -> Result<Array<f32, D>>
    where
        Sh: ShapeBuilder<Dim = D>,
        D: Dimension,
    {
        if !(min.is_finite() && max.is_finite() && min < max) {
            return Err(PallasError::configuration(
                "uniform range".to_string(),
                format!("expected finite min < max, got [{}, {})", min, max),
            ));
        }
        Ok(Array::random(shape, Uniform::new(min, max)))
    }

    fn normal<Sh, D>(shape: Sh, std: f32) -> Array<f32, D>
    where
        Sh: ShapeBuilder<Dim = D>,
        D: Dimension,
    {
        let standard: Array<f32, D> = Array::random(shape, StandardNormal);
        standard.mapv(|v| std * v)
    }

    /// Get the recommended initialization for an activation function
    pub fn for_activation(activation: &Activation) -> Self {
        match activation {
            Activation::Relu => WeightInit::HeNormal,
            Activation::Sigmoid | Activation::Tanh | Activation::Linear => WeightInit::XavierUniform,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array4};

    #[test]
    fn test_initialize_shapes() {
        let w: Array2<f32> = WeightInit::XavierUniform.initialize((4, 3), 4, 3).unwrap();
        assert_eq!(w.dim(), (4, 3));

        let k: Array4<f32> = WeightInit::HeNormal.initialize((8, 1, 3, 3), 9, 72).unwrap();
        assert_eq!(k.dim(), (8, 1, 3, 3));
    }

    #[test]
    fn test_xavier_uniform_bounds() {
        let w: Array2<f32> = WeightInit::XavierUniform.initialize((10, 10), 10, 10).unwrap();
        let limit = (6.0f32 / 20.0).sqrt();
        assert!(w.iter().all(|&v| v >= -limit && v < limit));
    }

    #[test]
    fn test_he_normal_spread_tracks_fan_in() {
        let w: Array2<f32> = WeightInit::HeNormal.initialize((200, 50), 200, 50).unwrap();
        let std = (w.mapv(|v| v * v).sum() / w.len() as f32).sqrt();
        assert!((std - 0.1).abs() < 0.01, "std was {}", std);
    }

    #[test]
    fn test_invalid_ranges_are_rejected() {
        let bad = WeightInit::Uniform { min: 1.0, max: -1.0 };
        assert!(bad.initialize::<_, ndarray::Ix2>((2, 2), 2, 2).is_err());

        let bad = WeightInit::Uniform { min: f32::NAN, max: 1.0 };
        assert!(bad.initialize::<_, ndarray::Ix2>((2, 2), 2, 2).is_err());

        assert!(WeightInit::XavierUniform.initialize::<_, ndarray::Ix2>((0, 2), 0, 2).is_err());
    }
}
