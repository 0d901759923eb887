use crate::network::{Architecture, QNetwork};
use crate::error::{Result, PallasError};

/// Builder for constructing Q-networks with a fluent API
pub struct NetworkBuilder {
    input_shape: Option<(usize, usize, usize)>,
    num_actions: Option<usize>,
    architecture: Result<Architecture>,
    hidden_width: usize,
}

impl NetworkBuilder {
    /// Create a new network builder for a plain `dqn` with 256 hidden units
    pub fn new() -> Self {
        NetworkBuilder {
            input_shape: None,
            num_actions: None,
            architecture: Ok(Architecture::default()),
            hidden_width: 256,
        }
    }

    /// Set the observation shape `(height, width, frames)`
    pub fn input_shape(mut self, shape: (usize, usize, usize)) -> Self {
        self.input_shape = Some(shape);
        self
    }

    /// Set the number of discrete actions
    pub fn num_actions(mut self, num_actions: usize) -> Self {
        self.num_actions = Some(num_actions);
        self
    }

    /// Set an already parsed architecture
    pub fn architecture(mut self, architecture: Architecture) -> Self {
        self.architecture = Ok(architecture);
        self
    }

    /// Set the architecture by name; a bad name is reported by `build`
    pub fn architecture_name(mut self, name: &str) -> Self {
        self.architecture = Architecture::parse(name);
        self
    }

    /// Set the width of the hidden layer(s)
    pub fn hidden_width(mut self, width: usize) -> Self {
        self.hidden_width = width;
        self
    }

    /// Build the network
    pub fn build(self) -> Result<QNetwork> {
        let input_shape = self.input_shape.ok_or_else(|| {
            PallasError::configuration("input_shape", "Input shape not specified")
        })?;
        let num_actions = self.num_actions.ok_or_else(|| {
            PallasError::configuration("num_actions", "Number of actions not specified")
        })?;

        QNetwork::new(input_shape, num_actions, self.architecture?, self.hidden_width)
    }
}

impl Default for NetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
