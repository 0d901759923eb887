use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize};

use crate::error::{PallasError, Result};

/// How observations flow into the output head.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topology {
    /// Stacked frames are convolution channels; one dense hidden layer.
    Feedforward,
    /// Frames become time steps; a dense trunk on the final step.
    ///
    /// Only the last frame reaches the output, so the result matches a
    /// single-frame network and earlier frames are never convolved.
    RecurrentDense,
    /// Frames become time steps; an LSTM trunk.
    RecurrentLstm,
    /// Frames become time steps; a GRU trunk.
    RecurrentGru,
}

impl Topology {
    pub fn is_recurrent(&self) -> bool {
        !matches!(self, Topology::Feedforward)
    }
}

/// Output head producing the action-value vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Head {
    Plain,
    Dueling,
}

/// A fully parsed network architecture.
///
/// Parsed once from a name such as `"dueling_drqn_lstm"`; the network builder
/// only ever looks at this value, never at the name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Architecture {
    pub topology: Topology,
    pub head: Head,
}

impl Architecture {
    pub fn new(topology: Topology, head: Head) -> Self {
        Architecture { topology, head }
    }

    /// Parse an architecture name.
    ///
    /// Keywords are matched as substrings: `drqn` selects a recurrent network
    /// whose trunk is `lstm`, else `gru`, else dense; otherwise `dqn` selects
    /// the feedforward network. `dueling` anywhere selects the dueling head.
    pub fn parse(name: &str) -> Result<Self> {
        let head = if name.contains("dueling") { Head::Dueling } else { Head::Plain };

        let topology = if name.contains("drqn") {
            if name.contains("lstm") {
                Topology::RecurrentLstm
            } else if name.contains("gru") {
                Topology::RecurrentGru
            } else {
                Topology::RecurrentDense
            }
        } else if name.contains("dqn") {
            if name.contains("lstm") || name.contains("gru") {
                return Err(PallasError::configuration(
                    "architecture".to_string(),
                    format!("'{}': lstm/gru cells require a drqn network", name),
                ));
            }
            Topology::Feedforward
        } else {
            return Err(PallasError::configuration(
                "architecture".to_string(),
                format!("'{}' names neither dqn nor drqn", name),
            ));
        };

        Ok(Architecture { topology, head })
    }

    /// Canonical name; parses back to the same architecture.
    pub fn name(&self) -> String {
        let base = match self.topology {
            Topology::Feedforward => "dqn",
            Topology::RecurrentDense => "drqn",
            Topology::RecurrentLstm => "drqn_lstm",
            Topology::RecurrentGru => "drqn_gru",
        };
        match self.head {
            Head::Plain => base.to_string(),
            Head::Dueling => format!("dueling_{}", base),
        }
    }
}

impl Default for Architecture {
    fn default() -> Self {
        Architecture::new(Topology::Feedforward, Head::Plain)
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for Architecture {
    type Err = PallasError;

    fn from_str(s: &str) -> Result<Self> {
        Architecture::parse(s)
    }
}

impl TryFrom<String> for Architecture {
    type Error = PallasError;

    fn try_from(value: String) -> Result<Self> {
        Architecture::parse(&value)
    }
}

impl From<Architecture> for String {
    fn from(arch: Architecture) -> Self {
        arch.name()
    }
}
