//! Construction-time configuration of the network.
//!
//! Parsed from camelCase JSON, e.g.
//!
//! ```json
//! {
//!   "loss": "bce",
//!   "learningRate": 0.005,
//!   "epochs": 30,
//!   "hiddenLayers": [
//!     { "unitsIn": 128, "unitsOut": 32, "activation": "sigmoid", "isOutput": true }
//!   ]
//! }
//! ```
//!
//! Loss and activation identifiers stay strings here; they are resolved when the
//! network is built so unknown names surface as configuration errors there.
use crate::error::{MlpError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_loss() -> String {
    "bce".to_string()
}

fn default_learning_rate() -> f64 {
    0.01
}

fn default_epochs() -> usize {
    50
}

fn default_input_units() -> usize {
    128
}

fn default_num_classes() -> usize {
    10
}

fn default_seed() -> u64 {
    42
}

fn default_activation() -> String {
    "sigmoid".to_string()
}

/// One hidden layer between the input and output layers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LayerSpec {
    pub units_in: usize,
    pub units_out: usize,
    #[serde(default = "default_activation")]
    pub activation: String,
    #[serde(default)]
    pub is_output: bool,
}

impl LayerSpec {
    pub fn new(units_in: usize, units_out: usize, activation: &str, is_output: bool) -> Self {
        Self {
            units_in,
            units_out,
            activation: activation.to_string(),
            is_output,
        }
    }

    /// Sigmoid layer.
    pub fn sigmoid(units_in: usize, units_out: usize) -> Self {
        Self::new(units_in, units_out, "sigmoid", false)
    }
}

/// Hyperparameters and layer layout for [`crate::network::MLP`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MlpConfig {
    /// One of `bce`, `sse`, `mse`, `different`, `absolute`.
    #[serde(default = "default_loss")]
    pub loss: String,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default = "default_epochs")]
    pub epochs: usize,
    /// Output width of the input layer.
    #[serde(default = "default_input_units")]
    pub input_units: usize,
    #[serde(default = "default_num_classes")]
    pub num_classes: usize,
    #[serde(default)]
    pub hidden_layers: Vec<LayerSpec>,
    /// Seed for weight initialization.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for MlpConfig {
    fn default() -> Self {
        Self {
            loss: default_loss(),
            learning_rate: default_learning_rate(),
            epochs: default_epochs(),
            input_units: default_input_units(),
            num_classes: default_num_classes(),
            hidden_layers: Vec::new(),
            seed: default_seed(),
        }
    }
}

impl MlpConfig {
    /// Loads a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: MlpConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check ranges and that the hidden layers chain onto each other.
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(MlpError::InvalidConfig(format!(
                "learning rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if self.epochs == 0 {
            return Err(MlpError::InvalidConfig("epochs must be positive".into()));
        }
        if self.num_classes == 0 {
            return Err(MlpError::InvalidConfig("num_classes must be positive".into()));
        }
        if self.input_units == 0 {
            return Err(MlpError::InvalidConfig("input_units must be positive".into()));
        }
        let mut width = self.input_units;
        for (i, spec) in self.hidden_layers.iter().enumerate() {
            if spec.units_in != width {
                return Err(MlpError::InvalidConfig(format!(
                    "hidden layer {} expects {} inputs but the previous layer has {} outputs",
                    i, spec.units_in, width
                )));
            }
            if spec.units_out == 0 {
                return Err(MlpError::InvalidConfig(format!(
                    "hidden layer {} has no units",
                    i
                )));
            }
            width = spec.units_out;
        }
        Ok(())
    }

    /// Input width of the output layer.
    pub fn last_hidden_width(&self) -> usize {
        self.hidden_layers
            .last()
            .map_or(self.input_units, |spec| spec.units_out)
    }
}
