//! Dense layer with a bias column, forward cache and per-example SGD update.
//!
//! A layer with `units_in` inputs and `units_out` outputs owns a
//! `units_out × (units_in + 1)` weight matrix. Column [`BIAS_COLUMN`] holds the
//! bias; every input fed to [`DenseLayer::forward`] must carry a leading `1.0`
//! (see [`prepend_bias`]).
use crate::activations::{Activation, ActivationKind};
use crate::error::{MlpError, Result};
use rand::Rng;
use std::sync::Arc;

/// Matrix type
pub type Matrix = Vec<Vec<f64>>;

/// Index of the bias weight in every weight row and of the constant 1 in every input.
pub const BIAS_COLUMN: usize = 0;

/// Copy `values` with the constant bias input prepended.
pub fn prepend_bias(values: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len() + 1);
    out.push(1.0);
    out.extend_from_slice(values);
    out
}

/// Where a layer is within one training step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerState {
    Idle,
    Forwarded,
    BackwardReady,
}

impl LayerState {
    fn name(self) -> &'static str {
        match self {
            LayerState::Idle => "idle",
            LayerState::Forwarded => "forwarded",
            LayerState::BackwardReady => "backward-ready",
        }
    }
}

/// Error signal handed one layer upstream during backpropagation.
///
/// `weights` are the full weight rows of the layer that produced `delta`;
/// `None` stands for the identity, i.e. `delta` is already the derivative of
/// the loss with respect to the receiving layer's output.
#[derive(Debug, Clone)]
pub struct BackwardSignal<'a> {
    pub delta: Vec<f64>,
    pub weights: Option<&'a Matrix>,
}

impl<'a> BackwardSignal<'a> {
    /// Signal entering the output layer: the loss derivative itself.
    pub fn from_loss(derivative: Vec<f64>) -> Self {
        Self {
            delta: derivative,
            weights: None,
        }
    }
}

/// A fully-connected (dense) layer.
#[derive(Debug, Clone)]
pub struct DenseLayer {
    units_in: usize,
    units_out: usize,
    weights: Matrix,
    activation_kind: ActivationKind,
    activation: Arc<dyn Activation>,
    is_classifier_layer: bool,
    state: LayerState,
    input: Vec<f64>,
    raw: Vec<f64>,
    output: Vec<f64>,
    delta: Vec<f64>,
}

impl DenseLayer {
    /// Create a layer with Xavier uniform weights, bias column included.
    pub fn new<R: Rng>(
        units_in: usize,
        units_out: usize,
        activation: ActivationKind,
        is_classifier_layer: bool,
        rng: &mut R,
    ) -> Self {
        // U(-sqrt(6/(fan_in+fan_out)), sqrt(6/(fan_in+fan_out)))
        let limit = (6.0f64 / (units_in + units_out).max(1) as f64).sqrt();
        let weights: Matrix = (0..units_out)
            .map(|_| (0..=units_in).map(|_| rng.gen_range(-limit..limit)).collect())
            .collect();
        Self::assemble(units_in, weights, activation, is_classifier_layer)
    }

    /// Build a layer from explicit weights (`units_out` rows) and biases.
    pub fn from_parts(
        weights: Matrix,
        bias: Vec<f64>,
        activation: ActivationKind,
        is_classifier_layer: bool,
    ) -> Result<Self> {
        if weights.len() != bias.len() {
            return Err(MlpError::dimension(
                "DenseLayer: bias terms",
                weights.len(),
                bias.len(),
            ));
        }
        let units_in = weights.first().map_or(0, Vec::len);
        let full: Matrix = weights
            .into_iter()
            .zip(bias)
            .map(|(row, b)| {
                let mut full_row = Vec::with_capacity(row.len() + 1);
                full_row.push(b);
                full_row.extend(row);
                full_row
            })
            .collect();
        Self::with_weights(units_in, full, activation, is_classifier_layer)
    }

    /// Build a layer from a weight matrix that already contains the bias column.
    pub fn with_weights(
        units_in: usize,
        weights: Matrix,
        activation: ActivationKind,
        is_classifier_layer: bool,
    ) -> Result<Self> {
        if let Some(row) = weights.iter().find(|row| row.len() != units_in + 1) {
            return Err(MlpError::dimension(
                "DenseLayer: weight row",
                units_in + 1,
                row.len(),
            ));
        }
        Ok(Self::assemble(
            units_in,
            weights,
            activation,
            is_classifier_layer,
        ))
    }

    fn assemble(
        units_in: usize,
        weights: Matrix,
        activation: ActivationKind,
        is_classifier_layer: bool,
    ) -> Self {
        Self {
            units_in,
            units_out: weights.len(),
            weights,
            activation_kind: activation,
            activation: activation.to_arc(),
            is_classifier_layer,
            state: LayerState::Idle,
            input: Vec::new(),
            raw: Vec::new(),
            output: Vec::new(),
            delta: Vec::new(),
        }
    }

    pub fn units_in(&self) -> usize {
        self.units_in
    }

    pub fn units_out(&self) -> usize {
        self.units_out
    }

    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    pub fn activation(&self) -> ActivationKind {
        self.activation_kind
    }

    pub fn is_classifier_layer(&self) -> bool {
        self.is_classifier_layer
    }

    pub fn state(&self) -> LayerState {
        self.state
    }

    /// Output of the last forward pass.
    pub fn output(&self) -> &[f64] {
        &self.output
    }

    /// Delta of the last backward pass.
    pub fn delta(&self) -> &[f64] {
        &self.delta
    }

    /// Number of trainable weights, bias column included.
    pub fn parameter_count(&self) -> usize {
        self.units_out * (self.units_in + 1)
    }

    /// Forward pass: `raw = W·input`, `output = act(raw)`.
    ///
    /// `input` must already start with the bias constant.
    pub fn forward(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        if input.len() != self.units_in + 1 {
            return Err(MlpError::dimension(
                "DenseLayer: bad input dimensions",
                self.units_in + 1,
                input.len(),
            ));
        }
        let raw: Vec<f64> = self
            .weights
            .iter()
            .map(|row| row.iter().zip(input).map(|(&w, &x)| w * x).sum())
            .collect();
        let output = self.activation.apply(&raw);
        self.input = input.to_vec();
        self.raw = raw;
        self.output = output.clone();
        self.state = LayerState::Forwarded;
        Ok(output)
    }

    /// Backward step: compute this layer's delta from the downstream signal.
    ///
    /// `delta_j = (Σ_k upstream.delta_k · W_next[k][j + 1]) · act'(raw_j)`, or
    /// `upstream.delta_j · act'(raw_j)` when the signal carries no weights.
    /// Returns this layer's delta together with its own weights for the layer
    /// one step further upstream.
    pub fn compute_derivative<'a>(
        &'a mut self,
        upstream: &BackwardSignal<'_>,
    ) -> Result<BackwardSignal<'a>> {
        if self.state != LayerState::Forwarded {
            return Err(MlpError::LayerOrder {
                operation: "compute the local derivative",
                state: self.state.name(),
            });
        }
        let error = match upstream.weights {
            None => {
                if upstream.delta.len() != self.units_out {
                    return Err(MlpError::dimension(
                        "DenseLayer: loss derivative",
                        self.units_out,
                        upstream.delta.len(),
                    ));
                }
                upstream.delta.clone()
            }
            Some(next_weights) => self.propagate_through(&upstream.delta, next_weights)?,
        };
        let slope = self.activation.derivative(&self.raw);
        self.delta = error.iter().zip(&slope).map(|(&e, &s)| e * s).collect();
        self.state = LayerState::BackwardReady;
        Ok(BackwardSignal {
            delta: self.delta.clone(),
            weights: Some(&self.weights),
        })
    }

    // delta · W_next with W_next's bias column skipped
    fn propagate_through(&self, delta: &[f64], next_weights: &Matrix) -> Result<Vec<f64>> {
        if next_weights.len() != delta.len() {
            return Err(MlpError::dimension(
                "DenseLayer: downstream delta",
                next_weights.len(),
                delta.len(),
            ));
        }
        let mut error = vec![0.0; self.units_out];
        for (row, &d) in next_weights.iter().zip(delta) {
            if row.len() != self.units_out + 1 {
                return Err(MlpError::dimension(
                    "DenseLayer: downstream weight row",
                    self.units_out + 1,
                    row.len(),
                ));
            }
            for (e, &w) in error.iter_mut().zip(&row[BIAS_COLUMN + 1..]) {
                *e += d * w;
            }
        }
        Ok(error)
    }

    /// Parameter update: `W -= lr * (delta ⊗ input)`.
    pub fn update_weights(&mut self, learning_rate: f64) -> Result<()> {
        if self.state != LayerState::BackwardReady {
            return Err(MlpError::LayerOrder {
                operation: "update weights",
                state: self.state.name(),
            });
        }
        for (row, &d) in self.weights.iter_mut().zip(&self.delta) {
            for (w, &x) in row.iter_mut().zip(&self.input) {
                *w -= learning_rate * d * x;
            }
        }
        self.state = LayerState::Idle;
        Ok(())
    }
}
