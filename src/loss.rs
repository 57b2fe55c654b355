//! Loss functions for training neural networks.
//!
//! Each loss provides a scalar error and its derivative with respect to the
//! network output, so that `W -= lr * delta ⊗ input` descends the error.
use crate::activations::PROBABILITY_EPS;
use crate::error::{MlpError, Result};
use std::fmt;
use std::str::FromStr;

/// Trait for loss functions.
pub trait Loss: fmt::Debug + Send + Sync {
    /// Identifier as accepted by [`LossKind::from_str`].
    fn name(&self) -> &'static str;
    /// Scalar error of `output` against `target`.
    fn calculate_error(&self, target: &[f64], output: &[f64]) -> f64;
    /// Derivative of the error with respect to each output unit.
    fn calculate_derivative(&self, target: &[f64], output: &[f64]) -> Vec<f64>;
}

fn clamp_probability(p: f64) -> f64 {
    p.clamp(PROBABILITY_EPS, 1.0 - PROBABILITY_EPS)
}

/// Binary cross-entropy, summed over output units.
#[derive(Debug, Clone, Default)]
pub struct BinaryCrossEntropyError;

impl Loss for BinaryCrossEntropyError {
    fn name(&self) -> &'static str {
        "bce"
    }

    fn calculate_error(&self, target: &[f64], output: &[f64]) -> f64 {
        target
            .iter()
            .zip(output)
            .map(|(&t, &o)| {
                let o = clamp_probability(o);
                -(t * o.ln() + (1.0 - t) * (1.0 - o).ln())
            })
            .sum()
    }

    fn calculate_derivative(&self, target: &[f64], output: &[f64]) -> Vec<f64> {
        target
            .iter()
            .zip(output)
            .map(|(&t, &o)| {
                let o = clamp_probability(o);
                (o - t) / (o * (1.0 - o))
            })
            .collect()
    }
}

/// Half the sum of squared differences.
#[derive(Debug, Clone, Default)]
pub struct SumSquaredError;

impl Loss for SumSquaredError {
    fn name(&self) -> &'static str {
        "sse"
    }

    fn calculate_error(&self, target: &[f64], output: &[f64]) -> f64 {
        0.5 * target
            .iter()
            .zip(output)
            .map(|(&t, &o)| (t - o).powi(2))
            .sum::<f64>()
    }

    fn calculate_derivative(&self, target: &[f64], output: &[f64]) -> Vec<f64> {
        target.iter().zip(output).map(|(&t, &o)| o - t).collect()
    }
}

/// Mean of squared differences.
#[derive(Debug, Clone, Default)]
pub struct MeanSquaredError;

impl Loss for MeanSquaredError {
    fn name(&self) -> &'static str {
        "mse"
    }

    fn calculate_error(&self, target: &[f64], output: &[f64]) -> f64 {
        if target.is_empty() {
            return 0.0;
        }
        target
            .iter()
            .zip(output)
            .map(|(&t, &o)| (t - o).powi(2))
            .sum::<f64>()
            / target.len() as f64
    }

    fn calculate_derivative(&self, target: &[f64], output: &[f64]) -> Vec<f64> {
        let n = target.len().max(1) as f64;
        target
            .iter()
            .zip(output)
            .map(|(&t, &o)| 2.0 * (o - t) / n)
            .collect()
    }
}

/// Plain difference `target - output`.
#[derive(Debug, Clone, Default)]
pub struct DifferentError;

impl Loss for DifferentError {
    fn name(&self) -> &'static str {
        "different"
    }

    fn calculate_error(&self, target: &[f64], output: &[f64]) -> f64 {
        target.iter().zip(output).map(|(&t, &o)| t - o).sum()
    }

    fn calculate_derivative(&self, target: &[f64], output: &[f64]) -> Vec<f64> {
        target.iter().zip(output).map(|(&t, &o)| o - t).collect()
    }
}

/// Absolute difference `|target - output|`.
#[derive(Debug, Clone, Default)]
pub struct AbsoluteError;

impl Loss for AbsoluteError {
    fn name(&self) -> &'static str {
        "absolute"
    }

    fn calculate_error(&self, target: &[f64], output: &[f64]) -> f64 {
        target.iter().zip(output).map(|(&t, &o)| (t - o).abs()).sum()
    }

    fn calculate_derivative(&self, target: &[f64], output: &[f64]) -> Vec<f64> {
        target
            .iter()
            .zip(output)
            .map(|(&t, &o)| {
                if o > t {
                    1.0
                } else if o < t {
                    -1.0
                } else {
                    0.0
                }
            })
            .collect()
    }
}

/// Loss identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossKind {
    Bce,
    Sse,
    Mse,
    Different,
    Absolute,
}

impl LossKind {
    pub fn to_box(self) -> Box<dyn Loss> {
        match self {
            LossKind::Bce => Box::new(BinaryCrossEntropyError),
            LossKind::Sse => Box::new(SumSquaredError),
            LossKind::Mse => Box::new(MeanSquaredError),
            LossKind::Different => Box::new(DifferentError),
            LossKind::Absolute => Box::new(AbsoluteError),
        }
    }
}

impl FromStr for LossKind {
    type Err = MlpError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bce" => Ok(LossKind::Bce),
            "sse" => Ok(LossKind::Sse),
            "mse" => Ok(LossKind::Mse),
            "different" => Ok(LossKind::Different),
            "absolute" => Ok(LossKind::Absolute),
            _ => Err(MlpError::UnknownLoss(s.to_string())),
        }
    }
}

/// Resolve a loss identifier to its implementation.
pub fn get_loss(name: &str) -> Result<Box<dyn Loss>> {
    Ok(name.parse::<LossKind>()?.to_box())
}
