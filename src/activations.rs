//! Activation functions and their derivatives.
//!
//! Every activation maps a pre-activation vector to an output vector of the same
//! length. Elementwise activations are built from a scalar function; softmax
//! normalizes over the whole vector.
use crate::error::{MlpError, Result};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Trait for activation functions.
pub trait Activation: fmt::Debug + Send + Sync {
    /// Activation of a whole pre-activation vector.
    fn apply(&self, x: &[f64]) -> Vec<f64>;
    /// Derivative evaluated at a pre-activation vector, one entry per unit.
    fn derivative(&self, x: &[f64]) -> Vec<f64>;
}

/// Smallest distance a probability is kept from 0 and 1 in derivatives.
pub const PROBABILITY_EPS: f64 = 1e-12;

/// Sigmoid: 1 / (1 + exp(-x))
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Sigmoid derivative at the pre-activation `x`.
pub fn sigmoid_derivative(x: f64) -> f64 {
    let s = sigmoid(x);
    s * (1.0 - s)
}

/// Softmax with the max subtracted before exponentiation.
pub fn softmax(x: &[f64]) -> Vec<f64> {
    if x.is_empty() {
        return Vec::new();
    }
    let max = x.iter().fold(f64::MIN, |a, &b| a.max(b));
    let exps: Vec<f64> = x.iter().map(|&xi| (xi - max).exp()).collect();
    let exp_sum: f64 = exps.iter().sum();
    if !exp_sum.is_finite() || exp_sum <= 0.0 {
        // NaN input; uniform keeps arg-max and sums well defined
        let n = x.len() as f64;
        return vec![1.0 / n; x.len()];
    }
    exps.into_iter().map(|e| e / exp_sum).collect()
}

fn map(x: &[f64], f: impl Fn(f64) -> f64) -> Vec<f64> {
    x.iter().map(|&xi| f(xi)).collect()
}

#[derive(Debug, Clone, Default)]
pub struct Sigmoid;

impl Activation for Sigmoid {
    fn apply(&self, x: &[f64]) -> Vec<f64> {
        map(x, sigmoid)
    }
    fn derivative(&self, x: &[f64]) -> Vec<f64> {
        map(x, sigmoid_derivative)
    }
}

/// Tanh
#[derive(Debug, Clone, Default)]
pub struct Tanh;

impl Activation for Tanh {
    fn apply(&self, x: &[f64]) -> Vec<f64> {
        map(x, f64::tanh)
    }
    fn derivative(&self, x: &[f64]) -> Vec<f64> {
        map(x, |v| 1.0 - v.tanh().powi(2))
    }
}

/// ReLU: max(0, x)
#[derive(Debug, Clone, Default)]
pub struct ReLU;

impl Activation for ReLU {
    fn apply(&self, x: &[f64]) -> Vec<f64> {
        map(x, |v| v.max(0.0))
    }
    fn derivative(&self, x: &[f64]) -> Vec<f64> {
        map(x, |v| (v > 0.0) as u8 as f64)
    }
}

/// Linear: identity
#[derive(Debug, Clone, Default)]
pub struct Linear;

impl Activation for Linear {
    fn apply(&self, x: &[f64]) -> Vec<f64> {
        x.to_vec()
    }
    fn derivative(&self, x: &[f64]) -> Vec<f64> {
        vec![1.0; x.len()]
    }
}

/// Softmax over the whole vector.
///
/// The derivative is the diagonal of the Jacobian, `s_i * (1 - s_i)`, which is
/// what the layer multiplies elementwise into its delta. `s_i` is clamped to
/// the same range the cross-entropy derivative uses, so the two cancel to
/// `s - t` even for saturated outputs.
#[derive(Debug, Clone, Default)]
pub struct Softmax;

impl Activation for Softmax {
    fn apply(&self, x: &[f64]) -> Vec<f64> {
        softmax(x)
    }
    fn derivative(&self, x: &[f64]) -> Vec<f64> {
        softmax(x)
            .into_iter()
            .map(|s| {
                let s = s.clamp(PROBABILITY_EPS, 1.0 - PROBABILITY_EPS);
                s * (1.0 - s)
            })
            .collect()
    }
}

/// Activation identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationKind {
    Sigmoid,
    Softmax,
    Tanh,
    ReLU,
    Linear,
}

impl ActivationKind {
    pub fn to_arc(self) -> Arc<dyn Activation> {
        match self {
            ActivationKind::Sigmoid => Arc::new(Sigmoid),
            ActivationKind::Softmax => Arc::new(Softmax),
            ActivationKind::Tanh => Arc::new(Tanh),
            ActivationKind::ReLU => Arc::new(ReLU),
            ActivationKind::Linear => Arc::new(Linear),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ActivationKind::Sigmoid => "sigmoid",
            ActivationKind::Softmax => "softmax",
            ActivationKind::Tanh => "tanh",
            ActivationKind::ReLU => "relu",
            ActivationKind::Linear => "linear",
        }
    }
}

impl FromStr for ActivationKind {
    type Err = MlpError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sigmoid" => Ok(ActivationKind::Sigmoid),
            "softmax" => Ok(ActivationKind::Softmax),
            "tanh" => Ok(ActivationKind::Tanh),
            "relu" | "rectified" => Ok(ActivationKind::ReLU),
            "linear" | "identity" => Ok(ActivationKind::Linear),
            _ => Err(MlpError::UnknownActivation(s.to_string())),
        }
    }
}

impl fmt::Display for ActivationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolve an activation identifier to its implementation.
pub fn get_activation(name: &str) -> Result<Arc<dyn Activation>> {
    Ok(name.parse::<ActivationKind>()?.to_arc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sigmoid_zero() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert_eq!(sigmoid_derivative(0.0), 0.25);
    }

    #[test]
    fn test_sigmoid_three() {
        assert_relative_eq!(sigmoid(3.0), 0.9526, epsilon = 1e-4);
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let out = softmax(&[1.0, 2.0, 3.0]);
        assert_relative_eq!(out.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert!(out[2] > out[1] && out[1] > out[0]);
    }

    #[test]
    fn test_softmax_numerical_stability() {
        let out = softmax(&[1000.0, 1001.0, 1002.0]);
        assert!(out.iter().all(|v| v.is_finite()));
        assert_relative_eq!(out.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_softmax_derivative_is_jacobian_diagonal() {
        let x = [0.5, -1.0];
        let s = softmax(&x);
        let d = Softmax.derivative(&x);
        for i in 0..2 {
            assert_relative_eq!(d[i], s[i] * (1.0 - s[i]), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_relu_mixed() {
        assert_eq!(ReLU.apply(&[-2.0, 0.0, 3.0]), vec![0.0, 0.0, 3.0]);
        assert_eq!(ReLU.derivative(&[-2.0, 0.0, 3.0]), vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_parse_identifiers() {
        assert_eq!("Sigmoid".parse::<ActivationKind>().unwrap(), ActivationKind::Sigmoid);
        assert_eq!("identity".parse::<ActivationKind>().unwrap(), ActivationKind::Linear);
        let err = "swishy".parse::<ActivationKind>().unwrap_err();
        assert!(matches!(err, MlpError::UnknownActivation(ref s) if s == "swishy"));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_get_activation() {
        let act = get_activation("tanh").unwrap();
        assert_relative_eq!(act.apply(&[0.5])[0], 0.5f64.tanh(), epsilon = 1e-12);
        assert!(get_activation("").is_err());
    }
}
