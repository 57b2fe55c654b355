//! A single neuron: weighted sum plus bias through an activation.
use crate::activations::{Activation, ActivationKind};
use crate::error::{MlpError, Result};
use rand::Rng;

#[derive(Debug, Clone, PartialEq)]
pub struct Neuron {
    pub weights: Vec<f64>,
    pub bias: f64,
    pub activation: ActivationKind,
}

impl Neuron {
    /// Weights and bias drawn from U[0, 1); `bias = false` pins the bias to 0.
    pub fn new<R: Rng>(num_weights: usize, activation: ActivationKind, bias: bool, rng: &mut R) -> Self {
        let weights = (0..num_weights).map(|_| rng.gen_range(0.0..1.0)).collect();
        let bias = if bias { rng.gen_range(0.0..1.0) } else { 0.0 };
        Self {
            weights,
            bias,
            activation,
        }
    }

    pub fn compute_output(&self, input: &[f64]) -> Result<f64> {
        if input.len() != self.weights.len() {
            return Err(MlpError::dimension(
                "Neuron: bad input dimensions",
                self.weights.len(),
                input.len(),
            ));
        }
        let weighted_sum: f64 =
            input.iter().zip(&self.weights).map(|(&x, &w)| x * w).sum::<f64>() + self.bias;
        Ok(self.activation.to_arc().apply(&[weighted_sum])[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_compute_output() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut neuron = Neuron::new(3, ActivationKind::Sigmoid, false, &mut rng);
        let input = [0.0, 1.0, 2.0];

        neuron.weights = vec![0.0; 3];
        assert_eq!(neuron.compute_output(&input).unwrap(), 0.5);

        neuron.weights = vec![1.0; 3];
        assert_relative_eq!(neuron.compute_output(&input).unwrap(), 0.9526, epsilon = 1e-4);
    }

    #[test]
    fn test_bad_input_dimensions() {
        let mut rng = StdRng::seed_from_u64(0);
        let neuron = Neuron::new(3, ActivationKind::Sigmoid, true, &mut rng);
        let err = neuron.compute_output(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, MlpError::DimensionMismatch { expected: 3, actual: 2, .. }));
    }

    #[test]
    fn test_random_weights_in_unit_interval() {
        let mut rng = StdRng::seed_from_u64(5);
        let neuron = Neuron::new(50, ActivationKind::Sigmoid, true, &mut rng);
        assert!(neuron.weights.iter().all(|&w| (0.0..1.0).contains(&w)));
        assert!((0.0..1.0).contains(&neuron.bias));
    }
}
