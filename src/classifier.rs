//! Interface shared by the MLP and the baseline classifiers.
use crate::error::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Something that can be trained and then map inputs to class indices.
///
/// Inputs are the vectors as the classifier stores them for its own splits
/// (for the MLP: with the bias constant prepended).
pub trait Classifier {
    /// Run the full training procedure.
    fn train(&mut self, verbose: bool) -> Result<()>;

    /// Predicted class of one input.
    fn classify(&mut self, input: &[f64]) -> Result<usize>;

    /// Predicted classes of `inputs`, or of the classifier's own test split
    /// when `None`, index-aligned with the inputs.
    fn evaluate(&mut self, inputs: Option<&[Vec<f64>]>) -> Result<Vec<usize>>;
}

/// Baseline that guesses a class uniformly at random.
#[derive(Debug, Clone)]
pub struct StupidRecognizer {
    num_classes: usize,
    test_inputs: Vec<Vec<f64>>,
    rng: StdRng,
}

impl StupidRecognizer {
    pub fn new(num_classes: usize, test_inputs: Vec<Vec<f64>>, seed: u64) -> Self {
        Self {
            num_classes: num_classes.max(1),
            test_inputs,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Classifier for StupidRecognizer {
    fn train(&mut self, _verbose: bool) -> Result<()> {
        Ok(())
    }

    fn classify(&mut self, _input: &[f64]) -> Result<usize> {
        Ok(self.rng.gen_range(0..self.num_classes))
    }

    fn evaluate(&mut self, inputs: Option<&[Vec<f64>]>) -> Result<Vec<usize>> {
        let count = inputs.map_or(self.test_inputs.len(), <[Vec<f64>]>::len);
        (0..count)
            .map(|_| Ok(self.rng.gen_range(0..self.num_classes)))
            .collect()
    }
}
