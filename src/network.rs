//! Multi-Layer Perceptron (MLP) trained by per-example SGD.
use crate::activations::ActivationKind;
use crate::classifier::Classifier;
use crate::config::MlpConfig;
use crate::datasets::{one_hot, BiasedSplits, DataSplits};
use crate::error::{MlpError, Result};
use crate::layers::{prepend_bias, BackwardSignal, DenseLayer};
use crate::loss::{get_loss, Loss};
use crate::metrics::accuracy;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use tracing::{debug, info, warn};

/// Which of the network's own splits to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Training,
    Validation,
    Test,
}

/// MLP
///
/// Borrows the dataset splits for its whole lifetime and keeps a bias column
/// prepended to every input until it is dropped.
pub struct MLP<'d> {
    /// Ordered list of dense layers from input to output.
    layers: Vec<DenseLayer>,
    loss: Box<dyn Loss>,
    learning_rate: f64,
    epochs: usize,
    num_classes: usize,
    /// Validation accuracy after each completed epoch.
    performances: Vec<f64>,
    data: BiasedSplits<'d>,
}

impl<'d> MLP<'d> {
    /// Build the network and augment the splits with the bias column.
    ///
    /// Layers are `[input (sigmoid, D -> input_units)] + hidden_layers +
    /// [output (softmax, -> num_classes)]`, where D is the training split's
    /// feature dimensionality. Unknown loss or activation identifiers, and
    /// splits whose inputs differ from D, fail here before the splits are touched.
    pub fn new(splits: &'d mut DataSplits, config: &MlpConfig) -> Result<Self> {
        config.validate()?;
        let loss = get_loss(&config.loss)?;
        let hidden_activations = config
            .hidden_layers
            .iter()
            .map(|spec| spec.activation.parse::<ActivationKind>())
            .collect::<Result<Vec<_>>>()?;
        if splits.training.is_empty() {
            return Err(MlpError::EmptyDataset("training split".into()));
        }
        let dimension = splits.training.dimension();
        for (name, split) in [
            ("training split", &splits.training),
            ("validation split", &splits.validation),
            ("test split", &splits.test),
        ] {
            if let Some(input) = split.inputs.iter().find(|x| x.len() != dimension) {
                return Err(MlpError::dimension(name, dimension, input.len()));
            }
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut layers = Vec::with_capacity(config.hidden_layers.len() + 2);
        layers.push(DenseLayer::new(
            dimension,
            config.input_units,
            ActivationKind::Sigmoid,
            false,
            &mut rng,
        ));
        for (spec, activation) in config.hidden_layers.iter().zip(hidden_activations) {
            layers.push(DenseLayer::new(
                spec.units_in,
                spec.units_out,
                activation,
                spec.is_output,
                &mut rng,
            ));
        }
        layers.push(DenseLayer::new(
            config.last_hidden_width(),
            config.num_classes,
            ActivationKind::Softmax,
            true,
            &mut rng,
        ));
        for layer in &layers {
            debug!(
                units_in = layer.units_in(),
                units_out = layer.units_out(),
                activation = %layer.activation(),
                "created layer"
            );
        }

        let mlp = Self {
            layers,
            loss,
            learning_rate: config.learning_rate,
            epochs: config.epochs,
            num_classes: config.num_classes,
            performances: Vec::with_capacity(config.epochs),
            data: BiasedSplits::new(splits),
        };
        info!(network = %mlp, "built network");
        Ok(mlp)
    }

    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }

    pub fn loss(&self) -> &dyn Loss {
        self.loss.as_ref()
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn epochs(&self) -> usize {
        self.epochs
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Validation accuracy per completed epoch, in [0, 1].
    pub fn performances(&self) -> &[f64] {
        &self.performances
    }

    /// The borrowed splits, bias column included.
    pub fn splits(&self) -> &DataSplits {
        &self.data
    }

    /// End the session, restoring the splits, and keep the learning curve.
    pub fn into_performances(self) -> Vec<f64> {
        self.performances
    }

    /// Output-layer activations for one biased input.
    pub fn feed_forward(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        feed_forward(&mut self.layers, input)
    }

    /// Run one online SGD step on a single example and return its error.
    pub fn train_example(&mut self, input: &[f64], label: usize) -> Result<f64> {
        train_example(
            &mut self.layers,
            self.loss.as_ref(),
            input,
            label,
            self.num_classes,
            self.learning_rate,
        )
    }

    /// Classify every example of one of the network's splits.
    pub fn evaluate_split(&mut self, split: Split) -> Result<Vec<usize>> {
        let set = match split {
            Split::Training => &self.data.training,
            Split::Validation => &self.data.validation,
            Split::Test => &self.data.test,
        };
        classify_all(&mut self.layers, &set.inputs)
    }

    fn validation_accuracy(&mut self) -> Result<f64> {
        let predictions = classify_all(&mut self.layers, &self.data.validation.inputs)?;
        Ok(accuracy(&self.data.validation.labels, &predictions))
    }
}

impl Classifier for MLP<'_> {
    /// Online SGD over the training split in its stored order, one validation
    /// accuracy recorded per epoch.
    fn train(&mut self, verbose: bool) -> Result<()> {
        if self.data.validation.is_empty() {
            warn!("validation split is empty, recorded accuracies will be 0");
        }
        for epoch in 0..self.epochs {
            if verbose {
                info!("Epoch {}", epoch + 1);
            }
            let mut total_error = 0.0;
            for (input, label) in self.data.training.iter() {
                total_error += train_example(
                    &mut self.layers,
                    self.loss.as_ref(),
                    input,
                    label,
                    self.num_classes,
                    self.learning_rate,
                )?;
            }
            debug!(
                epoch = epoch + 1,
                mean_error = total_error / self.data.training.len() as f64,
                "finished epoch"
            );

            let accuracy = self.validation_accuracy()?;
            self.performances.push(accuracy);
            if verbose {
                info!("Accuracy on validation: {:.2}%", accuracy * 100.0);
            }
        }
        Ok(())
    }

    fn classify(&mut self, input: &[f64]) -> Result<usize> {
        classify(&mut self.layers, input)
    }

    fn evaluate(&mut self, inputs: Option<&[Vec<f64>]>) -> Result<Vec<usize>> {
        match inputs {
            Some(inputs) => classify_all(&mut self.layers, inputs),
            None => self.evaluate_split(Split::Test),
        }
    }
}

impl fmt::Display for MLP<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sizes = vec![self.layers.first().map_or(0, DenseLayer::units_in)];
        for layer in &self.layers {
            sizes.push(layer.units_out());
        }
        write!(f, "MLP: {:?} ({} loss)", sizes, self.loss.name())
    }
}

impl fmt::Debug for MLP<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MLP")
            .field("layers", &self.layers.len())
            .field("loss", &self.loss.name())
            .field("learning_rate", &self.learning_rate)
            .field("epochs", &self.epochs)
            .field("performances", &self.performances)
            .finish()
    }
}

fn feed_forward(layers: &mut [DenseLayer], input: &[f64]) -> Result<Vec<f64>> {
    let mut next = input.to_vec();
    let mut output = Vec::new();
    for layer in layers.iter_mut() {
        output = layer.forward(&next)?;
        next = prepend_bias(&output);
    }
    Ok(output)
}

fn train_example(
    layers: &mut [DenseLayer],
    loss: &dyn Loss,
    input: &[f64],
    label: usize,
    num_classes: usize,
    learning_rate: f64,
) -> Result<f64> {
    if label >= num_classes {
        return Err(MlpError::InvalidLabel { label, num_classes });
    }
    let output = feed_forward(layers, input)?;
    let target = one_hot(label, num_classes);
    let error = loss.calculate_error(&target, &output);

    // Output layer first; each step hands its delta and weights one layer up.
    {
        let mut signal = BackwardSignal::from_loss(loss.calculate_derivative(&target, &output));
        for layer in layers.iter_mut().rev() {
            signal = layer.compute_derivative(&signal)?;
        }
    }

    for layer in layers.iter_mut() {
        layer.update_weights(learning_rate)?;
    }
    Ok(error)
}

// First maximum wins ties.
fn argmax(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .fold(0usize, |best, (i, &v)| if v > values[best] { i } else { best })
}

fn classify(layers: &mut [DenseLayer], input: &[f64]) -> Result<usize> {
    Ok(argmax(&feed_forward(layers, input)?))
}

fn classify_all(layers: &mut [DenseLayer], inputs: &[Vec<f64>]) -> Result<Vec<usize>> {
    inputs.iter().map(|input| classify(layers, input)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax_first_max_wins() {
        assert_eq!(argmax(&[0.1, 0.7, 0.7, 0.2]), 1);
        assert_eq!(argmax(&[0.5, 0.5]), 0);
        assert_eq!(argmax(&[]), 0);
    }
}
