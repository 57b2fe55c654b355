//! Dataset splits, bias augmentation and the digit CSV loader.
use crate::error::{MlpError, Result};
use crate::layers::{prepend_bias, BIAS_COLUMN};
use csv::ReaderBuilder;
use flate2::read::GzDecoder;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fs::File;
use std::io::Read;
use std::ops::Deref;
use std::path::Path;
use tracing::info;

/// One-hot encode
pub fn one_hot(label: usize, num_classes: usize) -> Vec<f64> {
    let mut v = vec![0.0; num_classes];
    if label < num_classes {
        v[label] = 1.0;
    }
    v
}

/// Ordered (input vector, label) pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSet {
    pub inputs: Vec<Vec<f64>>,
    pub labels: Vec<usize>,
}

impl DataSet {
    pub fn new(inputs: Vec<Vec<f64>>, labels: Vec<usize>) -> Result<Self> {
        if inputs.len() != labels.len() {
            return Err(MlpError::dimension(
                "DataSet: labels",
                inputs.len(),
                labels.len(),
            ));
        }
        Ok(Self { inputs, labels })
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Length of the first input vector, 0 when empty.
    pub fn dimension(&self) -> usize {
        self.inputs.first().map_or(0, Vec::len)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[f64], usize)> + '_ {
        self.inputs
            .iter()
            .zip(&self.labels)
            .map(|(x, &y)| (x.as_slice(), y))
    }

    /// Put the constant bias input in front of every vector.
    pub fn prepend_bias(&mut self) {
        for input in &mut self.inputs {
            *input = prepend_bias(input);
        }
    }

    /// Undo [`DataSet::prepend_bias`].
    pub fn remove_bias(&mut self) {
        for input in &mut self.inputs {
            if !input.is_empty() {
                input.remove(BIAS_COLUMN);
            }
        }
    }
}

/// Training, validation and test splits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSplits {
    pub training: DataSet,
    pub validation: DataSet,
    pub test: DataSet,
}

impl DataSplits {
    pub fn new(training: DataSet, validation: DataSet, test: DataSet) -> Self {
        Self {
            training,
            validation,
            test,
        }
    }

    fn for_each_mut(&mut self, f: impl Fn(&mut DataSet)) {
        f(&mut self.training);
        f(&mut self.validation);
        f(&mut self.test);
    }
}

/// Splits borrowed with a bias column prepended for as long as the guard lives.
///
/// The bias is removed again when the guard is dropped, whether the session
/// ends normally, through an error, or through a panic.
#[derive(Debug)]
pub struct BiasedSplits<'d> {
    splits: &'d mut DataSplits,
}

impl<'d> BiasedSplits<'d> {
    pub fn new(splits: &'d mut DataSplits) -> Self {
        splits.for_each_mut(DataSet::prepend_bias);
        Self { splits }
    }
}

impl Deref for BiasedSplits<'_> {
    type Target = DataSplits;

    fn deref(&self) -> &DataSplits {
        self.splits
    }
}

impl Drop for BiasedSplits<'_> {
    fn drop(&mut self) {
        self.splits.for_each_mut(DataSet::remove_bias);
    }
}

/// How CSV labels are mapped to classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelMode {
    /// Keep the digit as the class.
    Digits,
    /// Class 1 for the given digit, class 0 for everything else.
    TargetDigit(usize),
}

/// Options for [`load_digits_csv`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoaderOptions {
    pub num_train: usize,
    pub num_valid: usize,
    pub num_test: usize,
    pub label_mode: LabelMode,
    pub seed: u64,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            num_train: 3000,
            num_valid: 1000,
            num_test: 1000,
            label_mode: LabelMode::Digits,
            seed: 42,
        }
    }
}

fn open_csv(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path)?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(GzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}

/// Load `label,pixel,...` rows, shuffle them and cut them into three splits.
///
/// Pixels are scaled to [0, 1]. Files ending in `.gz` are decompressed.
/// Fewer rows than requested shrink the later splits.
pub fn load_digits_csv(path: impl AsRef<Path>, options: LoaderOptions) -> Result<DataSplits> {
    let path = path.as_ref();
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .from_reader(open_csv(path)?);

    let mut rows: Vec<(Vec<f64>, usize)> = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let record = result?;
        let mut fields = record.iter();
        let digit: usize = fields
            .next()
            .map(str::trim)
            .unwrap_or_default()
            .parse()
            .map_err(|e| MlpError::Parse(format!("line {}: bad label: {}", line + 1, e)))?;
        let pixels = fields
            .map(|s| {
                s.trim()
                    .parse::<f64>()
                    .map(|p| p / 255.0)
                    .map_err(|e| MlpError::Parse(format!("line {}: bad pixel: {}", line + 1, e)))
            })
            .collect::<Result<Vec<f64>>>()?;
        let label = match options.label_mode {
            LabelMode::Digits => digit,
            LabelMode::TargetDigit(target) => usize::from(digit == target),
        };
        rows.push((pixels, label));
    }
    if rows.is_empty() {
        return Err(MlpError::EmptyDataset(format!(
            "no rows in {}",
            path.display()
        )));
    }

    let mut rng = StdRng::seed_from_u64(options.seed);
    rows.shuffle(&mut rng);

    let mut rows = rows.into_iter();
    let mut take = |n: usize| -> Result<DataSet> {
        let (inputs, labels) = rows.by_ref().take(n).unzip();
        DataSet::new(inputs, labels)
    };
    let training = take(options.num_train)?;
    let validation = take(options.num_valid)?;
    let test = take(options.num_test)?;
    info!(
        path = %path.display(),
        training = training.len(),
        validation = validation.len(),
        test = test.len(),
        "loaded digit dataset"
    );
    Ok(DataSplits::new(training, validation, test))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_set() -> DataSet {
        DataSet::new(vec![vec![0.2, 0.4], vec![0.6, 0.8]], vec![0, 1]).unwrap()
    }

    #[test]
    fn test_one_hot() {
        assert_eq!(one_hot(2, 4), vec![0.0, 0.0, 1.0, 0.0]);
        assert_eq!(one_hot(9, 3), vec![0.0; 3]);
    }

    #[test]
    fn test_bias_round_trip() {
        let mut set = small_set();
        set.prepend_bias();
        assert_eq!(set.inputs[0], vec![1.0, 0.2, 0.4]);
        assert_eq!(set.dimension(), 3);
        set.remove_bias();
        assert_eq!(set, small_set());
    }

    #[test]
    fn test_mismatched_labels() {
        let err = DataSet::new(vec![vec![1.0]], vec![]).unwrap_err();
        assert!(matches!(err, MlpError::DimensionMismatch { expected: 1, actual: 0, .. }));
    }

    #[test]
    fn test_guard_restores_on_drop() {
        let mut splits = DataSplits::new(small_set(), small_set(), small_set());
        {
            let guard = BiasedSplits::new(&mut splits);
            assert_eq!(guard.validation.inputs[1], vec![1.0, 0.6, 0.8]);
        }
        assert_eq!(splits, DataSplits::new(small_set(), small_set(), small_set()));
    }
}
