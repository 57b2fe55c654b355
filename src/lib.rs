//! A from-scratch multilayer perceptron for digit classification.
//!
//! - Dense layers with a bias column, cached forward state and manual backprop
//! - Per-example SGD with bce/sse/mse/different/absolute losses
//! - Dataset splits borrowed with a scoped bias column
//! - CSV digit loader, metrics and console reports

pub mod activations;
pub mod classifier;
pub mod config;
pub mod datasets;
pub mod error;
pub mod layers;
pub mod loss;
pub mod metrics;
pub mod network;
pub mod neuron;
pub mod report;

pub use activations::{Activation, ActivationKind, Linear, ReLU, Sigmoid, Softmax, Tanh};
pub use classifier::{Classifier, StupidRecognizer};
pub use config::{LayerSpec, MlpConfig};
pub use datasets::{load_digits_csv, one_hot, BiasedSplits, DataSet, DataSplits, LabelMode, LoaderOptions};
pub use error::{MlpError, Result};
pub use layers::{prepend_bias, BackwardSignal, DenseLayer, LayerState, Matrix, BIAS_COLUMN};
pub use loss::{Loss, LossKind};
pub use metrics::{accuracy, confusion_matrix};
pub use network::{Split, MLP};
pub use neuron::Neuron;
pub use report::{
    print_accuracy, print_comparison, print_confusion_matrix, print_model_summary,
    print_performance_curve,
};
