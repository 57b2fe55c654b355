// ml_examples/src/main.rs
use anyhow::{Context, Result};
use clap::Parser;
use digit_mlp::{
    load_digits_csv, print_accuracy, print_comparison, print_confusion_matrix,
    print_model_summary, print_performance_curve, Classifier, LabelMode, LayerSpec, LoaderOptions, MlpConfig, MLP,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Train a multilayer perceptron on a digit CSV dataset")]
struct Args {
    /// Number of hidden layers (128 -> 128 sigmoid each)
    num_layers: usize,

    /// Path to the dataset (CSV, optionally .gz)
    dataset: PathBuf,

    /// JSON network configuration; replaces the hidden layers built from num_layers
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    epochs: Option<usize>,

    #[arg(short, long)]
    learning_rate: Option<f64>,

    /// One of bce, sse, mse, different, absolute
    #[arg(long)]
    loss: Option<String>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value = "3000")]
    train: usize,

    #[arg(long, default_value = "1000")]
    valid: usize,

    #[arg(long, default_value = "1000")]
    test: usize,

    /// Classify "is this digit" instead of the ten digits
    #[arg(long)]
    target_digit: Option<usize>,

    /// Skip per-epoch progress output
    #[arg(short, long)]
    quiet: bool,
}

fn build_config(args: &Args) -> Result<MlpConfig> {
    let mut config = match &args.config {
        Some(path) => MlpConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => {
            let mut config = MlpConfig::default();
            config.hidden_layers = (0..args.num_layers)
                .map(|_| LayerSpec::sigmoid(config.input_units, config.input_units))
                .collect();
            config
        }
    };
    if let Some(epochs) = args.epochs {
        config.epochs = epochs;
    }
    if let Some(learning_rate) = args.learning_rate {
        config.learning_rate = learning_rate;
    }
    if let Some(loss) = &args.loss {
        config.loss = loss.clone();
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.target_digit.is_some() {
        config.num_classes = 2;
    }
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;

    let options = LoaderOptions {
        num_train: args.train,
        num_valid: args.valid,
        num_test: args.test,
        label_mode: args
            .target_digit
            .map_or(LabelMode::Digits, LabelMode::TargetDigit),
        seed: config.seed,
    };
    let mut data = load_digits_csv(&args.dataset, options)
        .with_context(|| format!("loading dataset {}", args.dataset.display()))?;
    let labels = data.test.labels.clone();

    let mut mlp = MLP::new(&mut data, &config)?;
    print_model_summary(&mlp);

    info!("Training MLP...");
    mlp.train(!args.quiet)?;
    info!("Done.");

    let predictions = mlp.evaluate(None)?;
    let epochs = mlp.epochs();
    let num_classes = mlp.num_classes();
    let performances = mlp.into_performances();

    println!("=========================");
    println!("Result of the MLP recognizer:");
    print_comparison(&labels, &predictions);
    print_accuracy(&labels, &predictions);
    print_confusion_matrix(&labels, &predictions, num_classes);
    print_performance_curve(&performances, epochs);

    Ok(())
}
