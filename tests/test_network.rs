// Tests for network construction, training, classification and teardown.

use digit_mlp::{
    Classifier, DataSet, DataSplits, LayerSpec, MlpConfig, MlpError, Split, MLP,
};

// Two clusters around (-1, -1) and (1, 1), labels alternating.
fn clusters(n: usize, phase: f64) -> DataSet {
    let mut inputs = Vec::with_capacity(n);
    let mut labels = Vec::with_capacity(n);
    for i in 0..n {
        let label = i % 2;
        let center = if label == 0 { -1.0 } else { 1.0 };
        let t = i as f64 * 0.7 + phase;
        inputs.push(vec![center + 0.3 * t.sin(), center + 0.3 * (1.3 * t).cos()]);
        labels.push(label);
    }
    DataSet::new(inputs, labels).unwrap()
}

fn toy_splits() -> DataSplits {
    DataSplits::new(clusters(40, 0.0), clusters(20, 0.35), clusters(10, 1.1))
}

fn toy_config() -> MlpConfig {
    MlpConfig {
        loss: "bce".into(),
        learning_rate: 0.5,
        epochs: 30,
        input_units: 4,
        num_classes: 2,
        hidden_layers: vec![LayerSpec::sigmoid(4, 4)],
        seed: 7,
    }
}

#[test]
fn test_layer_layout() {
    let mut splits = toy_splits();
    let mlp = MLP::new(&mut splits, &toy_config()).unwrap();
    let shapes: Vec<(usize, usize)> = mlp
        .layers()
        .iter()
        .map(|l| (l.units_in(), l.units_out()))
        .collect();
    assert_eq!(shapes, vec![(2, 4), (4, 4), (4, 2)]);
    let output = mlp.layers().last().unwrap();
    assert!(output.is_classifier_layer());
    assert_eq!(output.activation(), digit_mlp::ActivationKind::Softmax);
    assert_eq!(mlp.epochs(), 30);
    assert!(mlp.performances().is_empty());
}

#[test]
fn test_unknown_loss_fails_before_touching_data() {
    let mut splits = toy_splits();
    let config = MlpConfig {
        loss: "bogus".into(),
        ..toy_config()
    };
    let err = MLP::new(&mut splits, &config).unwrap_err();
    assert!(matches!(err, MlpError::UnknownLoss(ref name) if name == "bogus"));
    assert!(err.is_configuration_error());
    assert_eq!(splits, toy_splits());
}

#[test]
fn test_unknown_activation_fails() {
    let mut splits = toy_splits();
    let config = MlpConfig {
        hidden_layers: vec![LayerSpec::new(4, 4, "wobble", false)],
        ..toy_config()
    };
    let err = MLP::new(&mut splits, &config).unwrap_err();
    assert!(matches!(err, MlpError::UnknownActivation(_)));
    assert_eq!(splits, toy_splits());
}

#[test]
fn test_split_dimension_mismatch_fails() {
    let mut splits = toy_splits();
    splits.validation.inputs[3] = vec![0.0, 1.0, 2.0];
    let before = splits.clone();
    let err = MLP::new(&mut splits, &toy_config()).unwrap_err();
    match err {
        MlpError::DimensionMismatch {
            ref context,
            expected,
            actual,
        } => {
            assert_eq!(context, "validation split");
            assert_eq!((expected, actual), (2, 3));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(splits, before);

    let mut splits = toy_splits();
    splits.test.inputs[0].pop();
    let err = MLP::new(&mut splits, &toy_config()).unwrap_err();
    assert!(matches!(
        err,
        MlpError::DimensionMismatch { ref context, expected: 2, actual: 1 } if context == "test split"
    ));
}

#[test]
fn test_broken_layer_chain_fails() {
    let mut splits = toy_splits();
    let config = MlpConfig {
        hidden_layers: vec![LayerSpec::sigmoid(5, 4)],
        ..toy_config()
    };
    let err = MLP::new(&mut splits, &config).unwrap_err();
    assert!(matches!(err, MlpError::InvalidConfig(_)));
}

#[test]
fn test_empty_training_split_fails() {
    let mut splits = DataSplits::new(DataSet::default(), clusters(4, 0.0), clusters(4, 0.0));
    let err = MLP::new(&mut splits, &toy_config()).unwrap_err();
    assert!(matches!(err, MlpError::EmptyDataset(_)));
}

#[test]
fn test_bias_augmentation_round_trip() {
    let original = toy_splits();
    let mut splits = original.clone();
    {
        let mut mlp = MLP::new(&mut splits, &toy_config()).unwrap();
        for set in [&mlp.splits().training, &mlp.splits().validation, &mlp.splits().test] {
            assert!(set.inputs.iter().all(|x| x.len() == 3 && x[0] == 1.0));
        }
        mlp.train(false).unwrap();
    }
    assert_eq!(splits, original);
}

#[test]
fn test_teardown_after_training_error() {
    let mut training = clusters(6, 0.0);
    training.labels[3] = 5;
    let original = DataSplits::new(training, clusters(4, 0.2), clusters(4, 0.4));
    let mut splits = original.clone();
    {
        let mut mlp = MLP::new(&mut splits, &toy_config()).unwrap();
        let err = mlp.train(false).unwrap_err();
        assert!(matches!(
            err,
            MlpError::InvalidLabel {
                label: 5,
                num_classes: 2
            }
        ));
    }
    assert_eq!(splits, original);
}

#[test]
fn test_into_performances_restores_splits() {
    let original = toy_splits();
    let mut splits = original.clone();
    let mut mlp = MLP::new(&mut splits, &MlpConfig { epochs: 2, ..toy_config() }).unwrap();
    mlp.train(false).unwrap();
    let performances = mlp.into_performances();
    assert_eq!(performances.len(), 2);
    assert_eq!(splits, original);
}

#[test]
fn test_evaluate_returns_one_prediction_per_example() {
    let mut splits = toy_splits();
    let mut mlp = MLP::new(&mut splits, &toy_config()).unwrap();
    assert_eq!(mlp.evaluate(None).unwrap().len(), 10);
    assert_eq!(mlp.evaluate_split(Split::Training).unwrap().len(), 40);
    assert_eq!(mlp.evaluate_split(Split::Validation).unwrap().len(), 20);

    let inputs = vec![vec![1.0, -1.0, -1.0], vec![1.0, 1.0, 1.0], vec![1.0, 0.0, 0.0]];
    let predictions = mlp.evaluate(Some(inputs.as_slice())).unwrap();
    assert_eq!(predictions.len(), 3);
    assert!(predictions.iter().all(|&p| p < 2));
}

#[test]
fn test_classify_is_deterministic() {
    let input = [1.0, 0.25, -0.6];
    let mut first = toy_splits();
    let mut second = toy_splits();
    let mut a = MLP::new(&mut first, &toy_config()).unwrap();
    let mut b = MLP::new(&mut second, &toy_config()).unwrap();

    let class = a.classify(&input).unwrap();
    assert_eq!(a.classify(&input).unwrap(), class);
    assert_eq!(b.classify(&input).unwrap(), class);
    assert_eq!(a.feed_forward(&input).unwrap(), b.feed_forward(&input).unwrap());
}

#[test]
fn test_classify_rejects_unbiased_input() {
    let mut splits = toy_splits();
    let mut mlp = MLP::new(&mut splits, &toy_config()).unwrap();
    let err = mlp.classify(&[0.5, 0.5]).unwrap_err();
    assert!(matches!(err, MlpError::DimensionMismatch { expected: 3, actual: 2, .. }));
}

#[test]
fn test_training_improves_validation_accuracy() {
    let mut splits = toy_splits();
    let mut mlp = MLP::new(&mut splits, &toy_config()).unwrap();
    mlp.train(false).unwrap();

    let performances = mlp.performances();
    assert_eq!(performances.len(), 30);
    assert!(performances.iter().all(|&p| (0.0..=1.0).contains(&p)));

    let half = performances.len() / 2;
    let early: f64 = performances[..half].iter().sum::<f64>() / half as f64;
    let late: f64 = performances[half..].iter().sum::<f64>() / (performances.len() - half) as f64;
    assert!(late >= early, "early {early}, late {late}");
    assert!(*performances.last().unwrap() >= 0.9);

    let predictions = mlp.evaluate(None).unwrap();
    let labels = mlp.splits().test.labels.clone();
    assert!(digit_mlp::accuracy(&labels, &predictions) >= 0.9);
}

#[test]
fn test_train_example_reduces_error() {
    let mut splits = toy_splits();
    let mut mlp = MLP::new(&mut splits, &toy_config()).unwrap();
    let input = vec![1.0, 1.0, 1.0];
    let before = mlp.train_example(&input, 1).unwrap();
    for _ in 0..20 {
        mlp.train_example(&input, 1).unwrap();
    }
    let after = mlp.train_example(&input, 1).unwrap();
    assert!(after < before, "before {before}, after {after}");
}

#[test]
fn test_display() {
    let mut splits = toy_splits();
    let mlp = MLP::new(&mut splits, &toy_config()).unwrap();
    assert_eq!(mlp.to_string(), "MLP: [2, 4, 4, 2] (bce loss)");
}
