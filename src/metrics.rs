//! Metrics for evaluating classifier predictions.

/// Fraction of predictions equal to their label; 0 for no examples.
pub fn accuracy(labels: &[usize], predictions: &[usize]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let correct = labels
        .iter()
        .zip(predictions)
        .filter(|(label, prediction)| label == prediction)
        .count();
    correct as f64 / labels.len() as f64
}

/// Confusion matrix indexed `[true_class][predicted_class]`.
///
/// Pairs with a class outside `num_classes` are skipped.
pub fn confusion_matrix(labels: &[usize], predictions: &[usize], num_classes: usize) -> Vec<Vec<usize>> {
    let mut cm = vec![vec![0; num_classes]; num_classes];
    for (&label, &prediction) in labels.iter().zip(predictions) {
        if label < num_classes && prediction < num_classes {
            cm[label][prediction] += 1;
        }
    }
    cm
}
