//! Console reports: prediction comparison, accuracy, confusion matrix and the
//! learning curve.
use crate::metrics::{accuracy, confusion_matrix};
use crate::network::MLP;

/// Print model summary
pub fn print_model_summary(mlp: &MLP<'_>) {
    println!("Model Summary:\n{}", mlp);
    for (i, layer) in mlp.layers().iter().enumerate() {
        println!(
            "  layer {:>2}: {:>4} -> {:<4} {:<8} params={}",
            i,
            layer.units_in(),
            layer.units_out(),
            layer.activation(),
            layer.parameter_count()
        );
    }
}

/// Print label / prediction pairs, marking the misses.
pub fn print_comparison(labels: &[usize], predictions: &[usize]) {
    println!("+-------+-------+-------+");
    println!("| Label | Pred  |       |");
    println!("+-------+-------+-------+");
    for (&label, &prediction) in labels.iter().zip(predictions) {
        let mark = if label == prediction { "" } else { "WRONG" };
        println!("| {:>5} | {:>5} | {:<5} |", label, prediction, mark);
    }
    println!("+-------+-------+-------+");
}

pub fn print_accuracy(labels: &[usize], predictions: &[usize]) {
    println!("Accuracy on test: {:.2}%", accuracy(labels, predictions) * 100.0);
}

/// Text rendering of a confusion matrix, rows are true classes.
pub fn render_confusion_matrix(cm: &[Vec<usize>]) -> String {
    let mut out = String::from("true\\pred");
    for class in 0..cm.len() {
        out.push_str(&format!(" {:>5}", class));
    }
    out.push('\n');
    for (class, row) in cm.iter().enumerate() {
        out.push_str(&format!("{:>9}", class));
        for count in row {
            out.push_str(&format!(" {:>5}", count));
        }
        out.push('\n');
    }
    out
}

pub fn print_confusion_matrix(labels: &[usize], predictions: &[usize], num_classes: usize) {
    println!("\nConfusion matrix:");
    print!(
        "{}",
        render_confusion_matrix(&confusion_matrix(labels, predictions, num_classes))
    );
}

/// Text rendering of per-epoch accuracies, one bar per epoch.
pub fn render_performance_curve(performances: &[f64], epochs: usize) -> String {
    const WIDTH: usize = 50;
    let mut out = String::from("Epoch | Accuracy\n");
    for (epoch, &value) in performances.iter().take(epochs).enumerate() {
        let filled = (value.clamp(0.0, 1.0) * WIDTH as f64).round() as usize;
        out.push_str(&format!(
            "{:>5} | {:>6.2}% {}\n",
            epoch + 1,
            value * 100.0,
            "#".repeat(filled)
        ));
    }
    out
}

pub fn print_performance_curve(performances: &[f64], epochs: usize) {
    println!("\nValidation accuracy per epoch:");
    print!("{}", render_performance_curve(performances, epochs));
}
