use ndarray::{Array1, ArrayView1};

/// Cleans raw text before it reaches the vectorizer.
///
/// Lowercases, drops every character that is not an ASCII letter or whitespace,
/// collapses whitespace runs to a single space and trims both ends. Non-ASCII
/// letters are removed along with digits and punctuation.
///
/// ```
/// use polarity::normalize_text;
///
/// assert_eq!(normalize_text("  Hello,   World! 42 "), "hello world");
/// assert_eq!(normalize_text("123 !!!"), "");
/// ```
pub fn normalize_text(text: &str) -> String {
    let kept: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits normalized text into tokens.
pub(crate) fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
}

pub(crate) fn normalize_vector(vec: &Array1<f64>) -> Array1<f64> {
    let norm: f64 = vec.iter().map(|&x| x * x).sum::<f64>().sqrt();
    if norm > 1e-12 {
        vec / norm
    } else {
        Array1::zeros(vec.len())
    }
}

/// Normalized exponential, shifted by the max score for stability.
pub(crate) fn softmax(scores: ArrayView1<f64>) -> Array1<f64> {
    let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exp = scores.mapv(|s| (s - max).exp());
    let sum = exp.sum();
    exp / sum
}
