use std::collections::{BTreeMap, BTreeSet};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use log::{debug, info};

use super::error::ClassifierError;
use super::utils::softmax;
use crate::corpus::Sentiment;

/// Per-class probabilities for one input, keyed by every class seen in training.
pub type ConfidenceMap = BTreeMap<Sentiment, f64>;

/// Hyperparameters for [`SoftmaxRegression`].
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    /// Gradient descent step size
    pub learning_rate: f64,
    /// Upper bound on optimizer iterations; training stops here even if not converged
    pub max_iter: usize,
    /// Inverse L2 regularization strength (larger means weaker penalty)
    pub regularization: f64,
    /// Stop once the largest absolute gradient component drops below this
    pub tolerance: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.5,
            max_iter: 1000,
            regularization: 1.0,
            tolerance: 1e-6,
        }
    }
}

/// Learned parameters: one weight row and one bias per class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierState {
    classes: Vec<Sentiment>,
    weights: Array2<f64>,
    bias: Array1<f64>,
    iterations: usize,
    converged: bool,
}

impl ClassifierState {
    /// Classes in the order of the weight rows
    pub fn classes(&self) -> &[Sentiment] {
        &self.classes
    }

    /// `n_classes x n_features` weight matrix
    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    pub fn bias(&self) -> &Array1<f64> {
        &self.bias
    }

    pub fn n_features(&self) -> usize {
        self.weights.ncols()
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn converged(&self) -> bool {
        self.converged
    }
}

/// Multinomial logistic regression trained with full-batch gradient descent.
///
/// Weights start at zero, so fitting the same data twice gives the same model.
#[derive(Debug, Clone, Default)]
pub struct SoftmaxRegression {
    config: ModelConfig,
    state: Option<ClassifierState>,
}

impl SoftmaxRegression {
    pub fn new(config: ModelConfig) -> Self {
        Self { config, state: None }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn is_fitted(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<&ClassifierState> {
        self.state.as_ref()
    }

    /// Fits the model on a feature matrix with one row per label.
    ///
    /// # Errors
    /// - `Fit` if there are no samples, the row and label counts differ,
    ///   or fewer than two distinct labels are present
    /// - `Fit` if the optimizer diverges to non-finite parameters
    pub fn fit(&mut self, features: &Array2<f64>, labels: &[Sentiment]) -> Result<&ClassifierState, ClassifierError> {
        let n_samples = features.nrows();
        if n_samples == 0 {
            return Err(ClassifierError::Fit("Cannot fit classifier without samples".into()));
        }
        if n_samples != labels.len() {
            return Err(ClassifierError::Fit(format!(
                "Got {} feature rows but {} labels", n_samples, labels.len()
            )));
        }

        let classes: Vec<Sentiment> = labels.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        if classes.len() < 2 {
            return Err(ClassifierError::Fit(format!(
                "Need at least 2 distinct labels, found {}", classes.len()
            )));
        }

        let n_classes = classes.len();
        let n_features = features.ncols();
        let mut targets: Array2<f64> = Array2::zeros((n_samples, n_classes));
        for (row, label) in labels.iter().enumerate() {
            if let Ok(k) = classes.binary_search(label) {
                targets[[row, k]] = 1.0;
            }
        }

        let ModelConfig { learning_rate, max_iter, regularization, tolerance } = self.config.clone();
        let penalty = 1.0 / (regularization * n_samples as f64);
        let mut weights: Array2<f64> = Array2::zeros((n_classes, n_features));
        let mut bias: Array1<f64> = Array1::zeros(n_classes);
        let mut iterations = 0;
        let mut converged = false;

        while iterations < max_iter {
            let mut probs = features.dot(&weights.t()) + &bias;
            for mut row in probs.rows_mut() {
                let p = softmax(row.view());
                row.assign(&p);
            }

            let residual = (probs - &targets) / n_samples as f64;
            let grad_w = residual.t().dot(features) + &weights * penalty;
            let grad_b = residual.sum_axis(Axis(0));

            weights.scaled_add(-learning_rate, &grad_w);
            bias.scaled_add(-learning_rate, &grad_b);
            iterations += 1;

            let max_grad = grad_w.iter()
                .chain(grad_b.iter())
                .fold(0.0_f64, |acc, g| acc.max(g.abs()));
            if max_grad < tolerance {
                converged = true;
                break;
            }
        }

        if weights.iter().chain(bias.iter()).any(|v| !v.is_finite()) {
            return Err(ClassifierError::Fit(format!(
                "Optimizer diverged after {} iterations (learning_rate={})", iterations, learning_rate
            )));
        }

        if converged {
            debug!("Optimizer converged after {} iterations", iterations);
        } else {
            info!("Optimizer stopped at max_iter={} before converging", max_iter);
        }

        let state = self.state.insert(ClassifierState {
            classes,
            weights,
            bias,
            iterations,
            converged,
        });
        Ok(&*state)
    }

    /// Returns the probability of every trained class for one feature vector.
    ///
    /// # Errors
    /// - `NotFitted` if called before [`fit`](Self::fit)
    /// - `Validation` if the vector length differs from the trained feature count
    pub fn predict_proba(&self, features: ArrayView1<f64>) -> Result<ConfidenceMap, ClassifierError> {
        let state = self.state.as_ref()
            .ok_or(ClassifierError::NotFitted("Classifier"))?;
        if features.len() != state.n_features() {
            return Err(ClassifierError::Validation(format!(
                "Expected {} features, got {}", state.n_features(), features.len()
            )));
        }

        let scores = state.weights.dot(&features) + &state.bias;
        let probs = softmax(scores.view());
        Ok(state.classes.iter().copied().zip(probs.iter().copied()).collect())
    }

    /// Returns the most probable class together with the full distribution.
    pub fn predict(&self, features: ArrayView1<f64>) -> Result<(Sentiment, ConfidenceMap), ClassifierError> {
        let scores = self.predict_proba(features)?;
        let label = scores.iter()
            .fold(None, |best: Option<(Sentiment, f64)>, (&label, &p)| match best {
                Some((_, best_p)) if best_p >= p => best,
                _ => Some((label, p)),
            })
            .map(|(label, _)| label)
            .ok_or(ClassifierError::NotFitted("Classifier"))?;
        Ok((label, scores))
    }
}
