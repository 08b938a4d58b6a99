mod error;
mod model;
mod vectorizer;
#[allow(clippy::module_inception)]
mod classifier;
pub mod builder;
mod utils;

pub use error::ClassifierError;
pub use classifier::{BatchItem, PipelineState, Prediction, SentimentClassifier};
pub use builder::ClassifierBuilder;
pub use model::{ClassifierState, ConfidenceMap, ModelConfig, SoftmaxRegression};
pub use vectorizer::{TfidfVectorizer, Vocabulary, DEFAULT_MAX_FEATURES};
pub use utils::normalize_text;

use serde::Serialize;
use crate::corpus::Sentiment;

/// Information about the current state and configuration of a classifier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifierInfo {
    /// Whether training has completed
    pub state: PipelineState,
    /// Labels of the classes seen during training
    pub class_labels: Vec<Sentiment>,
    /// Number of tokens in the fitted vocabulary
    pub vocabulary_size: usize,
    /// Configured vocabulary cap
    pub max_features: usize,
    /// Optimizer iterations used in training
    pub iterations: usize,
    /// Whether the optimizer reached its tolerance before `max_iter`
    pub converged: bool,
}
