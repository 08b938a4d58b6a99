use thiserror::Error;

/// Represents the different types of errors that can occur in the sentiment pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifierError {
    /// Training data could not be fitted (empty corpus, single class, no vocabulary)
    #[error("Fit error: {0}")]
    Fit(String),
    /// A component was used before it was fitted
    #[error("{0} has not been fitted")]
    NotFitted(&'static str),
    /// Inference was requested before the pipeline finished training
    #[error("Model not trained yet")]
    NotTrained,
    /// The pipeline is trained once per lifetime
    #[error("Model has already been trained")]
    AlreadyTrained,
    /// Error occurred due to invalid configuration parameters
    #[error("Validation error: {0}")]
    Validation(String),
}
