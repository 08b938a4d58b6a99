use log::info;

use super::error::ClassifierError;
use super::classifier::SentimentClassifier;
use super::model::ModelConfig;
use super::vectorizer::DEFAULT_MAX_FEATURES;
use crate::corpus::LabeledExample;

/// A builder for constructing a SentimentClassifier with a fluent interface.
#[derive(Debug, Clone)]
pub struct ClassifierBuilder {
    max_features: usize,
    model_config: ModelConfig,
}

impl Default for ClassifierBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassifierBuilder {
    /// Creates a new ClassifierBuilder with default configuration
    ///
    /// # Example
    /// ```
    /// use polarity::ClassifierBuilder;
    ///
    /// let builder = ClassifierBuilder::new();
    /// ```
    pub fn new() -> Self {
        Self {
            max_features: DEFAULT_MAX_FEATURES,
            model_config: ModelConfig::default(),
        }
    }

    /// Caps the vocabulary at the `max_features` most frequent tokens
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = max_features;
        self
    }

    /// Sets the maximum number of optimizer iterations
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.model_config.max_iter = max_iter;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.model_config.learning_rate = learning_rate;
        self
    }

    /// Sets the inverse L2 regularization strength
    pub fn with_regularization(mut self, regularization: f64) -> Self {
        self.model_config.regularization = regularization;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.model_config.tolerance = tolerance;
        self
    }

    /// Replaces the whole optimizer configuration
    pub fn with_model_config(mut self, config: ModelConfig) -> Self {
        self.model_config = config;
        self
    }

    /// Validates configuration according to the following rules:
    /// - `max_features` and `max_iter` must be at least 1
    /// - learning rate and regularization must be finite and positive
    /// - tolerance must be finite and non-negative
    fn validate(&self) -> Result<(), ClassifierError> {
        let ModelConfig { learning_rate, max_iter, regularization, tolerance } = &self.model_config;

        if self.max_features == 0 {
            return Err(ClassifierError::Validation("max_features must be at least 1".into()));
        }
        if *max_iter == 0 {
            return Err(ClassifierError::Validation("max_iter must be at least 1".into()));
        }
        if !learning_rate.is_finite() || *learning_rate <= 0.0 {
            return Err(ClassifierError::Validation(
                format!("learning_rate must be positive, got {}", learning_rate)
            ));
        }
        if !regularization.is_finite() || *regularization <= 0.0 {
            return Err(ClassifierError::Validation(
                format!("regularization must be positive, got {}", regularization)
            ));
        }
        if !tolerance.is_finite() || *tolerance < 0.0 {
            return Err(ClassifierError::Validation(
                format!("tolerance must be non-negative, got {}", tolerance)
            ));
        }
        Ok(())
    }

    /// Builds an untrained classifier
    ///
    /// # Example
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use polarity::SentimentClassifier;
    ///
    /// let classifier = SentimentClassifier::builder()
    ///     .with_max_features(500)
    ///     .with_max_iter(200)
    ///     .build()?;
    /// assert!(!classifier.is_trained());
    /// # Ok(())
    /// # }
    /// ```
    pub fn build(self) -> Result<SentimentClassifier, ClassifierError> {
        self.validate()?;
        Ok(SentimentClassifier::new(self.max_features, self.model_config))
    }

    /// Builds a classifier and trains it on `corpus` in one step
    pub fn train(self, corpus: &[LabeledExample]) -> Result<SentimentClassifier, ClassifierError> {
        let mut classifier = self.build()?;
        classifier.train(corpus)?;
        info!("Classifier ready: {:?}", classifier.info());
        Ok(classifier)
    }
}
