use serde::Serialize;
use log::{debug, info};

use super::error::ClassifierError;
use super::model::{ConfidenceMap, ModelConfig, SoftmaxRegression};
use super::utils::normalize_text;
use super::vectorizer::TfidfVectorizer;
use crate::corpus::{LabeledExample, Sentiment};

/// Whether the pipeline has been trained. The only transition is
/// `Untrained -> Trained`, made by a successful [`SentimentClassifier::train`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineState {
    Untrained,
    Trained,
}

/// Result of classifying one text.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: Sentiment,
    pub scores: ConfidenceMap,
}

impl Prediction {
    /// Probability of the predicted label, which is the largest score
    pub fn confidence(&self) -> f64 {
        self.scores.get(&self.label).copied().unwrap_or(0.0)
    }
}

/// One surviving entry of [`SentimentClassifier::predict_batch`].
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItem {
    pub text: String,
    pub prediction: Prediction,
}

/// Normalizer, TF-IDF vectorizer and softmax classifier trained and queried as one unit.
///
/// # Thread Safety
///
/// Training takes `&mut self`; prediction only reads fitted state, so a trained
/// classifier can be shared across threads behind an `Arc` without locking:
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use polarity::{SentimentClassifier, LabeledExample, Sentiment};
/// use std::sync::Arc;
/// use std::thread;
///
/// let mut classifier = SentimentClassifier::builder().build()?;
/// classifier.train(&[
///     LabeledExample::new("I love this", Sentiment::Positive),
///     LabeledExample::new("I hate this", Sentiment::Negative),
/// ])?;
///
/// let classifier = Arc::new(classifier);
/// let classifier_clone = Arc::clone(&classifier);
/// thread::spawn(move || {
///     classifier_clone.predict("love it").unwrap();
/// }).join().unwrap();
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SentimentClassifier {
    vectorizer: TfidfVectorizer,
    model: SoftmaxRegression,
    state: PipelineState,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<SentimentClassifier>();
    }
};

impl SentimentClassifier {
    /// Creates a new ClassifierBuilder for fluent construction
    pub fn builder() -> super::builder::ClassifierBuilder {
        super::builder::ClassifierBuilder::new()
    }

    pub(crate) fn new(max_features: usize, model_config: ModelConfig) -> Self {
        Self {
            vectorizer: TfidfVectorizer::new(max_features),
            model: SoftmaxRegression::new(model_config),
            state: PipelineState::Untrained,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn is_trained(&self) -> bool {
        self.state == PipelineState::Trained
    }

    /// Returns information about the classifier's current state
    pub fn info(&self) -> super::ClassifierInfo {
        let model_state = self.model.state();
        super::ClassifierInfo {
            state: self.state,
            class_labels: model_state.map(|s| s.classes().to_vec()).unwrap_or_default(),
            vocabulary_size: self.vectorizer.vocabulary().map_or(0, |v| v.len()),
            max_features: self.vectorizer.max_features(),
            iterations: model_state.map_or(0, |s| s.iterations()),
            converged: model_state.map_or(false, |s| s.converged()),
        }
    }

    /// Trains the pipeline on a labeled corpus.
    ///
    /// Either both the vectorizer and the classifier are fitted and the state
    /// becomes `Trained`, or nothing changes.
    ///
    /// # Errors
    /// - `AlreadyTrained` if the pipeline was trained before
    /// - `Fit` if the corpus is empty, has a single label, or yields no vocabulary
    pub fn train(&mut self, corpus: &[LabeledExample]) -> Result<(), ClassifierError> {
        if self.is_trained() {
            return Err(ClassifierError::AlreadyTrained);
        }
        if corpus.is_empty() {
            return Err(ClassifierError::Fit("Training corpus is empty".into()));
        }

        info!("Training on {} examples", corpus.len());
        let texts: Vec<String> = corpus.iter().map(|e| normalize_text(&e.text)).collect();
        let labels: Vec<Sentiment> = corpus.iter().map(|e| e.label).collect();

        let mut vectorizer = TfidfVectorizer::new(self.vectorizer.max_features());
        let features = vectorizer.fit_transform(&texts)?;
        debug!("Feature matrix shape: {:?}", features.dim());

        let mut model = SoftmaxRegression::new(self.model.config().clone());
        let model_state = model.fit(&features, &labels)?;
        info!(
            "Model trained: {} classes, {} features, {} iterations",
            model_state.classes().len(),
            model_state.n_features(),
            model_state.iterations()
        );

        self.vectorizer = vectorizer;
        self.model = model;
        self.state = PipelineState::Trained;
        Ok(())
    }

    /// Classifies one text.
    ///
    /// # Errors
    /// - `NotTrained` if [`train`](Self::train) has not succeeded yet
    pub fn predict(&self, text: &str) -> Result<Prediction, ClassifierError> {
        if !self.is_trained() {
            return Err(ClassifierError::NotTrained);
        }
        self.predict_normalized(&normalize_text(text))
    }

    /// Classifies each text independently, preserving input order.
    ///
    /// Texts that normalize to an empty string are left out of the result.
    pub fn predict_batch<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<BatchItem>, ClassifierError> {
        if !self.is_trained() {
            return Err(ClassifierError::NotTrained);
        }

        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            let text = text.as_ref();
            let normalized = normalize_text(text);
            if normalized.is_empty() {
                debug!("Skipping text with no usable content: {:?}", text);
                continue;
            }
            results.push(BatchItem {
                text: text.to_string(),
                prediction: self.predict_normalized(&normalized)?,
            });
        }
        Ok(results)
    }

    fn predict_normalized(&self, normalized: &str) -> Result<Prediction, ClassifierError> {
        let features = self.vectorizer.transform(normalized)?;
        let (label, scores) = self.model.predict(features.view())?;
        Ok(Prediction { label, scores })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<LabeledExample> {
        vec![
            LabeledExample::new("I love this", Sentiment::Positive),
            LabeledExample::new("I hate this", Sentiment::Negative),
            LabeledExample::new("it is fine", Sentiment::Neutral),
        ]
    }

    fn trained() -> SentimentClassifier {
        let mut classifier = SentimentClassifier::builder().build().unwrap();
        classifier.train(&corpus()).unwrap();
        classifier
    }

    #[test]
    fn test_predict_before_train() {
        let classifier = SentimentClassifier::builder().build().unwrap();
        assert_eq!(classifier.state(), PipelineState::Untrained);
        assert_eq!(classifier.predict("hello").unwrap_err(), ClassifierError::NotTrained);
        assert_eq!(
            classifier.predict_batch(&["hello"]).unwrap_err(),
            ClassifierError::NotTrained
        );
    }

    #[test]
    fn test_train_transitions_state() {
        let classifier = trained();
        assert!(classifier.is_trained());
        let info = classifier.info();
        assert_eq!(info.state, PipelineState::Trained);
        assert_eq!(info.vocabulary_size, 7);
        assert_eq!(
            info.class_labels,
            vec![Sentiment::Negative, Sentiment::Neutral, Sentiment::Positive]
        );
    }

    #[test]
    fn test_train_only_once() {
        let mut classifier = trained();
        assert_eq!(classifier.train(&corpus()).unwrap_err(), ClassifierError::AlreadyTrained);
        assert!(classifier.is_trained());
    }

    #[test]
    fn test_failed_train_leaves_untrained() {
        let mut classifier = SentimentClassifier::builder().build().unwrap();

        let single = vec![
            LabeledExample::new("good", Sentiment::Positive),
            LabeledExample::new("great", Sentiment::Positive),
        ];
        assert!(matches!(classifier.train(&single), Err(ClassifierError::Fit(_))));
        assert!(matches!(classifier.train(&[]), Err(ClassifierError::Fit(_))));

        let no_tokens = vec![
            LabeledExample::new("123", Sentiment::Positive),
            LabeledExample::new("!!!", Sentiment::Negative),
        ];
        assert!(matches!(classifier.train(&no_tokens), Err(ClassifierError::Fit(_))));

        assert_eq!(classifier.state(), PipelineState::Untrained);
        assert_eq!(classifier.info().vocabulary_size, 0);
        assert_eq!(classifier.predict("good").unwrap_err(), ClassifierError::NotTrained);

        // a later valid corpus still trains
        classifier.train(&corpus()).unwrap();
        assert!(classifier.is_trained());
    }

    #[test]
    fn test_predict_scenario() {
        let classifier = trained();
        let prediction = classifier.predict("I love this product").unwrap();
        assert_eq!(prediction.label, Sentiment::Positive);
        assert_eq!(prediction.scores.len(), 3);
    }

    #[test]
    fn test_confidence_is_max_score() {
        let classifier = trained();
        for text in ["I hate this", "it is fine", "love", "something else entirely", "42"] {
            let prediction = classifier.predict(text).unwrap();
            let sum: f64 = prediction.scores.values().sum();
            assert!((sum - 1.0).abs() < 1e-6, "sum was {}", sum);
            let max = prediction.scores.values().cloned().fold(f64::MIN, f64::max);
            assert_eq!(prediction.confidence(), max);
            assert!(prediction.scores.values().all(|&p| (0.0..=1.0).contains(&p)));
        }
    }

    #[test]
    fn test_predict_batch_skips_empty() {
        let classifier = trained();
        let results = classifier.predict_batch(&["", "   ", "good"]).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "good");
    }

    #[test]
    fn test_predict_batch_keeps_order() {
        let classifier = trained();
        let texts = vec!["I hate this".to_string(), "123".to_string(), "I love this".to_string()];
        let results = classifier.predict_batch(&texts).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text, "I hate this");
        assert_eq!(results[0].prediction.label, Sentiment::Negative);
        assert_eq!(results[1].text, "I love this");
        assert_eq!(results[1].prediction, classifier.predict("I love this").unwrap());
    }
}
