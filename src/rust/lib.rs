//! A thread-safe sentiment classifier: text normalization, TF-IDF features and
//! multinomial logistic regression, with an optional HTTP front end.
//!
//! # Basic Usage
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use polarity::{SentimentClassifier, LabeledExample, Sentiment};
//!
//! let classifier = SentimentClassifier::builder()
//!     .with_max_features(1000)
//!     .train(&[
//!         LabeledExample::new("I love this", Sentiment::Positive),
//!         LabeledExample::new("I hate this", Sentiment::Negative),
//!         LabeledExample::new("it is fine", Sentiment::Neutral),
//!     ])?;
//!
//! let prediction = classifier.predict("I love this product")?;
//! assert_eq!(prediction.label, Sentiment::Positive);
//! println!("Confidence: {:.2}", prediction.confidence());
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! Training happens once through `&mut self`. After that the classifier is
//! read-only and can be shared across threads using `Arc`:
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use polarity::{SentimentClassifier, builtin_corpus};
//! use std::sync::Arc;
//! use std::thread;
//!
//! let classifier = Arc::new(SentimentClassifier::builder().train(&builtin_corpus()?)?);
//!
//! let mut handles = vec![];
//! for _ in 0..3 {
//!     let classifier = Arc::clone(&classifier);
//!     handles.push(thread::spawn(move || {
//!         classifier.predict("test text").unwrap();
//!     }));
//! }
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod corpus;
pub mod server;

pub use classifier::{
    BatchItem, ClassifierBuilder, ClassifierError, ClassifierInfo, ConfidenceMap, ModelConfig,
    PipelineState, Prediction, SentimentClassifier, normalize_text,
};
pub use corpus::{CorpusError, LabeledExample, Sentiment, builtin_corpus, load_corpus, parse_corpus};
pub use server::{ServerConfig, ServerError};

pub fn init_logger() {
    env_logger::init();
}
