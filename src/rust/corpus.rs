use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use log::info;

const BUILTIN_CORPUS: &str = include_str!("../../data/sentiment_dataset.json");

#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Invalid corpus JSON: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Unknown sentiment label '{label}' at entry {position}")]
    UnknownLabel {
        label: String,
        position: usize,
    },
    #[error("Corpus contains no examples")]
    Empty,
}

/// The sentiment classes the pipeline can learn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Negative,
    Neutral,
    Positive,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Negative => "negative",
            Self::Neutral => "neutral",
            Self::Positive => "positive",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "negative" => Ok(Self::Negative),
            "neutral" => Ok(Self::Neutral),
            "positive" => Ok(Self::Positive),
            other => Err(other.to_string()),
        }
    }
}

/// One training example: raw text and its sentiment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledExample {
    pub text: String,
    pub label: Sentiment,
}

impl LabeledExample {
    pub fn new(text: impl Into<String>, label: Sentiment) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }
}

impl<S: Into<String>> From<(S, Sentiment)> for LabeledExample {
    fn from((text, label): (S, Sentiment)) -> Self {
        Self::new(text, label)
    }
}

/// Parses a corpus from a JSON array of `[text, label]` pairs.
///
/// # Errors
/// - `ParseError` if the document is not an array of string pairs
/// - `UnknownLabel` if a label is not one of `positive`, `negative`, `neutral`
/// - `Empty` if the array has no entries
pub fn parse_corpus(json: &str) -> Result<Vec<LabeledExample>, CorpusError> {
    let pairs: Vec<(String, String)> = serde_json::from_str(json)?;
    if pairs.is_empty() {
        return Err(CorpusError::Empty);
    }

    pairs.into_iter()
        .enumerate()
        .map(|(position, (text, label))| {
            let label = label.parse::<Sentiment>()
                .map_err(|label| CorpusError::UnknownLabel { label, position })?;
            Ok(LabeledExample { text, label })
        })
        .collect()
}

/// Loads a corpus file in the format accepted by [`parse_corpus`].
pub fn load_corpus<P: AsRef<Path>>(path: P) -> Result<Vec<LabeledExample>, CorpusError> {
    let path = path.as_ref();
    info!("Loading corpus from {:?}", path);
    let contents = fs::read_to_string(path)?;
    let corpus = parse_corpus(&contents)?;
    info!("Loaded {} labeled examples", corpus.len());
    Ok(corpus)
}

/// Returns the corpus bundled with the crate.
pub fn builtin_corpus() -> Result<Vec<LabeledExample>, CorpusError> {
    parse_corpus(BUILTIN_CORPUS)
}
