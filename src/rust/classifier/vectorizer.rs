use std::collections::{BTreeMap, HashSet};
use ndarray::{Array1, Array2};
use log::debug;

use super::error::ClassifierError;
use super::utils::{normalize_vector, tokenize};

/// Default cap on the number of tokens kept in the vocabulary.
pub const DEFAULT_MAX_FEATURES: usize = 1000;

/// Token to feature index mapping learned by [`TfidfVectorizer::fit`].
///
/// Indices are assigned in lexicographic token order, so iteration order
/// matches feature order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Vocabulary {
    index: BTreeMap<String, usize>,
}

impl Vocabulary {
    fn from_tokens(mut tokens: Vec<String>) -> Self {
        tokens.sort();
        let index = tokens.into_iter()
            .enumerate()
            .map(|(i, token)| (token, i))
            .collect();
        Self { index }
    }

    /// Returns the feature index for `token`, if it is in the vocabulary
    pub fn get(&self, token: &str) -> Option<usize> {
        self.index.get(token).copied()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.index.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Iterates `(token, index)` pairs in index order
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.index.iter().map(|(token, &i)| (token.as_str(), i))
    }
}

#[derive(Debug, Clone)]
struct FittedVocabulary {
    vocabulary: Vocabulary,
    idf: Array1<f64>,
}

/// Term frequency / inverse document frequency vectorizer.
///
/// Operates on text that has already gone through [`normalize_text`](super::utils::normalize_text).
/// Weights are `count * idf` with the smoothed idf `ln((1 + n) / (1 + df)) + 1`,
/// and every produced row is L2-normalized.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    max_features: usize,
    fitted: Option<FittedVocabulary>,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FEATURES)
    }
}

impl TfidfVectorizer {
    pub fn new(max_features: usize) -> Self {
        Self {
            max_features,
            fitted: None,
        }
    }

    pub fn max_features(&self) -> usize {
        self.max_features
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Returns the learned vocabulary, or `None` before fitting
    pub fn vocabulary(&self) -> Option<&Vocabulary> {
        self.fitted.as_ref().map(|f| &f.vocabulary)
    }

    /// Returns the learned inverse document frequencies, indexed like the vocabulary
    pub fn idf(&self) -> Option<&Array1<f64>> {
        self.fitted.as_ref().map(|f| &f.idf)
    }

    /// Learns the vocabulary and document frequencies from normalized documents.
    ///
    /// Tokens are ranked by their total count across the corpus (ties broken by
    /// token order) and the top `max_features` are kept.
    ///
    /// # Errors
    /// - `Fit` if `documents` is empty or contains no tokens
    pub fn fit<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<&Vocabulary, ClassifierError> {
        if documents.is_empty() {
            return Err(ClassifierError::Fit("Cannot fit vectorizer on an empty corpus".into()));
        }

        let mut term_count: BTreeMap<&str, usize> = BTreeMap::new();
        let mut doc_freq: BTreeMap<&str, usize> = BTreeMap::new();
        for doc in documents {
            let mut seen = HashSet::new();
            for token in tokenize(doc.as_ref()) {
                *term_count.entry(token).or_insert(0) += 1;
                if seen.insert(token) {
                    *doc_freq.entry(token).or_insert(0) += 1;
                }
            }
        }

        if term_count.is_empty() {
            return Err(ClassifierError::Fit("Corpus yields an empty vocabulary".into()));
        }

        let mut ranked: Vec<(&str, usize)> = term_count.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(self.max_features);

        let vocabulary = Vocabulary::from_tokens(
            ranked.into_iter().map(|(token, _)| token.to_string()).collect()
        );

        let n_docs = documents.len() as f64;
        let mut idf: Array1<f64> = Array1::zeros(vocabulary.len());
        for (token, i) in vocabulary.iter() {
            let df = doc_freq.get(token).copied().unwrap_or(0) as f64;
            idf[i] = ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0;
        }

        debug!("Vectorizer fitted: {} documents, {} features", documents.len(), vocabulary.len());

        let fitted = self.fitted.insert(FittedVocabulary { vocabulary, idf });
        Ok(&fitted.vocabulary)
    }

    /// Converts one normalized text into a TF-IDF vector of `|Vocabulary|` dimensions.
    ///
    /// Tokens outside the vocabulary are ignored.
    ///
    /// # Errors
    /// - `NotFitted` if called before [`fit`](Self::fit)
    pub fn transform(&self, text: &str) -> Result<Array1<f64>, ClassifierError> {
        let fitted = self.fitted.as_ref()
            .ok_or(ClassifierError::NotFitted("Vectorizer"))?;

        let mut counts: Array1<f64> = Array1::zeros(fitted.vocabulary.len());
        for token in tokenize(text) {
            if let Some(i) = fitted.vocabulary.get(token) {
                counts[i] += 1.0;
            }
        }
        Ok(normalize_vector(&(counts * &fitted.idf)))
    }

    /// Fits on `documents` and returns their feature matrix, one row per document
    pub fn fit_transform<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<Array2<f64>, ClassifierError> {
        let n_features = self.fit(documents)?.len();
        let mut matrix: Array2<f64> = Array2::zeros((documents.len(), n_features));
        for (mut row, doc) in matrix.rows_mut().into_iter().zip(documents) {
            row.assign(&self.transform(doc.as_ref())?);
        }
        Ok(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<&'static str> {
        vec!["i love this", "i hate this", "it is fine"]
    }

    #[test]
    fn test_fit_assigns_sorted_indices() {
        let mut vectorizer = TfidfVectorizer::default();
        let vocab = vectorizer.fit(&corpus()).unwrap();
        let tokens: Vec<_> = vocab.iter().map(|(t, _)| t).collect();
        assert_eq!(tokens, vec!["fine", "hate", "i", "is", "it", "love", "this"]);
        assert_eq!(vocab.get("fine"), Some(0));
        assert_eq!(vocab.get("this"), Some(6));
        assert_eq!(vocab.get("product"), None);
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let mut vectorizer = TfidfVectorizer::new(2);
        let vocab = vectorizer.fit(&corpus()).unwrap();
        // "i" and "this" appear twice, everything else once
        assert_eq!(vocab.len(), 2);
        assert!(vocab.contains("i"));
        assert!(vocab.contains("this"));
    }

    #[test]
    fn test_max_features_ties_break_lexicographically() {
        let mut vectorizer = TfidfVectorizer::new(3);
        let vocab = vectorizer.fit(&["zeta alpha", "beta gamma"]).unwrap();
        let tokens: Vec<_> = vocab.iter().map(|(t, _)| t).collect();
        assert_eq!(tokens, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let mut a = TfidfVectorizer::new(4);
        let mut b = TfidfVectorizer::new(4);
        let va = a.fit(&corpus()).unwrap().clone();
        let vb = b.fit(&corpus()).unwrap().clone();
        assert_eq!(va, vb);
        assert_eq!(a.idf(), b.idf());
    }

    #[test]
    fn test_fit_errors() {
        let mut vectorizer = TfidfVectorizer::default();
        let empty: Vec<&str> = vec![];
        assert!(matches!(vectorizer.fit(&empty), Err(ClassifierError::Fit(_))));
        assert!(matches!(vectorizer.fit(&["", " "]), Err(ClassifierError::Fit(_))));
        assert!(!vectorizer.is_fitted());
    }

    #[test]
    fn test_transform_requires_fit() {
        let vectorizer = TfidfVectorizer::default();
        assert_eq!(
            vectorizer.transform("hello").unwrap_err(),
            ClassifierError::NotFitted("Vectorizer")
        );
    }

    #[test]
    fn test_transform_weights() {
        let mut vectorizer = TfidfVectorizer::default();
        vectorizer.fit(&corpus()).unwrap();
        let v = vectorizer.transform("i love this product").unwrap();
        assert_eq!(v.len(), 7);

        let norm: f64 = v.iter().map(|x| x * x).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-9);

        // "love" is rarer than "i" across the corpus, so it weighs more
        let vocab = vectorizer.vocabulary().unwrap();
        assert!(v[vocab.get("love").unwrap()] > v[vocab.get("i").unwrap()]);
        assert_eq!(v[vocab.get("fine").unwrap()], 0.0);
    }

    #[test]
    fn test_transform_out_of_vocabulary_is_zero() {
        let mut vectorizer = TfidfVectorizer::default();
        vectorizer.fit(&corpus()).unwrap();
        let v = vectorizer.transform("completely unknown words").unwrap();
        assert_eq!(v.len(), 7);
        assert!(v.iter().all(|&x| x == 0.0));

        // inference never touches fitted statistics
        let idf_before = vectorizer.idf().unwrap().clone();
        vectorizer.transform("new tokens again").unwrap();
        assert_eq!(vectorizer.idf().unwrap(), &idf_before);
    }

    #[test]
    fn test_fit_transform_shape() {
        let mut vectorizer = TfidfVectorizer::default();
        let matrix = vectorizer.fit_transform(&corpus()).unwrap();
        assert_eq!(matrix.dim(), (3, 7));
        assert_eq!(matrix.row(0).to_owned(), vectorizer.transform("i love this").unwrap());
    }
}
