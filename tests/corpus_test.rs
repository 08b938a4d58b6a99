use polarity::{builtin_corpus, load_corpus, CorpusError, Sentiment, SentimentClassifier};
use std::fs;
use std::path::PathBuf;

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("polarity_{}_{}.json", name, std::process::id()));
    fs::write(&path, contents).expect("temp dir is writable");
    path
}

#[test]
fn test_load_corpus_from_file() -> Result<(), Box<dyn std::error::Error>> {
    let path = temp_file(
        "valid",
        r#"[["Great job", "positive"], ["Bad job", "negative"], ["A job", "neutral"]]"#,
    );
    let corpus = load_corpus(&path)?;
    fs::remove_file(&path)?;

    assert_eq!(corpus.len(), 3);
    assert_eq!(corpus[0].text, "Great job");
    assert_eq!(corpus[2].label, Sentiment::Neutral);

    let classifier = SentimentClassifier::builder().train(&corpus)?;
    assert!(classifier.is_trained());
    Ok(())
}

#[test]
fn test_load_missing_file() {
    let result = load_corpus("/definitely/not/here/corpus.json");
    assert!(matches!(result, Err(CorpusError::IoError(_))));
}

#[test]
fn test_load_bad_label() {
    let path = temp_file("bad_label", r#"[["hmm", "mixed"]]"#);
    let result = load_corpus(&path);
    fs::remove_file(&path).ok();
    assert!(matches!(result, Err(CorpusError::UnknownLabel { .. })));
}

#[test]
fn test_builtin_corpus_trains() -> Result<(), Box<dyn std::error::Error>> {
    let corpus = builtin_corpus()?;
    assert!(corpus.len() >= 30);
    let classifier = SentimentClassifier::builder().train(&corpus)?;
    assert_eq!(classifier.info().class_labels.len(), 3);
    Ok(())
}
