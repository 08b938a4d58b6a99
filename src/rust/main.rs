use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use polarity::{server, builtin_corpus, load_corpus, ServerConfig, SentimentClassifier};
use log::info;
use env_logger::{Builder, Env};
use clap::Parser;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind the HTTP server to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 5000)]
    port: u16,

    /// JSON file of [text, label] pairs to train on (defaults to the bundled corpus)
    #[arg(short, long, env = "POLARITY_CORPUS")]
    corpus: Option<PathBuf>,

    /// Maximum vocabulary size
    #[arg(long, default_value_t = 1000)]
    max_features: usize,

    /// Maximum optimizer iterations
    #[arg(long, default_value_t = 1000)]
    max_iter: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    info!("=== Starting Sentiment Analysis API ===");

    let corpus = match &args.corpus {
        Some(path) => load_corpus(path)?,
        None => {
            info!("No corpus given, using the bundled dataset");
            builtin_corpus()?
        }
    };

    let start_time = Instant::now();
    let classifier = SentimentClassifier::builder()
        .with_max_features(args.max_features)
        .with_max_iter(args.max_iter)
        .train(&corpus)?;
    info!("=== Classifier Trained (took {:.2?}) ===", start_time.elapsed());

    let config = ServerConfig {
        host: args.host,
        port: args.port,
    };
    server::serve(&config, Arc::new(classifier)).await?;

    Ok(())
}
