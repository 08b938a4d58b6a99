//! HTTP surface for a trained [`SentimentClassifier`].
//!
//! | Route       | Method | Body                  |
//! |-------------|--------|-----------------------|
//! | `/`         | GET    |                       |
//! | `/health`   | GET    |                       |
//! | `/analyze`  | POST   | `{"text": "..."}`     |
//! | `/batch`    | POST   | `{"texts": ["..."]}`  |
//!
//! Malformed requests get a 400 with `{"error": "..."}`; classifier failures get a 500.

use std::future::Future;
use std::io;
use std::sync::Arc;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use log::{error, info, warn};

use crate::classifier::{ClassifierError, ConfidenceMap, Prediction, SentimentClassifier};
use crate::corpus::Sentiment;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Classifier(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Rejected request: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Body of `POST /analyze`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
}

impl AnalyzeRequest {
    /// Checks the shape of a decoded body and extracts the text
    pub fn from_json(body: &Value) -> Result<Self, ServerError> {
        let text = body.get("text")
            .ok_or_else(|| ServerError::Validation("Missing 'text' field in request body".into()))?
            .as_str()
            .ok_or_else(|| ServerError::Validation("'text' must be a string".into()))?;
        if text.trim().is_empty() {
            return Err(ServerError::Validation("Text cannot be empty".into()));
        }
        Ok(Self { text: text.to_string() })
    }
}

/// Body of `POST /batch`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BatchRequest {
    pub texts: Vec<String>,
}

impl BatchRequest {
    pub fn from_json(body: &Value) -> Result<Self, ServerError> {
        let texts = body.get("texts")
            .ok_or_else(|| ServerError::Validation("Missing 'texts' field in request body".into()))?
            .as_array()
            .ok_or_else(|| ServerError::Validation("'texts' must be an array".into()))?;
        let texts = texts.iter()
            .map(|t| t.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| ServerError::Validation("'texts' must contain only strings".into()))?;
        Ok(Self { texts })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzeResponse {
    pub text: String,
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub scores: ConfidenceMap,
}

impl AnalyzeResponse {
    fn new(text: String, prediction: Prediction) -> Self {
        Self {
            text,
            sentiment: prediction.label,
            confidence: prediction.confidence(),
            scores: prediction.scores,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResponse {
    pub count: usize,
    pub results: Vec<AnalyzeResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_trained: bool,
}

fn parse_body(body: &[u8]) -> Result<Value, ServerError> {
    serde_json::from_slice(body)
        .map_err(|_| ServerError::Validation("Request body must be valid JSON".into()))
}

/// Validates an `/analyze` body and classifies its text
pub fn analyze_json(classifier: &SentimentClassifier, body: &Value) -> Result<AnalyzeResponse, ServerError> {
    let request = AnalyzeRequest::from_json(body)?;
    let prediction = classifier.predict(&request.text)?;
    Ok(AnalyzeResponse::new(request.text, prediction))
}

/// Validates a `/batch` body and classifies every non-empty text
pub fn batch_json(classifier: &SentimentClassifier, body: &Value) -> Result<BatchResponse, ServerError> {
    let request = BatchRequest::from_json(body)?;
    let results: Vec<AnalyzeResponse> = classifier.predict_batch(&request.texts)?
        .into_iter()
        .map(|item| AnalyzeResponse::new(item.text, item.prediction))
        .collect();
    Ok(BatchResponse {
        count: results.len(),
        results,
    })
}

async fn home() -> Json<Value> {
    Json(json!({
        "message": "Sentiment Analysis API",
        "version": VERSION,
        "endpoints": {
            "/analyze": "POST - Analyze sentiment of text",
            "/batch": "POST - Analyze multiple texts",
            "/health": "GET - Health check"
        }
    }))
}

async fn health(State(classifier): State<Arc<SentimentClassifier>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        model_trained: classifier.is_trained(),
    })
}

async fn analyze(
    State(classifier): State<Arc<SentimentClassifier>>,
    body: Bytes,
) -> Result<Json<AnalyzeResponse>, ServerError> {
    let body = parse_body(&body)?;
    analyze_json(&classifier, &body).map(Json)
}

async fn batch(
    State(classifier): State<Arc<SentimentClassifier>>,
    body: Bytes,
) -> Result<Json<BatchResponse>, ServerError> {
    let body = parse_body(&body)?;
    batch_json(&classifier, &body).map(Json)
}

/// Builds the router; the classifier is shared read-only by every request.
///
/// Cross-origin requests are allowed from any origin.
pub fn router(classifier: Arc<SentimentClassifier>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/analyze", post(analyze))
        .route("/batch", post(batch))
        .layer(CorsLayer::permissive())
        .with_state(classifier)
}

/// Serves on an already bound listener until `shutdown` resolves.
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    classifier: Arc<SentimentClassifier>,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    if !classifier.is_trained() {
        warn!("Serving an untrained classifier; predictions will fail");
    }
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router(classifier))
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("Server stopped");
    Ok(())
}

/// Binds `config` and serves until Ctrl-C.
pub async fn serve(config: &ServerConfig, classifier: Arc<SentimentClassifier>) -> Result<(), ServerError> {
    let listener = TcpListener::bind(config.bind_addr()).await?;
    serve_with_shutdown(listener, classifier, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
