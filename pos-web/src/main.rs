//! Servidor web Axum para etiquetagem POS
//!
//! O modelo é treinado **antes** de abrir o socket: nenhuma requisição chega a ver um
//! modelo incompleto. Depois disso ele é apenas lido, compartilhado via `Arc`.

mod config;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use pos_core::{
    corpus::demo_texts,
    evaluation::Accuracy,
    hmm::ModelSummary,
    tagset::{render, TagInfo, TaggedWord, TAG_GUIDE},
    tokenizer::TokenizerMode,
    viterbi::ViterbiStep,
    PosError, PosPipeline,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{BoxError, ServerConfig};

/// Estado compartilhado da aplicação
struct AppState {
    pipeline: PosPipeline,
}

#[derive(Deserialize)]
struct TagRequest {
    text: String,
    #[serde(default)]
    tokenizer_mode: Option<TokenizerMode>,
    /// Inclui a tabela do Viterbi na resposta.
    #[serde(default)]
    trace: bool,
}

#[derive(Serialize)]
struct TagResponse {
    tagged: Vec<TaggedWord>,
    rendered: String,
    total_tokens: usize,
    processing_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    best_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    steps: Option<Vec<ViterbiStep>>,
}

/// Linhas já tokenizadas por espaço, como num arquivo de sentenças.
#[derive(Deserialize)]
struct BatchRequest {
    sentences: Vec<String>,
}

#[derive(Serialize)]
struct SentenceResult {
    line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct BatchResponse {
    results: Vec<SentenceResult>,
    failed: usize,
}

#[derive(Deserialize)]
struct EvaluateRequest {
    sentences: Vec<String>,
    answers: Vec<String>,
}

#[derive(Serialize)]
struct EvaluateResponse {
    accuracy: Accuracy,
    percentage: f64,
    report: String,
}

/// Erros devolvidos pela API como `{"error": "..."}`.
enum ApiError {
    Pos(PosError),
    Internal(String),
}

impl From<PosError> for ApiError {
    fn from(e: PosError) -> Self {
        ApiError::Pos(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Pos(e) => {
                let status = match e {
                    PosError::NoPathFound { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    PosError::Io(_) | PosError::EmptyCorpus | PosError::InvalidPenalty(_) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                    _ => StatusCode::BAD_REQUEST,
                };
                (status, e.to_string())
            }
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::load()?;
    let pipeline = config.build_pipeline()?;
    info!(model = ?pipeline.model().summary(), "modelo pronto");

    let app = router(Arc::new(AppState { pipeline }));

    let listener = tokio::net::TcpListener::bind(config.bind_addr.as_str()).await?;
    info!("Servidor POS iniciado em http://{}", config.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/tagset", get(tagset_handler))
        .route("/model", get(model_handler))
        .route("/demo-texts", get(demo_texts_handler))
        .route("/tag", post(tag_handler))
        .route("/tag-batch", post(tag_batch_handler))
        .route("/evaluate", post(evaluate_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Guia de referência do conjunto de tags
async fn tagset_handler() -> Json<&'static [TagInfo]> {
    Json(TAG_GUIDE)
}

/// Contagens do modelo treinado
async fn model_handler(State(state): State<Arc<AppState>>) -> Json<ModelSummary> {
    Json(state.pipeline.model().summary())
}

async fn demo_texts_handler() -> impl IntoResponse {
    Json(demo_texts())
}

/// Etiqueta uma sentença avulsa (texto livre)
async fn tag_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TagRequest>,
) -> Result<Json<TagResponse>, ApiError> {
    let start = Instant::now();
    let mode = req.tokenizer_mode.unwrap_or_default();

    let (tagged, best_score, steps) = if req.trace {
        let (tagged, result) = state.pipeline.trace_sentence(&req.text, mode)?;
        (tagged, Some(result.best_score), Some(result.steps))
    } else {
        (state.pipeline.tag_sentence(&req.text, mode)?, None, None)
    };

    Ok(Json(TagResponse {
        rendered: render(&tagged),
        total_tokens: tagged.len(),
        processing_ms: start.elapsed().as_millis() as u64,
        tagged,
        best_score,
        steps,
    }))
}

/// Etiqueta várias linhas pré-tokenizadas (equivalente a etiquetar um arquivo)
async fn tag_batch_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchRequest>,
) -> Result<Json<BatchResponse>, ApiError> {
    let lines = split_lines(&req.sentences);

    // Decodificação em lote é síncrona (Rayon): roda fora do runtime
    let results = tokio::task::spawn_blocking(move || state.pipeline.tag_lines(&lines))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let results: Vec<SentenceResult> = results
        .into_iter()
        .enumerate()
        .map(|(i, result)| match result {
            Ok(tags) => SentenceResult { line: i + 1, tags: Some(tags), error: None },
            Err(e) => SentenceResult { line: i + 1, tags: None, error: Some(e.to_string()) },
        })
        .collect();
    let failed = results.iter().filter(|r| r.error.is_some()).count();

    Ok(Json(BatchResponse { results, failed }))
}

/// Acurácia das predições contra as respostas
async fn evaluate_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EvaluateRequest>,
) -> Result<Json<EvaluateResponse>, ApiError> {
    let sentences = split_lines(&req.sentences);
    let answers = split_lines(&req.answers);

    let accuracy = tokio::task::spawn_blocking(move || state.pipeline.evaluate(&sentences, &answers))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(|e| {
            warn!("avaliação rejeitada: {e}");
            ApiError::from(e)
        })?;

    Ok(Json(EvaluateResponse {
        percentage: accuracy.percentage(),
        report: accuracy.to_string(),
        accuracy,
    }))
}

fn split_lines(lines: &[String]) -> Vec<Vec<String>> {
    lines
        .iter()
        .map(|line| line.split_whitespace().map(str::to_string).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use pos_core::ModelTrainer;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        let pipeline = PosPipeline::demo(&ModelTrainer::default()).unwrap();
        router(Arc::new(AppState { pipeline }))
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_tag_sentence() {
        let (status, body) = send(post_json("/tag", json!({ "text": "The dog runs." }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rendered"], "The/DET dog/N runs/V ./.");
        assert_eq!(body["total_tokens"], 4);
        assert!(body.get("steps").is_none());
    }

    #[tokio::test]
    async fn test_tag_with_trace() {
        let request = post_json(
            "/tag",
            json!({ "text": "the dog runs .", "tokenizer_mode": "whitespace", "trace": true }),
        );
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["steps"].as_array().unwrap().len(), 4);
        assert!(body["best_score"].as_f64().unwrap() <= 0.0);
    }

    #[tokio::test]
    async fn test_tag_empty_sentence_is_bad_request() {
        let (status, body) = send(post_json("/tag", json!({ "text": "  " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "sentença vazia");
    }

    #[tokio::test]
    async fn test_tag_batch_keeps_line_order() {
        let request = post_json(
            "/tag-batch",
            json!({ "sentences": ["the dog runs .", "", "a cat saw the dog ."] }),
        );
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["failed"], 1);
        assert_eq!(body["results"][0]["tags"], json!(["DET", "N", "V", "."]));
        assert!(body["results"][1]["error"].is_string());
        assert_eq!(body["results"][2]["line"], 3);
    }

    #[tokio::test]
    async fn test_evaluate() {
        let request = post_json(
            "/evaluate",
            json!({ "sentences": ["the dog runs ."], "answers": ["DET N V ."] }),
        );
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["accuracy"]["correct"], 4);
        assert_eq!(body["percentage"], 100.0);
    }

    #[tokio::test]
    async fn test_evaluate_mismatched_answers() {
        let request = post_json(
            "/evaluate",
            json!({ "sentences": ["the dog runs ."], "answers": ["DET N"] }),
        );
        let (status, _) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_tagset_and_model() {
        let (status, body) = send(get_request("/tagset")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), TAG_GUIDE.len());

        let (status, body) = send(get_request("/model")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sentences"], 20);
    }
}
