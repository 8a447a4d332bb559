use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use chrono::Utc;
use clap::Parser;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use medley_config::{load_config, MedleyConfig};
use medley_core::types::{InputEnvelope, ResponseEnvelope};
use medley_core::{assemble_failure, IntentClassifier, Pipeline, TraceLog};
use medley_extract::{Extractor, RemoteExtractor};
use medley_llm::{build_http_client, ClassifierConfig, LlmClient, LlmIntentClassifier};
use medley_tasks::sentiment::model::{LexiconSentimentModel, SentimentModel};
use medley_tasks::standard_router;

mod ingest;
mod sessions;

use sessions::SessionStore;

#[derive(Debug, Parser)]
#[command(name = "medley-server")]
struct Args {
    #[arg(long, default_value = "config/medley.yaml")]
    config: PathBuf,
    /// Overrides the configured listen address.
    #[arg(long)]
    listen: Option<SocketAddr>,
}

#[derive(Clone)]
struct AppState {
    pipeline: Arc<Pipeline>,
    extractor: Arc<dyn Extractor>,
    sessions: Arc<SessionStore>,
    min_content_chars: usize,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ClarifyRequest {
    clarification: String,
    #[serde(default = "default_session_id")]
    session_id: String,
}

fn default_session_id() -> String {
    ingest::DEFAULT_SESSION_ID.to_string()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = load_config(&args.config)
        .with_context(|| format!("load config from {}", args.config.display()))?;
    let listen: SocketAddr = match args.listen {
        Some(listen) => listen,
        None => config
            .server
            .listen
            .parse()
            .context("parse configured listen address")?,
    };
    let app = build_app(&config)?;

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .context("bind server listener failed")?;
    info!(%listen, "medley-server listening");
    axum::serve(listener, app)
        .await
        .context("server terminated with error")
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

fn build_app(config: &MedleyConfig) -> anyhow::Result<Router> {
    let llm: Arc<dyn LlmClient> =
        Arc::new(build_http_client(&config.llm).context("build llm client")?);
    let classifier: Arc<dyn IntentClassifier> = Arc::new(LlmIntentClassifier::new(
        llm.clone(),
        ClassifierConfig::from_settings(&config.llm, &config.classifier),
    ));

    let model: Arc<dyn SentimentModel> = Arc::new(LexiconSentimentModel::load());
    info!(model = model.id(), "sentiment model loaded");

    let router = standard_router(llm, model, &config.llm, &config.tasks);
    let pipeline = Arc::new(Pipeline::new(classifier, Arc::new(router)));

    let extractor: Arc<dyn Extractor> = Arc::new(
        RemoteExtractor::new(
            config.extraction.service_url.clone(),
            Duration::from_secs(config.extraction.timeout_secs),
            config.extraction.min_content_chars,
        )
        .context("build extraction client")?,
    );

    let state = AppState {
        pipeline,
        extractor,
        sessions: Arc::new(SessionStore::with_capacity(config.server.session_capacity)),
        min_content_chars: config.extraction.min_content_chars,
    };

    Ok(Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/process", post(process))
        .route("/clarify", post(clarify))
        .layer(DefaultBodyLimit::max(config.server.max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

async fn index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": "medley-server",
        "endpoints": {
            "POST /process": "multipart: text and/or file, optional session_id",
            "POST /clarify": "form: clarification, optional session_id",
            "GET /health": "liveness check",
        },
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status":"ok"}))
}

/// Main entry point: triage, extract, classify, dispatch.
///
/// Domain failures come back as a 200 envelope with `error` set; only an
/// unreadable or empty request earns a 4xx.
async fn process(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ResponseEnvelope>, (StatusCode, Json<ErrorBody>)> {
    let submission = ingest::read_submission(multipart).await.map_err(bad_request)?;
    let session_id = submission.session_id.clone();

    let envelope = match ingest::prepare_input(
        state.extractor.as_ref(),
        submission,
        state.min_content_chars,
    )
    .await
    {
        Ok(prepared) => {
            let parked = sessions::StoredContext::new(
                prepared.input.extracted_content.clone(),
                prepared.input.source_kind,
                prepared.metadata.clone(),
            );
            let envelope = state
                .pipeline
                .handle(prepared.input, prepared.metadata)
                .await;
            if envelope.needs_clarification() {
                if let Err(err) = state.sessions.save(&session_id, parked) {
                    warn!(session_id = %session_id, "failed to park session context: {}", err);
                }
            }
            envelope
        }
        Err(failure) => assemble_failure(&failure.input, None, failure.error, TraceLog::new()),
    };
    Ok(Json(envelope))
}

/// Answer to a previously returned clarification question.
async fn clarify(
    State(state): State<AppState>,
    Form(payload): Form<ClarifyRequest>,
) -> Result<Json<ResponseEnvelope>, (StatusCode, Json<ErrorBody>)> {
    let clarification = payload.clarification.trim().to_string();
    if clarification.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                code: "empty_clarification".to_string(),
                message: "clarification must not be empty".to_string(),
            }),
        ));
    }

    let Some(context) = state
        .sessions
        .take(&payload.session_id)
        .map_err(internal_error)?
    else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                code: "session_expired".to_string(),
                message: "session expired or unknown, resubmit the original input".to_string(),
            }),
        ));
    };

    let age_secs = (Utc::now() - context.created_at).num_seconds();
    info!(session_id = %payload.session_id, age_secs, "resuming parked session");

    let input = match context.extracted_content.as_deref() {
        Some(content) => InputEnvelope::extracted(clarification, content, context.source_kind),
        None => InputEnvelope::text(clarification),
    };
    let envelope = state.pipeline.handle(input, context.metadata.clone()).await;
    if envelope.needs_clarification() {
        if let Err(err) = state.sessions.save(&payload.session_id, context) {
            warn!(session_id = %payload.session_id, "failed to park session context: {}", err);
        }
    }
    Ok(Json(envelope))
}

fn bad_request(err: ingest::IngestError) -> (StatusCode, Json<ErrorBody>) {
    let code = match &err {
        ingest::IngestError::NoInput => "empty_input",
        ingest::IngestError::Multipart(_) => "unreadable_request",
    };
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            code: code.to_string(),
            message: err.to_string(),
        }),
    )
}

fn internal_error(err: sessions::SessionError) -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            code: "internal".to_string(),
            message: err.to_string(),
        }),
    )
}
