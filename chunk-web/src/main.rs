//! Servidor web Axum com WebSocket para visualização do chunking em tempo real

use std::net::SocketAddr;
use std::sync::mpsc;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chunk_core::{
    corpus::demo_texts,
    pipeline::{ChunkPipeline, PipelineEvent},
    ChunkError, ChunkerConfig, TaggedToken, TransformEvent,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_ADDR: &str = "0.0.0.0:3000";

/// Estado compartilhado da aplicação
struct AppState {
    pipeline: ChunkPipeline,
}

#[derive(Deserialize)]
struct ChunkRequest {
    text: String,
}

#[derive(Deserialize)]
struct TransformRequest {
    /// Pares `[palavra, tag]`.
    chunk: Vec<(String, String)>,
    /// Estágios a aplicar; ausente usa os do pipeline.
    #[serde(default)]
    stages: Option<Vec<String>>,
}

#[derive(Serialize)]
struct TransformResponse {
    stages: Vec<TransformEvent>,
    result: Vec<TaggedToken>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_config()?;
    let pipeline = tokio::task::spawn_blocking(move || ChunkPipeline::from_config(config)).await??;
    let state = Arc::new(AppState { pipeline });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(index_handler))
        .route("/chunk", post(chunk_handler))
        .route("/transform", post(transform_handler))
        .route("/ws", get(ws_handler))
        .route("/demo-texts", get(demo_texts_handler))
        .layer(cors)
        .with_state(state);

    let addr: SocketAddr = std::env::var("CHUNK_ADDR")
        .unwrap_or_else(|_| DEFAULT_ADDR.to_string())
        .parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Servidor de chunking iniciado em http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Lê a configuração do arquivo em `CHUNK_CONFIG`, ou usa a padrão.
fn load_config() -> Result<ChunkerConfig, ChunkError> {
    match std::env::var("CHUNK_CONFIG") {
        Ok(path) => {
            info!(%path, "carregando configuração");
            let file = std::fs::File::open(&path).map_err(|e| ChunkError::Config(format!("{path}: {e}")))?;
            ChunkerConfig::from_reader(std::io::BufReader::new(file))
        }
        Err(_) => Ok(ChunkerConfig::default()),
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

/// Retorna a página principal HTML
async fn index_handler() -> impl IntoResponse {
    Html(include_str!("templates/index.html"))
}

/// Análise via HTTP POST (sem streaming)
async fn chunk_handler(State(state): State<Arc<AppState>>, Json(req): Json<ChunkRequest>) -> Response {
    if req.text.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Texto vazio");
    }

    let result = tokio::task::spawn_blocking(move || state.pipeline.analyze(&req.text)).await;
    match result {
        Ok(Ok(analysis)) => Json(analysis).into_response(),
        Ok(Err(e)) => error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
        Err(e) => {
            error!(error = %e, "análise interrompida");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "análise interrompida")
        }
    }
}

/// Aplica as transformações a um chunk e devolve cada estágio
async fn transform_handler(State(state): State<Arc<AppState>>, Json(req): Json<TransformRequest>) -> Response {
    let pipeline = match &req.stages {
        Some(names) => match state.pipeline.config().transform_pipeline_for(names.as_slice()) {
            Ok(p) => p,
            Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
        },
        None => state.pipeline.transforms().clone(),
    };

    let chunk: Vec<TaggedToken> = req.chunk.into_iter().map(TaggedToken::from).collect();
    let (tx, rx) = mpsc::channel();
    let result = pipeline.run_traced(&chunk, &tx);
    drop(tx);

    Json(TransformResponse {
        stages: rx.into_iter().collect(),
        result,
    })
    .into_response()
}

/// Retorna textos de demonstração
async fn demo_texts_handler() -> impl IntoResponse {
    let texts: Vec<serde_json::Value> = demo_texts()
        .iter()
        .map(|(domain, text)| {
            serde_json::json!({
                "domain": domain,
                "text": text
            })
        })
        .collect();
    Json(texts)
}

/// Upgrade HTTP → WebSocket
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Lógica do WebSocket: recebe texto, executa pipeline e envia eventos passo a passo
async fn handle_websocket(mut socket: WebSocket, state: Arc<AppState>) {
    info!("WebSocket conectado");

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => {
                // Aceita JSON {text} ou texto puro
                let text = match serde_json::from_str::<ChunkRequest>(&text) {
                    Ok(req) => req.text.trim().to_string(),
                    Err(_) => text.trim().to_string(),
                };
                if text.is_empty() {
                    continue;
                }

                info!("Analisando via WebSocket: {} chars", text.len());

                // O pipeline é síncrono: roda fora do runtime e coleta os eventos
                let state = Arc::clone(&state);
                let handle = tokio::task::spawn_blocking(move || {
                    let (tx, rx) = mpsc::channel::<PipelineEvent>();
                    state.pipeline.analyze_streaming(&text, tx);
                    rx.into_iter().collect::<Vec<_>>()
                });
                let events = match handle.await {
                    Ok(events) => events,
                    Err(e) => {
                        warn!(error = %e, "pipeline interrompido");
                        continue;
                    }
                };

                for event in &events {
                    if let Ok(json) = serde_json::to_string(event) {
                        if socket.send(Message::Text(json)).await.is_err() {
                            return; // cliente desconectou
                        }
                        // Pequena pausa para animação visual (passo a passo)
                        tokio::time::sleep(tokio::time::Duration::from_millis(35)).await;
                    }
                }
            }
            Message::Close(_) => {
                info!("WebSocket desconectado");
                return;
            }
            Message::Ping(payload) => {
                let _ = socket.send(Message::Pong(payload)).await;
            }
            _ => {}
        }
    }
}
