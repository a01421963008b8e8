//! HTTP + WebSocket API for HumanGate
//!
//! Endpoints:
//! - POST /session/new - Create new session
//! - GET /session/{id} - Get session status
//! - POST /session/{id}/claim - Submit a humanity claim
//! - POST /session/{id}/frame - Ingest one video frame
//! - POST /session/{id}/choice - Answer the offer (tutorial or rejection)
//! - POST /session/{id}/reset - Reset session to initial state
//! - GET /session/{id}/attempt - Latest scored attempt
//! - GET /session/{id}/overlay - Overlay primitives for the current frame
//! - WS /ws/{id} - Live updates
//! - GET /health - Health check

use axum::{
    extract::{Path, State, WebSocketUpgrade, ws::{Message, WebSocket}},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use crate::core::projector::OverlayFrame;
use crate::core::session::{FrameInput, VerificationSession};
use crate::types::{ChallengeConfig, StatusOutput, SubMetrics};

/// Session wrapper with its live update channel
#[derive(Debug)]
pub struct Session {
    pub id: String,
    pub engine: VerificationSession,
    pub update_tx: broadcast::Sender<SessionUpdate>,
}

/// Live update message
#[derive(Debug, Clone, Serialize)]
pub struct SessionUpdate {
    pub phase: String,
    pub level: u32,
    pub humanity_percentage: u32,
    pub countdown_steps: Option<u32>,
    pub score: Option<f64>,
    pub reason: String,
}

impl SessionUpdate {
    fn from_status(status: &StatusOutput) -> Self {
        Self {
            phase: status.phase.to_string(),
            level: status.level,
            humanity_percentage: status.humanity_percentage,
            countdown_steps: status.countdown_steps,
            score: status.score,
            reason: status.reason.code().to_string(),
        }
    }
}

/// App state
pub struct AppState {
    pub sessions: RwLock<HashMap<String, Session>>,
}

/// Create new session request
#[derive(Debug, Default, Deserialize)]
pub struct NewSessionRequest {
    pub seed: Option<u64>,
    #[serde(default)]
    pub reverse_challenge: bool,
}

/// Create new session response
#[derive(Debug, Serialize)]
pub struct NewSessionResponse {
    pub session_id: String,
    pub websocket_url: String,
}

/// Session status response
#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub session_id: String,
    pub phase: String,
    pub level: u32,
    pub humanity_percentage: u32,
    pub countdown_steps: Option<u32>,
    pub score: Option<f64>,
    pub reason: String,
    pub reason_description: String,
    pub tracking: bool,
}

/// Frame ingest response
#[derive(Debug, Serialize)]
pub struct FrameResponse {
    pub phase: String,
    pub countdown_steps: Option<u32>,
    pub tracking_mode: Option<String>,
    pub scored: bool,
}

/// Offer choice request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceRequest {
    Tutorial,
    Rejection,
}

/// Latest attempt response
#[derive(Debug, Serialize)]
pub struct AttemptResponse {
    pub session_id: String,
    pub level: u32,
    pub score: f64,
    pub passing_threshold: f64,
    pub shortfall: f64,
    pub sub_metrics: SubMetrics,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sessions_active: usize,
}

/// Create the API router
pub fn create_router() -> Router {
    let state = Arc::new(AppState {
        sessions: RwLock::new(HashMap::new()),
    });

    Router::new()
        .route("/health", get(health))
        .route("/session/new", post(create_session))
        .route("/session/:id", get(get_session))
        .route("/session/:id/claim", post(submit_claim))
        .route("/session/:id/frame", post(ingest_frame))
        .route("/session/:id/choice", post(submit_choice))
        .route("/session/:id/reset", post(reset_session))
        .route("/session/:id/attempt", get(get_attempt))
        .route("/session/:id/overlay", get(get_overlay))
        .route("/ws/:id", get(websocket_handler))
        .with_state(state)
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let sessions = state.sessions.read().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        sessions_active: sessions.len(),
    })
}

/// Create new session
async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewSessionRequest>,
) -> Result<Json<NewSessionResponse>, StatusCode> {
    let session_id = generate_session_id();
    let (tx, _) = broadcast::channel(100);

    let config = if req.reverse_challenge {
        ChallengeConfig::reverse_challenge()
    } else {
        ChallengeConfig::default()
    };
    let engine = match req.seed {
        Some(seed) => VerificationSession::with_seed(config, seed),
        None => VerificationSession::with_config(config),
    };

    let session = Session {
        id: session_id.clone(),
        engine,
        update_tx: tx,
    };

    let mut sessions = state.sessions.write().await;
    sessions.insert(session_id.clone(), session);

    Ok(Json(NewSessionResponse {
        session_id: session_id.clone(),
        websocket_url: format!("/ws/{}", session_id),
    }))
}

/// Get session status
async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionStatusResponse>, StatusCode> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(status_response(&id, &session.engine)))
}

/// Submit a humanity claim
async fn submit_claim(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionStatusResponse>, StatusCode> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;

    let status = session.engine.submit_claim();
    let _ = session.update_tx.send(SessionUpdate::from_status(&status));

    Ok(Json(status_response(&id, &session.engine)))
}

/// Ingest one frame
async fn ingest_frame(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(frame): Json<FrameInput>,
) -> Result<Json<FrameResponse>, StatusCode> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;

    let attempt = session.engine.ingest_frame(&frame);
    let status = session.engine.status();
    let _ = session.update_tx.send(SessionUpdate::from_status(&status));

    Ok(Json(FrameResponse {
        phase: status.phase.to_string(),
        countdown_steps: status.countdown_steps,
        tracking_mode: session
            .engine
            .face()
            .map(|f| format!("{:?}", f.mode).to_uppercase()),
        scored: attempt.is_some(),
    }))
}

/// Answer the offer
async fn submit_choice(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(choice): Json<ChoiceRequest>,
) -> Result<Json<SessionStatusResponse>, StatusCode> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;

    let status = match choice {
        ChoiceRequest::Tutorial => session.engine.choose_tutorial(),
        ChoiceRequest::Rejection => session.engine.choose_rejection(),
    };
    let _ = session.update_tx.send(SessionUpdate::from_status(&status));

    Ok(Json(status_response(&id, &session.engine)))
}

/// Reset session to initial state
async fn reset_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionStatusResponse>, StatusCode> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;

    session.engine.reset();
    let status = session.engine.status();
    let _ = session.update_tx.send(SessionUpdate::from_status(&status));

    Ok(Json(status_response(&id, &session.engine)))
}

/// Latest scored attempt
async fn get_attempt(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<AttemptResponse>, StatusCode> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;

    let attempt = session.engine.last_attempt().ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(AttemptResponse {
        session_id: id,
        level: attempt.level,
        score: attempt.score,
        passing_threshold: crate::PASSING_THRESHOLD,
        shortfall: attempt.shortfall(),
        sub_metrics: attempt.sub_metrics.clone(),
    }))
}

/// Overlay primitives for the current tracked state
async fn get_overlay(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OverlayFrame>, StatusCode> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;

    let overlay = session.engine.overlay().ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(overlay))
}

/// WebSocket handler for live updates
async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, StatusCode> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    let rx = session.update_tx.subscribe();
    drop(sessions);

    Ok(ws.on_upgrade(move |socket| async move {
        handle_websocket(socket, rx).await;
    }))
}

/// Handle WebSocket connection: push updates, drop on client close
async fn handle_websocket(socket: WebSocket, mut rx: broadcast::Receiver<SessionUpdate>) {
    let (mut sender, mut receiver) = socket.split();
    loop {
        tokio::select! {
            update = rx.recv() => {
                let Ok(update) = update else { break };
                let json = serde_json::to_string(&update).unwrap_or_default();
                if futures_util::SinkExt::send(&mut sender, Message::Text(json)).await.is_err() {
                    break;
                }
            }
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    _ => {}
                }
            }
        }
    }
}

fn status_response(id: &str, engine: &VerificationSession) -> SessionStatusResponse {
    let status = engine.status();
    SessionStatusResponse {
        session_id: id.to_string(),
        phase: status.phase.to_string(),
        level: status.level,
        humanity_percentage: status.humanity_percentage,
        countdown_steps: status.countdown_steps,
        score: status.score,
        reason: status.reason.code().to_string(),
        reason_description: status.reason.description().to_string(),
        tracking: engine.face().is_some(),
    }
}

/// Generate session ID
fn generate_session_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    format!("session_{:x}", nanos as u64)
}

/// Run the API server
pub async fn run_server(addr: &str) -> Result<(), Box<dyn std::error::Error>> {
    let router = create_router();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("🧬 HumanGate API running on {}", addr);
    println!("  POST /session/new         - Create session");
    println!("  GET  /session/:id         - Get status");
    println!("  POST /session/:id/claim   - Submit humanity claim");
    println!("  POST /session/:id/frame   - Ingest frame");
    println!("  POST /session/:id/choice  - Answer offer");
    println!("  POST /session/:id/reset   - Reset session");
    println!("  GET  /session/:id/attempt - Latest attempt");
    println!("  GET  /session/:id/overlay - Overlay primitives");
    println!("  WS   /ws/:id              - Live updates");
    println!("  GET  /health              - Health check");
    axum::serve(listener, router).await?;
    Ok(())
}
