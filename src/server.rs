use crate::config::AppConfig;
use crate::control::YearControl;
use crate::join::working_set;
use crate::plot::Session;
use crate::scene::Tooltip;
use crate::svg::to_svg;
use crate::types::Record;
use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tracing::info;

const INDEX_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Gdp over population</title>
<style>
  body { font-family: sans-serif; }
  .tooltip { position: absolute; opacity: 0; pointer-events: none; background: white; border: 1px solid #999; padding: 4px 8px; width: {tooltip_width}px; }
</style>
</head>
<body>
<div id="plot"></div>
<input type="range" min="{min}" max="{max}" step="1" value="{value}">
<div class="tooltip"></div>
<script>
  const plot = document.getElementById('plot');
  const tooltip = document.querySelector('.tooltip');
  const input = document.querySelector('input');
  const load = (query) => fetch('/api/frame' + query).then(r => r.text()).then(svg => { plot.innerHTML = svg; });
  input.addEventListener('input', () => load('?year=' + input.value));
  plot.addEventListener('mouseover', (e) => {
    const key = e.target.getAttribute && e.target.getAttribute('data-key');
    if (!key) return;
    fetch(`/api/tooltip?key=${encodeURIComponent(key)}&x=${e.clientX}&y=${e.clientY}`, { method: 'POST' })
      .then(r => r.json())
      .then(t => { tooltip.innerHTML = t.html; tooltip.style.opacity = t.opacity; tooltip.style.top = t.top + 'px'; tooltip.style.left = t.left + 'px'; });
  });
  plot.addEventListener('mouseout', (e) => {
    if (!(e.target.getAttribute && e.target.getAttribute('data-key'))) return;
    fetch('/api/tooltip', { method: 'DELETE' }).then(() => { tooltip.style.opacity = 0; });
  });
  load('');
</script>
</body>
</html>
"#;

pub struct AppState {
    pub session: Mutex<Session>,
    pub config: AppConfig,
}

#[derive(Deserialize)]
pub struct FrameParams {
    year: Option<f64>,
}

#[derive(Deserialize)]
pub struct RecordsParams {
    year: Option<i32>,
}

#[derive(Deserialize)]
pub struct TooltipParams {
    key: String,
    x: f64,
    y: f64,
}

#[derive(Serialize)]
pub struct RecordsResponse {
    year: i32,
    records: Vec<Record>,
}

#[derive(Serialize)]
struct ErrorBody {
    status: &'static str,
    message: String,
}

/// Error response with a JSON body.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody { status: "error", message: self.message });
        (self.status, body).into_response()
    }
}

impl ApiError {
    fn internal(message: impl Into<String>) -> Self {
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, message: message.into() }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self { status: StatusCode::NOT_FOUND, message: message.into() }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, ApiError> {
    mutex.lock().map_err(|_| ApiError::internal("Plot state is unavailable after an earlier failure"))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/frame", get(frame_handler))
        .route("/api/records", get(records_handler))
        .route("/api/tooltip", post(tooltip_enter_handler).delete(tooltip_exit_handler))
        .route("/api/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(config: AppConfig, session: Session) -> Result<()> {
    let port = config.server.port;
    let state = Arc::new(AppState {
        session: Mutex::new(session),
        config,
    });

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}

pub fn index_page(control: &YearControl, tooltip_width: f64) -> String {
    INDEX_TEMPLATE
        .replace("{min}", &control.min().to_string())
        .replace("{max}", &control.max().to_string())
        .replace("{value}", &control.value().to_string())
        .replace("{tooltip_width}", &tooltip_width.to_string())
}

async fn index_handler(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    let session = lock(&state.session)?;
    Ok(Html(index_page(&session.control, state.config.canvas.tooltip_width)))
}

/// Drives the year control when `year` is given, then returns the current frame.
async fn frame_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FrameParams>,
) -> Result<Response, ApiError> {
    let mut session = lock(&state.session)?;
    if let Some(raw) = params.year {
        let year = session.control.input(raw);
        info!("Year set to {}", year);
    }
    let svg = to_svg(&lock(&session.plot)?.state);
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response())
}

async fn records_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RecordsParams>,
) -> Result<Json<RecordsResponse>, ApiError> {
    let session = lock(&state.session)?;
    let year = params.year.unwrap_or_else(|| session.control.value());
    let plot = lock(&session.plot)?;
    let records = working_set(&plot.dataset, year).into_iter().cloned().collect();
    Ok(Json(RecordsResponse { year, records }))
}

async fn tooltip_enter_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TooltipParams>,
) -> Result<Json<Tooltip>, ApiError> {
    let session = lock(&state.session)?;
    let mut plot = lock(&session.plot)?;
    if !plot.state.scene.hover_enter(&params.key, params.x, params.y) {
        return Err(ApiError::not_found(format!("No mark for '{}'", params.key)));
    }
    Ok(Json(plot.state.scene.tooltip.clone()))
}

async fn tooltip_exit_handler(State(state): State<Arc<AppState>>) -> Result<Json<Tooltip>, ApiError> {
    let session = lock(&state.session)?;
    let mut plot = lock(&session.plot)?;
    plot.state.scene.hover_exit();
    Ok(Json(plot.state.scene.tooltip.clone()))
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
