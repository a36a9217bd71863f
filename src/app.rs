#![cfg(feature = "web")]
use axum::{
    Form, Json, Router,
    extract::{Multipart, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::Settings;
use crate::dashboard::Dashboard;
use crate::graph::{GraphOptions, create_status_chart};
use crate::html;
use crate::selection::Entity;

/// Interactions are applied one at a time under this lock.
pub struct AppState {
    dashboard: Mutex<Dashboard>,
}

impl AppState {
    pub fn new(dashboard: Dashboard) -> Self {
        AppState {
            dashboard: Mutex::new(dashboard),
        }
    }

    fn dashboard(&self) -> MutexGuard<'_, Dashboard> {
        self.dashboard
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[derive(Deserialize)]
struct SelectForm {
    entity: String,
    id: String,
    /// Explicit checkbox state; a plain click toggles.
    checked: Option<bool>,
}

#[derive(Serialize)]
struct ApiResponse {
    status: String,
    message: Option<String>,
}

impl ApiResponse {
    fn error(code: StatusCode, message: impl Into<String>) -> Response {
        (
            code,
            Json(ApiResponse {
                status: "error".to_string(),
                message: Some(message.into()),
            }),
        )
            .into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(serve_dashboard))
        .route("/chart.svg", get(serve_chart))
        .route("/select", post(select_row))
        .route("/selections/clear", post(clear_selections))
        .route("/layout/reload", post(reload_layout))
        .route("/upload", post(upload_workbook))
        .route("/api/dashboard", get(get_dashboard))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let bind_addr = settings.bind_addr.clone();
    let state = Arc::new(AppState::new(Dashboard::new(settings)));
    let app = router(state);

    let listener = TcpListener::bind(&bind_addr).await?;
    info!("listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn serve_dashboard(State(state): State<Arc<AppState>>) -> Response {
    let mut dashboard = state.dashboard();
    match dashboard.render() {
        Ok(page) => Html(html::render_page(&page)).into_response(),
        Err(e) => {
            warn!("workbook load failed: {}", e);
            let body = html::render_error(&dashboard.source().name(), &e.to_string());
            (StatusCode::UNPROCESSABLE_ENTITY, Html(body)).into_response()
        }
    }
}

async fn get_dashboard(State(state): State<Arc<AppState>>) -> Response {
    let mut dashboard = state.dashboard();
    match dashboard.render() {
        Ok(page) => Json(page).into_response(),
        Err(e) => ApiResponse::error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
    }
}

async fn serve_chart(State(state): State<Arc<AppState>>) -> Response {
    let page = match state.dashboard().render() {
        Ok(page) => page,
        Err(e) => return ApiResponse::error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
    };
    match create_status_chart(&page.tally, &GraphOptions::default()) {
        Ok(Some(svg)) => ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response(),
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => ApiResponse::error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn select_row(State(state): State<Arc<AppState>>, Form(form): Form<SelectForm>) -> Response {
    let Some(entity) = Entity::parse(&form.entity) else {
        return ApiResponse::error(
            StatusCode::BAD_REQUEST,
            format!("unknown table '{}'", form.entity),
        );
    };
    let mut dashboard = state.dashboard();
    match form.checked {
        Some(checked) => dashboard.apply_checkbox(entity, &form.id, checked),
        None => dashboard.toggle(entity, &form.id),
    }
    Redirect::to("/").into_response()
}

async fn clear_selections(State(state): State<Arc<AppState>>) -> Redirect {
    state.dashboard().clear_selections();
    Redirect::to("/")
}

async fn reload_layout(State(state): State<Arc<AppState>>) -> Redirect {
    state.dashboard().reload_layout();
    Redirect::to("/")
}

async fn upload_workbook(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> Response {
    let mut upload: Option<(String, Vec<u8>)> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return ApiResponse::error(StatusCode::BAD_REQUEST, e.to_string()),
        };
        if field.name() != Some("workbook") {
            continue;
        }
        let name = field.file_name().unwrap_or("upload.xlsx").to_string();
        match field.bytes().await {
            Ok(bytes) => upload = Some((name, bytes.to_vec())),
            Err(e) => return ApiResponse::error(StatusCode::BAD_REQUEST, e.to_string()),
        }
    }

    let mut dashboard = state.dashboard();
    match upload {
        Some((name, bytes)) if !bytes.is_empty() => dashboard.use_upload(name, bytes),
        // An empty file input means "no upload": back to the bundled workbook.
        _ => dashboard.use_default_workbook(),
    }
    Redirect::to("/").into_response()
}
