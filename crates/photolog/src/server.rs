//! HTTP surface of the journal.
//!
//! | Route                 | Purpose                                   |
//! |-----------------------|-------------------------------------------|
//! | `POST /upload`        | multipart batch upload (field `photos`)   |
//! | `GET /photos`         | all records, newest first                 |
//! | `GET /photo/:id`      | one full record                           |
//! | `DELETE /photo/:id`   | remove a record and its images            |
//! | `GET /uploads/*`      | stored originals                          |
//! | `GET /thumbnails/*`   | thumbnails                                |
//! | `GET /previews/*`     | previews                                  |
//!
//! Mutations run one at a time under [`AppState::writes`]. The catalog file
//! itself has no cross-process lock.

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use photolog_core::{Journal, JournalError, PhotoRecord, PhotoSummary, SkippedUpload, Upload};
use serde::Serialize;
use tokio::sync::Mutex;
use tower_http::{services::ServeDir, trace::TraceLayer};

/// Shared state of the router.
pub struct AppState {
    journal: Journal,
    /// Held for the duration of every catalog mutation.
    writes: Mutex<()>,
    upload_field: String,
}

/// Build the application router over `journal`.
pub fn router(journal: Journal) -> Router {
    let config = journal.config().clone();
    let body_limit = config.limits.max_upload_bytes();

    let state = Arc::new(AppState {
        journal,
        writes: Mutex::new(()),
        upload_field: config.server.upload_field.clone(),
    });

    Router::new()
        .route("/upload", post(upload_photos))
        .route("/photos", get(list_photos))
        .route("/photo/:id", get(get_photo).delete(delete_photo))
        .nest_service("/uploads", ServeDir::new(config.originals_dir()))
        .nest_service("/thumbnails", ServeDir::new(config.thumbnails_dir()))
        .nest_service("/previews", ServeDir::new(config.previews_dir()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(journal: Journal, addr: &str) -> anyhow::Result<()> {
    let app = router(journal);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}

/// Body of a successful upload.
#[derive(Debug, Serialize)]
struct UploadResponse {
    success: bool,
    message: String,
    count: usize,
    photos: Vec<PhotoSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    skipped: Vec<SkippedUpload>,
}

#[derive(Debug, Serialize)]
struct DeleteResponse {
    success: bool,
    id: String,
}

async fn upload_photos(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(state.upload_field.as_str()) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        // Browsers send an empty part when nothing was picked.
        if filename.is_empty() && bytes.is_empty() {
            continue;
        }
        uploads.push(Upload::new(filename, bytes.to_vec()));
    }

    if uploads.is_empty() {
        return Err(ApiError::bad_request("No photos selected"));
    }

    let report = {
        let _guard = state.writes.lock().await;
        state.journal.ingest(uploads).await?
    };

    Ok(Json(UploadResponse {
        success: true,
        message: report.message(),
        count: report.created.len(),
        photos: report.created.iter().map(PhotoRecord::summary).collect(),
        skipped: report.skipped,
    }))
}

async fn list_photos(State(state): State<Arc<AppState>>) -> Json<Vec<PhotoRecord>> {
    Json(state.journal.list())
}

async fn get_photo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PhotoRecord>, ApiError> {
    Ok(Json(state.journal.get(&id)?))
}

async fn delete_photo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let record = {
        let _guard = state.writes.lock().await;
        let worker = Arc::clone(&state);
        tokio::task::spawn_blocking(move || worker.journal.delete(&id))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Delete task failed");
                ApiError::internal()
            })??
    };
    Ok(Json(DeleteResponse {
        success: true,
        id: record.id,
    }))
}

/// An error rendered as `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Internal server error".to_string(),
        }
    }
}

impl From<JournalError> for ApiError {
    fn from(err: JournalError) -> Self {
        match err {
            JournalError::NotFound(_) => Self {
                status: StatusCode::NOT_FOUND,
                message: "Photo not found".to_string(),
            },
            JournalError::NoUsableFiles { .. } => Self::bad_request(err.to_string()),
            other => {
                tracing::error!(error = %other, "Request failed");
                Self::internal()
            }
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}
