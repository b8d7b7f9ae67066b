use crate::api::response::{ApiResponse, ErrorResponse};
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};

use super::commands::{add_assets, AddAssetsCommand, AddAssetsError};
use super::types::CandidateFile;
use crate::features::FeatureState;

pub fn projects_routes() -> Router<FeatureState> {
    Router::new().route("/:project_id/assets", post(upload_assets))
}

#[tracing::instrument(skip(state, multipart), fields(project_id = project_id))]
async fn upload_assets(
    State(state): State<FeatureState>,
    Path(project_id): Path<i64>,
    mut multipart: Multipart,
) -> Result<Response, AssetApiError> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AssetApiError::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        if field.name() != Some("files") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(|e| {
            AssetApiError::BadRequest(format!("Failed to read file bytes: {}", e))
        })?;

        files.push(CandidateFile {
            filename,
            content: data.to_vec(),
        });
    }

    if files.is_empty() {
        return Err(AssetApiError::BadRequest(
            "No files field found in multipart data".to_string(),
        ));
    }

    let command = AddAssetsCommand { project_id, files };
    let response = add_assets::handle(
        state.projects.as_ref(),
        &state.storage,
        &state.queue,
        command,
    )
    .await?;

    tracing::info!(files_ingested = response.files_ingested, "Assets uploaded via API");

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[derive(Debug)]
enum AssetApiError {
    BadRequest(String),
    Ingest(AddAssetsError),
}

impl From<AddAssetsError> for AssetApiError {
    fn from(err: AddAssetsError) -> Self {
        Self::Ingest(err)
    }
}

impl IntoResponse for AssetApiError {
    fn into_response(self) -> Response {
        match self {
            AssetApiError::BadRequest(message) => {
                let error = ErrorResponse::new("BAD_REQUEST", message);
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            AssetApiError::Ingest(err @ AddAssetsError::ProjectNotFound) => {
                let error = ErrorResponse::new("PROJECT_NOT_FOUND", err.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            AssetApiError::Ingest(err @ AddAssetsError::InvalidFileType(_)) => {
                let error = ErrorResponse::new("INVALID_FILE_TYPE", err.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            AssetApiError::Ingest(err @ AddAssetsError::Storage { .. }) => {
                tracing::error!(error = %err, "Storage error during asset upload");
                let error = ErrorResponse::new("STORAGE_ERROR", err.to_string());
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
            AssetApiError::Ingest(err @ AddAssetsError::Submission { .. }) => {
                tracing::error!(error = %err, "Submission error during asset upload");
                let error = ErrorResponse::new("SUBMISSION_ERROR", err.to_string());
                (StatusCode::SERVICE_UNAVAILABLE, Json(error)).into_response()
            },
            AssetApiError::Ingest(AddAssetsError::Database(err)) => {
                tracing::error!(error = %err, "Database error during asset upload");
                let error = ErrorResponse::new("DATABASE_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}
