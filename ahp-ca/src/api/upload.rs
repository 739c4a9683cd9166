//! Upload endpoint
//!
//! `POST /uploadfile/` takes one or more comparison tables as
//! multipart/form-data. Each file runs through the full AHP pipeline on its
//! own; matrices from different files are never aggregated together.
//!
//! Any failure aborts the whole request: the response carries only the error
//! message, never partial results.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{debug, error, info};

use ahp_common::ahp::analyze_table;
use ahp_common::api::{ErrorResponse, FileAnalysisView, UploadResponse};

use crate::{report, AppState};

/// POST /uploadfile/
pub async fn upload_files(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, UploadError> {
    info!("Files upload initiated");

    let result = process_upload(&state, multipart).await;
    match &result {
        Ok(response) => info!(
            "Files processed successfully ({} files, report {})",
            response.files.len(),
            response.document
        ),
        Err(e) => error!("Error processing files: {}", e),
    }
    result.map(Json)
}

async fn process_upload(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<UploadResponse, UploadError> {
    let mut multipart = multipart.map_err(|e| UploadError::Multipart {
        status: e.status(),
        message: e.body_text(),
    })?;

    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        // Plain form fields carry no file name; only file parts are tables
        let Some(file_name) = field.file_name().map(str::to_string) else {
            debug!(
                "Skipping non-file form field {}",
                field.name().unwrap_or("<unnamed>")
            );
            continue;
        };

        let bytes = field.bytes().await.map_err(multipart_error)?;
        let content = String::from_utf8(bytes.to_vec()).map_err(|_| UploadError::InvalidEncoding {
            file: file_name.clone(),
        })?;

        info!("Processing file content for {}", file_name);
        let analysis = analyze_table(&content).map_err(|source| UploadError::Analysis {
            file: file_name.clone(),
            source,
        })?;

        files.push(FileAnalysisView::new(file_name, &analysis));
    }

    if files.is_empty() {
        return Err(UploadError::NoFiles);
    }

    info!("Saving analysis results to report document");
    let document = report::write_report(&state.config.reports_dir, &files)
        .await
        .map_err(|e| UploadError::Report(e.to_string()))?;

    Ok(UploadResponse::new(document, files))
}

fn multipart_error(e: MultipartError) -> UploadError {
    UploadError::Multipart {
        status: e.status(),
        message: e.body_text(),
    }
}

/// Upload API errors
#[derive(Debug, Error)]
pub enum UploadError {
    /// Request body is not valid multipart/form-data, or is too large
    #[error("Invalid upload: {message}")]
    Multipart { status: StatusCode, message: String },

    /// Multipart body held no file parts
    #[error("No files uploaded")]
    NoFiles,

    /// File content is not UTF-8 text
    #[error("{file}: file is not valid UTF-8 text")]
    InvalidEncoding { file: String },

    /// Engine rejected the file
    #[error("{file}: {source}")]
    Analysis {
        file: String,
        #[source]
        source: ahp_common::Error,
    },

    /// Report document could not be written
    #[error("Failed to save report: {0}")]
    Report(String),
}

impl UploadError {
    fn status(&self) -> StatusCode {
        match self {
            UploadError::Multipart { status, .. } => *status,
            UploadError::NoFiles | UploadError::InvalidEncoding { .. } => StatusCode::BAD_REQUEST,
            UploadError::Analysis { source, .. } => match source {
                ahp_common::Error::MalformedInput { .. } | ahp_common::Error::InvalidInput(_) => {
                    StatusCode::BAD_REQUEST
                }
                ahp_common::Error::NumericDegeneracy(_)
                | ahp_common::Error::MatrixShapeMismatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                ahp_common::Error::Io(_) | ahp_common::Error::Config(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            UploadError::Report(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}
