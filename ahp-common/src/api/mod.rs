//! API request/response types shared by the service and its clients

pub mod types;

pub use types::{
    round3, AggregateView, ErrorResponse, FileAnalysisView, RespondentView, UploadResponse,
};
