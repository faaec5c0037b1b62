use std::path::PathBuf;
use thiserror::Error;

pub mod chat;
pub mod client;
pub mod config;
pub mod types;
pub mod uploads;

#[cfg(test)]
pub(crate) mod testing;

// Re-export for convenience
pub use chat::{BOT_ERROR_TEXT, ChatController, ChatMessage, SendOutcome, Sender};
pub use client::{ApiClient, PdfApi, wire_name};
pub use config::{Config, ConfigError, ConfigOverrides, FileConfig, ReprocessPolicy};
pub use types::{
    ChatAnswer, DeleteResponse, FileList, HealthResponse, ReprocessResponse, UploadFile,
    UploadResponse,
};
pub use uploads::{
    DeleteOutcome, FileEntry, FileState, ListingToken, PendingFile, StatusKind, StatusMessage,
    UploadController, UploadOutcome, read_pending,
};

/// The server accepts at most this many files per upload request.
pub const MAX_UPLOAD_FILES: usize = 10;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("at most 10 files per upload, got {count}")]
    TooManyFiles { count: usize },
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid API base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl ApiError {
    /// The `detail` field FastAPI-style servers put in error bodies, if any.
    pub fn detail(&self) -> Option<String> {
        match self {
            ApiError::Status { body, .. } => serde_json::from_str::<serde_json::Value>(body)
                .ok()
                .and_then(|v| v.get("detail")?.as_str().map(str::to_string)),
            _ => None,
        }
    }
}
