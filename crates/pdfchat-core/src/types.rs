//! Request and response bodies exchanged with the question-answering service.
//!
//! Every response field the client does not strictly need is optional or
//! defaulted: the service is a black box and callers only care whether the
//! call succeeded.

use serde::{Deserialize, Serialize};

/// A local file ready to be sent as one multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Response to `POST /upload_pdfs`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub message: Option<String>,
    /// Identifiers of the stored files, usually prefixed with the server's
    /// storage directory.
    #[serde(default)]
    pub files: Vec<String>,
}

/// Response to `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChatAnswer {
    pub answer: String,
}

/// Response to `GET /list_pdfs`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<String>,
}

/// Response to `POST /reprocess_pdfs`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReprocessResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub new_files: Vec<String>,
    #[serde(default)]
    pub deleted_chunks: usize,
}

/// Body of `DELETE /delete_pdf`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct DeleteRequest<'a> {
    pub filename: &'a str,
}

/// Response to `DELETE /delete_pdf`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DeleteResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub deleted_file: Option<String>,
    #[serde(default)]
    pub deleted_chunks: Option<usize>,
}

/// Response to `GET /`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub message: Option<String>,
}
