use pdfchat_core::{
    ApiError, ChatAnswer, DeleteResponse, FileList, ListingToken, PendingFile, ReprocessResponse,
    UploadResponse,
};

/// Network work the UI asks the backend to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    List(ListingToken),
    Reprocess,
    Upload(Vec<PendingFile>),
    /// Delete the file with this (unstripped) identifier.
    Delete(String),
    Ask { text: String, n_results: u32 },
}

/// Events flowing from backend tasks to the TUI.
#[derive(Debug)]
pub enum BackendEvent {
    Listed {
        token: ListingToken,
        result: Result<FileList, ApiError>,
    },
    Reprocessed(Result<ReprocessResponse, ApiError>),
    Uploaded(Result<UploadResponse, ApiError>),
    Deleted {
        identifier: String,
        result: Result<DeleteResponse, ApiError>,
    },
    Answered(Result<ChatAnswer, ApiError>),
}
