//! Scripted [`PdfApi`] double for controller tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::ApiError;
use crate::client::{PdfApi, wire_name};
use crate::types::{
    ChatAnswer, DeleteResponse, FileList, ReprocessResponse, UploadFile, UploadResponse,
};

/// A request the fake received, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    /// File names of the uploaded parts.
    Upload(Vec<String>),
    Query(String, u32),
    List,
    Reprocess,
    /// The name as it would go on the wire.
    Delete(String),
}

/// Each queue is popped per call; an empty queue yields a default success,
/// except queries, which fail.
#[derive(Default)]
pub(crate) struct FakeApi {
    pub uploads: Mutex<VecDeque<Result<UploadResponse, ApiError>>>,
    pub answers: Mutex<VecDeque<Result<ChatAnswer, ApiError>>>,
    pub listings: Mutex<VecDeque<Result<FileList, ApiError>>>,
    pub deletes: Mutex<VecDeque<Result<DeleteResponse, ApiError>>>,
    log: Mutex<Vec<Call>>,
}

pub(crate) fn failure() -> ApiError {
    ApiError::Status {
        status: 500,
        body: r#"{"detail":"boom"}"#.to_string(),
    }
}

impl FakeApi {
    pub fn calls(&self) -> Vec<Call> {
        self.log.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.log.lock().unwrap().push(call);
    }
}

impl PdfApi for FakeApi {
    async fn upload(&self, files: Vec<UploadFile>) -> Result<UploadResponse, ApiError> {
        self.record(Call::Upload(files.into_iter().map(|f| f.name).collect()));
        self.uploads
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(UploadResponse::default()))
    }

    async fn query(&self, text: &str, n_results: u32) -> Result<ChatAnswer, ApiError> {
        self.record(Call::Query(text.to_string(), n_results));
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(failure()))
    }

    async fn list_uploaded(&self) -> Result<FileList, ApiError> {
        self.record(Call::List);
        self.listings
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(FileList::default()))
    }

    async fn reprocess(&self) -> Result<ReprocessResponse, ApiError> {
        self.record(Call::Reprocess);
        Ok(ReprocessResponse::default())
    }

    async fn delete(&self, identifier: &str) -> Result<DeleteResponse, ApiError> {
        self.record(Call::Delete(wire_name(identifier).to_string()));
        self.deletes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(DeleteResponse::default()))
    }
}
