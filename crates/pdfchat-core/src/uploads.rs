//! Upload/list/delete reconciliation.
//!
//! [`UploadController`] keeps the local view of uploaded files consistent with
//! what the server reports. Every network operation is split into a
//! `begin_*` step that updates local state and says what to send, and a
//! `finish_*` step that applies the server's answer. The async drivers
//! (`startup`, `upload`, `delete_file`, ...) simply run both halves around a
//! [`PdfApi`] call; a UI that runs requests on background tasks calls the
//! halves itself.

use std::path::{Path, PathBuf};

use crate::client::{PdfApi, wire_name};
use crate::config::ReprocessPolicy;
use crate::types::{DeleteResponse, ReprocessResponse, UploadFile, UploadResponse};
use crate::{ApiError, MAX_UPLOAD_FILES};

pub const UPLOAD_COMPLETE_TEXT: &str = "Upload complete!";
pub const UPLOAD_FAILED_TEXT: &str = "Upload failed.";
pub const DELETE_FAILED_TEXT: &str = "Delete failed.";
pub const LIST_FAILED_TEXT: &str = "Could not load uploaded files.";

/// A local file the user picked but has not uploaded yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    pub path: PathBuf,
    /// File name sent to the server.
    pub name: String,
}

impl PendingFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }

    pub async fn read(&self) -> Result<UploadFile, ApiError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| ApiError::Io {
                path: self.path.clone(),
                source,
            })?;
        Ok(UploadFile {
            name: self.name.clone(),
            bytes,
        })
    }
}

impl From<&Path> for PendingFile {
    fn from(path: &Path) -> Self {
        Self::new(path)
    }
}

/// Read every pending file, failing on the first unreadable one.
pub async fn read_pending(files: &[PendingFile]) -> Result<Vec<UploadFile>, ApiError> {
    let mut out = Vec::with_capacity(files.len());
    for file in files {
        out.push(file.read().await?);
    }
    Ok(out)
}

/// Lifecycle of a known file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    Present,
    /// A delete request is in flight; the entry stays visible until it settles.
    Deleting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub identifier: String,
    pub state: FileState,
}

impl FileEntry {
    fn present(identifier: String) -> Self {
        Self {
            identifier,
            state: FileState::Present,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Failure,
}

/// The last user-visible outcome of an upload-side operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    fn success(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            text: text.into(),
        }
    }

    fn failure(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Failure,
            text: text.into(),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.kind == StatusKind::Failure
    }
}

/// Marks one listing request. Changes confirmed after the token was issued
/// are replayed over the listing it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListingToken(u64);

/// A change to `known` that a listing issued earlier cannot have seen.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Change {
    Uploaded(String),
    Deleted(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Nothing selected, or another upload is in flight.
    Skipped,
    /// Identifiers newly added to the known list (already-known ones excluded).
    Uploaded { added: Vec<String> },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Unknown identifier, or a delete for it is already in flight.
    Skipped,
    Deleted,
    /// The request failed and the entry was restored.
    Failed { reason: String },
}

/// Owner of the pending selection and the known uploaded files.
#[derive(Debug, Clone)]
pub struct UploadController {
    pending: Vec<PendingFile>,
    /// The selection handed out by `begin_upload`, while that upload runs.
    uploading: Option<Vec<PendingFile>>,
    known: Vec<FileEntry>,
    status: Option<StatusMessage>,
    policy: ReprocessPolicy,
    /// Sequence number of the next recorded change.
    seq: u64,
    /// Confirmed changes, kept while some listing issued before them is out.
    journal: Vec<(u64, Change)>,
    /// Listings issued but not yet applied or failed.
    outstanding: Vec<ListingToken>,
    /// Newest listing applied so far; older ones arriving later are dropped.
    last_applied: Option<ListingToken>,
}

impl Default for UploadController {
    fn default() -> Self {
        Self::new(ReprocessPolicy::default())
    }
}

impl UploadController {
    pub fn new(policy: ReprocessPolicy) -> Self {
        Self {
            pending: Vec::new(),
            uploading: None,
            known: Vec::new(),
            status: None,
            policy,
            seq: 0,
            journal: Vec::new(),
            outstanding: Vec::new(),
            last_applied: None,
        }
    }

    pub fn pending(&self) -> &[PendingFile] {
        &self.pending
    }

    pub fn known(&self) -> &[FileEntry] {
        &self.known
    }

    pub fn identifiers(&self) -> Vec<&str> {
        self.known.iter().map(|e| e.identifier.as_str()).collect()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.known.iter().any(|e| e.identifier == identifier)
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.uploading.is_some()
    }

    pub fn policy(&self) -> ReprocessPolicy {
        self.policy
    }

    /// Replace the pending selection with at most [`MAX_UPLOAD_FILES`] handles.
    ///
    /// Returns the number of handles dropped for exceeding the cap.
    pub fn select_files<I>(&mut self, handles: I) -> usize
    where
        I: IntoIterator<Item = PendingFile>,
    {
        let mut handles = handles.into_iter();
        self.pending = handles.by_ref().take(MAX_UPLOAD_FILES).collect();
        let dropped = handles.count();
        if dropped > 0 {
            log::info!("selection capped at {MAX_UPLOAD_FILES} files, dropped {dropped}");
        }
        dropped
    }

    pub fn clear_selection(&mut self) {
        self.pending.clear();
    }

    /// Mark the start of a listing request.
    pub fn begin_listing(&mut self) -> ListingToken {
        let token = ListingToken(self.seq);
        self.seq += 1;
        self.outstanding.push(token);
        token
    }

    /// Replace the known list with the listing issued as `token`.
    ///
    /// The listing is deduplicated in order, then uploads and deletes
    /// confirmed after `token` was issued are replayed over it. Entries with a
    /// delete in flight keep their `Deleting` state. A listing older than one
    /// already applied is ignored.
    pub fn apply_listing(&mut self, token: ListingToken, files: Vec<String>) {
        self.settle_listing(token);
        if self.last_applied.is_some_and(|newest| token < newest) {
            log::debug!("dropping superseded listing {token:?}");
            return;
        }
        self.last_applied = Some(token);

        let previous = std::mem::take(&mut self.known);
        let state_of = |identifier: &str| {
            previous
                .iter()
                .find(|e| e.identifier == identifier)
                .map_or(FileState::Present, |e| e.state)
        };
        for identifier in files {
            if self.contains(&identifier) {
                continue;
            }
            let state = state_of(&identifier);
            self.known.push(FileEntry { identifier, state });
        }

        let replay: Vec<Change> = self
            .journal
            .iter()
            .filter(|(seq, _)| *seq > token.0)
            .map(|(_, change)| change.clone())
            .collect();
        for change in replay {
            match change {
                Change::Uploaded(identifier) => {
                    if !self.contains(&identifier) {
                        let state = state_of(&identifier);
                        self.known.push(FileEntry { identifier, state });
                    }
                }
                Change::Deleted(identifier) => self.known.retain(|e| e.identifier != identifier),
            }
        }
        self.prune_journal();
        log::debug!("listing applied: {} known file(s)", self.known.len());
    }

    pub fn listing_failed(&mut self, token: ListingToken, err: &ApiError) {
        log::warn!("listing uploaded files failed: {err}");
        self.settle_listing(token);
        self.prune_journal();
        self.status = Some(StatusMessage::failure(LIST_FAILED_TEXT));
    }

    fn settle_listing(&mut self, token: ListingToken) {
        self.outstanding.retain(|t| *t != token);
    }

    fn record(&mut self, change: Change) {
        if self.outstanding.is_empty() {
            return;
        }
        self.journal.push((self.seq, change));
        self.seq += 1;
    }

    /// Forget changes every outstanding listing was issued after.
    fn prune_journal(&mut self) {
        match self.outstanding.iter().min() {
            Some(oldest) => {
                let oldest = oldest.0;
                self.journal.retain(|(seq, _)| *seq > oldest);
            }
            None => self.journal.clear(),
        }
    }

    /// Start an upload of the pending selection.
    ///
    /// Returns the files to send, or `None` when nothing is selected or an
    /// upload is already in flight.
    pub fn begin_upload(&mut self) -> Option<Vec<PendingFile>> {
        if self.uploading.is_some() || self.pending.is_empty() {
            return None;
        }
        self.status = None;
        self.uploading = Some(self.pending.clone());
        Some(self.pending.clone())
    }

    /// Apply an upload result. The pending selection is cleared only if it is
    /// still the one `begin_upload` handed out.
    pub fn finish_upload(&mut self, result: Result<UploadResponse, ApiError>) -> UploadOutcome {
        let sent = self.uploading.take();
        match result {
            Ok(resp) => {
                let text = resp
                    .message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| UPLOAD_COMPLETE_TEXT.to_string());
                self.status = Some(StatusMessage::success(text));
                if sent.as_deref() == Some(self.pending.as_slice()) {
                    self.pending.clear();
                }
                for identifier in &resp.files {
                    self.record(Change::Uploaded(identifier.clone()));
                }
                let added = self.merge(resp.files);
                log::info!("upload complete, {} new file(s)", added.len());
                UploadOutcome::Uploaded { added }
            }
            Err(err) => {
                log::warn!("upload failed: {err}");
                self.status = Some(StatusMessage::failure(UPLOAD_FAILED_TEXT));
                UploadOutcome::Failed {
                    reason: err.detail().unwrap_or_else(|| err.to_string()),
                }
            }
        }
    }

    /// Mark `identifier` as deleting. Returns `false` when it is unknown or
    /// already being deleted, in which case no request should be sent.
    pub fn begin_delete(&mut self, identifier: &str) -> bool {
        match self.known.iter_mut().find(|e| e.identifier == identifier) {
            Some(entry) if entry.state == FileState::Present => {
                entry.state = FileState::Deleting;
                true
            }
            _ => false,
        }
    }

    pub fn finish_delete(
        &mut self,
        identifier: &str,
        result: Result<DeleteResponse, ApiError>,
    ) -> DeleteOutcome {
        match result {
            Ok(resp) => {
                log::info!(
                    "deleted {} ({})",
                    wire_name(identifier),
                    resp.message.as_deref().unwrap_or("no message")
                );
                self.known.retain(|e| e.identifier != identifier);
                self.record(Change::Deleted(identifier.to_string()));
                DeleteOutcome::Deleted
            }
            Err(err) => {
                log::warn!("delete of {identifier} failed: {err}");
                if let Some(entry) = self.known.iter_mut().find(|e| e.identifier == identifier) {
                    entry.state = FileState::Present;
                }
                self.status = Some(StatusMessage::failure(DELETE_FAILED_TEXT));
                DeleteOutcome::Failed {
                    reason: err.detail().unwrap_or_else(|| err.to_string()),
                }
            }
        }
    }

    /// Log the result of a reprocess request. Returns whether it succeeded.
    pub fn finish_reprocess(&mut self, result: Result<ReprocessResponse, ApiError>) -> bool {
        match result {
            Ok(resp) => {
                log::info!(
                    "reprocess complete: {} new file(s), {} stale chunk(s) removed",
                    resp.new_files.len(),
                    resp.deleted_chunks
                );
                true
            }
            Err(err) => {
                log::warn!("reprocess failed: {err}");
                false
            }
        }
    }

    pub fn reprocess_on_startup(&self) -> bool {
        self.policy == ReprocessPolicy::OnStartup
    }

    pub fn reprocess_after_upload(&self) -> bool {
        self.policy == ReprocessPolicy::AfterUpload
    }

    /// Initial sync: fetch the listing, then reprocess if the policy says so.
    ///
    /// The reprocess step runs even when the listing fails; the listing error
    /// is returned afterwards.
    pub async fn startup<A: PdfApi>(&mut self, api: &A) -> Result<(), ApiError> {
        let listing = self.refresh(api).await;
        if self.reprocess_on_startup() {
            let result = api.reprocess().await;
            self.finish_reprocess(result);
        }
        listing
    }

    pub async fn refresh<A: PdfApi>(&mut self, api: &A) -> Result<(), ApiError> {
        let token = self.begin_listing();
        match api.list_uploaded().await {
            Ok(list) => {
                self.apply_listing(token, list.files);
                Ok(())
            }
            Err(err) => {
                self.listing_failed(token, &err);
                Err(err)
            }
        }
    }

    pub async fn upload<A: PdfApi>(&mut self, api: &A) -> UploadOutcome {
        let Some(files) = self.begin_upload() else {
            return UploadOutcome::Skipped;
        };
        let result = match read_pending(&files).await {
            Ok(files) => api.upload(files).await,
            Err(err) => Err(err),
        };
        let outcome = self.finish_upload(result);
        if matches!(outcome, UploadOutcome::Uploaded { .. }) && self.reprocess_after_upload() {
            let result = api.reprocess().await;
            self.finish_reprocess(result);
        }
        outcome
    }

    pub async fn delete_file<A: PdfApi>(&mut self, api: &A, identifier: &str) -> DeleteOutcome {
        if !self.begin_delete(identifier) {
            return DeleteOutcome::Skipped;
        }
        let result = api.delete(identifier).await;
        self.finish_delete(identifier, result)
    }

    /// Append identifiers that are not yet known; returns the ones added.
    fn merge(&mut self, identifiers: Vec<String>) -> Vec<String> {
        let mut added = Vec::new();
        for identifier in identifiers {
            if self.contains(&identifier) {
                continue;
            }
            self.known.push(FileEntry::present(identifier.clone()));
            added.push(identifier);
        }
        added
    }
}
