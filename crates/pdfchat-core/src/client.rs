//! HTTP client for the question-answering service.
//!
//! [`PdfApi`] is the seam the controllers are written against; [`ApiClient`]
//! is its reqwest implementation.

use std::future::Future;
use std::time::Duration;

use reqwest::Url;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::types::{
    ChatAnswer, DeleteRequest, DeleteResponse, FileList, HealthResponse, ReprocessResponse,
    UploadFile, UploadResponse,
};
use crate::{ApiError, MAX_UPLOAD_FILES};

/// The operations the service exposes.
pub trait PdfApi {
    /// Upload up to [`MAX_UPLOAD_FILES`] PDFs in one multipart request.
    fn upload(
        &self,
        files: Vec<UploadFile>,
    ) -> impl Future<Output = Result<UploadResponse, ApiError>> + Send;

    /// Ask a question, retrieving `n_results` context chunks server-side.
    fn query(
        &self,
        text: &str,
        n_results: u32,
    ) -> impl Future<Output = Result<ChatAnswer, ApiError>> + Send;

    fn list_uploaded(&self) -> impl Future<Output = Result<FileList, ApiError>> + Send;

    /// Rebuild the server's search index over the stored files.
    fn reprocess(&self) -> impl Future<Output = Result<ReprocessResponse, ApiError>> + Send;

    /// Delete one stored file. The identifier is sent as its [`wire_name`].
    fn delete(
        &self,
        identifier: &str,
    ) -> impl Future<Output = Result<DeleteResponse, ApiError>> + Send;
}

/// Strip any storage-path prefix from a server identifier.
///
/// `"uploaded_pdfs/a.pdf"` becomes `"a.pdf"`; bare names pass through, and
/// so does an identifier with nothing after its last separator.
pub fn wire_name(identifier: &str) -> &str {
    match identifier.rsplit(['/', '\\']).next() {
        Some(name) if !name.is_empty() => name,
        _ => identifier,
    }
}

/// reqwest-backed [`PdfApi`] bound to one base address.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let base = parse_base_url(base_url)?;
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(&config.base_url, config.timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `GET /`: whether the service is up.
    pub async fn health(&self) -> Result<HealthResponse, ApiError> {
        let url = self.endpoint("")?;
        log::debug!("GET {url}");
        let resp = self.http.get(url).send().await?;
        read_json(resp).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base.join(path).map_err(|e| ApiError::InvalidBaseUrl {
            url: self.base.to_string(),
            reason: e.to_string(),
        })
    }
}

impl PdfApi for ApiClient {
    async fn upload(&self, files: Vec<UploadFile>) -> Result<UploadResponse, ApiError> {
        if files.len() > MAX_UPLOAD_FILES {
            return Err(ApiError::TooManyFiles { count: files.len() });
        }
        let count = files.len();
        let mut form = Form::new();
        for file in files {
            let part = Part::bytes(file.bytes)
                .file_name(file.name)
                .mime_str("application/pdf")?;
            form = form.part("files", part);
        }

        let url = self.endpoint("upload_pdfs")?;
        log::debug!("POST {url} ({count} file(s))");
        let resp = self.http.post(url).multipart(form).send().await?;
        read_json(resp).await
    }

    async fn query(&self, text: &str, n_results: u32) -> Result<ChatAnswer, ApiError> {
        let url = self.endpoint("chat")?;
        log::debug!("POST {url} (n_results={n_results})");
        let resp = self
            .http
            .post(url)
            .query(&[("query", text)])
            .query(&[("n_results", n_results)])
            .send()
            .await?;
        read_json(resp).await
    }

    async fn list_uploaded(&self) -> Result<FileList, ApiError> {
        let url = self.endpoint("list_pdfs")?;
        log::debug!("GET {url}");
        let resp = self.http.get(url).send().await?;
        read_json(resp).await
    }

    async fn reprocess(&self) -> Result<ReprocessResponse, ApiError> {
        let url = self.endpoint("reprocess_pdfs")?;
        log::debug!("POST {url}");
        let resp = self.http.post(url).send().await?;
        read_json(resp).await
    }

    async fn delete(&self, identifier: &str) -> Result<DeleteResponse, ApiError> {
        let url = self.endpoint("delete_pdf")?;
        let filename = wire_name(identifier);
        log::debug!("DELETE {url} ({filename})");
        let resp = self
            .http
            .delete(url)
            .json(&DeleteRequest { filename })
            .send()
            .await?;
        read_json(resp).await
    }
}

/// Parse and normalise a base address so relative endpoint paths join under it.
fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let invalid = |reason: String| ApiError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };

    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("not a base address".to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// Turn a response into `T`, mapping non-2xx statuses to [`ApiError::Status`].
async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(serde_json::from_str(&body)?)
}
