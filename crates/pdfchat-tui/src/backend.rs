use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use pdfchat_core::{ApiClient, PdfApi, read_pending};

use crate::tui_event::{BackendEvent, Request};

/// Run one request on its own task and report the result to the TUI.
///
/// Requests are independent: two deletes may be in flight at once and finish
/// in either order. Cancelling the token abandons the request without sending
/// an event.
pub fn spawn_request(
    request: Request,
    api: Arc<ApiClient>,
    tx: mpsc::UnboundedSender<BackendEvent>,
    cancel: CancellationToken,
) {
    tokio::spawn(async move {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {}
            event = perform(request, api.as_ref()) => {
                let _ = tx.send(event);
            }
        }
    });
}

/// Execute a request against the API and wrap the outcome as an event.
pub async fn perform<A: PdfApi>(request: Request, api: &A) -> BackendEvent {
    match request {
        Request::List(token) => BackendEvent::Listed {
            token,
            result: api.list_uploaded().await,
        },
        Request::Reprocess => BackendEvent::Reprocessed(api.reprocess().await),
        Request::Upload(files) => {
            let result = match read_pending(&files).await {
                Ok(files) => api.upload(files).await,
                Err(err) => Err(err),
            };
            BackendEvent::Uploaded(result)
        }
        Request::Delete(identifier) => {
            let result = api.delete(&identifier).await;
            BackendEvent::Deleted { identifier, result }
        }
        Request::Ask { text, n_results } => BackendEvent::Answered(api.query(&text, n_results).await),
    }
}

#[cfg(test)]
mod tests {
    use pdfchat_core::{PendingFile, UploadController};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn delete_event_keeps_full_identifier() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/delete_pdf"))
            .and(body_json(json!({ "filename": "a.pdf" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
            .expect(1)
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri(), None).unwrap();
        let event = perform(Request::Delete("uploaded_pdfs/a.pdf".into()), &api).await;
        match event {
            BackendEvent::Deleted { identifier, result } => {
                assert_eq!(identifier, "uploaded_pdfs/a.pdf");
                assert!(result.is_ok());
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn ask_uses_requested_n_results() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(query_param("n_results", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "answer": "42" })))
            .expect(1)
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri(), None).unwrap();
        let event = perform(
            Request::Ask {
                text: "meaning?".into(),
                n_results: 2,
            },
            &api,
        )
        .await;
        assert!(matches!(event, BackendEvent::Answered(Ok(ref a)) if a.answer == "42"));
    }

    #[tokio::test]
    async fn upload_of_missing_file_fails_before_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload_pdfs"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri(), None).unwrap();
        let event = perform(
            Request::Upload(vec![PendingFile::new("/no/such/file.pdf")]),
            &api,
        )
        .await;
        assert!(matches!(event, BackendEvent::Uploaded(Err(_))));
    }

    #[tokio::test]
    async fn cancelled_request_sends_nothing() {
        let server = MockServer::start().await;
        let api = Arc::new(ApiClient::new(&server.uri(), None).unwrap());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let token = UploadController::default().begin_listing();
        spawn_request(Request::List(token), api, tx, cancel);
        assert!(rx.recv().await.is_none());
    }
}
