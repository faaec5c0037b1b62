use serde::{Deserialize, Serialize};

use crate::ApiError;
use crate::client::PdfApi;
use crate::types::ChatAnswer;

/// Bot reply appended when a query fails for any reason.
pub const BOT_ERROR_TEXT: &str = "Error: Could not get response.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
        }
    }
}

/// What became of one send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank text or a query already running; nothing was sent.
    Skipped,
    Answered,
    /// The query failed and the placeholder reply was appended.
    Failed,
}

/// Append-only question/answer transcript with one query in flight at most.
#[derive(Debug, Clone)]
pub struct ChatController {
    transcript: Vec<ChatMessage>,
    draft: String,
    loading: bool,
    n_results: u32,
}

impl Default for ChatController {
    fn default() -> Self {
        Self::new(1)
    }
}

impl ChatController {
    pub fn new(n_results: u32) -> Self {
        Self {
            transcript: Vec::new(),
            draft: String::new(),
            loading: false,
            n_results: n_results.max(1),
        }
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut String {
        &mut self.draft
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn n_results(&self) -> u32 {
        self.n_results
    }

    /// Record the user's question and mark a query in flight.
    ///
    /// Returns the text to send, or `None` if `text` is blank or a query is
    /// already running. Nothing is appended in the `None` case.
    pub fn begin_send(&mut self, text: &str) -> Option<String> {
        if self.loading || text.trim().is_empty() {
            return None;
        }
        self.loading = true;
        self.transcript.push(ChatMessage::user(text));
        Some(text.to_string())
    }

    /// Append the bot's reply (or the error placeholder) and reset the input.
    pub fn finish_send(&mut self, result: Result<ChatAnswer, ApiError>) -> SendOutcome {
        let (reply, outcome) = match result {
            Ok(answer) => (answer.answer, SendOutcome::Answered),
            Err(err) => {
                log::warn!("chat query failed: {err}");
                (BOT_ERROR_TEXT.to_string(), SendOutcome::Failed)
            }
        };
        self.transcript.push(ChatMessage::bot(reply));
        self.draft.clear();
        self.loading = false;
        outcome
    }

    /// Ask `text`.
    pub async fn send<A: PdfApi>(&mut self, api: &A, text: &str) -> SendOutcome {
        let Some(query) = self.begin_send(text) else {
            return SendOutcome::Skipped;
        };
        let result = api.query(&query, self.n_results).await;
        self.finish_send(result)
    }

    /// Ask whatever is in the draft.
    pub async fn send_draft<A: PdfApi>(&mut self, api: &A) -> SendOutcome {
        let text = self.draft.clone();
        self.send(api, &text).await
    }
}
