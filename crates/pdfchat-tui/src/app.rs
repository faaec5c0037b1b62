use chrono::{DateTime, Local};
use pdfchat_core::{ChatController, Config, MAX_UPLOAD_FILES, PendingFile, UploadController};

use crate::action::Action;
use crate::input::InputMode;
use crate::model::selection::{PathPrompt, expand_paths, parse_paths};
use crate::theme::Theme;
use crate::tui_event::{BackendEvent, Request};

/// Which pane receives keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Files,
    Chat,
}

/// A timestamped note shown in the footer for events the controllers do not
/// report themselves (selection changes, reprocess results).
#[derive(Debug, Clone)]
pub struct Notice {
    pub at: DateTime<Local>,
    pub text: String,
    pub failure: bool,
}

/// Main application state.
pub struct App {
    pub focus: Focus,
    pub uploads: UploadController,
    pub chat: ChatController,
    /// Row highlighted in the uploaded-files list.
    pub file_cursor: usize,
    pub prompt: Option<PathPrompt>,
    /// Lines scrolled up from the bottom of the transcript.
    pub chat_scroll: u16,
    pub notice: Option<Notice>,
    pub listing: bool,
    pub reprocessing: bool,
    pub server: String,
    pub tick: usize,
    pub theme: Theme,
    pub should_quit: bool,
    pub show_help: bool,
    /// Height of the visible list area (set on resize, used for page up/down).
    pub visible_rows: usize,
}

impl App {
    pub fn new(config: &Config, server: String) -> Self {
        Self {
            focus: Focus::Files,
            uploads: UploadController::new(config.reprocess),
            chat: ChatController::new(config.n_results),
            file_cursor: 0,
            prompt: None,
            chat_scroll: 0,
            notice: None,
            listing: false,
            reprocessing: false,
            server,
            tick: 0,
            theme: Theme::ocean(),
            should_quit: false,
            show_help: false,
            visible_rows: 20,
        }
    }

    /// Requests to issue once at launch: the file listing, then a reprocess
    /// when the policy asks for one.
    pub fn startup_requests(&mut self) -> Vec<Request> {
        let mut requests = vec![self.refresh()];
        if self.uploads.reprocess_on_startup() {
            requests.push(self.reprocess());
        }
        requests
    }

    pub fn input_mode(&self) -> InputMode {
        if self.show_help {
            InputMode::Navigate
        } else if self.prompt.is_some() || self.focus == Focus::Chat {
            InputMode::Text
        } else {
            InputMode::Navigate
        }
    }

    /// Replace the pending selection, noting how many files were dropped.
    pub fn select_files(&mut self, files: Vec<PendingFile>) {
        let total = files.len();
        let dropped = self.uploads.select_files(files);
        let text = if dropped > 0 {
            format!(
                "Selected {} of {total} files (limit {MAX_UPLOAD_FILES})",
                total - dropped
            )
        } else {
            format!("Selected {total} file(s)")
        };
        self.note(text, false);
    }

    fn note(&mut self, text: impl Into<String>, failure: bool) {
        self.notice = Some(Notice {
            at: Local::now(),
            text: text.into(),
            failure,
        });
    }

    fn refresh(&mut self) -> Request {
        self.listing = true;
        Request::List(self.uploads.begin_listing())
    }

    fn reprocess(&mut self) -> Request {
        self.reprocessing = true;
        Request::Reprocess
    }

    fn clamp_file_cursor(&mut self) {
        let max = self.uploads.known().len().saturating_sub(1);
        self.file_cursor = self.file_cursor.min(max);
    }

    /// Process a user action and update state. Returns network work to start.
    pub fn update(&mut self, action: Action) -> Option<Request> {
        // When help overlay is shown, only allow a few actions through
        if self.show_help {
            match action {
                Action::Quit => self.should_quit = true,
                Action::ToggleHelp | Action::Cancel => self.show_help = false,
                Action::Tick => self.tick = self.tick.wrapping_add(1),
                Action::Resize(_w, h) => self.visible_rows = (h as usize).saturating_sub(8),
                _ => {} // swallow everything else
            }
            return None;
        }

        match action {
            Action::Quit => {
                self.should_quit = true;
                None
            }
            Action::Tick => {
                self.tick = self.tick.wrapping_add(1);
                None
            }
            Action::Resize(_w, h) => {
                // Rough estimate: total height minus header/footer/borders/status
                self.visible_rows = (h as usize).saturating_sub(8);
                None
            }
            _ if self.prompt.is_some() => {
                self.update_prompt(action);
                None
            }
            _ => match self.focus {
                Focus::Files => self.update_files(action),
                Focus::Chat => self.update_chat(action),
            },
        }
    }

    fn update_prompt(&mut self, action: Action) {
        let Some(prompt) = self.prompt.as_mut() else {
            return;
        };
        match action {
            Action::InsertChar(c) => prompt.input.push(c),
            Action::Backspace => {
                prompt.input.pop();
            }
            Action::Cancel => self.prompt = None,
            Action::Submit => {
                let paths = parse_paths(&prompt.input);
                self.prompt = None;
                if paths.is_empty() {
                    return;
                }
                match expand_paths(&paths) {
                    Ok(files) if files.is_empty() => self.note("No PDF files found", true),
                    Ok(files) => self.select_files(files),
                    Err(err) => self.note(err.to_string(), true),
                }
            }
            _ => {}
        }
    }

    fn update_files(&mut self, action: Action) -> Option<Request> {
        let count = self.uploads.known().len();
        match action {
            Action::ToggleHelp => self.show_help = true,
            Action::FocusNext => self.focus = Focus::Chat,
            Action::MoveDown => {
                if self.file_cursor + 1 < count {
                    self.file_cursor += 1;
                }
            }
            Action::MoveUp => self.file_cursor = self.file_cursor.saturating_sub(1),
            Action::PageDown => {
                let page = self.visible_rows.max(1);
                self.file_cursor = (self.file_cursor + page).min(count.saturating_sub(1));
            }
            Action::PageUp => {
                let page = self.visible_rows.max(1);
                self.file_cursor = self.file_cursor.saturating_sub(page);
            }
            Action::GoTop => self.file_cursor = 0,
            Action::GoBottom => self.file_cursor = count.saturating_sub(1),
            // The selection is what the running upload sends
            Action::SelectFiles | Action::ClearSelection if self.uploads.is_loading() => {
                self.note("Upload in progress", true)
            }
            Action::SelectFiles => self.prompt = Some(PathPrompt::default()),
            Action::ClearSelection => self.uploads.clear_selection(),
            Action::Upload => return self.uploads.begin_upload().map(Request::Upload),
            Action::DeleteSelected => {
                let identifier = self.uploads.known().get(self.file_cursor)?.identifier.clone();
                if self.uploads.begin_delete(&identifier) {
                    return Some(Request::Delete(identifier));
                }
            }
            Action::Refresh if !self.listing => return Some(self.refresh()),
            Action::Reprocess if !self.reprocessing => return Some(self.reprocess()),
            _ => {}
        }
        None
    }

    fn update_chat(&mut self, action: Action) -> Option<Request> {
        match action {
            Action::FocusNext | Action::Cancel => self.focus = Focus::Files,
            // Input is frozen while a query is in flight
            Action::InsertChar(c) if !self.chat.is_loading() => self.chat.draft_mut().push(c),
            Action::Backspace if !self.chat.is_loading() => {
                self.chat.draft_mut().pop();
            }
            Action::Submit => {
                let draft = self.chat.draft().to_string();
                let text = self.chat.begin_send(&draft)?;
                self.chat_scroll = 0;
                return Some(Request::Ask {
                    text,
                    n_results: self.chat.n_results(),
                });
            }
            Action::MoveUp => self.chat_scroll = self.chat_scroll.saturating_add(1),
            Action::MoveDown => self.chat_scroll = self.chat_scroll.saturating_sub(1),
            Action::PageUp => {
                self.chat_scroll = self.chat_scroll.saturating_add(self.visible_rows as u16)
            }
            Action::PageDown => {
                self.chat_scroll = self.chat_scroll.saturating_sub(self.visible_rows as u16)
            }
            _ => {}
        }
        None
    }

    /// Apply a backend result. Returns follow-up work, if any.
    pub fn handle_backend_event(&mut self, event: BackendEvent) -> Option<Request> {
        match event {
            BackendEvent::Listed { token, result } => {
                self.listing = false;
                match result {
                    Ok(list) => self.uploads.apply_listing(token, list.files),
                    Err(err) => self.uploads.listing_failed(token, &err),
                }
                self.clamp_file_cursor();
            }
            BackendEvent::Reprocessed(result) => {
                self.reprocessing = false;
                if self.uploads.finish_reprocess(result) {
                    self.note("Search index rebuilt", false);
                } else {
                    self.note("Reprocess failed.", true);
                }
            }
            BackendEvent::Uploaded(result) => {
                let outcome = self.uploads.finish_upload(result);
                if matches!(outcome, pdfchat_core::UploadOutcome::Uploaded { .. })
                    && self.uploads.reprocess_after_upload()
                    && !self.reprocessing
                {
                    return Some(self.reprocess());
                }
            }
            BackendEvent::Deleted { identifier, result } => {
                self.uploads.finish_delete(&identifier, result);
                self.clamp_file_cursor();
            }
            BackendEvent::Answered(result) => {
                self.chat.finish_send(result);
                self.chat_scroll = 0;
            }
        }
        None
    }

    /// Render the current screen.
    pub fn view(&self, f: &mut ratatui::Frame) {
        crate::view::render(f, self);

        if let Some(prompt) = &self.prompt {
            crate::view::prompt::render(f, prompt, &self.theme);
        }
        if self.show_help {
            crate::view::help::render(f, &self.theme);
        }
    }
}

#[cfg(test)]
mod tests {
    use pdfchat_core::{
        ApiError, ChatAnswer, DeleteResponse, FileList, FileState, ListingToken, ReprocessPolicy,
        UploadResponse,
    };

    use super::*;

    fn app(policy: ReprocessPolicy) -> App {
        let config = Config {
            reprocess: policy,
            ..Config::default()
        };
        App::new(&config, "http://localhost:8000/".into())
    }

    fn listed(app: &mut App, ids: &[&str]) {
        let Some(Request::List(token)) = app.update(Action::Refresh) else {
            panic!("expected a listing request");
        };
        listing_arrives(app, token, ids);
    }

    fn listing_arrives(app: &mut App, token: ListingToken, ids: &[&str]) {
        app.handle_backend_event(BackendEvent::Listed {
            token,
            result: Ok(FileList {
                files: ids.iter().map(|s| s.to_string()).collect(),
            }),
        });
    }

    fn failure() -> ApiError {
        ApiError::Status {
            status: 500,
            body: String::new(),
        }
    }

    #[test]
    fn startup_lists_then_reprocesses() {
        let mut app = app(ReprocessPolicy::OnStartup);
        assert!(matches!(
            app.startup_requests().as_slice(),
            [Request::List(_), Request::Reprocess]
        ));
        assert!(app.listing && app.reprocessing);

        let mut app = self::app(ReprocessPolicy::Never);
        assert!(matches!(app.startup_requests().as_slice(), [Request::List(_)]));
    }

    #[test]
    fn startup_listing_is_deduplicated() {
        let mut app = app(ReprocessPolicy::Never);
        listed(&mut app, &["a.pdf", "a.pdf", "b.pdf"]);
        assert_eq!(app.uploads.identifiers(), vec!["a.pdf", "b.pdf"]);
        assert!(!app.listing);
    }

    #[test]
    fn delete_marks_then_removes() {
        let mut app = app(ReprocessPolicy::Never);
        listed(&mut app, &["uploaded_pdfs/a.pdf", "uploaded_pdfs/b.pdf"]);
        app.update(Action::MoveDown);

        let request = app.update(Action::DeleteSelected);
        assert_eq!(request, Some(Request::Delete("uploaded_pdfs/b.pdf".into())));
        assert_eq!(app.uploads.known()[1].state, FileState::Deleting);
        assert_eq!(app.update(Action::DeleteSelected), None, "already deleting");

        app.handle_backend_event(BackendEvent::Deleted {
            identifier: "uploaded_pdfs/b.pdf".into(),
            result: Ok(DeleteResponse::default()),
        });
        assert_eq!(app.uploads.identifiers(), vec!["uploaded_pdfs/a.pdf"]);
        assert_eq!(app.file_cursor, 0, "cursor clamped to remaining rows");
    }

    #[test]
    fn failed_delete_restores_entry() {
        let mut app = app(ReprocessPolicy::Never);
        listed(&mut app, &["a.pdf"]);
        app.update(Action::DeleteSelected);
        app.handle_backend_event(BackendEvent::Deleted {
            identifier: "a.pdf".into(),
            result: Err(failure()),
        });
        assert_eq!(app.uploads.known()[0].state, FileState::Present);
        assert!(app.uploads.status().unwrap().is_failure());
    }

    #[test]
    fn upload_flow_with_reprocess_after_upload() {
        let mut app = app(ReprocessPolicy::AfterUpload);
        app.select_files(vec![PendingFile::new("/tmp/a.pdf")]);

        let Some(Request::Upload(files)) = app.update(Action::Upload) else {
            panic!("expected an upload request");
        };
        assert_eq!(files.len(), 1);
        assert_eq!(app.update(Action::Upload), None, "upload already in flight");

        let follow_up = app.handle_backend_event(BackendEvent::Uploaded(Ok(UploadResponse {
            message: None,
            files: vec!["uploaded_pdfs/a.pdf".into()],
        })));
        assert_eq!(follow_up, Some(Request::Reprocess));
        assert!(app.uploads.pending().is_empty());
        assert_eq!(app.uploads.identifiers(), vec!["uploaded_pdfs/a.pdf"]);
    }

    #[test]
    fn late_listing_keeps_file_uploaded_meanwhile() {
        let mut app = app(ReprocessPolicy::Never);
        listed(&mut app, &["a.pdf"]);
        let Some(Request::List(token)) = app.update(Action::Refresh) else {
            panic!("expected a listing request");
        };

        app.select_files(vec![PendingFile::new("/tmp/b.pdf")]);
        app.update(Action::Upload);
        app.handle_backend_event(BackendEvent::Uploaded(Ok(UploadResponse {
            message: None,
            files: vec!["b.pdf".into()],
        })));

        // The server answered the listing before it stored b.pdf
        listing_arrives(&mut app, token, &["a.pdf"]);
        assert_eq!(app.uploads.identifiers(), vec!["a.pdf", "b.pdf"]);
    }

    #[test]
    fn late_listing_does_not_bring_back_deleted_file() {
        let mut app = app(ReprocessPolicy::Never);
        listed(&mut app, &["a.pdf", "b.pdf"]);
        let Some(Request::List(token)) = app.update(Action::Refresh) else {
            panic!("expected a listing request");
        };

        assert_eq!(app.update(Action::DeleteSelected), Some(Request::Delete("a.pdf".into())));
        app.handle_backend_event(BackendEvent::Deleted {
            identifier: "a.pdf".into(),
            result: Ok(DeleteResponse::default()),
        });

        listing_arrives(&mut app, token, &["a.pdf", "b.pdf"]);
        assert_eq!(app.uploads.identifiers(), vec!["b.pdf"]);
    }

    #[test]
    fn selection_is_frozen_during_upload() {
        let mut app = app(ReprocessPolicy::Never);
        app.select_files(vec![PendingFile::new("/tmp/a.pdf")]);
        assert!(matches!(app.update(Action::Upload), Some(Request::Upload(_))));

        app.update(Action::ClearSelection);
        assert_eq!(app.uploads.pending().len(), 1);
        app.update(Action::SelectFiles);
        assert!(app.prompt.is_none());
        assert_eq!(app.notice.as_ref().unwrap().text, "Upload in progress");

        app.handle_backend_event(BackendEvent::Uploaded(Err(failure())));
        app.update(Action::ClearSelection);
        assert!(app.uploads.pending().is_empty());
    }

    #[test]
    fn selection_is_capped_with_notice() {
        let mut app = app(ReprocessPolicy::Never);
        let files = (0..12)
            .map(|i| PendingFile::new(format!("/tmp/{i}.pdf")))
            .collect();
        app.select_files(files);
        assert_eq!(app.uploads.pending().len(), 10);
        assert_eq!(
            app.notice.as_ref().unwrap().text,
            "Selected 10 of 12 files (limit 10)"
        );
    }

    #[test]
    fn prompt_selects_directory_pdfs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("x.pdf"), b"x").unwrap();
        let mut app = app(ReprocessPolicy::Never);

        app.update(Action::SelectFiles);
        assert_eq!(app.input_mode(), InputMode::Text);
        for c in dir.path().display().to_string().chars() {
            app.update(Action::InsertChar(c));
        }
        app.update(Action::Submit);

        assert!(app.prompt.is_none());
        assert_eq!(app.uploads.pending().len(), 1);
        assert_eq!(app.uploads.pending()[0].name, "x.pdf");
    }

    #[test]
    fn prompt_reports_missing_file() {
        let mut app = app(ReprocessPolicy::Never);
        app.update(Action::SelectFiles);
        for c in "/no/such.pdf".chars() {
            app.update(Action::InsertChar(c));
        }
        app.update(Action::Submit);
        assert!(app.notice.as_ref().unwrap().failure);
        assert!(app.uploads.pending().is_empty());
    }

    #[test]
    fn chat_send_round_trip() {
        let mut app = app(ReprocessPolicy::Never);
        app.update(Action::FocusNext);
        for c in "What is X?".chars() {
            app.update(Action::InsertChar(c));
        }
        let request = app.update(Action::Submit);
        assert_eq!(
            request,
            Some(Request::Ask {
                text: "What is X?".into(),
                n_results: 1
            })
        );
        // Typing is ignored while the query runs
        app.update(Action::InsertChar('!'));
        assert_eq!(app.chat.draft(), "What is X?");

        app.handle_backend_event(BackendEvent::Answered(Ok(ChatAnswer {
            answer: "Y".into(),
        })));
        let texts: Vec<_> = app.chat.transcript().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["What is X?", "Y"]);
        assert!(app.chat.draft().is_empty());
    }

    #[test]
    fn blank_chat_submit_issues_nothing() {
        let mut app = app(ReprocessPolicy::Never);
        app.update(Action::FocusNext);
        app.update(Action::InsertChar(' '));
        assert_eq!(app.update(Action::Submit), None);
        assert!(app.chat.transcript().is_empty());
    }

    #[test]
    fn help_swallows_commands() {
        let mut app = app(ReprocessPolicy::Never);
        app.update(Action::ToggleHelp);
        assert!(app.show_help);
        assert_eq!(app.update(Action::Refresh), None);
        app.update(Action::Cancel);
        assert!(!app.show_help);
        assert!(matches!(app.update(Action::Refresh), Some(Request::List(_))));
        assert_eq!(app.update(Action::Refresh), None, "listing already running");
    }
}
