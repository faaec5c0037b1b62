//! Interactive line-oriented chat session.
//!
//! Plain lines are questions. Lines starting with `/` manage files.

use std::io::Write;
use std::path::PathBuf;

use tokio::io::{AsyncBufReadExt, BufReader};

use pdfchat_core::{
    ChatController, Config, DeleteOutcome, PdfApi, PendingFile, SendOutcome, UploadController,
    UploadOutcome, wire_name,
};

use crate::output::Printer;

const HELP: &str = "\
  <question>          ask about the uploaded PDFs
  /list               show uploaded files
  /upload <paths...>  upload up to 10 PDFs
  /delete <name>      delete an uploaded file
  /reprocess          rebuild the search index
  /help               show this help
  /quit               leave the session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ask(String),
    List,
    Upload(Vec<PathBuf>),
    Delete(String),
    Reprocess,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

pub fn parse_line(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Ask(line.to_string());
    };

    let (word, args) = match rest.split_once(char::is_whitespace) {
        Some((word, args)) => (word, args.trim()),
        None => (rest, ""),
    };
    match word {
        "list" | "ls" => Command::List,
        "upload" | "up" => Command::Upload(args.split_whitespace().map(PathBuf::from).collect()),
        "delete" | "rm" => Command::Delete(args.to_string()),
        "reprocess" => Command::Reprocess,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => Command::Unknown(other.to_string()),
    }
}

/// Find the known identifier for a user-typed name: exact match first, then
/// a match on the name the server stores.
pub fn resolve_identifier(uploads: &UploadController, name: &str) -> Option<String> {
    let known = uploads.known();
    known
        .iter()
        .find(|e| e.identifier == name)
        .or_else(|| known.iter().find(|e| wire_name(&e.identifier) == name))
        .map(|e| e.identifier.clone())
}

pub fn print_files(uploads: &UploadController, printer: Printer) {
    if uploads.known().is_empty() {
        println!("{}", printer.dim("No uploaded files"));
        return;
    }
    println!(
        "{}",
        printer.label(&format!("Uploaded files ({})", uploads.known().len()))
    );
    for entry in uploads.known() {
        println!("{}", printer.file_line(entry));
    }
}

pub async fn upload<A: PdfApi>(
    uploads: &mut UploadController,
    api: &A,
    paths: Vec<PathBuf>,
    printer: Printer,
) -> UploadOutcome {
    let total = paths.len();
    let dropped = uploads.select_files(paths.into_iter().map(PendingFile::new));
    if dropped > 0 {
        eprintln!(
            "{}",
            printer.failure(&format!(
                "Only the first {} of {total} files will be uploaded",
                total - dropped
            ))
        );
    }

    let spinner = printer.spinner(&format!("Uploading {} file(s)...", uploads.pending().len()));
    let outcome = uploads.upload(api).await;
    spinner.finish_and_clear();

    if let Some(status) = uploads.status() {
        println!("{}", printer.status(status));
    }
    match &outcome {
        UploadOutcome::Uploaded { added } => {
            for identifier in added {
                println!("  + {}", wire_name(identifier));
            }
        }
        UploadOutcome::Failed { reason } => eprintln!("  {}", printer.dim(reason)),
        UploadOutcome::Skipped => println!("{}", printer.dim("Nothing to upload")),
    }
    outcome
}

pub async fn delete<A: PdfApi>(
    uploads: &mut UploadController,
    api: &A,
    name: &str,
    printer: Printer,
) -> DeleteOutcome {
    let Some(identifier) = resolve_identifier(uploads, name) else {
        eprintln!("{}", printer.failure(&format!("No uploaded file named {name:?}")));
        return DeleteOutcome::Skipped;
    };

    let spinner = printer.spinner(&format!("Deleting {}...", wire_name(&identifier)));
    let outcome = uploads.delete_file(api, &identifier).await;
    spinner.finish_and_clear();

    match &outcome {
        DeleteOutcome::Deleted => {
            println!("{}", printer.success(&format!("Deleted {}", wire_name(&identifier))))
        }
        DeleteOutcome::Failed { reason } => {
            if let Some(status) = uploads.status() {
                eprintln!("{}", printer.status(status));
            }
            eprintln!("  {}", printer.dim(reason));
        }
        DeleteOutcome::Skipped => {
            eprintln!("{}", printer.dim("A delete of that file is already running"))
        }
    }
    outcome
}

/// Ask one question and print the reply.
pub async fn ask<A: PdfApi>(
    chat: &mut ChatController,
    api: &A,
    text: &str,
    printer: Printer,
) -> SendOutcome {
    let spinner = printer.spinner("Thinking...");
    let outcome = chat.send(api, text).await;
    spinner.finish_and_clear();

    if let Some(line) = reply_line(chat, outcome, printer) {
        println!("{line}");
    }
    outcome
}

/// The printed form of the reply `outcome` appended, if any.
fn reply_line(chat: &ChatController, outcome: SendOutcome, printer: Printer) -> Option<String> {
    let reply = &chat.transcript().last()?.text;
    match outcome {
        SendOutcome::Skipped => None,
        SendOutcome::Answered => Some(format!("{} {reply}", printer.label("Bot:"))),
        SendOutcome::Failed => Some(format!("{} {}", printer.label("Bot:"), printer.failure(reply))),
    }
}

/// Run the interactive session until `/quit` or end of input.
pub async fn run<A: PdfApi>(api: &A, config: &Config, printer: Printer) -> anyhow::Result<()> {
    let mut uploads = UploadController::new(config.reprocess);
    let mut chat = ChatController::new(config.n_results);

    let spinner = printer.spinner("Loading uploaded files...");
    let listing = uploads.startup(api).await;
    spinner.finish_and_clear();
    match listing {
        Ok(()) => print_files(&uploads, printer),
        Err(err) => {
            log::debug!("startup listing failed: {err}");
            if let Some(status) = uploads.status() {
                eprintln!("{}", printer.status(status));
            }
        }
    }
    println!("{}", printer.dim("Ask a question about your PDFs, or /help"));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", printer.label("You:"));
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };

        match parse_line(&line) {
            Command::Empty => {}
            Command::Ask(text) => {
                ask(&mut chat, api, &text, printer).await;
            }
            Command::List => {
                if uploads.refresh(api).await.is_err() {
                    if let Some(status) = uploads.status() {
                        eprintln!("{}", printer.status(status));
                    }
                } else {
                    print_files(&uploads, printer);
                }
            }
            Command::Upload(paths) if paths.is_empty() => {
                eprintln!("{}", printer.dim("usage: /upload <paths...>"));
            }
            Command::Upload(paths) => {
                upload(&mut uploads, api, paths, printer).await;
            }
            Command::Delete(name) if name.is_empty() => {
                eprintln!("{}", printer.dim("usage: /delete <name>"));
            }
            Command::Delete(name) => {
                delete(&mut uploads, api, &name, printer).await;
            }
            Command::Reprocess => {
                let spinner = printer.spinner("Rebuilding search index...");
                let result = api.reprocess().await;
                spinner.finish_and_clear();
                if uploads.finish_reprocess(result) {
                    println!("{}", printer.success("Search index rebuilt"));
                } else {
                    eprintln!("{}", printer.failure("Reprocess failed."));
                }
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
            Command::Unknown(word) => {
                eprintln!("{}", printer.failure(&format!("Unknown command /{word}, try /help")));
            }
        }
    }
    Ok(())
}
