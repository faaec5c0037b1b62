use std::path::PathBuf;

use clap::{Parser, Subcommand};

use pdfchat_core::{
    ApiClient, ChatController, Config, ConfigOverrides, DeleteOutcome, FileConfig, PdfApi,
    ReprocessPolicy, SendOutcome, UploadController, UploadOutcome,
};

mod output;
mod session;

use output::Printer;

/// pdfchat: upload PDFs to a question-answering server and ask about them
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Base URL of the PDF chat server
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Request timeout in seconds (0 disables the timeout)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Number of passages the server retrieves per question
    #[arg(long, global = true)]
    n_results: Option<u32>,

    /// When to rebuild the server's search index: on-startup, after-upload, never
    #[arg(long, global = true)]
    reprocess: Option<ReprocessPolicy>,

    /// Config file (default: <config dir>/pdfchat/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the server is reachable
    Status,
    /// List uploaded files
    List,
    /// Upload up to 10 PDF files
    Upload {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Delete an uploaded file by identifier or file name
    Delete { name: String },
    /// Rebuild the server's search index
    Reprocess,
    /// Ask one question and print the answer
    Ask {
        #[arg(required = true)]
        question: Vec<String>,
    },
    /// Interactive chat session
    Chat,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_logging(args.verbose);
    let printer = Printer::new(args.no_color);

    // Resolve config from CLI flags > env vars > config file > defaults
    let file = FileConfig::load_or_default(args.config.as_deref())?;
    let config = Config::resolve(
        ConfigOverrides {
            base_url: args.api_url,
            timeout_secs: args.timeout,
            n_results: args.n_results,
            reprocess: args.reprocess,
        },
        file,
    )?;
    log::info!("server {}", config.base_url);
    let api = ApiClient::from_config(&config)?;

    match args.command {
        Command::Status => {
            let spinner = printer.spinner("Contacting server...");
            let result = api.health().await;
            spinner.finish_and_clear();
            let health = result?;
            println!(
                "{} {}",
                printer.success("Server is up:"),
                health.message.as_deref().unwrap_or(api.base_url().as_str())
            );
        }
        Command::List => {
            let mut uploads = UploadController::new(config.reprocess);
            let spinner = printer.spinner("Loading uploaded files...");
            let result = uploads.refresh(&api).await;
            spinner.finish_and_clear();
            result?;
            session::print_files(&uploads, printer);
        }
        Command::Upload { paths } => {
            for path in &paths {
                if !path.is_file() {
                    anyhow::bail!("PDF file not found: {}", path.display());
                }
            }
            let mut uploads = UploadController::new(config.reprocess);
            if let UploadOutcome::Failed { reason } =
                session::upload(&mut uploads, &api, paths, printer).await
            {
                anyhow::bail!("upload failed: {reason}");
            }
        }
        Command::Delete { name } => {
            let mut uploads = UploadController::new(config.reprocess);
            uploads.refresh(&api).await?;
            match session::delete(&mut uploads, &api, &name, printer).await {
                DeleteOutcome::Deleted => {}
                DeleteOutcome::Failed { reason } => anyhow::bail!("delete failed: {reason}"),
                DeleteOutcome::Skipped => anyhow::bail!("no uploaded file named {name:?}"),
            }
        }
        Command::Reprocess => {
            let spinner = printer.spinner("Rebuilding search index...");
            let result = api.reprocess().await;
            spinner.finish_and_clear();
            let resp = result?;
            println!(
                "{} {} new file(s) indexed, {} stale chunk(s) removed",
                printer.success("Search index rebuilt:"),
                resp.new_files.len(),
                resp.deleted_chunks
            );
        }
        Command::Ask { question } => {
            let mut chat = ChatController::new(config.n_results);
            let question = question.join(" ");
            match session::ask(&mut chat, &api, &question, printer).await {
                SendOutcome::Answered => {}
                SendOutcome::Failed => anyhow::bail!("no answer for {question:?}"),
                SendOutcome::Skipped => anyhow::bail!("question is empty"),
            }
        }
        Command::Chat => session::run(&api, &config, printer).await?,
    }

    Ok(())
}
