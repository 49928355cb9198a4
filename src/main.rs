use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};

use doc_analyzer::{
    config::Config,
    handle_submit,
    render,
    session::ResultView,
    utils::{init_logger, LogTarget},
    AnalyzeClient, Notifier, Submission, SubmitOutcome, UploadFile, ViewState,
};

#[derive(Debug, Parser)]
#[command(name = "doc-analyzer", version, about = "Upload documents to the analysis service")]
struct Cli {
    /// Service base URL (overrides ANALYZER_API_BASE)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Upload a document and print its analysis
    Analyze {
        /// Document to upload
        #[arg(long)]
        file: Option<PathBuf>,
        /// Defaults to ANALYZER_QUERY
        #[arg(long)]
        query: Option<String>,
        /// Defaults to ANALYZER_USERNAME; sent as "anonymous" when empty
        #[arg(long)]
        username: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print a stored analysis
    Show {
        id: i64,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Check that the service is reachable
    Health,
    /// Interactive terminal form (default)
    Tui,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Html,
    Json,
}

/// Alerts go to stderr on the command line
struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn alert(&self, message: &str) {
        eprintln!("{}", message);
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url)?;
    }

    let command = cli.command.unwrap_or(Commands::Tui);
    let target = match command {
        Commands::Tui => LogTarget::File,
        _ => LogTarget::Stderr,
    };
    let _guard = init_logger(&config.logging, target)?;
    info!(base_url = %config.api.base_url, "Configuration loaded");

    match command {
        Commands::Analyze {
            file,
            query,
            username,
            format,
        } => {
            let query = config.form.query_or(query);
            let username = config.form.username_or(username);
            run_analyze(&config, file, query, username, format).await
        }
        Commands::Show { id, format } => run_show(&config, id, format).await,
        Commands::Health => run_health(&config).await,
        Commands::Tui => {
            doc_analyzer::tui::run(config).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_analyze(
    config: &Config,
    file: Option<PathBuf>,
    query: String,
    username: String,
    format: OutputFormat,
) -> Result<ExitCode> {
    let file = match file {
        Some(path) => Some(UploadFile::from_path(&path).await?),
        None => None,
    };

    let client = AnalyzeClient::from_config(&config.api);
    let mut view = ViewState::new();
    let submission = Submission::new(file, query, username);

    let outcome = handle_submit(&client, &mut view, &StderrNotifier, submission).await;
    if let SubmitOutcome::Rejected(_) = outcome {
        return Ok(ExitCode::FAILURE);
    }

    let output = match (format, view.view()) {
        (OutputFormat::Json, ResultView::Analysis(result)) => serde_json::to_string_pretty(result)?,
        (OutputFormat::Html, current) => current.as_html(),
        (_, current) => current.as_text(),
    };
    println!("{}", output);

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn run_show(config: &Config, id: i64, format: OutputFormat) -> Result<ExitCode> {
    let client = AnalyzeClient::from_config(&config.api);

    let record = match client.get_analysis(id).await {
        Ok(record) => record,
        Err(e) => {
            error!(id, error = %e, "Failed to fetch analysis");
            println!("{}", render::render_error(&e));
            return Ok(ExitCode::FAILURE);
        }
    };

    let output = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&record)?,
        OutputFormat::Html => render::render_html(&record.to_result()),
        OutputFormat::Text => {
            let created = record
                .created_at_utc()
                .map(|ts| ts.format("%Y-%m-%d %H:%M UTC").to_string())
                .unwrap_or_else(|| record.created_at.clone());
            format!("Created: {}\n{}", created, render::render_text(&record.to_result()))
        }
    };
    println!("{}", output);
    Ok(ExitCode::SUCCESS)
}

async fn run_health(config: &Config) -> Result<ExitCode> {
    let client = AnalyzeClient::from_config(&config.api);
    match client.health().await {
        Ok(status) => {
            println!("{}", status.message);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            println!("{}", render::render_error(&e));
            Ok(ExitCode::FAILURE)
        }
    }
}
