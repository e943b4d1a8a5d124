mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod prompts;
mod services;
mod workflow;

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::cmd::parse::{self, ParseCommandArgs};
use crate::config::ProviderConfig;
use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::infra::http::ReqwestTransport;
use crate::infra::llm::GroqClient;
use crate::infra::retry::{RetryPolicy, RetryingTransport};
use crate::services::{ChatTransport, LanguageModelService};

#[derive(Parser)]
#[command(name = "ticket-scan", author, version, about = "Read receipts with a vision model")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a ticket from an image and print it as JSON.
    Parse(ParseArgs),
    /// Inspect the provider configuration.
    Config(ConfigArgs),
}

#[derive(Args)]
struct ParseArgs {
    /// Image URL, or a local jpeg/png file of at most 2048 KB.
    image: String,

    /// Override the configured model.
    #[arg(short, long)]
    model: Option<String>,

    /// Override the configured temperature (0 to 1).
    #[arg(short, long)]
    temperature: Option<f32>,

    /// Print compact JSON.
    #[arg(long)]
    compact: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(error) = run(cli.command).await {
        let (stdout, stderr) = failure_report(&error);
        println!("{stdout}");
        eprintln!("{stderr}");
        std::process::exit(1);
    }
}

/// JSON for stdout and a single human-readable line for stderr.
fn failure_report(error: &AppError) -> (String, String) {
    (error.to_array().to_string(), format!("Error: {error}"))
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(command: Commands) -> AppResult<()> {
    match command {
        Commands::Config(args) => config_cmd::run(args.command),
        Commands::Parse(args) => run_parse(args).await,
    }
}

async fn run_parse(args: ParseArgs) -> AppResult<()> {
    let config = ProviderConfig::from_env()?
        .with_model(args.model)
        .with_temperature(args.temperature)?;

    if config.api_key.is_empty() {
        eprintln!("Warning: GROQ_API_KEY not configured; the request will be refused.");
    }

    let transport: Arc<dyn ChatTransport> = Arc::new(RetryingTransport::new(
        ReqwestTransport::new(),
        RetryPolicy::from_config(&config),
    ));
    let language_model: Arc<dyn LanguageModelService> =
        Arc::new(GroqClient::new(config.clone(), transport));
    let context = AppContext::new(config, language_model);

    let document = parse::run(&context, ParseCommandArgs { image: args.image }).await?;

    let rendered = if args.compact {
        serde_json::to_string(&document)
    } else {
        serde_json::to_string_pretty(&document)
    }
    .map_err(|err| AppError::InvalidTicket(format!("failed to render output: {err}")))?;
    println!("{rendered}");

    Ok(())
}
