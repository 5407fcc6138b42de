//! Deprecator - rename published packages in bulk
//!
//! Usage:
//!   deprecator                 # Run the batch from lib/modules.json (dry run)
//!   deprecator --live run      # Push branches and open pull requests
//!   deprecator discover        # Rebuild lib/modules.json from the organization

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use deprecator_core::module::{load_modules, save_modules};
use deprecator_core::mutator::MutatorSettings;
use deprecator_core::prelude::*;

#[derive(Parser)]
#[command(name = "deprecator")]
#[command(about = "Deprecate packages in favour of renamed successors", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./deprecator.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Stop after the local commit; never push or open pull requests
    #[arg(long, global = true, conflicts_with = "live")]
    dry_run: bool,

    /// Push branches and open pull requests
    #[arg(long, global = true)]
    live: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build deprecation stubs and open rename pull requests (default)
    Run(RunArgs),

    /// List the organization's repositories and write the module list
    Discover {
        /// Where to write the module list
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Default)]
struct RunArgs {
    /// Module list to process
    #[arg(long)]
    modules: Option<PathBuf>,

    /// Directory receiving the deprecation stubs
    #[arg(long)]
    out: Option<PathBuf>,

    /// Also write the JSON report to this file
    #[arg(long)]
    report: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries the report
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deprecator=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let mut config = Config::load(cli.config.as_deref(), &cwd, &EnvOverrides::from_process())?;
    if cli.dry_run {
        config.dry_run = true;
    } else if cli.live {
        config.dry_run = false;
    }

    match cli.command.unwrap_or(Commands::Run(RunArgs::default())) {
        Commands::Run(args) => run_batch(config, args).await,
        Commands::Discover { output } => run_discover(&config, output).await,
    }
}

async fn run_batch(mut config: Config, args: RunArgs) -> Result<()> {
    if let Some(path) = args.modules {
        config.modules_path = path;
    }
    if let Some(path) = args.out {
        config.out_dir = path;
    }

    // A dry run never reaches the hosting API
    let token = if config.dry_run {
        config.token.as_deref()
    } else {
        Some(config.require_token()?)
    };

    let modules = load_modules(&config.modules_path)?;
    tracing::info!(
        count = modules.len(),
        dry_run = config.dry_run,
        modules = %config.modules_path.display(),
        "Starting batch"
    );

    let templates = match &config.templates_dir {
        Some(dir) => TemplateSet::load(dir)?,
        None => TemplateSet::builtin(),
    };
    let hosting = GitHubClient::new(&config.api_base, &config.org, &config.user_agent, token)?;
    let vcs = GitCli::new();

    let settings = MutatorSettings {
        repos_dir: config.repos_dir.clone(),
        clone_prefix: config.clone_prefix(),
        dry_run: config.dry_run,
        pull_request_body: templates.pull_request_body.clone(),
        commit_message: templates.commit_message.clone(),
    };
    let builder = ArtifactBuilder::new(config.out_dir.clone(), templates);
    let mutator = RepositoryMutator::new(&vcs, &hosting, settings);
    let report = BatchOrchestrator::new(&builder, &mutator)
        .run(&modules)
        .await;

    let json = report.to_json_pretty()?;
    println!("{json}");
    if let Some(path) = args.report {
        write_report(&path, &json)?;
    }

    Ok(())
}

async fn run_discover(config: &Config, output: Option<PathBuf>) -> Result<()> {
    let token = config.require_token()?;
    let hosting =
        GitHubClient::new(&config.api_base, &config.org, &config.user_agent, Some(token))?;

    let modules = Discovery::new(&hosting, &config.discovery).collect().await?;

    let output = output.unwrap_or_else(|| config.modules_path.clone());
    save_modules(&output, &modules)?;
    println!("Wrote {} module(s) to {}", modules.len(), output.display());

    Ok(())
}

fn write_report(path: &Path, json: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, format!("{json}\n"))
        .with_context(|| format!("Failed to write report: {}", path.display()))
}
