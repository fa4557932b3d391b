//! submodule-bot - bump submodule pointers when a Bitbucket PR merges
//!
//! CLI binary running the webhook server, or a one-off scan.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod cli;

#[derive(Parser)]
#[command(name = "submodule-bot")]
#[command(about = "Bump submodule pointers across a Bitbucket project on merge")]
#[command(version)]
struct Cli {
    /// Directory holding local working copies (defaults to ./repos)
    #[arg(short, long, global = true, env = "SUBMODULE_BOT_WORKING_DIR")]
    working_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the webhook server (default)
    Serve {
        /// Address to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Bump one repository's submodules by hand
    Scan {
        /// Bitbucket host, e.g. bitbucket.example.com
        #[arg(long)]
        host: String,

        /// Project key of the merged repository
        #[arg(long)]
        project: String,

        /// Slug or name of the merged repository
        #[arg(long)]
        repo: String,

        /// Commit to point submodules at
        #[arg(long)]
        commit: String,

        /// Reviewer for created PRs (repeatable)
        #[arg(long = "reviewer")]
        reviewers: Vec<String>,
    },

    /// Authentication management
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Test authentication against a Bitbucket host
    Test {
        /// Bitbucket host, e.g. bitbucket.example.com
        #[arg(long)]
        host: String,
    },
    /// Show authentication setup instructions
    Setup,
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
    }) {
        Commands::Serve { host, port } => {
            init_tracing("submodule_bot=info,tower_http=info");
            cli::run_serve(cli::ServeOptions {
                host,
                port,
                working_dir: cli.working_dir,
            })
            .await?;
        }
        Commands::Scan {
            host,
            project,
            repo,
            commit,
            reviewers,
        } => {
            init_tracing("submodule_bot=warn");
            cli::run_scan(cli::ScanOptions {
                host,
                project,
                repo,
                commit,
                reviewers,
                working_dir: cli.working_dir,
            })
            .await?;
        }
        Commands::Auth { action } => match action {
            AuthAction::Test { host } => cli::run_auth_test(&host).await?,
            AuthAction::Setup => cli::run_auth_setup(),
        },
    }

    Ok(())
}
