//! Command-line entrypoint for bookshelf.
//!
//! Commands:
//! - bookshelf-cli serve
//! - bookshelf-cli migrate
//! - bookshelf-cli check-config

use anyhow::Context;
use bookshelf_kernel::settings::Settings;
use clap::{Parser, Subcommand};

/// Book and author catalog service
#[derive(Parser, Debug)]
#[command(name = "bookshelf-cli")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Defaults to `serve`
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply migrations and serve the HTTP API until Ctrl-C or SIGTERM
    Serve,

    /// Apply pending migrations and exit
    Migrate,

    /// Print the resolved configuration as JSON and exit
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            bookshelf_telemetry::init(&settings.telemetry)?;
            bookshelf::run(settings).await
        }
        Command::Migrate => {
            bookshelf_telemetry::init(&settings.telemetry)?;
            let applied = bookshelf::migrate(&settings).await?;
            tracing::info!(applied, "migrate finished");
            println!("applied {applied} migrations");
            Ok(())
        }
        Command::CheckConfig => {
            let rendered = serde_json::to_string_pretty(&settings)
                .context("failed to render settings")?;
            println!("{rendered}");
            Ok(())
        }
    }
}
