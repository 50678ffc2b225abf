//! Plazas CLI - Main entry point

use clap::Parser;
use plazas_cli::commands::query::QueryOptions;
use plazas_cli::{Cli, Commands, Config};
use plazas_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use std::process;
use tracing::{debug, error};

#[tokio::main]
async fn main() {
    // Parse command-line arguments
    let cli = Cli::parse();

    // Handle markdown help generation
    if cli.markdown_help {
        println!("{}", clap_markdown::help_markdown::<Cli>());
        return;
    }

    // Ensure a command is provided
    if cli.command.is_none() {
        eprintln!("Error: A subcommand is required");
        eprintln!();
        eprintln!("For more information, try '--help'.");
        process::exit(2);
    }

    // A missing .env file is fine
    let dotenv = dotenvy::dotenv().ok();

    // Quiet by default; --verbose shows debug events on stderr
    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };
    let log_config = LogConfig::builder()
        .level(level)
        .output(LogOutput::Console)
        .log_file_prefix("plazas-cli")
        .build();

    // Environment variables take precedence
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);

    // Initialize logging (ignore errors as the CLI works without logging)
    let _guard = init_logging(&log_config).ok();
    if let Some(path) = dotenv {
        debug!(path = %path.display(), "Loaded .env file");
    }

    // Execute command
    if let Err(e) = execute_command(cli).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Resolve configuration and execute the CLI command
async fn execute_command(cli: Cli) -> plazas_cli::Result<()> {
    let config = Config::load(cli.config.as_deref())?.with_overrides(cli.source, cli.store, None);
    config.validate()?;
    debug!(?config, "Resolved configuration");

    // Command is guaranteed to exist at this point (checked in main)
    let Some(command) = cli.command else {
        return Ok(());
    };

    match command {
        Commands::Validate => plazas_cli::commands::validate::run(config).await,

        Commands::Ingest { force } => plazas_cli::commands::ingest::run(config, force).await,

        Commands::Status => plazas_cli::commands::status::run(config).await,

        Commands::Query {
            filters,
            page,
            page_size,
            format,
            output,
            no_summary,
        } => {
            plazas_cli::commands::query::run(
                config,
                QueryOptions {
                    filters,
                    page,
                    page_size,
                    format,
                    output,
                    no_summary,
                },
            )
            .await
        }

        Commands::Summary {
            filters,
            group_by,
            limit,
        } => plazas_cli::commands::summary::run(config, filters, group_by, limit).await,

        Commands::Top { year, specialties } => {
            plazas_cli::commands::top::run(config, year, specialties).await
        }

        Commands::Values { column } => plazas_cli::commands::values::run(config, column).await,
    }
}
