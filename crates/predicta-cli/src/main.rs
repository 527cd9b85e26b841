//! Predicta CLI - Main entry point

use clap::Parser;
use predicta_cli::{commands, Cli, Commands};
use predicta_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Handle markdown help generation
    if cli.markdown_help {
        println!("{}", clap_markdown::help_markdown::<Cli>());
        return;
    }

    let Some(command) = &cli.command else {
        eprintln!("Error: A subcommand is required");
        eprintln!();
        eprintln!("For more information, try '--help'.");
        process::exit(2);
    };

    // Verbose mode logs debug to the console; otherwise only warnings
    let log_config = LogConfig::builder()
        .level(if cli.verbose { LogLevel::Debug } else { LogLevel::Warn })
        .output(LogOutput::Console)
        .log_file_prefix("predicta-cli")
        .build();

    // Environment variables take precedence
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);

    // The CLI works without logging, so a failed init is not fatal
    let _guard = init_logging(&log_config).ok();

    if let Err(e) = execute_command(&cli.server_url, command).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Execute the CLI command
async fn execute_command(server_url: &str, command: &Commands) -> predicta_cli::Result<()> {
    match command {
        Commands::Upload { paths, process } => {
            commands::upload::run(server_url, paths.clone(), *process).await
        },
        Commands::List => commands::list::run(server_url).await,
        Commands::Show { id } => commands::show::run(server_url, id).await,
        Commands::Process { id } => commands::process::run(server_url, id).await,
        Commands::Download { id, output } => {
            commands::download::run(server_url, id, output.clone()).await
        },
        Commands::Delete { id } => commands::delete::run(server_url, id).await,
        Commands::Status { id, wait, timeout } => {
            commands::status::run(server_url, id, *wait, *timeout).await
        },
    }
}
