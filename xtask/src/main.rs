//! Build automation tasks for Predicta
//!
//! Currently generates the CLI reference from the clap definitions.

use clap::Parser;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation tasks for Predicta", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Generate the CLI reference in Markdown
    GenerateCliDocs {
        /// Output directory for generated documentation
        #[arg(short, long, default_value = "docs")]
        output_dir: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::GenerateCliDocs { output_dir } => generate_cli_docs(&output_dir)?,
    }

    Ok(())
}

fn generate_cli_docs(output_dir: &str) -> anyhow::Result<()> {
    println!("Generating CLI documentation...");

    let markdown = clap_markdown::help_markdown::<predicta_cli::Cli>();

    let content = format!(
        r#"# Predicta CLI Reference

This documentation is generated from the CLI source code. Last updated: {}.

## Overview

`predicta` uploads CSV, Excel and JSON datasets to a Predicta server, lists and
downloads stored files, and starts processing on them.

## Installation

```bash
cargo install --path crates/predicta-cli
```

## Quick Start

```bash
# Upload two files and start processing the first one
predicta upload sales.csv regions.json --process

# See what is stored
predicta list

# Follow a file until processing finishes
predicta status <id> --wait

# Fetch a stored file
predicta download <id> -o copy.csv
```

Uploads are sent one at a time. Press Ctrl-C during an upload to cancel the
rest of the batch; a transfer already in flight still completes on the server.

## Commands

{}

## Environment Variables

- `PREDICTA_SERVER_URL` - Server URL (default: `http://localhost:5000`)
- `PREDICTA_API_TIMEOUT_SECS` - Per-request timeout in seconds (default: `300`)
- `LOG_LEVEL`, `LOG_OUTPUT`, `LOG_FORMAT` - Logging overrides

---

*Generated by `cargo xtask generate-cli-docs`.*
"#,
        chrono::Utc::now().format("%Y-%m-%d"),
        markdown
    );

    let output_path = PathBuf::from(output_dir);
    fs::create_dir_all(&output_path)?;

    let file_path = output_path.join("cli-reference.md");
    fs::write(&file_path, content)?;

    println!("Generated CLI documentation at: {}", file_path.display());

    Ok(())
}
