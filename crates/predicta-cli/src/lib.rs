//! Predicta CLI Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Command-line client for the Predicta dataset intake server.
//!
//! # Overview
//!
//! - **Uploads**: queue local CSV, Excel and JSON files and send them one at a
//!   time with live progress (`predicta upload`)
//! - **Inventory**: list, inspect and download stored files (`predicta list`,
//!   `predicta show`, `predicta download`)
//! - **Processing**: start processing and follow a file to a terminal status
//!   (`predicta process`, `predicta status --wait`)
//! - **Cleanup**: remove stored files (`predicta delete`)
//!
//! The [`orchestrator`] module holds the upload queue and is independent of
//! the terminal; it talks to the server through the [`orchestrator::Transport`]
//! trait, which [`api::ApiClient`] implements.

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod progress;

// Re-export commonly used types
pub use error::{CliError, Result};
pub use orchestrator::UploadOrchestrator;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Predicta - dataset upload and processing client
#[derive(Parser, Debug)]
#[command(name = "predicta")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Server URL
    #[arg(
        long,
        env = "PREDICTA_SERVER_URL",
        default_value = config::DEFAULT_SERVER_URL,
        global = true
    )]
    pub server_url: String,

    /// Print the command reference as Markdown and exit
    #[arg(long, hide = true)]
    pub markdown_help: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload one or more dataset files
    Upload {
        /// Files to upload (.csv, .xls, .xlsx, .json)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Start processing the first uploaded file once the batch finishes
        #[arg(short, long)]
        process: bool,
    },

    /// List stored files
    List,

    /// Show one stored file, including extracted metadata
    Show {
        /// File id
        id: String,
    },

    /// Start processing a stored file
    Process {
        /// File id
        id: String,
    },

    /// Download a stored file
    Download {
        /// File id
        id: String,

        /// Output path (defaults to the original file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete a stored file
    Delete {
        /// File id
        id: String,
    },

    /// Show the processing status of a file
    Status {
        /// File id
        id: String,

        /// Poll until the file reaches a terminal status
        #[arg(short, long)]
        wait: bool,

        /// Give up waiting after this many seconds
        #[arg(long, default_value = "120", requires = "wait")]
        timeout: u64,
    },
}
