//! `predicta download` command implementation

use super::parse_id;
use crate::api::ApiClient;
use crate::error::Result;
use crate::progress::{create_spinner, format_bytes};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Download a stored file to `output` or to its original name
pub async fn run(server_url: &str, id: &str, output: Option<PathBuf>) -> Result<()> {
    let id = parse_id(id)?;
    let client = ApiClient::new(server_url)?;

    let spinner = create_spinner("Downloading...");
    let downloaded = client.download_file(id).await;
    spinner.finish_and_clear();
    let downloaded = downloaded?;

    let target = output.unwrap_or_else(|| default_target(downloaded.filename.as_deref(), &id.to_string()));
    tokio::fs::write(&target, &downloaded.bytes).await?;

    println!(
        "{} Saved {} to {}",
        "✓".green(),
        format_bytes(downloaded.bytes.len() as u64),
        target.display().to_string().cyan()
    );
    Ok(())
}

/// File name to save under when no output path is given. Only the final path
/// component of the server-supplied name is used.
fn default_target(filename: Option<&str>, fallback: &str) -> PathBuf {
    filename
        .and_then(|name| Path::new(name).file_name())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(fallback))
}
