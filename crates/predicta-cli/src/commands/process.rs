//! `predicta process` command implementation

use super::{colored_status, parse_id};
use crate::api::ApiClient;
use crate::error::Result;
use colored::Colorize;

/// Start processing a stored file
pub async fn run(server_url: &str, id: &str) -> Result<()> {
    let id = parse_id(id)?;
    let client = ApiClient::new(server_url)?;
    let reply = client.start_processing(id).await?;

    println!(
        "{} {}",
        "✓".green(),
        reply
            .message
            .unwrap_or_else(|| "File processing started".to_string())
    );
    println!("  Status: {}", colored_status(reply.started.status));
    if !reply.started.status.is_terminal() {
        println!("  Follow it with 'predicta status {} --wait'", reply.started.file_id);
    }
    Ok(())
}
