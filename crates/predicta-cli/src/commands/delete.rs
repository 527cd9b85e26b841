//! `predicta delete` command implementation

use super::parse_id;
use crate::api::ApiClient;
use crate::error::Result;
use colored::Colorize;

/// Delete a stored file
pub async fn run(server_url: &str, id: &str) -> Result<()> {
    let id = parse_id(id)?;
    let client = ApiClient::new(server_url)?;
    let message = client.delete_file(id).await?;

    println!("{} {}", "✓".green(), message);
    Ok(())
}
