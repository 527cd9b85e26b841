//! `predicta show` command implementation

use super::{colored_status, parse_id};
use crate::api::{ApiClient, FileSummary};
use crate::error::Result;
use crate::progress::format_bytes;
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};

/// Show one stored file and its extracted metadata
pub async fn run(server_url: &str, id: &str) -> Result<()> {
    let id = parse_id(id)?;
    let client = ApiClient::new(server_url)?;
    let file = client.get_file(id).await?;

    println!();
    println!("{}", "═".repeat(60).blue());
    println!("{}", format!("  {}", file.original_name).bold());
    println!("{}", "═".repeat(60).blue());
    println!();
    println!("{}", details_table(&file));

    match &file.metadata {
        Some(metadata) => {
            println!();
            println!("{}", "Metadata:".cyan().bold());
            println!("  Rows:    {}", metadata.row_count);
            println!("  Columns: {}", metadata.column_count);
            if !metadata.header_names.is_empty() {
                println!("  Headers: {}", metadata.header_names.join(", "));
            }
        },
        None => println!("\nNo metadata extracted for this file."),
    }
    println!();

    Ok(())
}

fn details_table(file: &FileSummary) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS);

    table.add_row(vec!["ID".to_string(), file.id.to_string()]);
    table.add_row(vec!["Name".to_string(), file.original_name.clone()]);
    table.add_row(vec!["Storage key".to_string(), file.storage_key.clone()]);
    table.add_row(vec!["Type".to_string(), file.content_type.clone()]);
    table.add_row(vec!["Size".to_string(), format_bytes(file.byte_size)]);
    table.add_row(vec!["Uploaded".to_string(), file.uploaded_at.to_rfc3339()]);
    table.add_row(vec!["Status".to_string(), colored_status(file.status).to_string()]);
    table
}
