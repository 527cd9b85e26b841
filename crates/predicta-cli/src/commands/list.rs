//! `predicta list` command implementation

use super::colored_status;
use crate::api::{ApiClient, FileSummary};
use crate::error::Result;
use crate::progress::format_bytes;
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};

/// List stored files as a table
pub async fn run(server_url: &str) -> Result<()> {
    let client = ApiClient::new(server_url)?;
    let files = client.list_files().await?;

    if files.is_empty() {
        println!("No files stored yet.");
        println!("Run 'predicta upload <file>' to add one.");
        return Ok(());
    }

    println!("{}", build_table(&files));
    println!();
    println!("{} file(s)", files.len().to_string().bold());
    Ok(())
}

fn build_table(files: &[FileSummary]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["ID", "Name", "Type", "Size", "Uploaded", "Status"]);

    for file in files {
        table.add_row(vec![
            file.id.to_string(),
            file.original_name.clone(),
            file.content_type.clone(),
            format_bytes(file.byte_size),
            file.uploaded_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            colored_status(file.status).to_string(),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use predicta_common::{FileId, FileStatus};

    #[test]
    fn test_table_has_one_row_per_file() {
        let file = FileSummary {
            id: FileId::new(),
            storage_key: "1700000000000a.csv".to_string(),
            original_name: "a.csv".to_string(),
            content_type: "text/csv".to_string(),
            byte_size: 2048,
            uploaded_at: Utc::now(),
            status: FileStatus::Uploaded,
            metadata: None,
        };

        let table = build_table(&[file.clone(), file]);
        assert_eq!(table.row_iter().count(), 2);
        let rendered = table.to_string();
        assert!(rendered.contains("a.csv"));
        assert!(rendered.contains("2.00 KB"));
    }
}
