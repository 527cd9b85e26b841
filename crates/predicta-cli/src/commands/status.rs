//! `predicta status` command implementation
//!
//! Shows where a file is in its lifecycle, optionally polling until it
//! reaches `processed` or `error`.

use super::{colored_status, parse_id};
use crate::api::ApiClient;
use crate::error::{CliError, Result};
use crate::progress::create_spinner;
use colored::Colorize;
use predicta_common::FileStatus;
use std::time::Duration;

/// Delay between polls while waiting
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Show the status of a file
pub async fn run(server_url: &str, id: &str, wait: bool, timeout_secs: u64) -> Result<()> {
    let id = parse_id(id)?;
    let client = ApiClient::new(server_url)?;

    let file = client.get_file(id).await?;
    if !wait || file.status.is_terminal() {
        print_status(&file.original_name, file.status);
        return Ok(());
    }

    let spinner = create_spinner(&format!("Waiting for {} to finish processing...", file.original_name));
    let waited = tokio::time::timeout(Duration::from_secs(timeout_secs), async {
        loop {
            tokio::time::sleep(POLL_INTERVAL).await;
            let current = client.get_file(id).await?;
            spinner.set_message(format!("{} is {}", current.original_name, current.status));
            if current.status.is_terminal() {
                return Ok::<_, CliError>(current);
            }
        }
    })
    .await;
    spinner.finish_and_clear();

    match waited {
        Ok(file) => {
            let file = file?;
            print_status(&file.original_name, file.status);
            Ok(())
        },
        Err(_) => Err(CliError::WaitTimedOut(timeout_secs)),
    }
}

fn print_status(name: &str, status: FileStatus) {
    println!("{} {}", format!("{}:", name).bold(), colored_status(status));
}
