//! `predicta upload` command implementation
//!
//! Checks the selected paths locally, queues the accepted ones and sends them
//! one by one. Ctrl-C cancels the batch; a transfer already in flight is left
//! to finish on the server.

use crate::api::ApiClient;
use crate::error::{CliError, Result};
use crate::orchestrator::{BatchReport, Snapshot, UploadOrchestrator, UploadSource, UploadStatus};
use crate::progress::{format_bytes, UploadBoard};
use colored::Colorize;
use std::{path::PathBuf, sync::Arc};

/// Upload `paths`, optionally starting processing on the first success
pub async fn run(server_url: &str, paths: Vec<PathBuf>, process: bool) -> Result<()> {
    let sources = select(paths).await?;

    let client = ApiClient::new(server_url)?;
    let orchestrator = UploadOrchestrator::new(Arc::new(client));
    orchestrator.enqueue(sources)?;

    let report = submit_with_progress(&orchestrator).await?;
    let snapshot = orchestrator.snapshot();
    print_summary(&snapshot, &report);

    if process && !report.cancelled {
        match orchestrator.process_first_uploaded().await {
            Ok(reply) => {
                println!();
                println!(
                    "{} {}",
                    "✓".green(),
                    reply
                        .message
                        .unwrap_or_else(|| "File processing started".to_string())
                );
                println!("  File ID: {}", reply.started.file_id.to_string().cyan());
                println!(
                    "  Follow it with 'predicta status {} --wait'",
                    reply.started.file_id
                );
            },
            Err(CliError::NothingToProcess) => {
                println!("{}", "No file was uploaded, so nothing was sent for processing.".yellow());
            },
            Err(e) => return Err(e),
        }
    }

    if report.failed > 0 {
        return Err(CliError::BatchFailed {
            failed: report.failed,
            attempted: report.attempted,
            last_error: snapshot.error.unwrap_or_default(),
        });
    }
    Ok(())
}

/// Apply the local selection rules; rejected paths are reported and skipped.
async fn select(paths: Vec<PathBuf>) -> Result<Vec<UploadSource>> {
    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        match UploadSource::from_path(&path).await {
            Ok(source) => sources.push(source),
            Err(CliError::Io(e)) => {
                eprintln!("{} Cannot read '{}': {}", "✗".red(), path.display(), e);
            },
            Err(e) => eprintln!("{} {}", "✗".red(), e),
        }
    }

    if sources.is_empty() {
        return Err(CliError::NoFilesSelected);
    }
    Ok(sources)
}

async fn submit_with_progress(orchestrator: &UploadOrchestrator) -> Result<BatchReport> {
    let mut board = UploadBoard::new(console::Term::stderr().is_term());
    let mut changes = orchestrator.subscribe();

    let cancel_on_interrupt = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                orchestrator.cancel();
            }
        })
    };

    let submit = orchestrator.submit_all();
    tokio::pin!(submit);

    let result = loop {
        tokio::select! {
            result = &mut submit => break result,
            changed = changes.changed() => {
                if changed.is_ok() {
                    board.render(&orchestrator.snapshot());
                }
            },
        }
    };

    cancel_on_interrupt.abort();
    board.render(&orchestrator.snapshot());
    board.finish();
    result
}

fn print_summary(snapshot: &Snapshot, report: &BatchReport) {
    println!();
    for view in &snapshot.descriptors {
        let size = format_bytes(view.size);
        match view.status {
            UploadStatus::Complete => {
                let id = view.server_id.map(|id| id.to_string()).unwrap_or_default();
                println!("{} {} ({}) → {}", "✓".green(), view.name, size, id.cyan());
            },
            UploadStatus::Error => {
                let reason = view.error.as_deref().unwrap_or("upload failed");
                println!("{} {} ({}): {}", "✗".red(), view.name, size, reason);
            },
            UploadStatus::Ready | UploadStatus::Uploading => {
                println!("{} {} ({}) not sent", "-".dimmed(), view.name, size);
            },
        }
    }

    println!();
    if report.cancelled {
        println!("{}", "Upload cancelled.".yellow());
    }
    println!("{} uploaded, {} failed", report.completed, report.failed);
    if let Some(error) = &snapshot.error {
        println!("{}", error.red());
    }
}
