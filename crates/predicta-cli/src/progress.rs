//! Progress bar utilities for CLI operations
//!
//! Upload bars mirror the orchestrator's percentage; spinners cover
//! indeterminate waits such as polling for a processing result.

use crate::orchestrator::{DescriptorView, Snapshot, UploadStatus};
use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::collections::HashMap;

const UPLOAD_TEMPLATE: &str = "{prefix:30!} [{bar:40.cyan/blue}] {pos:>3}% {msg}";

/// Create a 0..=100 bar for one queued upload
pub fn create_upload_progress(name: &str) -> ProgressBar {
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::with_template(UPLOAD_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb.set_prefix(name.to_string());
    pb
}

/// Create a spinner for indeterminate operations
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// One bar per queue entry, kept in step with orchestrator snapshots.
pub struct UploadBoard {
    multi: MultiProgress,
    bars: HashMap<String, ProgressBar>,
}

impl UploadBoard {
    /// Draw to stderr, or nowhere when `visible` is false.
    pub fn new(visible: bool) -> Self {
        let target = if visible {
            ProgressDrawTarget::stderr()
        } else {
            ProgressDrawTarget::hidden()
        };
        Self {
            multi: MultiProgress::with_draw_target(target),
            bars: HashMap::new(),
        }
    }

    pub fn render(&mut self, snapshot: &Snapshot) {
        for view in &snapshot.descriptors {
            let bar = self
                .bars
                .entry(view.id.to_string())
                .or_insert_with(|| self.multi.add(create_upload_progress(&view.name)));
            apply(bar, view);
        }
    }

    /// Finish every bar, leaving the final state on screen.
    pub fn finish(&self) {
        for bar in self.bars.values() {
            if !bar.is_finished() {
                bar.abandon();
            }
        }
    }
}

fn apply(bar: &ProgressBar, view: &DescriptorView) {
    bar.set_position(u64::from(view.progress));
    match view.status {
        UploadStatus::Ready => bar.set_message("ready".dimmed().to_string()),
        UploadStatus::Uploading => bar.set_message("uploading".yellow().to_string()),
        UploadStatus::Complete => bar.finish_with_message("done".green().to_string()),
        UploadStatus::Error => bar.abandon_with_message("failed".red().to_string()),
    }
}

/// Format bytes into human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", size as u64, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::DescriptorId;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1048576), "1.00 MB");
        assert_eq!(format_bytes(104857600), "100.00 MB");
        assert_eq!(format_bytes(1099511627776), "1.00 TB");
    }

    #[test]
    fn test_create_upload_progress() {
        let pb = create_upload_progress("sales.csv");
        assert_eq!(pb.length(), Some(100));
        assert_eq!(pb.prefix(), "sales.csv");
    }

    #[test]
    fn test_create_spinner() {
        let pb = create_spinner("Waiting...");
        assert!(!pb.is_finished());
        pb.finish();
    }

    #[test]
    fn test_board_tracks_snapshot() {
        let mut board = UploadBoard::new(false);
        let view = DescriptorView {
            id: DescriptorId::from("a.csv-1"),
            name: "a.csv".to_string(),
            size: 10,
            status: UploadStatus::Uploading,
            progress: 45,
            server_id: None,
            error: None,
        };
        board.render(&Snapshot {
            descriptors: vec![view],
            error: None,
            uploading: true,
        });

        let bar = &board.bars["a.csv-1"];
        assert_eq!(bar.position(), 45);
        board.finish();
        assert!(bar.is_finished());
    }
}
