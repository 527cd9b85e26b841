use predicta_common::{FileStatus, FileSummary};
use std::sync::Arc;

/// How a deferred processing run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Processed,
    Failed,
}

impl Outcome {
    pub fn status(self) -> FileStatus {
        match self {
            Outcome::Processed => FileStatus::Processed,
            Outcome::Failed => FileStatus::Error,
        }
    }
}

/// Decides the terminal status of a file once its processing delay has elapsed.
///
/// Any `Fn(&FileSummary) -> Outcome` closure is a valid outcome.
pub trait ProcessingOutcome: Send + Sync + 'static {
    fn decide(&self, file: &FileSummary) -> Outcome;
}

impl<F> ProcessingOutcome for F
where
    F: Fn(&FileSummary) -> Outcome + Send + Sync + 'static,
{
    fn decide(&self, file: &FileSummary) -> Outcome {
        self(file)
    }
}

/// Every run succeeds.
pub fn always_succeeds() -> Arc<dyn ProcessingOutcome> {
    Arc::new(|_: &FileSummary| Outcome::Processed)
}

/// Every run fails. Useful for exercising the `error` status.
pub fn always_fails() -> Arc<dyn ProcessingOutcome> {
    Arc::new(|_: &FileSummary| Outcome::Failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use predicta_common::FileId;

    fn summary(name: &str) -> FileSummary {
        FileSummary {
            id: FileId::new(),
            storage_key: format!("1{name}"),
            original_name: name.to_string(),
            content_type: "application/json".to_string(),
            byte_size: 2,
            uploaded_at: Utc::now(),
            status: FileStatus::Processing,
            metadata: None,
        }
    }

    #[test]
    fn test_outcome_maps_to_terminal_status() {
        assert_eq!(Outcome::Processed.status(), FileStatus::Processed);
        assert_eq!(Outcome::Failed.status(), FileStatus::Error);
        assert!(Outcome::Failed.status().is_terminal());
    }

    #[test]
    fn test_closure_outcome_sees_the_file() {
        let outcome = |file: &FileSummary| {
            if file.original_name.ends_with(".json") {
                Outcome::Failed
            } else {
                Outcome::Processed
            }
        };

        assert_eq!(outcome.decide(&summary("a.json")), Outcome::Failed);
        assert_eq!(outcome.decide(&summary("a.csv")), Outcome::Processed);
        assert_eq!(always_succeeds().decide(&summary("a.json")), Outcome::Processed);
        assert_eq!(always_fails().decide(&summary("a.csv")), Outcome::Failed);
    }
}
