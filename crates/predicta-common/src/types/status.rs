use crate::error::PredictaError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Server-side lifecycle of a stored file.
///
/// The path is monotonic: `uploaded → processing → {processed | error}`.
/// `processing → processing` is permitted so a repeated processing request can
/// re-arm its deferred completion. Terminal states have no outgoing edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    #[default]
    Uploaded,
    Processing,
    Processed,
    Error,
}

impl FileStatus {
    pub const ALL: [FileStatus; 4] = [
        FileStatus::Uploaded,
        FileStatus::Processing,
        FileStatus::Processed,
        FileStatus::Error,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FileStatus::Uploaded => "uploaded",
            FileStatus::Processing => "processing",
            FileStatus::Processed => "processed",
            FileStatus::Error => "error",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, FileStatus::Processed | FileStatus::Error)
    }

    /// Whether a write of `next` over `self` keeps the lifecycle monotonic.
    pub fn can_transition_to(self, next: FileStatus) -> bool {
        use FileStatus::*;
        matches!(
            (self, next),
            (Uploaded, Processing)
                | (Processing, Processing)
                | (Processing, Processed)
                | (Processing, Error)
        )
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileStatus {
    type Err = PredictaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "uploaded" => Ok(FileStatus::Uploaded),
            "processing" => Ok(FileStatus::Processing),
            "processed" => Ok(FileStatus::Processed),
            "error" => Ok(FileStatus::Error),
            _ => Err(PredictaError::InvalidStatus(s.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_allowed_edges() {
        use FileStatus::*;
        assert!(Uploaded.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Processed));
        assert!(Processing.can_transition_to(Error));

        assert!(!Uploaded.can_transition_to(Processed));
        assert!(!Uploaded.can_transition_to(Uploaded));
        assert!(!Processing.can_transition_to(Uploaded));
        assert!(!Processed.can_transition_to(Processing));
        assert!(!Error.can_transition_to(Processing));
        assert!(!Processed.can_transition_to(Processed));
    }

    #[test]
    fn test_wire_format() {
        assert_eq!(serde_json::to_string(&FileStatus::Processed).unwrap(), "\"processed\"");
        let parsed: FileStatus = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(parsed, FileStatus::Error);
        assert_eq!("Processing".parse::<FileStatus>().unwrap(), FileStatus::Processing);
        assert!("done".parse::<FileStatus>().is_err());
    }

    fn rank(status: FileStatus) -> u8 {
        match status {
            FileStatus::Uploaded => 0,
            FileStatus::Processing => 1,
            FileStatus::Processed | FileStatus::Error => 2,
        }
    }

    fn any_status() -> impl Strategy<Value = FileStatus> {
        prop::sample::select(FileStatus::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_accepted_writes_never_move_backwards(writes in prop::collection::vec(any_status(), 0..32)) {
            let mut current = FileStatus::Uploaded;
            for next in writes {
                if current.can_transition_to(next) {
                    prop_assert!(rank(next) >= rank(current));
                    current = next;
                }
            }
        }

        #[test]
        fn prop_terminal_states_are_final(next in any_status()) {
            prop_assert!(!FileStatus::Processed.can_transition_to(next));
            prop_assert!(!FileStatus::Error.can_transition_to(next));
        }
    }
}
