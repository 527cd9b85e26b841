//! CLI command implementations
//!
//! Each subcommand has its own module with a `run` function.

pub mod delete;
pub mod download;
pub mod list;
pub mod process;
pub mod show;
pub mod status;
pub mod upload;

use crate::error::Result;
use colored::{ColoredString, Colorize};
use predicta_common::{FileId, FileStatus};

/// Parse a file id given on the command line
pub(crate) fn parse_id(raw: &str) -> Result<FileId> {
    Ok(raw.parse()?)
}

/// Status word coloured by lifecycle stage
pub(crate) fn colored_status(status: FileStatus) -> ColoredString {
    match status {
        FileStatus::Uploaded => status.as_str().cyan(),
        FileStatus::Processing => status.as_str().yellow(),
        FileStatus::Processed => status.as_str().green(),
        FileStatus::Error => status.as_str().red(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;

    #[test]
    fn test_parse_id_rejects_garbage() {
        assert!(matches!(parse_id("abc"), Err(CliError::Common(_))));
        let id = FileId::new();
        assert!(matches!(parse_id(&id.to_string()), Ok(parsed) if parsed == id));
    }
}
