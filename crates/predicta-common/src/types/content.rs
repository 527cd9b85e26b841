use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of dataset kinds accepted by the intake.
///
/// Declared MIME types are parsed and compared by essence, so
/// `text/csv; charset=utf-8` is still a CSV upload. Anything outside the
/// allow-list has no kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Csv,
    Spreadsheet,
    Json,
}

const MIME_CSV: &str = "text/csv";
const MIME_XLS: &str = "application/vnd.ms-excel";
const MIME_XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const MIME_JSON: &str = "application/json";

impl ContentKind {
    /// Every MIME type on the allow-list.
    pub const ALLOWED_MIME_TYPES: [&'static str; 4] = [MIME_CSV, MIME_XLS, MIME_XLSX, MIME_JSON];

    pub fn from_mime(declared: &str) -> Option<Self> {
        let parsed: mime::Mime = declared.trim().parse().ok()?;
        match parsed.essence_str() {
            MIME_CSV => Some(ContentKind::Csv),
            MIME_XLS | MIME_XLSX => Some(ContentKind::Spreadsheet),
            MIME_JSON => Some(ContentKind::Json),
            _ => None,
        }
    }

    /// Kind and canonical MIME type for a local file extension.
    pub fn from_extension(ext: &str) -> Option<(Self, &'static str)> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some((ContentKind::Csv, MIME_CSV)),
            "xls" => Some((ContentKind::Spreadsheet, MIME_XLS)),
            "xlsx" => Some((ContentKind::Spreadsheet, MIME_XLSX)),
            "json" => Some((ContentKind::Json, MIME_JSON)),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ContentKind::Csv => "CSV",
            ContentKind::Spreadsheet => "Excel",
            ContentKind::Json => "JSON",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_list() {
        assert_eq!(ContentKind::from_mime("text/csv"), Some(ContentKind::Csv));
        assert_eq!(ContentKind::from_mime(MIME_XLS), Some(ContentKind::Spreadsheet));
        assert_eq!(ContentKind::from_mime(MIME_XLSX), Some(ContentKind::Spreadsheet));
        assert_eq!(ContentKind::from_mime("application/json"), Some(ContentKind::Json));
    }

    #[test]
    fn test_parameters_are_ignored() {
        assert_eq!(
            ContentKind::from_mime("text/csv; charset=utf-8"),
            Some(ContentKind::Csv)
        );
    }

    #[test]
    fn test_unknown_types_are_rejected() {
        assert_eq!(ContentKind::from_mime("text/plain"), None);
        assert_eq!(ContentKind::from_mime("application/octet-stream"), None);
        assert_eq!(ContentKind::from_mime("image/png"), None);
        assert_eq!(ContentKind::from_mime(""), None);
        assert_eq!(ContentKind::from_mime("not a mime"), None);
    }

    #[test]
    fn test_from_extension() {
        assert_eq!(
            ContentKind::from_extension("CSV"),
            Some((ContentKind::Csv, MIME_CSV))
        );
        assert_eq!(
            ContentKind::from_extension("xlsx"),
            Some((ContentKind::Spreadsheet, MIME_XLSX))
        );
        assert_eq!(ContentKind::from_extension("txt"), None);
    }

    #[test]
    fn test_extension_mime_is_on_allow_list() {
        for ext in ["csv", "xls", "xlsx", "json"] {
            let (kind, mime) = ContentKind::from_extension(ext).unwrap_or((ContentKind::Json, ""));
            assert_eq!(ContentKind::from_mime(mime), Some(kind), "extension {ext}");
        }
    }
}
