//! Structural metadata for uploaded datasets
//!
//! Only delimited text is inspected. Spreadsheets and JSON are stored as
//! opaque payloads and carry no metadata.

use predicta_common::{ContentKind, FileMetadata};

const UTF8_BOM: &str = "\u{feff}";

/// Derive metadata for a payload of the given kind.
///
/// Returns `None` for kinds that are not inspected and for CSV bodies that
/// are not valid UTF-8.
pub fn extract(bytes: &[u8], kind: ContentKind) -> Option<FileMetadata> {
    match kind {
        ContentKind::Csv => extract_csv(bytes),
        ContentKind::Spreadsheet | ContentKind::Json => None,
    }
}

fn extract_csv(bytes: &[u8]) -> Option<FileMetadata> {
    let text = std::str::from_utf8(bytes).ok()?;
    let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);

    let mut lines = text.lines();
    let Some(header) = lines.next().filter(|line| !line.trim().is_empty()) else {
        return Some(FileMetadata::default());
    };

    let header_names: Vec<String> = header.split(',').map(|f| f.trim().to_string()).collect();

    Some(FileMetadata {
        row_count: lines.count() as u64,
        column_count: header_names.len() as u64,
        header_names,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_header_and_rows() {
        let meta = extract(b"a,b,c\n1,2,3\n4,5,6\n", ContentKind::Csv).unwrap();
        assert_eq!(meta.column_count, 3);
        assert_eq!(meta.row_count, 2);
        assert_eq!(meta.header_names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_missing_trailing_newline_counts_the_same() {
        let with = extract(b"a,b\n1,2\n", ContentKind::Csv).unwrap();
        let without = extract(b"a,b\n1,2", ContentKind::Csv).unwrap();
        assert_eq!(with, without);
    }

    #[test]
    fn test_empty_body() {
        let meta = extract(b"", ContentKind::Csv).unwrap();
        assert_eq!(meta, FileMetadata { row_count: 0, column_count: 0, header_names: vec![] });
    }

    #[test]
    fn test_blank_first_line_has_no_header() {
        for body in [&b"\n"[..], b"   \r\n", b"\n1,2\n"] {
            let meta = extract(body, ContentKind::Csv).unwrap();
            assert_eq!(meta, FileMetadata::default());
        }
    }

    #[test]
    fn test_header_only() {
        let meta = extract(b"id,name", ContentKind::Csv).unwrap();
        assert_eq!(meta.row_count, 0);
        assert_eq!(meta.column_count, 2);
    }

    #[test]
    fn test_fields_are_trimmed_and_crlf_handled() {
        let meta = extract(b" id , name ,\tscore\r\n1,x,2\r\n", ContentKind::Csv).unwrap();
        assert_eq!(meta.header_names, vec!["id", "name", "score"]);
        assert_eq!(meta.row_count, 1);
    }

    #[test]
    fn test_byte_order_mark_is_stripped() {
        let meta = extract("\u{feff}a,b\n1,2\n".as_bytes(), ContentKind::Csv).unwrap();
        assert_eq!(meta.header_names[0], "a");
    }

    #[test]
    fn test_invalid_utf8_yields_none() {
        assert!(extract(&[0xff, 0xfe, 0x00, b'a'], ContentKind::Csv).is_none());
    }

    #[test]
    fn test_other_kinds_have_no_metadata() {
        assert!(extract(b"{\"a\":1}", ContentKind::Json).is_none());
        assert!(extract(b"a,b\n1,2\n", ContentKind::Spreadsheet).is_none());
    }

    #[test]
    fn test_is_deterministic() {
        let body = b"x,y\n1,2\n3,4\n";
        assert_eq!(extract(body, ContentKind::Csv), extract(body, ContentKind::Csv));
    }
}
