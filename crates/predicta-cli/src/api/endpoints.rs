//! API endpoint URL builders
//!
//! Helper functions to construct API endpoint URLs. `base_url` never carries a
//! trailing slash.

use predicta_common::FileId;

/// Build file list URL
pub fn files_url(base_url: &str) -> String {
    format!("{}/api/files", base_url)
}

/// Build upload URL
pub fn upload_url(base_url: &str) -> String {
    format!("{}/api/files/upload", base_url)
}

/// Build single file URL (get and delete)
pub fn file_url(base_url: &str, id: FileId) -> String {
    format!("{}/api/files/{}", base_url, id)
}

/// Build file download URL
pub fn download_url(base_url: &str, id: FileId) -> String {
    format!("{}/api/files/{}/download", base_url, id)
}

/// Build processing URL
pub fn process_url(base_url: &str, id: FileId) -> String {
    format!("{}/api/files/{}/process", base_url, id)
}

/// Build health check URL
pub fn health_url(base_url: &str) -> String {
    format!("{}/health", base_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://localhost:5000";

    #[test]
    fn test_collection_urls() {
        assert_eq!(files_url(BASE), "http://localhost:5000/api/files");
        assert_eq!(upload_url(BASE), "http://localhost:5000/api/files/upload");
        assert_eq!(health_url(BASE), "http://localhost:5000/health");
    }

    #[test]
    fn test_file_urls() {
        let id = FileId::new();
        assert_eq!(file_url(BASE, id), format!("{BASE}/api/files/{id}"));
        assert_eq!(download_url(BASE, id), format!("{BASE}/api/files/{id}/download"));
        assert_eq!(process_url(BASE, id), format!("{BASE}/api/files/{id}/process"));
    }
}
