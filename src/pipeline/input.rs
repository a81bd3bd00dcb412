//! Input resolution: normalise a user-supplied path or URL to a local file
//! and classify it as a PDF or a raster image.
//!
//! pdfium needs a file-system path, so URLs are downloaded into a `TempDir`
//! that lives as long as the returned [`ResolvedInput`].

use crate::error::OcrError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

/// What kind of document the input holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Pdf,
    Image,
}

/// The resolved input: either a local path or a downloaded temp file.
pub enum ResolvedInput {
    Local { path: PathBuf, kind: InputKind },
    /// The `TempDir` is kept alive until processing completes.
    Downloaded {
        path: PathBuf,
        kind: InputKind,
        _temp_dir: TempDir,
    },
}

impl ResolvedInput {
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local { path, .. } => path,
            ResolvedInput::Downloaded { path, .. } => path,
        }
    }

    pub fn kind(&self) -> InputKind {
        match self {
            ResolvedInput::Local { kind, .. } | ResolvedInput::Downloaded { kind, .. } => *kind,
        }
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Classify by leading bytes: `%PDF` is a PDF, anything else is handed to
/// the image decoder later.
pub fn classify(magic: &[u8]) -> InputKind {
    if magic.starts_with(b"%PDF") {
        InputKind::Pdf
    } else {
        InputKind::Image
    }
}

/// Resolve the input string to a local file path.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedInput, OcrError> {
    if input.trim().is_empty() {
        return Err(OcrError::InvalidInput {
            input: input.to_string(),
        });
    }
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        resolve_local(input)
    }
}

fn resolve_local(path_str: &str) -> Result<ResolvedInput, OcrError> {
    let path = PathBuf::from(path_str);

    let mut magic = [0u8; 4];
    let read = std::fs::File::open(&path)
        .and_then(|mut f| f.read(&mut magic))
        .map_err(|_| OcrError::FileNotFound { path: path.clone() })?;

    let kind = classify(&magic[..read]);
    debug!("Resolved local input {} as {:?}", path.display(), kind);
    Ok(ResolvedInput::Local { path, kind })
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedInput, OcrError> {
    info!("Downloading input from: {}", url);
    let failed = |reason: String| OcrError::DownloadFailed {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| failed(e.to_string()))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| failed(e.to_string()))?;

    if !response.status().is_success() {
        return Err(failed(format!("HTTP {}", response.status())));
    }

    let bytes = response.bytes().await.map_err(|e| failed(e.to_string()))?;
    let kind = classify(&bytes);

    let temp_dir = TempDir::new().map_err(|e| OcrError::Internal(e.to_string()))?;
    let file_path = temp_dir.path().join(filename_from_url(url, kind));
    tokio::fs::write(&file_path, &bytes)
        .await
        .map_err(|e| OcrError::Internal(format!("Failed to write temp file: {}", e)))?;

    info!("Downloaded to: {}", file_path.display());
    Ok(ResolvedInput::Downloaded {
        path: file_path,
        kind,
        _temp_dir: temp_dir,
    })
}

/// Last URL path segment when it looks like a file name, else a default.
fn filename_from_url(url: &str, kind: InputKind) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|mut s| s.next_back().map(str::to_string))
        })
        .filter(|last| !last.is_empty() && last.contains('.'))
        .unwrap_or_else(|| match kind {
            InputKind::Pdf => "downloaded.pdf".to_string(),
            InputKind::Image => "downloaded.img".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/doc.pdf"));
        assert!(is_url("http://example.com/scan.png"));
        assert!(!is_url("/tmp/doc.pdf"));
        assert!(!is_url(""));
    }

    #[test]
    fn classify_by_magic() {
        assert_eq!(classify(b"%PDF-1.7"), InputKind::Pdf);
        assert_eq!(classify(&[0x89, b'P', b'N', b'G']), InputKind::Image);
        assert_eq!(classify(b""), InputKind::Image);
    }

    #[test]
    fn filename_from_url_path() {
        assert_eq!(
            filename_from_url("https://example.com/a/scan.png", InputKind::Image),
            "scan.png"
        );
        assert_eq!(
            filename_from_url("https://example.com/download", InputKind::Pdf),
            "downloaded.pdf"
        );
    }

    #[tokio::test]
    async fn missing_local_file() {
        let err = resolve_input("/definitely/not/here.pdf", 5).await.err().unwrap();
        assert!(matches!(err, OcrError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn local_pdf_is_classified() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, b"%PDF-1.4\n%%EOF").unwrap();
        let resolved = resolve_input(path.to_str().unwrap(), 5).await.unwrap();
        assert_eq!(resolved.kind(), InputKind::Pdf);
        assert_eq!(resolved.path(), path.as_path());
    }
}
