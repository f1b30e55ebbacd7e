use anyhow::{Context, Result};
use onboard_flow::DroppedFile;
use std::path::Path;

/// Read a file from disk the way a drop target would hand it over.
pub fn load_dropped_file(path: &Path) -> Result<DroppedFile> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();
    let mime_type = declared_mime_type(path, &bytes);

    Ok(DroppedFile::new(name, mime_type, bytes))
}

/// Content type as sniffed from the bytes, falling back to the extension.
pub fn declared_mime_type(path: &Path, bytes: &[u8]) -> String {
    if let Some(kind) = infer::get(bytes) {
        return kind.mime_type().to_string();
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        _ => "application/octet-stream",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_pdf_content_is_detected() {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        file.write_all(b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n").unwrap();

        let dropped = load_dropped_file(file.path()).unwrap();

        assert_eq!(dropped.mime_type, "application/pdf");
        assert!(dropped.name.ends_with(".pdf"));
        assert_eq!(dropped.size(), 15);
    }

    #[test]
    fn test_content_wins_over_extension() {
        let path = Path::new("resume.pdf");
        assert_eq!(declared_mime_type(path, &PNG_MAGIC), "image/png");
    }

    #[test]
    fn test_extension_used_when_content_is_unknown() {
        assert_eq!(
            declared_mime_type(Path::new("notes.TXT"), b"plain words"),
            "text/plain"
        );
        assert_eq!(
            declared_mime_type(Path::new("blob"), b"plain words"),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_dropped_file(Path::new("/definitely/not/here.pdf")).is_err());
    }
}
