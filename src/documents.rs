//! Syllabus uploads: storage and plain-text extraction
//!
//! Two formats are accepted, chosen by file extension. The raw bytes are written
//! under the upload directory with the client's filename, then text is pulled out
//! of the in-memory copy.

use quick_xml::Reader;
use quick_xml::events::Event;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use strum_macros::{Display, EnumString};
use thiserror::Error;
use zip::ZipArchive;

use crate::log_debug;

const DOCX_BODY: &str = "word/document.xml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DocumentKind {
    Docx,
    Pdf,
}

impl DocumentKind {
    /// Kind from the text after the last `.`; `None` for anything unsupported
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, extension) = filename.rsplit_once('.')?;
        extension.parse().ok()
    }
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Only .docx and .pdf files are supported.")]
    Unsupported,
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("not a valid .docx archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("malformed document XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("not a readable PDF: {0}")]
    Pdf(#[from] lopdf::Error),
}

/// Write `bytes` to `dir/filename`, creating `dir` if needed; an existing file is replaced
pub fn save_upload(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf, DocumentError> {
    std::fs::create_dir_all(dir).map_err(|source| DocumentError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(filename);
    std::fs::write(&path, bytes).map_err(|source| DocumentError::Io {
        path: path.clone(),
        source,
    })?;
    log_debug!("Saved upload to {} ({} bytes)", path.display(), bytes.len());
    Ok(path)
}

pub fn extract_text(kind: DocumentKind, bytes: &[u8]) -> Result<String, DocumentError> {
    match kind {
        DocumentKind::Docx => extract_docx_text(bytes),
        DocumentKind::Pdf => extract_pdf_text(bytes),
    }
}

/// Body paragraphs joined with `\n`; table contents are skipped
pub fn extract_docx_text(bytes: &[u8]) -> Result<String, DocumentError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY)?
        .read_to_string(&mut xml)
        .map_err(|source| DocumentError::Io {
            path: PathBuf::from(DOCX_BODY),
            source,
        })?;

    let mut reader = Reader::from_str(&xml);
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current: Option<String> = None;
    let mut table_depth = 0usize;
    // Text boxes nest whole paragraphs inside a run of the outer one
    let mut paragraph_depth = 0usize;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:tbl" => table_depth += 1,
                b"w:p" if table_depth == 0 => {
                    paragraph_depth += 1;
                    match current.as_mut() {
                        None => current = Some(String::new()),
                        Some(text) => push_separator(text),
                    }
                }
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"w:tbl" => table_depth = table_depth.saturating_sub(1),
                b"w:p" if table_depth == 0 => {
                    paragraph_depth = paragraph_depth.saturating_sub(1);
                    if paragraph_depth > 0 {
                        if let Some(text) = current.as_mut() {
                            push_separator(text);
                        }
                    } else if let Some(text) = current.take() {
                        paragraphs.push(text);
                    }
                }
                b"w:t" => in_text = false,
                _ => {}
            },
            Event::Empty(e) => match (e.name().as_ref(), current.as_mut()) {
                (b"w:p", None) if table_depth == 0 => paragraphs.push(String::new()),
                (b"w:tab", Some(text)) => text.push('\t'),
                (b"w:br" | b"w:cr", Some(text)) => text.push('\n'),
                _ => {}
            },
            Event::Text(e) if in_text => {
                if let Some(text) = current.as_mut() {
                    text.push_str(&e.unescape()?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs.join("\n"))
}

fn push_separator(text: &mut String) {
    if !text.is_empty() && !text.ends_with(char::is_whitespace) {
        text.push(' ');
    }
}

/// Page texts in page order; pages without extractable text contribute nothing
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, DocumentError> {
    let document = lopdf::Document::load_mem(bytes)?;
    let mut text = String::new();
    for page_number in document.get_pages().keys() {
        match document.extract_text(&[*page_number]) {
            Ok(page_text) => text.push_str(&page_text),
            Err(e) => log_debug!("No text on page {}: {}", page_number, e),
        }
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_filename() {
        assert_eq!(
            DocumentKind::from_filename("syllabus.DOCX"),
            Some(DocumentKind::Docx)
        );
        assert_eq!(
            DocumentKind::from_filename("notes.v2.pdf"),
            Some(DocumentKind::Pdf)
        );
        assert_eq!(DocumentKind::from_filename("syllabus.txt"), None);
        assert_eq!(DocumentKind::from_filename("pdf"), None);
        assert_eq!(DocumentKind::from_filename("archive.pdf.zip"), None);
    }

    #[test]
    fn test_save_upload_overwrites() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("nested");
        save_upload(&target, "a.pdf", b"first").expect("first write");
        let path = save_upload(&target, "a.pdf", b"second").expect("second write");
        assert_eq!(std::fs::read(path).expect("read back"), b"second");
    }

    #[test]
    fn test_garbage_docx_is_rejected() {
        assert!(matches!(
            extract_docx_text(b"definitely not a zip"),
            Err(DocumentError::Zip(_))
        ));
    }

    #[test]
    fn test_garbage_pdf_is_rejected() {
        assert!(matches!(
            extract_pdf_text(b"%PDF-nonsense"),
            Err(DocumentError::Pdf(_))
        ));
    }
}
