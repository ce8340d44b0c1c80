//! Input extraction: turns raw text or an uploaded `.txt`/`.pdf` file into
//! plain email text.
//!
//! Blank content is not rejected here; `EmailContent::new` does that.

use tracing::{debug, warn};

use crate::error::InputError;

/// Maximum length of directly submitted text, in characters.
pub const MAX_TEXT_CHARS: usize = 800;

/// Accepted upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Text,
    Pdf,
}

impl FileKind {
    /// Pick the format from the file extension (case-insensitive).
    pub fn from_filename(filename: &str) -> Result<Self, InputError> {
        let lower = filename.to_lowercase();
        if lower.ends_with(".txt") {
            Ok(Self::Text)
        } else if lower.ends_with(".pdf") {
            Ok(Self::Pdf)
        } else {
            Err(InputError::UnsupportedFileType {
                filename: filename.to_string(),
            })
        }
    }
}

/// Validate directly submitted text.
pub fn from_text(text: &str) -> Result<String, InputError> {
    if text.chars().count() > MAX_TEXT_CHARS {
        return Err(InputError::TooLong {
            max: MAX_TEXT_CHARS,
        });
    }
    Ok(text.to_string())
}

/// Extract text from an uploaded file. No length limit applies.
pub async fn from_file(filename: &str, bytes: Vec<u8>) -> Result<String, InputError> {
    let kind = FileKind::from_filename(filename)?;
    debug!(filename, ?kind, size = bytes.len(), "Extracting uploaded file");
    match kind {
        FileKind::Text => decode_text(bytes),
        FileKind::Pdf => extract_pdf(bytes).await,
    }
}

fn decode_text(bytes: Vec<u8>) -> Result<String, InputError> {
    String::from_utf8(bytes).map_err(|_| InputError::InvalidUtf8)
}

/// PDF parsing is CPU-bound and may panic on malformed input, so it runs on
/// the blocking pool.
async fn extract_pdf(bytes: Vec<u8>) -> Result<String, InputError> {
    let pages = tokio::task::spawn_blocking(move || {
        pdf_extract::extract_text_from_mem_by_pages(&bytes)
    })
    .await
    .map_err(|e| {
        warn!(error = %e, "PDF extraction task failed");
        InputError::PdfRead("PDF parser crashed on this file".to_string())
    })?
    .map_err(|e| InputError::PdfRead(e.to_string()))?;

    join_pages(pages)
}

/// Concatenate non-empty pages, each followed by a newline. Pages without
/// text are skipped; only an all-blank document is an error.
fn join_pages(pages: Vec<String>) -> Result<String, InputError> {
    let total = pages.len();
    let mut text = String::new();
    let mut extracted = 0;
    for page in pages.into_iter().filter(|p| !p.is_empty()) {
        text.push_str(&page);
        text.push('\n');
        extracted += 1;
    }

    if text.trim().is_empty() {
        return Err(InputError::PdfNoText);
    }
    if extracted < total {
        debug!(extracted, total, "Some PDF pages had no extractable text");
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_at_limit_is_accepted() {
        let text = "a".repeat(MAX_TEXT_CHARS);
        assert_eq!(from_text(&text).unwrap(), text);
    }

    #[test]
    fn text_over_limit_is_rejected() {
        let text = "a".repeat(MAX_TEXT_CHARS + 1);
        assert_eq!(
            from_text(&text),
            Err(InputError::TooLong { max: MAX_TEXT_CHARS })
        );
    }

    #[test]
    fn limit_counts_characters_not_bytes() {
        // 800 two-byte characters
        let text = "ç".repeat(MAX_TEXT_CHARS);
        assert!(text.len() > MAX_TEXT_CHARS);
        assert!(from_text(&text).is_ok());
    }

    #[test]
    fn file_kind_from_extension() {
        assert_eq!(FileKind::from_filename("email.txt"), Ok(FileKind::Text));
        assert_eq!(FileKind::from_filename("Email.PDF"), Ok(FileKind::Pdf));
        assert_eq!(
            FileKind::from_filename("email.docx"),
            Err(InputError::UnsupportedFileType {
                filename: "email.docx".into()
            })
        );
        assert!(FileKind::from_filename("").is_err());
        assert!(FileKind::from_filename("txt").is_err());
    }

    #[tokio::test]
    async fn txt_file_decoded_as_utf8() {
        let text = from_file("msg.txt", "Olá, preciso de ajuda".as_bytes().to_vec())
            .await
            .unwrap();
        assert_eq!(text, "Olá, preciso de ajuda");
    }

    #[tokio::test]
    async fn txt_file_has_no_length_limit() {
        let body = "x".repeat(MAX_TEXT_CHARS * 3);
        let text = from_file("long.txt", body.clone().into_bytes()).await.unwrap();
        assert_eq!(text, body);
    }

    #[tokio::test]
    async fn invalid_utf8_rejected() {
        let err = from_file("msg.txt", vec![0xff, 0xfe, 0x00, 0xc3])
            .await
            .unwrap_err();
        assert_eq!(err, InputError::InvalidUtf8);
    }

    #[tokio::test]
    async fn unsupported_extension_rejected_before_reading() {
        let err = from_file("msg.eml", b"hello".to_vec()).await.unwrap_err();
        assert!(matches!(err, InputError::UnsupportedFileType { .. }));
    }

    #[tokio::test]
    async fn garbage_pdf_is_read_error() {
        let err = from_file("scan.pdf", b"definitely not a pdf".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, InputError::PdfRead(_)));
    }

    #[tokio::test]
    async fn text_pdf_extracted_page_by_page() {
        let bytes = include_bytes!("../tests/fixtures/two_pages.pdf").to_vec();
        let text = from_file("chamado.pdf", bytes).await.unwrap();

        let first = text.find("Solicito").expect("first page text missing");
        let second = text.find("4521").expect("second page text missing");
        assert!(first < second);
        // each page is terminated by a newline
        assert!(text[first..second].contains('\n'));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn join_pages_skips_empty_pages() {
        let pages = vec![
            "Página um".to_string(),
            String::new(),
            "Página três".to_string(),
        ];
        assert_eq!(join_pages(pages).unwrap(), "Página um\nPágina três\n");
    }

    #[test]
    fn join_pages_accepts_partial_extraction() {
        let pages = vec![String::new(), "Só esta página".to_string()];
        assert_eq!(join_pages(pages).unwrap(), "Só esta página\n");
    }

    #[test]
    fn join_pages_all_blank_is_no_text() {
        assert_eq!(join_pages(vec![]), Err(InputError::PdfNoText));
        assert_eq!(
            join_pages(vec![String::new(), "  \n ".to_string()]),
            Err(InputError::PdfNoText)
        );
    }
}
