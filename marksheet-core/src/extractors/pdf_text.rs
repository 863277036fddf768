// Text source abstraction for response sheets.
//
// A TextSource converts one staged document into per-page text. This is
// the key format boundary on the response side: the block scanner in
// `response` only ever sees plain text, so swapping the PDF backend (or
// feeding pre-dumped text) never touches extraction logic.

use crate::error::ScoreError;
use anyhow::Result;
use std::path::Path;

/// TextSource trait — converts response documents to per-page text.
///
/// Page order is preserved; the document text joins pages with a newline
/// separator, matching how response sheets are dumped.
pub trait TextSource {
    /// Per-page text in page order
    fn extract_pages(&self, bytes: &[u8], origin: &Path) -> Result<Vec<String>>;

    /// Full document text, pages joined with a newline separator
    fn document_text(&self, bytes: &[u8], origin: &Path) -> Result<String> {
        Ok(self.extract_pages(bytes, origin)?.join("\n"))
    }

    /// Backend name for diagnostics/logging
    fn name(&self) -> &str;

    /// Whether this backend handles the given file
    fn supports(&self, path: &Path) -> bool;
}

pub(crate) fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

/// Pure-Rust PDF backend built on lopdf.
///
/// A document that fails to load or a page that fails to decode is a
/// MalformedInput — the run aborts rather than score from a corrupted
/// source.
pub struct LopdfTextSource;

impl TextSource for LopdfTextSource {
    fn extract_pages(&self, bytes: &[u8], origin: &Path) -> Result<Vec<String>> {
        let document = lopdf::Document::load_mem(bytes).map_err(|e| ScoreError::MalformedInput {
            path: origin.display().to_string(),
            reason: e.to_string(),
        })?;

        // get_pages is a BTreeMap, so iteration follows page order
        let mut pages = Vec::new();
        for (page_number, _) in document.get_pages() {
            let text =
                document
                    .extract_text(&[page_number])
                    .map_err(|e| ScoreError::MalformedInput {
                        path: origin.display().to_string(),
                        reason: format!("page {page_number}: {e}"),
                    })?;
            pages.push(text);
        }
        Ok(pages)
    }

    fn name(&self) -> &str {
        "lopdf"
    }

    fn supports(&self, path: &Path) -> bool {
        has_extension(path, "pdf")
    }
}

/// Treats the document bytes as UTF-8 text, one page per document.
/// Handles pre-dumped `.txt` response sheets; also the test backend.
pub struct PlainTextSource;

impl TextSource for PlainTextSource {
    fn extract_pages(&self, bytes: &[u8], origin: &Path) -> Result<Vec<String>> {
        let text = std::str::from_utf8(bytes).map_err(|e| ScoreError::MalformedInput {
            path: origin.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(vec![text.to_string()])
    }

    fn name(&self) -> &str {
        "plain-text"
    }

    fn supports(&self, path: &Path) -> bool {
        has_extension(path, "txt")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn plain_text_passes_through() {
        let origin = PathBuf::from("sheet.txt");
        let text = PlainTextSource
            .document_text(b"Question ID : 101", &origin)
            .unwrap();
        assert_eq!(text, "Question ID : 101");
    }

    #[test]
    fn plain_text_rejects_non_utf8() {
        let origin = PathBuf::from("sheet.txt");
        let err = PlainTextSource
            .document_text(&[0xff, 0xfe, 0x00], &origin)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScoreError>(),
            Some(ScoreError::MalformedInput { .. })
        ));
    }

    #[test]
    fn lopdf_rejects_garbage_bytes() {
        let origin = PathBuf::from("sheet.pdf");
        let err = LopdfTextSource
            .extract_pages(b"this is not a pdf", &origin)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScoreError>(),
            Some(ScoreError::MalformedInput { .. })
        ));
    }

    #[test]
    fn backends_claim_their_extensions() {
        assert!(LopdfTextSource.supports(Path::new("a.PDF")));
        assert!(!LopdfTextSource.supports(Path::new("a.html")));
        assert!(PlainTextSource.supports(Path::new("a.txt")));
        assert!(!PlainTextSource.supports(Path::new("a")));
    }
}
