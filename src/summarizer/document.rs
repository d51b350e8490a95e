//! Document download and text extraction.

use std::io::Write as IoWrite;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{ExtractError, TransportError};

/// Download a document, failing on any non-2xx status.
pub async fn fetch_document(
    client: &reqwest::Client,
    url: &str,
) -> Result<Vec<u8>, TransportError> {
    debug!(url, "downloading document");
    let resp = client.get(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(TransportError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    let bytes = resp.bytes().await?;
    debug!(url, size = bytes.len(), "document downloaded");
    Ok(bytes.to_vec())
}

/// Extract the plain text of a downloaded document.
///
/// PDFs are staged in a temporary file that is removed when this returns,
/// on success and on error. HTML documents are stripped of markup.
pub fn extract_text(bytes: &[u8]) -> Result<String, ExtractError> {
    if is_pdf(bytes) {
        let staged = stage_document(bytes)?;
        extract_pdf_text(staged.path())
    } else if looks_like_html(bytes) {
        let html = String::from_utf8_lossy(bytes);
        Ok(strip_html(html.trim_start_matches(BOM)))
    } else {
        Err(ExtractError::Malformed(
            "document is neither PDF nor HTML".to_string(),
        ))
    }
}

/// Write the document to a temporary file that deletes itself on drop.
pub fn stage_document(bytes: &[u8]) -> Result<NamedTempFile, ExtractError> {
    let mut file = tempfile::Builder::new()
        .prefix("law-digest-")
        .suffix(".pdf")
        .tempfile()?;
    file.write_all(bytes)?;
    file.flush()?;
    Ok(file)
}

/// Concatenate the text of every page in order.
///
/// A page whose text cannot be extracted contributes nothing.
pub fn extract_pdf_text(path: &Path) -> Result<String, ExtractError> {
    let doc = lopdf::Document::load(path).map_err(|e| ExtractError::Malformed(e.to_string()))?;

    let pages = doc.get_pages();
    let mut text = String::new();
    for page_number in pages.keys() {
        match doc.extract_text(&[*page_number]) {
            Ok(page_text) => text.push_str(&page_text),
            Err(e) => {
                warn!(page = page_number, error = %e, "page yielded no extractable text");
            }
        }
    }
    debug!(pages = pages.len(), chars = text.chars().count(), "extracted document text");
    Ok(text)
}

fn is_pdf(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(1024)];
    head.windows(5).any(|w| w == b"%PDF-")
}

const BOM: char = '\u{feff}';

/// Markup after an optional byte-order mark and leading whitespace.
///
/// Registry HTML is sometimes served as a bare fragment (`<div class="akt">`)
/// rather than a full document.
fn looks_like_html(bytes: &[u8]) -> bool {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(512)]);
    let head = head.trim_start_matches(BOM).trim_start();
    let Some(rest) = head.strip_prefix('<') else {
        return false;
    };
    rest.starts_with(|c: char| c.is_ascii_alphabetic() || c == '!' || c == '?')
}

/// Strip HTML tags from content (basic).
pub fn strip_html(html: &str) -> String {
    let mut result = String::new();
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                result.push(' ');
            }
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }
    // Normalize whitespace
    result.split_whitespace().collect::<Vec<_>>().join(" ")
}
