//! Registry wire types and the normalized `ActRecord`.

use serde::{Deserialize, Serialize};

/// Sentinel the registry uses for acts currently in force.
const IN_FORCE: &str = "IN_FORCE";

/// Search response envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub items: Vec<RawAct>,
}

/// One act as returned by the registry search endpoint.
///
/// Every field is optional on the wire; normalization happens in
/// [`ActRecord::from_raw`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAct {
    pub title: Option<String>,
    pub in_force: Option<String>,
    pub entry_into_force: Option<String>,
    pub valid_from: Option<String>,
    pub announcement_date: Option<String>,
    pub change_date: Option<String>,
    pub promulgation: Option<String>,
    pub keywords: Option<Vec<String>>,
    #[serde(rename = "ELI")]
    pub eli: Option<String>,
    #[serde(rename = "textPDF", default)]
    pub text_pdf: bool,
    #[serde(rename = "textHTML", default)]
    pub text_html: bool,
}

/// A discovered legal act, normalized for the pipeline.
///
/// `summary` is the only field mutated after construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActRecord {
    pub title: String,
    pub summary: String,
    pub in_force: bool,
    pub entry_into_force: Option<String>,
    pub valid_from: Option<String>,
    pub announcement_date: Option<String>,
    pub change_date: Option<String>,
    pub promulgation: Option<String>,
    pub keywords: Option<String>,
    pub pdf_url: Option<String>,
    pub html_url: Option<String>,
}

impl ActRecord {
    /// Normalize a raw registry item. Pure: the same input always yields the
    /// same record.
    ///
    /// `acts_base` is the registry's acts root, e.g.
    /// `https://api.sejm.gov.pl/eli/acts`.
    pub fn from_raw(raw: &RawAct, acts_base: &str) -> Self {
        let base = acts_base.trim_end_matches('/');
        let eli = non_empty(&raw.eli);
        let text_url = |ext: &str| eli.as_ref().map(|id| format!("{base}/{id}/text.{ext}"));

        Self {
            title: non_empty(&raw.title).unwrap_or_default(),
            summary: String::new(),
            in_force: raw.in_force.as_deref() == Some(IN_FORCE),
            entry_into_force: non_empty(&raw.entry_into_force),
            valid_from: non_empty(&raw.valid_from),
            announcement_date: non_empty(&raw.announcement_date),
            change_date: non_empty(&raw.change_date),
            promulgation: non_empty(&raw.promulgation),
            keywords: join_keywords(raw.keywords.as_deref().unwrap_or_default()),
            pdf_url: if raw.text_pdf { text_url("pdf") } else { None },
            html_url: if raw.text_html { text_url("html") } else { None },
        }
    }

    /// Link to the act's text, preferring the PDF form.
    pub fn document_url(&self) -> Option<&str> {
        self.pdf_url.as_deref().or(self.html_url.as_deref())
    }

    pub fn is_summarized(&self) -> bool {
        !self.summary.is_empty()
    }
}

/// Collapse a keyword list to `"a, b, c"`, or `None` when empty.
pub fn join_keywords(keywords: &[String]) -> Option<String> {
    let kept: Vec<&str> = keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .collect();
    if kept.is_empty() {
        None
    } else {
        Some(kept.join(", "))
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
