//! Bibliographic record

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One parsed bibliography entry
///
/// Text fields default to the empty string; `doi`, `url` and
/// `references_raw` are `None` when missing or blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibRecord {
    pub key: String,
    #[serde(default = "unknown_entry_type")]
    pub entry_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub authors_raw: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub year: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, rename = "abstract")]
    pub abstract_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references_raw: Option<String>,
    #[serde(default)]
    pub raw_text: String,
}

fn unknown_entry_type() -> String {
    "unknown".to_string()
}

impl BibRecord {
    /// Record with only a key; remaining fields empty
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            entry_type: unknown_entry_type(),
            title: String::new(),
            authors_raw: String::new(),
            authors: Vec::new(),
            year: String::new(),
            doi: None,
            url: None,
            abstract_text: String::new(),
            references_raw: None,
            raw_text: String::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authors = authors.into_iter().map(Into::into).collect();
        self.authors_raw = self.authors.join(" and ");
        self
    }

    pub fn with_doi(mut self, doi: impl Into<String>) -> Self {
        self.doi = Some(doi.into());
        self
    }

    pub fn with_references(mut self, references: impl Into<String>) -> Self {
        self.references_raw = Some(references.into());
        self
    }

    pub fn with_raw_text(mut self, raw: impl Into<String>) -> Self {
        self.raw_text = raw.into();
        self
    }

    /// Lowercased surnames: the last whitespace token of each author
    pub fn last_names(&self) -> BTreeSet<String> {
        self.authors
            .iter()
            .filter_map(|name| name.split_whitespace().last())
            .map(str::to_lowercase)
            .collect()
    }

    /// DOI trimmed, lowercased and stripped of a `doi:` prefix
    pub fn normalized_doi(&self) -> Option<String> {
        self.doi.as_deref().and_then(normalize_doi)
    }
}

/// Normalize a DOI for matching; `None` when nothing is left
pub fn normalize_doi(doi: &str) -> Option<String> {
    let lowered = doi.trim().to_lowercase();
    let stripped = lowered.strip_prefix("doi:").unwrap_or(&lowered).trim();
    if stripped.is_empty() {
        None
    } else {
        Some(stripped.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_names_take_final_token() {
        let record = BibRecord::new("k").with_authors(["Ana María  Pérez", "J. SMITH", "   "]);
        let names: Vec<String> = record.last_names().into_iter().collect();
        assert_eq!(names, vec!["pérez", "smith"]);
    }

    #[test]
    fn doi_normalization() {
        assert_eq!(normalize_doi("  DOI:10.1000/ABC "), Some("10.1000/abc".to_string()));
        assert_eq!(normalize_doi("doi:"), None);
        let record = BibRecord::new("k").with_doi("10.5/X");
        assert_eq!(record.normalized_doi().as_deref(), Some("10.5/x"));
    }

    #[test]
    fn json_uses_abstract_field_name() {
        let json = r#"{"key": "a", "title": "T", "abstract": "Body"}"#;
        let record: BibRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.abstract_text, "Body");
        assert_eq!(record.entry_type, "unknown");
        assert!(record.doi.is_none());

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["abstract"], "Body");
        assert!(back.get("doi").is_none());
    }
}
