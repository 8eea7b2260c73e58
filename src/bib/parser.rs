//! Parser for loosely structured bibliography text
//!
//! Input is a sequence of `@type{key, field = value, ...}` blocks, as found
//! in merged exports from several databases. Parsing never fails on content:
//! blocks without a single field are skipped and logged.

use super::record::BibRecord;
use regex_lite::Regex;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

/// Errors reading bibliography input
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid record JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Line starts of block headers
static BLOCK_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^@\w+\s*\{").expect("valid block start regex"));

static HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@(\w+)\s*\{\s*([^,]+),").expect("valid header regex"));

/// `name = {value}` (one nested brace level), `name = "value"` or `name = bare`
static FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\w+)\s*=\s*(?:\{((?:[^{}]|\{[^{}]*\})*)\}|"([^"]*)"|([^,\n]+))\s*,?"#)
        .expect("valid field regex")
});

static AUTHOR_AND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+and\s+").expect("valid author separator regex"));

/// Split `text` into raw blocks at header line starts
///
/// Text before the first header is its own block when it is not blank.
fn split_blocks(text: &str) -> Vec<&str> {
    let mut starts: Vec<usize> = BLOCK_START.find_iter(text).map(|m| m.start()).collect();
    if starts.first() != Some(&0) {
        starts.insert(0, 0);
    }
    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(text.len());
            text[start..end].trim()
        })
        .filter(|block| !block.is_empty())
        .collect()
}

/// Field map of one block; names lowercased, later duplicates win
fn parse_fields(block: &str) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    for caps in FIELD.captures_iter(block) {
        let Some(name) = caps.get(1) else { continue };
        let value = if let Some(braced) = caps.get(2) {
            braced.as_str().replace(['{', '}'], "")
        } else if let Some(quoted) = caps.get(3) {
            quoted.as_str().to_string()
        } else if let Some(bare) = caps.get(4) {
            bare.as_str().trim().trim_end_matches('}').to_string()
        } else {
            String::new()
        };
        fields.insert(name.as_str().to_lowercase(), value.trim().to_string());
    }
    fields
}

/// Split an author field on `and` when present, otherwise on commas
pub fn split_authors(field: &str) -> Vec<String> {
    if field.trim().is_empty() {
        return Vec::new();
    }
    let parts: Vec<&str> = if AUTHOR_AND.is_match(field) {
        AUTHOR_AND.split(field).collect()
    } else {
        field.split(',').collect()
    };
    parts
        .into_iter()
        .map(|p| p.replace(['{', '}', '"'], "").trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}

/// Parse bibliography text into records, in input order
pub fn parse(text: &str) -> Vec<BibRecord> {
    let mut records: Vec<BibRecord> = Vec::new();
    let mut seen_keys: HashSet<String> = HashSet::new();

    for (block_idx, block) in split_blocks(text).into_iter().enumerate() {
        let fields = parse_fields(block);
        if fields.is_empty() {
            tracing::debug!(block = block_idx, "skipping block without fields");
            continue;
        }

        let (entry_type, key) = match HEADER.captures(block) {
            Some(caps) => (
                caps.get(1).map_or("unknown", |m| m.as_str()).to_string(),
                caps.get(2).map_or("", |m| m.as_str()).trim().to_string(),
            ),
            None => ("unknown".to_string(), String::new()),
        };
        let key = if key.is_empty() {
            format!("entry_{}", records.len() + 1)
        } else {
            key
        };
        let key = unique_key(key, &seen_keys);
        seen_keys.insert(key.clone());

        let authors_raw = fields
            .get("author")
            .filter(|a| !a.is_empty())
            .or_else(|| fields.get("authors"))
            .cloned()
            .unwrap_or_default();
        let field = |name: &str| fields.get(name).cloned().unwrap_or_default();

        records.push(BibRecord {
            key,
            entry_type,
            title: field("title"),
            authors: split_authors(&authors_raw),
            authors_raw,
            year: field("year"),
            doi: non_empty(fields.get("doi")),
            url: non_empty(fields.get("url")),
            abstract_text: field("abstract"),
            references_raw: non_empty(fields.get("references")),
            raw_text: block.to_string(),
        });
    }

    tracing::debug!(records = records.len(), "parsed bibliography");
    records
}

/// `key`, or `key_2`, `key_3`, ... when already taken
fn unique_key(key: String, seen: &HashSet<String>) -> String {
    if !seen.contains(&key) {
        return key;
    }
    let mut suffix = 2;
    loop {
        let candidate = format!("{key}_{suffix}");
        if !seen.contains(&candidate) {
            tracing::warn!(key = %key, renamed = %candidate, "duplicate record key");
            return candidate;
        }
        suffix += 1;
    }
}

/// Read and parse a bibliography file; invalid UTF-8 is replaced
pub fn parse_file(path: &Path) -> ParseResult<Vec<BibRecord>> {
    let bytes = std::fs::read(path)?;
    Ok(parse(&String::from_utf8_lossy(&bytes)))
}

/// Records from a JSON array
pub fn records_from_json(json: &str) -> ParseResult<Vec<BibRecord>> {
    Ok(serde_json::from_str(json)?)
}

/// Records as a pretty-printed JSON array
pub fn records_to_json(records: &[BibRecord]) -> ParseResult<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"@article{Wang2024,
  title = {Generative {AI} in the Classroom},
  author = {Li Wang and Ana P{\'e}rez},
  year = 2024,
  doi = "10.1000/XYZ",
  references = {Smith2023}
}

@inproceedings{Smith2023,
  title = "Prompting strategies",
  author = {Smith, John},
  year = {2023}
}
"#;

    #[test]
    fn parses_all_value_syntaxes() {
        let records = parse(SAMPLE);
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.key, "Wang2024");
        assert_eq!(first.entry_type, "article");
        assert_eq!(first.title, "Generative AI in the Classroom");
        assert_eq!(first.year, "2024");
        assert_eq!(first.doi.as_deref(), Some("10.1000/XYZ"));
        assert_eq!(first.references_raw.as_deref(), Some("Smith2023"));
        assert!(first.url.is_none());
        assert!(first.raw_text.starts_with("@article{Wang2024"));

        let second = &records[1];
        assert_eq!(second.entry_type, "inproceedings");
        assert_eq!(second.title, "Prompting strategies");
        assert_eq!(second.year, "2023");
    }

    #[test]
    fn authors_split_on_and_or_commas() {
        let records = parse(SAMPLE);
        assert_eq!(records[0].authors, vec!["Li Wang", "Ana P\\'erez"]);
        assert_eq!(records[1].authors, vec!["Smith", "John"]);
        assert_eq!(split_authors("A. Lovelace AND C. Babbage"), vec!["A. Lovelace", "C. Babbage"]);
        assert!(split_authors("  ").is_empty());
    }

    #[test]
    fn authors_field_fallback() {
        let records = parse("@misc{k1,\n  authors = {Grace Hopper},\n}\n");
        assert_eq!(records[0].authors, vec!["Grace Hopper"]);
    }

    #[test]
    fn missing_header_gets_synthetic_key() {
        let text = "title = {Headerless}\n@book{,\n  title = {No key}\n}\n";
        let records = parse(text);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].key, "entry_1");
        assert_eq!(records[0].entry_type, "unknown");
        assert_eq!(records[1].key, "entry_2");
    }

    #[test]
    fn blocks_without_fields_are_skipped() {
        let text = "some preamble text\n@article{broken}\n@article{ok,\n  title = {Fine}\n}\n";
        let records = parse(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].key, "ok");
    }

    #[test]
    fn duplicate_keys_get_suffixes() {
        let text = "@a{k,\n title={One}\n}\n@a{k,\n title={Two}\n}\n@a{k,\n title={Three}\n}\n";
        let keys: Vec<String> = parse(text).into_iter().map(|r| r.key).collect();
        assert_eq!(keys, vec!["k", "k_2", "k_3"]);
    }

    #[test]
    fn later_duplicate_fields_win() {
        let records = parse("@a{k,\n Title = {First},\n title = {Second}\n}\n");
        assert_eq!(records[0].title, "Second");
    }

    #[test]
    fn bare_value_before_closing_brace() {
        let records = parse("@a{k, year = 2021}");
        assert_eq!(records[0].year, "2021");
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(parse("").is_empty());
        assert!(parse("   \n\n").is_empty());
    }

    #[test]
    fn json_roundtrip() {
        let records = parse(SAMPLE);
        let restored = records_from_json(&records_to_json(&records).unwrap()).unwrap();
        assert_eq!(restored, records);
    }

    #[test]
    fn parse_file_reads_lossy_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("refs.bib");
        let mut bytes = b"@a{k,\n title = {Caf".to_vec();
        bytes.push(0xff);
        bytes.extend_from_slice(b"}\n}\n");
        std::fs::write(&path, bytes).unwrap();

        let records = parse_file(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].title.starts_with("Caf"));
    }
}
