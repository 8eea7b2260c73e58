//! Bibliographic records and the bibliography text parser

pub mod parser;
mod record;

pub use parser::{parse, parse_file, records_from_json, records_to_json, ParseError, ParseResult};
pub use record::{normalize_doi, BibRecord};
