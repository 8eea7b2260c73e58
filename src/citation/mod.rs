//! Directed citation graph inference from bibliographic records

mod builder;

pub use builder::{BuildSummary, CitationConfig, CitationGraph, CitationGraphBuilder};
