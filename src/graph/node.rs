//! Node representation in citation and term graphs

use serde::{Deserialize, Serialize};

/// Unique identifier for a node
///
/// Serializes as a plain string (a bibliography key like "Wang2024" or a
/// vocabulary term like "machine learning").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create a NodeId from a string
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::borrow::Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Optional bibliographic attributes carried by a node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl NodeAttributes {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// A node in a graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier
    pub id: NodeId,
    /// Bibliographic attributes (empty for term nodes)
    #[serde(flatten)]
    pub attributes: NodeAttributes,
}

impl Node {
    /// Create a node with no attributes
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            attributes: NodeAttributes::default(),
        }
    }

    /// Set the title attribute
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.attributes.title = Some(title.into());
        self
    }

    /// Set the author list
    pub fn with_authors(mut self, authors: Vec<String>) -> Self {
        self.attributes.authors = authors;
        self
    }

    /// Set the year attribute
    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.attributes.year = Some(year.into());
        self
    }
}
