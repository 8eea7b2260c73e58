//! Core graph data structures and exchange formats

mod edge;
pub mod exchange;
mod network;
mod node;

#[cfg(test)]
mod tests;

pub use edge::Edge;
pub use exchange::{GraphDocument, GraphError, GraphResult};
pub use network::{Graph, GraphKind, GraphMetadata};
pub use node::{Node, NodeAttributes, NodeId};
