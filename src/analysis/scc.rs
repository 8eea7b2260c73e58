//! Strongly connected components (iterative Tarjan)

use crate::graph::{Graph, NodeId};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Disjoint node groups covering a graph, largest first
///
/// Ties in size keep discovery order. Nodes inside a component follow
/// graph order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ComponentSet {
    components: Vec<Vec<NodeId>>,
    #[serde(skip)]
    membership: HashMap<NodeId, usize>,
}

/// Size profile of a component set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentSummary {
    pub total: usize,
    /// Sizes in descending order
    pub sizes: Vec<usize>,
    pub largest: usize,
    pub mean_size: f64,
}

impl ComponentSet {
    /// Sort groups (given in discovery order) by descending size and index them
    pub(crate) fn from_discovered(mut components: Vec<Vec<NodeId>>) -> Self {
        // stable: equal sizes keep discovery order
        components.sort_by(|a, b| b.len().cmp(&a.len()));
        let membership = components
            .iter()
            .enumerate()
            .flat_map(|(idx, members)| members.iter().map(move |id| (id.clone(), idx)))
            .collect();
        Self {
            components,
            membership,
        }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&[NodeId]> {
        self.components.get(index).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = &[NodeId]> {
        self.components.iter().map(Vec::as_slice)
    }

    /// Position of the component holding `node`
    pub fn component_of(&self, node: &NodeId) -> Option<usize> {
        self.membership.get(node).copied()
    }

    pub fn sizes(&self) -> Vec<usize> {
        self.components.iter().map(Vec::len).collect()
    }

    /// Components as sets, for order-insensitive comparison
    pub fn as_sets(&self) -> Vec<BTreeSet<NodeId>> {
        self.components
            .iter()
            .map(|c| c.iter().cloned().collect())
            .collect()
    }

    pub fn summary(&self) -> ComponentSummary {
        let sizes = self.sizes();
        let covered: usize = sizes.iter().sum();
        ComponentSummary {
            total: sizes.len(),
            largest: sizes.first().copied().unwrap_or(0),
            mean_size: if sizes.is_empty() {
                0.0
            } else {
                covered as f64 / sizes.len() as f64
            },
            sizes,
        }
    }

    /// Induced subgraph of component `index`
    pub fn subgraph(&self, graph: &Graph, index: usize) -> Option<Graph> {
        self.components.get(index).map(|members| graph.subgraph(members))
    }
}

/// Strongly connected components of `graph`
///
/// Undirected graphs are read as symmetric directed graphs, so each
/// component is a connected component. Self-loops do not affect the result.
pub fn strongly_connected_components(graph: &Graph) -> ComponentSet {
    let adjacency: Vec<Vec<usize>> = graph
        .adjacency()
        .into_iter()
        .map(|neighbors| neighbors.into_iter().map(|(n, _)| n).collect())
        .collect();
    let n = adjacency.len();

    let mut next_index = 0usize;
    let mut index: Vec<Option<usize>> = vec![None; n];
    let mut lowlink = vec![0usize; n];
    let mut on_stack = vec![false; n];
    let mut stack: Vec<usize> = Vec::new();
    // (root discovery index, members)
    let mut found: Vec<(usize, Vec<usize>)> = Vec::new();

    for root in 0..n {
        if index[root].is_some() {
            continue;
        }
        // (node, position of the next neighbor to visit)
        let mut call_stack: Vec<(usize, usize)> = Vec::new();

        index[root] = Some(next_index);
        lowlink[root] = next_index;
        next_index += 1;
        stack.push(root);
        on_stack[root] = true;
        call_stack.push((root, 0));

        while let Some(frame) = call_stack.last_mut() {
            let v = frame.0;
            if let Some(&w) = adjacency[v].get(frame.1) {
                frame.1 += 1;
                match index[w] {
                    None => {
                        index[w] = Some(next_index);
                        lowlink[w] = next_index;
                        next_index += 1;
                        stack.push(w);
                        on_stack[w] = true;
                        call_stack.push((w, 0));
                    }
                    Some(w_index) if on_stack[w] => {
                        lowlink[v] = lowlink[v].min(w_index);
                    }
                    Some(_) => {}
                }
                continue;
            }

            call_stack.pop();
            if let Some(&(parent, _)) = call_stack.last() {
                lowlink[parent] = lowlink[parent].min(lowlink[v]);
            }
            if Some(lowlink[v]) == index[v] {
                let mut members = Vec::new();
                while let Some(w) = stack.pop() {
                    on_stack[w] = false;
                    members.push(w);
                    if w == v {
                        break;
                    }
                }
                members.sort_unstable();
                found.push((lowlink[v], members));
            }
        }
    }

    found.sort_by_key(|(discovered, _)| *discovered);
    let components = found
        .into_iter()
        .map(|(_, members)| {
            members
                .into_iter()
                .map(|i| graph.node_at(i).id.clone())
                .collect()
        })
        .collect();
    ComponentSet::from_discovered(components)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Node};

    fn ids(items: &[&str]) -> Vec<NodeId> {
        items.iter().map(|s| NodeId::from(*s)).collect()
    }

    #[test]
    fn cycle_plus_isolated_node() {
        let mut g = Graph::directed("scc");
        g.add_edge(Edge::new("a", "b", 1.0));
        g.add_edge(Edge::new("b", "c", 1.0));
        g.add_edge(Edge::new("c", "a", 1.0));
        g.add_node(Node::new("d"));

        let set = strongly_connected_components(&g);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(0).unwrap(), ids(&["a", "b", "c"]).as_slice());
        assert_eq!(set.get(1).unwrap(), ids(&["d"]).as_slice());
        assert_eq!(set.component_of(&"b".into()), Some(0));
        assert_eq!(set.sizes(), vec![3, 1]);
    }

    #[test]
    fn chain_is_all_singletons_in_graph_order() {
        let mut g = Graph::directed("chain");
        g.add_edge(Edge::new("x", "y", 1.0));
        g.add_edge(Edge::new("y", "z", 1.0));

        let set = strongly_connected_components(&g);
        let flat: Vec<NodeId> = set.iter().flat_map(|c| c.to_vec()).collect();
        assert_eq!(flat, ids(&["x", "y", "z"]));
    }

    #[test]
    fn self_loops_and_disjoint_cycles() {
        let mut g = Graph::directed("mixed");
        g.add_edge(Edge::new("s", "s", 1.0));
        g.add_edge(Edge::new("p", "q", 1.0));
        g.add_edge(Edge::new("q", "p", 1.0));
        g.add_edge(Edge::new("u", "v", 1.0));
        g.add_edge(Edge::new("v", "w", 1.0));
        g.add_edge(Edge::new("w", "u", 1.0));

        let set = strongly_connected_components(&g);
        assert_eq!(set.sizes(), vec![3, 2, 1]);
        assert_eq!(set.get(2).unwrap(), ids(&["s"]).as_slice());
        let covered: usize = set.sizes().iter().sum();
        assert_eq!(covered, g.node_count());
    }

    #[test]
    fn deep_chain_does_not_overflow() {
        let mut g = Graph::directed("deep");
        for i in 0..50_000 {
            g.add_edge(Edge::new(format!("n{i}"), format!("n{}", i + 1), 1.0));
        }
        g.add_edge(Edge::new("n50000", "n0", 1.0));

        let set = strongly_connected_components(&g);
        assert_eq!(set.len(), 1);
        assert_eq!(set.summary().largest, 50_001);
    }

    #[test]
    fn undirected_graph_components() {
        let mut g = Graph::undirected("terms");
        g.add_edge(Edge::new("a", "b", 1.0));
        g.add_node(Node::new("c"));
        let set = strongly_connected_components(&g);
        assert_eq!(set.sizes(), vec![2, 1]);
    }

    #[test]
    fn summary_and_subgraph() {
        let mut g = Graph::directed("scc");
        g.add_edge(Edge::new("a", "b", 0.5));
        g.add_edge(Edge::new("b", "a", 0.7));
        g.add_edge(Edge::new("b", "c", 0.9));

        let set = strongly_connected_components(&g);
        let summary = set.summary();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.sizes, vec![2, 1]);
        assert!((summary.mean_size - 1.5).abs() < 1e-12);

        let sub = set.subgraph(&g, 0).unwrap();
        assert_eq!(sub.node_count(), 2);
        assert_eq!(sub.edge_count(), 2);
        assert!(set.subgraph(&g, 5).is_none());
    }

    #[test]
    fn empty_graph() {
        let set = strongly_connected_components(&Graph::directed("empty"));
        assert!(set.is_empty());
        assert_eq!(set.summary().largest, 0);
    }

    #[test]
    fn serializes_as_nested_lists() {
        let mut g = Graph::directed("scc");
        g.add_edge(Edge::new("a", "b", 1.0));
        let json = serde_json::to_value(strongly_connected_components(&g)).unwrap();
        assert_eq!(json, serde_json::json!([["a"], ["b"]]));
    }
}
