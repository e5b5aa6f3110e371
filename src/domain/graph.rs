use crate::domain::model::MethodId;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Method-level call graph.
///
/// Nodes are method identifiers, never references into the model, so self-calls and
/// mutual recursion are plain edges.
#[derive(Debug, Clone, Default)]
pub struct CallGraph {
    /// The directed graph of methods and resolved calls
    pub graph: DiGraph<MethodId, ()>,

    /// Mapping from method to node index
    pub method_to_node: HashMap<MethodId, NodeIndex>,
}

impl CallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_method(&mut self, method: MethodId) -> NodeIndex {
        if let Some(&idx) = self.method_to_node.get(&method) {
            return idx;
        }
        let idx = self.graph.add_node(method);
        self.method_to_node.insert(method, idx);
        idx
    }

    pub fn add_call(&mut self, caller: MethodId, callee: MethodId) {
        let from = self.add_method(caller);
        let to = self.add_method(callee);
        self.graph.add_edge(from, to, ());
    }

    pub fn node_by_method(&self, method: MethodId) -> Option<NodeIndex> {
        self.method_to_node.get(&method).copied()
    }

    /// Direct callees in the order the calls were resolved.
    pub fn callees(&self, method: MethodId) -> Vec<MethodId> {
        let Some(idx) = self.node_by_method(method) else {
            return Vec::new();
        };
        // petgraph yields outgoing neighbors most-recent-first
        let mut out: Vec<MethodId> = self
            .graph
            .neighbors_directed(idx, petgraph::Direction::Outgoing)
            .map(|n| self.graph[n])
            .collect();
        out.reverse();
        out
    }

    pub fn method_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
