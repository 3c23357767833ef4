//! # Node Graphs
//!
//! A small directed node/port graph used to describe processing networks the
//! host engine has to materialize: the compositor output graph and the world
//! lighting graph. Nodes carry a domain-specific kind, links connect a named
//! output port of one node to a named input port of another.
//!
//! The graph is rebuilt from scratch on every configuration pass; it is not
//! an incremental structure.

use std::collections::BTreeMap;

/// Handle to a node inside a [`NodeGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// A node plus its domain-specific payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Node<K> {
    pub id: NodeId,
    pub kind: K,
    pub label: Option<String>,
}

/// A directed connection from an output port to an input port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub from_node: NodeId,
    pub from_port: String,
    pub to_node: NodeId,
    pub to_port: String,
}

/// Directed node/port graph generic over the node kind.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeGraph<K> {
    nodes: Vec<Node<K>>,
    links: Vec<Link>,
}

impl<K> Default for NodeGraph<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> NodeGraph<K> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            links: Vec::new(),
        }
    }

    /// Add a node and return its handle.
    pub fn add(&mut self, kind: K) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            id,
            kind,
            label: None,
        });
        id
    }

    /// Add a node with a human-readable label.
    pub fn add_labeled(&mut self, kind: K, label: &str) -> NodeId {
        let id = self.add(kind);
        self.nodes[id.0].label = Some(label.to_string());
        id
    }

    /// Connect `from`'s output port to `to`'s input port.
    pub fn link(&mut self, from: NodeId, from_port: &str, to: NodeId, to_port: &str) {
        self.links.push(Link {
            from_node: from,
            from_port: from_port.to_string(),
            to_node: to,
            to_port: to_port.to_string(),
        });
    }

    pub fn node(&self, id: NodeId) -> &Node<K> {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node<K> {
        &mut self.nodes[id.0]
    }

    pub fn nodes(&self) -> &[Node<K>] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// First node matching a predicate on its kind.
    pub fn find(&self, pred: impl Fn(&K) -> bool) -> Option<NodeId> {
        self.nodes.iter().find(|n| pred(&n.kind)).map(|n| n.id)
    }

    /// All links terminating at the given node.
    pub fn links_to(&self, node: NodeId) -> Vec<&Link> {
        self.links.iter().filter(|l| l.to_node == node).collect()
    }

    /// The link feeding a specific input port, if any.
    pub fn link_into(&self, node: NodeId, port: &str) -> Option<&Link> {
        self.links
            .iter()
            .find(|l| l.to_node == node && l.to_port == port)
    }

    /// All links originating at the given node.
    pub fn links_from(&self, node: NodeId) -> Vec<&Link> {
        self.links.iter().filter(|l| l.from_node == node).collect()
    }

    /// Whether the graph contains no directed cycle (Kahn's algorithm).
    pub fn is_acyclic(&self) -> bool {
        let mut in_degree: BTreeMap<NodeId, usize> =
            self.nodes.iter().map(|n| (n.id, 0)).collect();
        for link in &self.links {
            *in_degree.entry(link.to_node).or_insert(0) += 1;
        }

        let mut ready: Vec<NodeId> = in_degree
            .iter()
            .filter(|(_, deg)| **deg == 0)
            .map(|(id, _)| *id)
            .collect();

        let mut visited = 0;
        while let Some(id) = ready.pop() {
            visited += 1;
            for link in &self.links {
                if link.from_node != id {
                    continue;
                }
                let deg = in_degree.get_mut(&link.to_node).unwrap();
                *deg -= 1;
                if *deg == 0 {
                    ready.push(link.to_node);
                }
            }
        }

        visited == self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linking() {
        let mut graph: NodeGraph<&str> = NodeGraph::new();
        let a = graph.add("source");
        let b = graph.add_labeled("sink", "the sink");
        graph.link(a, "Image", b, "Image");

        assert_eq!(graph.nodes().len(), 2);
        assert_eq!(graph.node(b).label.as_deref(), Some("the sink"));
        let link = graph.link_into(b, "Image").unwrap();
        assert_eq!(link.from_node, a);
        assert_eq!(link.from_port, "Image");
        assert!(graph.link_into(a, "Image").is_none());
    }

    #[test]
    fn test_acyclic_detection() {
        let mut graph: NodeGraph<u32> = NodeGraph::new();
        let a = graph.add(0);
        let b = graph.add(1);
        let c = graph.add(2);
        graph.link(a, "out", b, "in");
        graph.link(b, "out", c, "in");
        assert!(graph.is_acyclic());

        graph.link(c, "out", a, "in");
        assert!(!graph.is_acyclic());
    }
}
