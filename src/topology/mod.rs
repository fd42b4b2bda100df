pub mod edge;
pub mod node;

pub use edge::{FeatureEdge, FeatureEdgeId};
pub use node::{FeatureNode, FeatureNodeId};

use crate::error::TopologyError;
use crate::operations::features::Polarity;
use slotmap::SlotMap;

/// Arena owning the nodes and edges of one feature extraction.
///
/// Edges refer to nodes by id. The graph is a forest: it is traced from a
/// spanning forest, so at most one path joins any two nodes.
#[derive(Debug, Default)]
pub struct FeatureGraph {
    nodes: SlotMap<FeatureNodeId, FeatureNode>,
    edges: SlotMap<FeatureEdgeId, FeatureEdge>,
    polarity: Polarity,
}

impl FeatureGraph {
    /// Creates an empty graph for features of the given polarity.
    #[must_use]
    pub fn new(polarity: Polarity) -> Self {
        Self {
            polarity,
            ..Self::default()
        }
    }

    /// Whether the graph traces ridges or valleys.
    #[must_use]
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Inserts a node and returns its ID.
    pub(crate) fn add_node(&mut self, node: FeatureNode) -> FeatureNodeId {
        self.nodes.insert(node)
    }

    /// Inserts an edge, registering it with both endpoints.
    pub(crate) fn add_edge(&mut self, edge: FeatureEdge) -> FeatureEdgeId {
        let (start, end) = (edge.start, edge.end);
        let id = self.edges.insert(edge);
        for node in [start, end] {
            if let Some(n) = self.nodes.get_mut(node) {
                n.edges.push(id);
            }
        }
        id
    }

    /// Returns the node data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the graph.
    pub fn node(&self, id: FeatureNodeId) -> Result<&FeatureNode, TopologyError> {
        self.nodes
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("feature node".into()))
    }

    /// Returns the edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the graph.
    pub fn edge(&self, id: FeatureEdgeId) -> Result<&FeatureEdge, TopologyError> {
        self.edges
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("feature edge".into()))
    }

    /// Iterates over all nodes.
    pub fn nodes(&self) -> impl Iterator<Item = (FeatureNodeId, &FeatureNode)> {
        self.nodes.iter()
    }

    /// Iterates over all edges.
    pub fn edges(&self) -> impl Iterator<Item = (FeatureEdgeId, &FeatureEdge)> {
        self.edges.iter()
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns true if no features were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
