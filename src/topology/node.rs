use crate::math::Point2;

use super::edge::FeatureEdgeId;

slotmap::new_key_type! {
    /// Unique identifier for a node in a feature graph.
    pub struct FeatureNodeId;
}

/// A branch point or end point of a ridge/valley skeleton.
#[derive(Debug, Clone)]
pub struct FeatureNode {
    /// Smoothed position in source-pixel units.
    pub position: Point2,
    /// Id of the candidate cell this node was traced from.
    pub candidate: usize,
    /// Elevation of that cell, negated for valleys.
    pub elevation: f32,
    /// Edges incident to this node.
    pub edges: Vec<FeatureEdgeId>,
}

impl FeatureNode {
    /// Creates a node with no incident edges.
    #[must_use]
    pub fn new(position: Point2, candidate: usize, elevation: f32) -> Self {
        Self {
            position,
            candidate,
            elevation,
            edges: Vec::new(),
        }
    }

    /// Number of incident edges.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.edges.len()
    }
}
