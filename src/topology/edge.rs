use crate::math::Point2;

use super::node::FeatureNodeId;

slotmap::new_key_type! {
    /// Unique identifier for an edge in a feature graph.
    pub struct FeatureEdgeId;
}

/// A polyline between two feature nodes.
///
/// The path runs from `start` to `end` and includes both endpoint positions.
#[derive(Debug, Clone)]
pub struct FeatureEdge {
    /// Start node of the edge.
    pub start: FeatureNodeId,
    /// End node of the edge.
    pub end: FeatureNodeId,
    /// Ordered positions from `start` to `end`, inclusive.
    pub path: Vec<Point2>,
}

impl FeatureEdge {
    /// Creates a new edge.
    #[must_use]
    pub fn new(start: FeatureNodeId, end: FeatureNodeId, path: Vec<Point2>) -> Self {
        Self { start, end, path }
    }

    /// Returns the endpoint opposite `node`.
    #[must_use]
    pub fn other(&self, node: FeatureNodeId) -> FeatureNodeId {
        if node == self.start {
            self.end
        } else {
            self.start
        }
    }

    /// Arc length of the polyline.
    #[must_use]
    pub fn length(&self) -> f32 {
        self.path.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
    }
}
