//! Ridge and valley skeleton extraction.
//!
//! The pipeline runs in three stages over a downsampled operational grid:
//! crest candidates are selected ([`candidates`]), joined into a minimum
//! spanning forest and pruned of short spurs ([`forest`]), and the forest is
//! collapsed into a [`FeatureGraph`] of nodes and polyline edges
//! ([`skeleton`]).

pub mod candidates;
pub mod forest;
pub mod skeleton;

use crate::error::{FieldError, Result};
use crate::field::ScalarField;
use crate::topology::FeatureGraph;

/// Which kind of crest to trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Polarity {
    /// Local maxima across the feature.
    #[default]
    Ridge,
    /// Local minima across the feature.
    Valley,
}

/// Parameters controlling feature extraction.
#[derive(Debug, Clone, Copy)]
pub struct FeatureParams {
    /// Downsample factor from the source field to the operational grid.
    pub grid_spacing: usize,
    /// Odd profile length; crests are tested up to half of it on each side.
    pub profile_length: usize,
    /// Ridges or valleys.
    pub polarity: Polarity,
}

impl Default for FeatureParams {
    fn default() -> Self {
        Self {
            grid_spacing: 10,
            profile_length: 7,
            polarity: Polarity::Ridge,
        }
    }
}

impl FeatureParams {
    /// Checks the parameter ranges.
    ///
    /// # Errors
    ///
    /// Returns `FieldError::InvalidParameter` if the grid spacing is zero or
    /// the profile length is even or shorter than 3.
    pub fn validate(&self) -> std::result::Result<(), FieldError> {
        if self.grid_spacing == 0 {
            return Err(FieldError::InvalidParameter {
                parameter: "grid_spacing",
                value: 0,
                reason: "must be at least 1",
            });
        }
        if self.profile_length < 3 || self.profile_length % 2 == 0 {
            return Err(FieldError::InvalidParameter {
                parameter: "profile_length",
                value: i64::try_from(self.profile_length).unwrap_or(i64::MAX),
                reason: "must be odd and at least 3",
            });
        }
        Ok(())
    }
}

/// Extracts the ridge or valley skeleton of an elevation field.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractFeatures {
    params: FeatureParams,
}

impl ExtractFeatures {
    /// Creates a new extraction with the given parameters.
    #[must_use]
    pub fn new(params: FeatureParams) -> Self {
        Self { params }
    }

    /// Executes the extraction.
    ///
    /// # Errors
    ///
    /// Returns `FieldError::InvalidParameter` for out-of-range parameters or a
    /// grid spacing larger than the field, and `FieldError::Empty` if the
    /// field has no defined cells.
    pub fn execute(&self, field: &ScalarField) -> Result<FeatureGraph> {
        let params = self.params;
        params.validate()?;

        let set = candidates::select(field, &params)?;
        tracing::debug!(
            grid_width = set.grid.width(),
            grid_height = set.grid.height(),
            candidates = set.len(),
            "selected feature candidates"
        );

        let edges = forest::candidate_edges(&set);
        let adjacent = edges.len();
        let edges = forest::spanning_forest(edges, set.len());
        let spanning = edges.len();
        let edges = forest::prune(edges, set.len(), params.profile_length / 2);
        tracing::debug!(adjacent, spanning, pruned = edges.len(), "built feature forest");

        let mut graph = FeatureGraph::new(params.polarity);
        skeleton::trace(&set, &edges, params.grid_spacing, &mut graph);
        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "traced feature skeleton"
        );
        Ok(graph)
    }
}

impl FeatureGraph {
    /// Extracts the feature graph of `field`; shorthand for
    /// [`ExtractFeatures::execute`].
    ///
    /// # Errors
    ///
    /// See [`ExtractFeatures::execute`].
    pub fn extract(field: &ScalarField, params: FeatureParams) -> Result<Self> {
        ExtractFeatures::new(params).execute(field)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::TerrainError;
    use crate::field::Grid;
    use crate::math::Point2;

    /// A Y-shaped ridge: a trunk along x = 40 for y >= 40 and two arms
    /// running up-left and up-right from the fork at (40, 40).
    #[allow(clippy::cast_precision_loss)]
    fn forked_ridge() -> ScalarField {
        let distance = |p: Point2, a: Point2, b: Point2| {
            let ab = b - a;
            let t = ((p - a).dot(&ab) / ab.norm_squared()).clamp(0.0, 1.0);
            (p - (a + ab * t)).norm()
        };
        let fork = Point2::new(40.0, 40.0);
        let ends = [
            Point2::new(40.0, 79.0),
            Point2::new(5.0, 5.0),
            Point2::new(75.0, 5.0),
        ];
        Grid::from_fn(80, 80, |c| {
            let p = Point2::new(c.x as f32, c.y as f32);
            let d = ends
                .iter()
                .map(|&e| distance(p, fork, e))
                .fold(f32::INFINITY, f32::min);
            100.0 - 4.0 * d.min(20.0)
        })
    }

    fn params(polarity: Polarity) -> FeatureParams {
        FeatureParams {
            grid_spacing: 2,
            profile_length: 7,
            polarity,
        }
    }

    #[test]
    fn flat_field_yields_an_empty_graph() {
        let field = Grid::filled(40, 40, 12.0_f32);
        let graph = FeatureGraph::extract(&field, FeatureParams::default()).unwrap();
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn forked_ridge_has_a_branch_node() {
        let graph = FeatureGraph::extract(&forked_ridge(), params(Polarity::Ridge)).unwrap();
        assert!(graph.node_count() >= 4);
        assert_eq!(graph.edge_count(), graph.node_count() - count_trees(&graph));
        assert!(graph.nodes().any(|(_, n)| n.degree() >= 3));
        for (_, edge) in graph.edges() {
            assert!(edge.path.len() >= 2);
            let start = graph.node(edge.start).unwrap().position;
            let end = graph.node(edge.end).unwrap().position;
            assert_eq!(edge.path[0], start);
            assert_eq!(*edge.path.last().unwrap(), end);
        }
    }

    #[test]
    fn valley_of_negated_ridge_matches_ridge() {
        let ridge = FeatureGraph::extract(&forked_ridge(), params(Polarity::Ridge)).unwrap();
        let mut negated = forked_ridge();
        negated.scale(-1.0);
        let valley = FeatureGraph::extract(&negated, params(Polarity::Valley)).unwrap();

        assert_eq!(valley.polarity(), Polarity::Valley);
        assert_eq!(valley.node_count(), ridge.node_count());
        assert_eq!(valley.edge_count(), ridge.edge_count());
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let field = Grid::filled(20, 20, 0.0_f32);
        for (grid_spacing, profile_length) in [(0, 7), (2, 4), (2, 1), (50, 7)] {
            let result = FeatureGraph::extract(
                &field,
                FeatureParams {
                    grid_spacing,
                    profile_length,
                    polarity: Polarity::Ridge,
                },
            );
            assert!(matches!(
                result,
                Err(TerrainError::Field(FieldError::InvalidParameter { .. }))
            ));
        }
    }

    /// Number of connected components, via the edge/node incidence.
    fn count_trees(graph: &FeatureGraph) -> usize {
        use std::collections::HashMap;
        let ids: HashMap<_, _> = graph.nodes().enumerate().map(|(i, (id, _))| (id, i)).collect();
        let mut uf = petgraph::unionfind::UnionFind::<usize>::new(ids.len());
        for (_, e) in graph.edges() {
            uf.union(ids[&e.start], ids[&e.end]);
        }
        let mut roots: Vec<_> = (0..ids.len()).map(|i| uf.find(i)).collect();
        roots.sort_unstable();
        roots.dedup();
        roots.len()
    }
}
