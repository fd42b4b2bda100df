use crate::math::Point2;
use crate::topology::{FeatureEdge, FeatureGraph, FeatureNode, FeatureNodeId};

use super::candidates::CandidateSet;
use super::forest::CandidateEdge;

/// Extra weight on a node's own position when smoothing, so two leaves
/// joined only to each other do not collapse onto the same point.
const SELF_WEIGHT: f32 = 1.01;

/// Collapses a pruned forest into a node/edge graph.
///
/// Leaves and branch points become [`FeatureNode`]s; runs of degree-2
/// candidates between them become the polyline of a single
/// [`FeatureEdge`]. Candidates left with no edges are dropped.
pub fn trace(
    set: &CandidateSet,
    edges: &[CandidateEdge],
    grid_spacing: usize,
    graph: &mut FeatureGraph,
) {
    let count = set.len();
    let mut adjacency = vec![Vec::new(); count];
    for e in edges {
        adjacency[e.a].push(e.b);
        adjacency[e.b].push(e.a);
    }
    let positions = smoothed_positions(set, &adjacency, grid_spacing);

    let mut visited = vec![false; count];
    let mut node_of: Vec<Option<FeatureNodeId>> = vec![None; count];
    let mut stack = Vec::new();

    for start in 0..count {
        if adjacency[start].len() != 1 || visited[start] {
            continue;
        }
        visited[start] = true;
        let node = FeatureNode::new(positions[start], start, set.elevation(start));
        node_of[start] = Some(graph.add_node(node));
        stack.push(start);

        while let Some(current) = stack.pop() {
            let Some(from) = node_of[current] else {
                continue;
            };
            for &first in &adjacency[current] {
                if visited[first] {
                    continue;
                }
                visited[first] = true;

                let mut path = vec![positions[current]];
                let (mut prev, mut next) = (current, first);
                while adjacency[next].len() == 2 {
                    path.push(positions[next]);
                    let ahead = adjacency[next]
                        .iter()
                        .copied()
                        .find(|&n| n != prev)
                        .unwrap_or(prev);
                    prev = next;
                    next = ahead;
                    visited[next] = true;
                }
                path.push(positions[next]);

                let node = FeatureNode::new(positions[next], next, set.elevation(next));
                let to = graph.add_node(node);
                node_of[next] = Some(to);
                graph.add_edge(FeatureEdge::new(from, to, path));
                stack.push(next);
            }
        }
    }
}

/// One-hop weighted average of each candidate's position with its
/// neighbours', weighted by elevation magnitude. Positions are in
/// source-pixel units.
fn smoothed_positions(
    set: &CandidateSet,
    adjacency: &[Vec<usize>],
    grid_spacing: usize,
) -> Vec<Point2> {
    #[allow(clippy::cast_precision_loss)]
    let spacing = grid_spacing as f32;
    #[allow(clippy::cast_precision_loss)]
    let position = |id: usize| {
        let cell = set.cells[id];
        Point2::new(cell.x as f32 * spacing, cell.y as f32 * spacing)
    };

    (0..set.len())
        .map(|id| {
            let own = position(id);
            if adjacency[id].is_empty() {
                return own;
            }
            let mut weight = SELF_WEIGHT * set.elevation(id).abs();
            let mut sum = own.coords * weight;
            for &n in &adjacency[id] {
                let w = set.elevation(n).abs();
                weight += w;
                sum += position(n).coords * w;
            }
            if weight > 0.0 {
                Point2::from(sum / weight)
            } else {
                own
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::field::Grid;
    use crate::math::Cell;
    use crate::operations::features::forest::degrees;
    use crate::operations::features::Polarity;

    /// Candidates at the given cells on a grid of uniform elevation.
    fn candidates(cells: &[(i32, i32)], elevation: f32) -> CandidateSet {
        let mut ids = Grid::filled(10, 10, None);
        for (id, &(x, y)) in cells.iter().enumerate() {
            *ids.get_mut(Cell::new(x, y)).unwrap() = Some(id);
        }
        CandidateSet {
            grid: Grid::filled(10, 10, elevation),
            ids,
            cells: cells.iter().map(|&(x, y)| Cell::new(x, y)).collect(),
        }
    }

    fn link(a: usize, b: usize) -> CandidateEdge {
        CandidateEdge { weight: 0.0, a, b }
    }

    fn absorbed(graph: &FeatureGraph) -> usize {
        graph.edges().map(|(_, e)| e.path.len() - 2).sum()
    }

    #[test]
    fn chain_collapses_to_one_edge() {
        let set = candidates(&[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)], 2.0);
        let edges: Vec<_> = (0..4).map(|i| link(i, i + 1)).collect();
        let mut graph = FeatureGraph::new(Polarity::Ridge);
        trace(&set, &edges, 1, &mut graph);

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        let (_, edge) = graph.edges().next().unwrap();
        assert_eq!(edge.path.len(), 5);
        assert_eq!(graph.node(edge.start).unwrap().candidate, 0);
        assert_eq!(graph.node(edge.end).unwrap().candidate, 4);
        assert_relative_eq!(graph.node(edge.end).unwrap().elevation, 2.0);
        // Interior points are symmetric averages, so they stay on the line.
        assert_relative_eq!(edge.path[2].x, 2.0, epsilon = 1e-5);
        assert!(edge.path.iter().all(|p| p.y.abs() < 1e-6));
    }

    #[test]
    fn branch_point_splits_edges() {
        // A T: 0-1-2-3 along x, with 4-5 hanging below cell 1.
        let set = candidates(&[(0, 0), (1, 0), (2, 0), (3, 0), (1, 1), (1, 2)], 1.0);
        let edges = vec![link(0, 1), link(1, 2), link(2, 3), link(1, 4), link(4, 5)];
        let mut graph = FeatureGraph::new(Polarity::Ridge);
        trace(&set, &edges, 10, &mut graph);

        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);
        let branch = graph
            .nodes()
            .find(|(_, n)| n.candidate == 1)
            .map(|(_, n)| n.degree());
        assert_eq!(branch, Some(3));

        let surviving = degrees(&edges, set.len()).iter().filter(|&&d| d > 0).count();
        assert_eq!(graph.node_count() + absorbed(&graph), surviving);
    }

    #[test]
    fn isolated_candidates_are_excluded() {
        let set = candidates(&[(0, 0), (5, 5), (1, 0)], 3.0);
        let mut graph = FeatureGraph::new(Polarity::Ridge);
        trace(&set, &[link(0, 2)], 1, &mut graph);

        assert_eq!(graph.node_count(), 2);
        assert!(graph.nodes().all(|(_, n)| n.candidate != 1));
    }

    #[test]
    fn smoothing_favours_own_position() {
        let set = candidates(&[(0, 0), (1, 0)], 5.0);
        let adjacency = vec![vec![1], vec![0]];
        let p = smoothed_positions(&set, &adjacency, 10);
        // Weights 1.01 * 5 and 5: the pair moves towards each other but stays apart.
        assert!(p[0].x > 0.0 && p[0].x < 5.0);
        assert!(p[1].x > 5.0 && p[1].x < 10.0);
        assert_relative_eq!(p[0].x + p[1].x, 10.0, epsilon = 1e-4);
    }

    #[test]
    fn zero_weights_fall_back_to_cell_position() {
        let set = candidates(&[(2, 3), (3, 3)], 0.0);
        let adjacency = vec![vec![1], vec![0]];
        let p = smoothed_positions(&set, &adjacency, 4);
        assert_eq!(p[0], Point2::new(8.0, 12.0));
    }

    #[test]
    fn every_surviving_candidate_is_used_once() {
        // Two trees: a star around cell 4 and a separate pair.
        let set = candidates(
            &[(0, 0), (2, 0), (0, 2), (2, 2), (1, 1), (7, 7), (8, 7), (9, 7)],
            1.0,
        );
        let edges = vec![link(0, 4), link(1, 4), link(2, 4), link(3, 4), link(5, 6), link(6, 7)];
        let mut graph = FeatureGraph::new(Polarity::Ridge);
        trace(&set, &edges, 1, &mut graph);

        let mut seen: Vec<usize> = graph.nodes().map(|(_, n)| n.candidate).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), graph.node_count());
        assert_eq!(graph.node_count() + absorbed(&graph), 8);
        assert_eq!(graph.edge_count(), 5);
    }
}
