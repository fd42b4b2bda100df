use petgraph::unionfind::UnionFind;

use crate::math::{step, FORWARD_DIRECTIONS};

use super::candidates::CandidateSet;

/// An edge between two adjacent candidates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateEdge {
    /// Negated sum of the endpoint elevations; lower is stronger.
    pub weight: f32,
    pub a: usize,
    pub b: usize,
}

/// Connects every pair of candidates adjacent along a forward direction.
///
/// Edges are listed in discovery order: candidates row-major, then
/// directions in [`FORWARD_DIRECTIONS`] order.
#[must_use]
pub fn candidate_edges(set: &CandidateSet) -> Vec<CandidateEdge> {
    let mut edges = Vec::new();
    for (a, &cell) in set.cells.iter().enumerate() {
        for &direction in &FORWARD_DIRECTIONS {
            let Some(b) = step(cell, direction, 1).and_then(|c| set.id_at(c)) else {
                continue;
            };
            edges.push(CandidateEdge {
                weight: -(set.elevation(a) + set.elevation(b)),
                a,
                b,
            });
        }
    }
    edges
}

/// Kruskal's minimum spanning forest over `count` candidates.
///
/// Edges are taken in ascending weight (ties keep discovery order); an edge
/// is kept only if it joins two different components.
#[must_use]
pub fn spanning_forest(mut edges: Vec<CandidateEdge>, count: usize) -> Vec<CandidateEdge> {
    edges.sort_by(|x, y| x.weight.total_cmp(&y.weight));
    let mut components = UnionFind::<usize>::new(count);
    edges
        .into_iter()
        .filter(|e| components.union(e.a, e.b))
        .collect()
}

/// Erodes dangling spurs: each round drops every edge with an endpoint of
/// degree one or less.
#[must_use]
pub fn prune(mut edges: Vec<CandidateEdge>, count: usize, rounds: usize) -> Vec<CandidateEdge> {
    for _ in 0..rounds {
        let degree = degrees(&edges, count);
        edges.retain(|e| degree[e.a] > 1 && degree[e.b] > 1);
    }
    edges
}

/// Number of edges incident to each candidate.
#[must_use]
pub fn degrees(edges: &[CandidateEdge], count: usize) -> Vec<usize> {
    let mut degree = vec![0_usize; count];
    for e in edges {
        degree[e.a] += 1;
        degree[e.b] += 1;
    }
    degree
}
