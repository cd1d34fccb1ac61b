use log::{debug, info};
use std::time::Instant;

use crate::grid::{Cost, Grid, Pos};
use crate::pathfinding::{Path, Pathfinder, Targets};

pub type VertexId = u16;

/// Largest target count a graph can index, leaving room for the start.
pub const MAX_GRAPH_TARGETS: usize = VertexId::MAX as usize - 1;

/// The start is always vertex 0; targets follow in ascending cell order.
pub const START: VertexId = 0;

/// Complete graph over the start and the targets, where each edge is the
/// cheapest grid path between its two cells.
#[derive(Clone, Debug)]
pub struct TargetGraph {
    pub vertices: Vec<Pos>,
    // costs[from][to], Cost::INFINITE when 'to' can't be reached from 'from'.
    costs: Vec<Vec<Cost>>,
    // paths[from][to]
    paths: Vec<Vec<Path>>,
    /// Whether routes must end back on the start.
    pub return_to_start: bool,
}

impl TargetGraph {
    /// Runs one search per vertex. A target equal to the start counts as
    /// already visited and is left out. Callers keep the target count within
    /// MAX_GRAPH_TARGETS.
    pub fn new(grid: &Grid, start: Pos, targets: &Targets, return_to_start: bool) -> Self {
        let graph_start = Instant::now();
        let mut sorted: Vec<Pos> = targets.iter().copied().filter(|&t| t != start).collect();
        sorted.sort();
        assert!(sorted.len() <= MAX_GRAPH_TARGETS,
                "More targets than we support: {}", sorted.len());

        let mut vertices = Vec::with_capacity(sorted.len() + 1);
        vertices.push(start);
        vertices.extend(sorted);

        let n = vertices.len();
        let mut costs = vec![vec![Cost::INFINITE; n]; n];
        let mut paths = vec![vec![Path::unreachable(); n]; n];
        let pathfinder = Pathfinder::new(grid);
        for (from, source) in vertices.iter().enumerate() {
            costs[from][from] = Cost::ZERO;
            paths[from][from] = Path::empty();
            let others = Targets::from_iter(
                vertices.iter().copied().filter(|pos| pos != source));
            let found = pathfinder.paths_to_all_targets(source, &others);
            debug!("From {source}: {}/{} vertices reachable", found.len(), others.len());
            for (to, target) in vertices.iter().enumerate() {
                if let Some(path) = found.get(target) {
                    debug_assert!(pathfinder.is_valid_path(source, path));
                    costs[from][to] = path.cost;
                    paths[from][to] = path.clone();
                }
            }
        }

        info!("Graph created: {} vertices in {:?}", n, graph_start.elapsed());
        TargetGraph { vertices, costs, paths, return_to_start }
    }

    /// Number of targets (vertices other than the start).
    pub fn num_targets(&self) -> usize {
        self.vertices.len() - 1
    }

    #[inline]
    pub fn cost(&self, from: VertexId, to: VertexId) -> Cost {
        self.costs[from as usize][to as usize]
    }

    pub fn path(&self, from: VertexId, to: VertexId) -> &Path {
        &self.paths[from as usize][to as usize]
    }

    #[inline]
    pub fn targets(&self) -> impl Iterator<Item=VertexId> {
        (1..self.vertices.len()).map(|v| v as VertexId)
    }

    pub fn position(&self, vertex: VertexId) -> Pos {
        self.vertices[vertex as usize]
    }

    /// Total cost of visiting targets in `order`, starting from the start and
    /// coming back to it if required. INFINITE if any leg is unreachable.
    pub fn tour_cost(&self, order: &[VertexId]) -> Cost {
        let mut cost = Cost::ZERO;
        let mut current = START;
        for &next in order {
            cost = cost + self.cost(current, next);
            if !cost.is_finite() {
                return cost;
            }
            current = next;
        }
        if self.return_to_start {
            cost = cost + self.cost(current, START);
        }
        cost
    }
}
