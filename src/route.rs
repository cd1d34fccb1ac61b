use log::warn;
use serde::Serialize;

use crate::graph::{TargetGraph, VertexId, MAX_GRAPH_TARGETS, START};
use crate::grid::{Cost, Grid, Pos};
use crate::pathfinding::{Path, Pathfinder, Targets};
use crate::solvers::{AutoSolver, Solver};

/// A planned visit of every target: the order, one path per leg, and the
/// total cost of all legs.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Route {
    pub start: Pos,
    pub order: Vec<Pos>,
    pub legs: Vec<Path>,
    pub cost: Cost,
}

impl Route {
    /// Nothing to visit.
    pub fn empty(start: Pos) -> Self {
        Route { start, order: Vec::new(), legs: Vec::new(), cost: Cost::ZERO }
    }

    /// Chains the graph's paths along `order`, and back to the start if the
    /// graph requires it.
    pub fn from_order(graph: &TargetGraph, order: &[VertexId]) -> Self {
        let mut legs = Vec::with_capacity(order.len() + 1);
        let mut current = START;
        for &next in order {
            legs.push(graph.path(current, next).clone());
            current = next;
        }
        if graph.return_to_start && !order.is_empty() {
            legs.push(graph.path(current, START).clone());
        }
        Route {
            start: graph.position(START),
            order: order.iter().map(|&v| graph.position(v)).collect(),
            cost: legs.iter().map(|leg| leg.cost).sum(),
            legs,
        }
    }

    /// All legs joined into one path from the start.
    pub fn to_path(&self) -> Path {
        let mut path = Path::empty();
        for leg in &self.legs {
            path.extend(leg);
        }
        path
    }
}

/// Cheapest path from `start` to `goal` on the current grid, or
/// `Path::unreachable()` (no steps, infinite cost).
pub fn shortest_path(grid: &Grid, start: Pos, goal: Pos) -> Path {
    Pathfinder::new(grid).shortest_path(&start, &goal)
}

/// Plans a route with `solver`. None when no order reaches every target, or
/// when there are more targets than a graph can hold.
pub fn plan(
    solver: &mut dyn Solver, grid: &Grid, start: Pos, targets: &Targets,
    return_to_start: bool
    ) -> Option<Route> {
    let num_targets = targets.iter().filter(|&&target| target != start).count();
    if num_targets == 0 {
        return Some(Route::empty(start));
    }
    if num_targets > MAX_GRAPH_TARGETS {
        warn!("{num_targets} targets is more than we can plan for (max {MAX_GRAPH_TARGETS})");
        return None;
    }
    let graph = TargetGraph::new(grid, start, targets, return_to_start);
    solver.solve(&graph)
}

/// Like `plan_route`, with a chosen solver.
pub fn plan_route_with(
    solver: &mut dyn Solver, grid: &Grid, start: Pos, targets: &Targets,
    return_to_start: bool
    ) -> Path {
    match plan(solver, grid, start, targets, return_to_start) {
        Some(route) => route.to_path(),
        None => Path::unreachable(),
    }
}

/// Cheapest path from `start` through every target, trying every visiting
/// order. Empty when there is nothing to visit; `Path::unreachable()` when no
/// order reaches every target.
///
/// Past 10 targets the order comes from Held-Karp (same cost), and past 16
/// from nearest neighbor, which still visits everything but may cost more.
pub fn plan_route(grid: &Grid, start: Pos, targets: &Targets, return_to_start: bool) -> Path {
    plan_route_with(&mut AutoSolver::default(), grid, start, targets, return_to_start)
}

#[cfg(test)]
mod tests {
    use crate::maps::{default_grid, parse_text, random_grid};
    use crate::solvers::{HeldKarpSolver, NearestNeighborSolver, PermutationSolver};
    use super::*;

    fn targets(cells: &[(u16, u16)]) -> Targets {
        cells.iter().map(|&(row, col)| Pos::new(row, col)).collect()
    }

    #[test]
    fn test_no_targets() {
        let grid = default_grid();
        let start = grid.start().unwrap();
        assert_eq!(plan_route(&grid, start, &Targets::default(), false), Path::empty());
        assert_eq!(plan_route(&grid, start, &Targets::default(), true), Path::empty());
    }

    #[test]
    fn test_single_target_is_shortest_path() {
        let grid = default_grid();
        let start = grid.start().unwrap();
        for treasure in grid.treasures() {
            let route = plan_route(&grid, start, &Targets::from_iter([treasure]), false);
            assert_eq!(route, shortest_path(&grid, start, treasure));
        }
    }

    #[test]
    fn test_reward_picks_cheaper_order() {
        // Going right first crosses the reward twice: 1.5 + 3.5 = 5.0, against
        // 2 + 3.5 = 5.5 when going left first.
        let grid = parse_text("T . S R1 T").unwrap();
        let path = plan_route(&grid, Pos::new(0, 2), &targets(&[(0, 0), (0, 4)]), false);
        assert_eq!(path.steps, vec![
            Pos::new(0, 3), Pos::new(0, 4), Pos::new(0, 3), Pos::new(0, 2),
            Pos::new(0, 1), Pos::new(0, 0),
        ]);
        assert_eq!(path.cost.as_f64(), 5.0);
    }

    #[test]
    fn test_open_grid_costs_one_per_step() {
        let grid = Grid::open(3, 3);
        let start = Pos::new(0, 0);
        let path = plan_route(&grid, start, &targets(&[(0, 2), (2, 2)]), false);
        assert_eq!(path.cost.as_f64(), 4.0);
        assert_eq!(path.steps.len(), 4);
        assert_eq!(path.goal(), Some(Pos::new(2, 2)));
        assert!(path.steps.contains(&Pos::new(0, 2)));

        let pathfinder = Pathfinder::new(&grid);
        assert!(pathfinder.is_valid_path(&start, &path));
        let mut cumulative = Cost::ZERO;
        for step in &path.steps {
            let next = cumulative + grid.step_cost(step);
            assert!(next >= cumulative);
            cumulative = next;
        }
        assert_eq!(cumulative, path.cost);
    }

    #[test]
    fn test_return_to_start() {
        let grid = parse_text("S . T").unwrap();
        let start = Pos::new(0, 0);
        let path = plan_route(&grid, start, &targets(&[(0, 2)]), true);
        assert_eq!(path.steps, vec![
            Pos::new(0, 1), Pos::new(0, 2), Pos::new(0, 1), Pos::new(0, 0),
        ]);
        assert_eq!(path.cost.as_f64(), 4.0);
    }

    #[test]
    fn test_unreachable_targets() {
        let grid = parse_text("S . # T\n. . # .").unwrap();
        let start = Pos::new(0, 0);
        let path = plan_route(&grid, start, &targets(&[(0, 1), (0, 3)]), false);
        assert!(path.is_empty());
        assert!(!path.is_reachable());
    }

    #[test]
    fn test_more_targets_than_permutations_allow() {
        let grid = Grid::open(1, 12);
        let start = Pos::new(0, 0);
        let cells: Vec<(u16, u16)> = (1..12).map(|col| (0, col)).collect();
        let path = plan_route(&grid, start, &targets(&cells), false);
        assert_eq!(path.cost.as_f64(), 11.0);
        assert_eq!(path.steps, cells.iter().map(|&(r, c)| Pos::new(r, c)).collect::<Vec<_>>());
    }

    #[test]
    fn test_more_targets_than_held_karp_allows() {
        // Every other cell of a 20x20 map: nearest neighbor still visits them all.
        let grid = Grid::open(20, 20);
        let start = Pos::new(0, 0);
        let treasures: Targets = grid.positions().filter(|&pos| pos != start).collect();
        assert_eq!(treasures.len(), 399);
        let path = plan_route(&grid, start, &treasures, false);
        assert!(path.is_reachable());
        assert!(path.cost.as_f64() >= 399.0);
        assert!(Pathfinder::new(&grid).is_valid_path(&start, &path));
        assert!(treasures.iter().all(|t| path.steps.contains(t)));
    }

    #[test]
    fn test_too_many_targets_is_unreachable() {
        let grid = Grid::open(256, 256);
        let start = Pos::new(0, 0);
        let treasures: Targets = grid.positions().take(MAX_GRAPH_TARGETS + 2).collect();
        assert_eq!(plan(&mut AutoSolver::default(), &grid, start, &treasures, false), None);
        let path = plan_route(&grid, start, &treasures, false);
        assert!(path.is_empty());
        assert!(!path.is_reachable());
    }

    #[test]
    fn test_traps_and_rewards_shift_route_cost() {
        let start = Pos::new(0, 0);
        let cost = |layout: &str| {
            let grid = parse_text(layout).unwrap();
            plan_route(&grid, start, &targets(&[(0, 2), (0, 4)]), false).cost
        };
        let plain = cost("S . T . T");
        assert!(cost("S . T X4 T") > plain);
        assert!(cost("S . T R2 T") < plain);
    }

    #[test]
    fn test_route_visits_every_target() {
        let grid = default_grid();
        let start = grid.start().unwrap();
        let treasures = Targets::from_iter(grid.treasures());
        for return_to_start in [false, true] {
            let route = plan(&mut PermutationSolver::default(), &grid, start,
                             &treasures, return_to_start).unwrap();
            let path = route.to_path();
            assert_eq!(path.cost, route.cost);
            assert!(Pathfinder::new(&grid).is_valid_path(&start, &path));
            assert!(treasures.iter().all(|t| path.steps.contains(t)));
            if return_to_start {
                assert_eq!(path.goal(), Some(start));
            }
        }
    }

    #[test]
    fn test_solvers_agree_on_optimal_cost() {
        for seed in 0..8 {
            let grid = random_grid(8, 10, 6, seed);
            let start = grid.start().unwrap();
            let treasures = Targets::from_iter(grid.treasures());
            let exact = plan_route(&grid, start, &treasures, false);
            let held_karp = plan_route_with(&mut HeldKarpSolver::default(), &grid,
                                            start, &treasures, false);
            let greedy = plan_route_with(&mut NearestNeighborSolver::default(), &grid,
                                         start, &treasures, false);
            assert_eq!(held_karp.cost, exact.cost, "seed {seed}");
            assert!(greedy.cost >= exact.cost, "seed {seed}");
        }
    }
}
