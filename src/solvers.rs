// Different solver implementations to pick the order in which targets are
// visited. They all work on a TargetGraph, so every candidate order is priced
// with the cheapest grid path of each leg.

use itertools::Itertools;
use log::{debug, info, warn};
use std::time::Instant;

use crate::graph::{TargetGraph, VertexId, START};
use crate::grid::Cost;
use crate::held_karp::{HeldKarp, MAX_HELD_KARP_TARGETS};
use crate::route::Route;

/// Above this, n! orderings take too long to enumerate.
pub const MAX_PERMUTATION_TARGETS: usize = 10;

pub trait Solver {
    // Name to display for this solver.
    fn name(&self) -> &str;

    // Implementation of the solver.
    fn do_solve(&mut self, graph: &TargetGraph) -> Option<Route>;

    // Wrapper to do_solve, to log timing and cost information.
    fn solve(&mut self, graph: &TargetGraph) -> Option<Route> {
        let start = Instant::now();
        let route = self.do_solve(graph);
        info!("Solver {} took {:?}", self.name(), start.elapsed());
        match &route {
            Some(route) => info!(
                "Solver {} found a route of cost {}, visiting {} targets",
                self.name(), route.cost, route.order.len()),
            None => warn!("Solver {} did NOT find a route.", self.name()),
        };
        route
    }
}

// Tries every visiting order and keeps the first cheapest one. Orders with an
// unreachable leg are skipped.
#[derive(Default)]
pub struct PermutationSolver {
    // Number of orders that reached every target, during the last solve.
    pub valid_orders: usize,
}

// Dynamic programming over subsets of targets. Same optimal cost as
// PermutationSolver, although ties between equally cheap orders may be broken
// differently.
#[derive(Default)]
pub struct HeldKarpSolver {}

// Greedy: always head to the cheapest unvisited target. Fast, but not exact.
#[derive(Default)]
pub struct NearestNeighborSolver {}

// Picks by target count: every order while that's cheap, Held-Karp up to its
// cap, then nearest neighbor so large target sets still get a route.
#[derive(Default)]
pub struct AutoSolver {
    permutations: PermutationSolver,
    held_karp: HeldKarpSolver,
    nearest_neighbor: NearestNeighborSolver,
}

impl AutoSolver {
    fn pick(&mut self, num_targets: usize) -> &mut dyn Solver {
        if num_targets <= MAX_PERMUTATION_TARGETS {
            &mut self.permutations
        } else if num_targets <= MAX_HELD_KARP_TARGETS {
            &mut self.held_karp
        } else {
            &mut self.nearest_neighbor
        }
    }
}

impl Solver for PermutationSolver {
    fn name(&self) -> &str {
        "permutations"
    }

    fn do_solve(&mut self, graph: &TargetGraph) -> Option<Route> {
        let n = graph.num_targets();
        if n == 0 {
            return Some(Route::empty(graph.position(START)));
        }
        if n > MAX_PERMUTATION_TARGETS {
            warn!("{n} targets is too many to try every order (max {MAX_PERMUTATION_TARGETS})");
            return None;
        }

        self.valid_orders = 0;
        let mut best: Option<(Cost, Vec<VertexId>)> = None;
        for order in graph.targets().permutations(n) {
            let cost = graph.tour_cost(&order);
            if !cost.is_finite() {
                continue;
            }
            self.valid_orders += 1;
            if best.as_ref().map_or(true, |(best_cost, _)| cost < *best_cost) {
                best = Some((cost, order));
            }
        }
        best.map(|(_, order)| Route::from_order(graph, &order))
    }
}

impl Solver for HeldKarpSolver {
    fn name(&self) -> &str {
        "held-karp"
    }

    fn do_solve(&mut self, graph: &TargetGraph) -> Option<Route> {
        let n = graph.num_targets();
        if n > MAX_HELD_KARP_TARGETS {
            warn!("{n} targets is too many for Held-Karp (max {MAX_HELD_KARP_TARGETS})");
            return None;
        }
        let tour = HeldKarp::new(graph).solve(graph)?;
        Some(Route::from_order(graph, &tour.order))
    }
}

impl Solver for NearestNeighborSolver {
    fn name(&self) -> &str {
        "nearest-neighbor"
    }

    fn do_solve(&mut self, graph: &TargetGraph) -> Option<Route> {
        let mut unvisited: Vec<VertexId> = graph.targets().collect();
        let mut order = Vec::with_capacity(unvisited.len());
        let mut current = START;
        while !unvisited.is_empty() {
            // min_by_key keeps the first of equally close targets.
            let (idx, &closest) = unvisited.iter().enumerate()
                .min_by_key(|&(_, &target)| graph.cost(current, target))?;
            if !graph.cost(current, closest).is_finite() {
                return None;  // Stranded: nothing left is reachable.
            }
            order.push(closest);
            unvisited.remove(idx);
            current = closest;
        }
        let route = Route::from_order(graph, &order);
        if route.cost.is_finite() {
            Some(route)
        } else {
            None
        }
    }
}

impl Solver for AutoSolver {
    fn name(&self) -> &str {
        "auto"
    }

    fn do_solve(&mut self, graph: &TargetGraph) -> Option<Route> {
        let n = graph.num_targets();
        let solver = self.pick(n);
        if n > MAX_HELD_KARP_TARGETS {
            warn!("{n} targets is too many for an exact order, using {}", solver.name());
        }
        debug!("Picked {} for {n} targets", solver.name());
        solver.do_solve(graph)
    }
}
