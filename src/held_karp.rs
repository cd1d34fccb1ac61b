// Exact ordering search with the Held-Karp algorithm.
// See https://en.wikipedia.org/wiki/Held%E2%80%93Karp_algorithm
//
// We compute g(S, e), "the cheapest way to leave the start, visit every target
// in S, and stop on e (which is in S)", for growing subsets S. For |S|=1 that's
// the direct cost start->e. For bigger sets, we try every possible second-to-
// last target m and keep the best g(S \ {e}, m) + cost(m, e).
//
// The best route is then the g(all, e) (+ cost(e, start) when looping back)
// with the smallest total. This is O(2^n * n^2) instead of O(n!) for trying
// all orderings.

use crate::graph::{TargetGraph, VertexId, START};
use crate::grid::Cost;

/// Memory grows as 2^n * n, so we stop there.
pub const MAX_HELD_KARP_TARGETS: usize = 16;

#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
struct Mask(u32);

impl Mask {
    fn single(v: VertexId) -> Mask {
        Mask(1 << (v as u32 - 1))
    }

    fn contains(&self, v: VertexId) -> bool {
        self.0 & Mask::single(v).0 != 0
    }

    fn without(&self, v: VertexId) -> Mask {
        Mask(self.0 & !Mask::single(v).0)
    }

    fn len(&self) -> u32 {
        self.0.count_ones()
    }
}

/// Visiting order (target vertex ids) and its total cost.
#[derive(Debug, Clone, PartialEq)]
pub struct Tour {
    pub cost: Cost,
    pub order: Vec<VertexId>,
}

pub struct HeldKarp {
    num_targets: usize,
    /// g(S, e) flattened as g[mask * n + (e - 1)].
    g: Vec<Cost>,
    /// p(S, e): the target visited right before 'e'. Used when backtracking.
    p: Vec<VertexId>,
}

impl HeldKarp {
    pub fn new(graph: &TargetGraph) -> Self {
        let n = graph.num_targets();
        assert!(n <= MAX_HELD_KARP_TARGETS, "Too many targets for Held-Karp: {n}");
        let size = (1usize << n) * n;
        HeldKarp {
            num_targets: n,
            g: vec![Cost::INFINITE; size],
            p: vec![START; size],
        }
    }

    #[inline]
    fn index(&self, mask: Mask, e: VertexId) -> usize {
        mask.0 as usize * self.num_targets + (e as usize - 1)
    }

    /// Cheapest tour over all targets, None if no order reaches them all.
    pub fn solve(&mut self, graph: &TargetGraph) -> Option<Tour> {
        let n = self.num_targets;
        if n == 0 {
            return Some(Tour { cost: Cost::ZERO, order: Vec::new() });
        }

        // For |S|=1 (S={k}), smallest cost is the cost of start->k.
        for k in graph.targets() {
            let idx = self.index(Mask::single(k), k);
            self.g[idx] = graph.cost(START, k);
            self.p[idx] = START;
        }

        // Subsets of a mask are numerically smaller, so increasing order
        // always has g(S \ {k}, m) ready before g(S, k).
        for bits in 1u32..(1 << n) {
            let mask = Mask(bits);
            if mask.len() < 2 {
                continue;
            }
            for k in graph.targets().filter(|&k| mask.contains(k)) {
                let mask_minus_k = mask.without(k);
                let mut best = (Cost::INFINITE, START);
                for m in graph.targets().filter(|&m| mask_minus_k.contains(m)) {
                    let cost = self.g[self.index(mask_minus_k, m)] + graph.cost(m, k);
                    if cost < best.0 {
                        best = (cost, m);
                    }
                }
                let idx = self.index(mask, k);
                self.g[idx] = best.0;
                self.p[idx] = best.1;
            }
        }

        // Find the best last target, adding the way back home if needed.
        let all = Mask((1 << n) - 1);
        let mut best = (Cost::INFINITE, START);
        for k in graph.targets() {
            let mut cost = self.g[self.index(all, k)];
            if graph.return_to_start {
                cost = cost + graph.cost(k, START);
            }
            if cost < best.0 {
                best = (cost, k);
            }
        }
        let (cost, last) = best;
        if !cost.is_finite() {
            return None;
        }
        Some(Tour { cost, order: self.backtrack(all, last) })
    }

    fn backtrack(&self, all: Mask, last: VertexId) -> Vec<VertexId> {
        let mut order = Vec::with_capacity(self.num_targets);
        let mut mask = all;
        let mut vertex = last;
        while vertex != START {
            order.push(vertex);
            let previous = self.p[self.index(mask, vertex)];
            mask = mask.without(vertex);
            vertex = previous;
        }
        order.reverse();
        order
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use crate::maps::{default_grid, parse_text, random_grid};
    use crate::pathfinding::Targets;
    use super::*;

    fn graph_for(grid: &crate::grid::Grid, return_to_start: bool) -> TargetGraph {
        let targets = Targets::from_iter(grid.treasures());
        TargetGraph::new(grid, grid.start().unwrap(), &targets, return_to_start)
    }

    fn best_by_enumeration(graph: &TargetGraph) -> Cost {
        graph.targets().permutations(graph.num_targets())
            .map(|order| graph.tour_cost(&order))
            .min()
            .unwrap_or(Cost::ZERO)
    }

    #[test]
    fn test_no_targets() {
        let grid = parse_text("S . .").unwrap();
        let graph = graph_for(&grid, false);
        let tour = HeldKarp::new(&graph).solve(&graph).unwrap();
        assert_eq!(tour, Tour { cost: Cost::ZERO, order: vec![] });
    }

    #[test]
    fn test_reward_makes_later_order_cheaper() {
        let grid = parse_text("T . S R1 T").unwrap();
        let graph = graph_for(&grid, false);
        let tour = HeldKarp::new(&graph).solve(&graph).unwrap();
        assert_eq!(tour.order, vec![2, 1]);
        assert_eq!(tour.cost.as_f64(), 5.0);
    }

    #[test]
    fn test_unreachable_target() {
        let grid = parse_text("S . # T\nT . # .").unwrap();
        let graph = graph_for(&grid, false);
        assert_eq!(HeldKarp::new(&graph).solve(&graph), None);
    }

    #[test]
    fn test_tour_cost_is_consistent() {
        for return_to_start in [false, true] {
            let grid = default_grid();
            let graph = graph_for(&grid, return_to_start);
            let tour = HeldKarp::new(&graph).solve(&graph).unwrap();
            assert_eq!(tour.order.len(), graph.num_targets());
            assert_eq!(graph.tour_cost(&tour.order), tour.cost);
        }
    }

    #[test]
    fn test_match_enumeration() {
        for seed in 0..10 {
            for return_to_start in [false, true] {
                let grid = random_grid(7, 8, 5, seed);
                let graph = graph_for(&grid, return_to_start);
                let expected = best_by_enumeration(&graph);
                let tour = HeldKarp::new(&graph).solve(&graph);
                match tour {
                    Some(tour) => assert_eq!(tour.cost, expected, "seed {seed}"),
                    None => assert!(!expected.is_finite(), "seed {seed}"),
                }
            }
        }
    }
}
