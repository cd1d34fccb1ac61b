use log::debug;
use priority_queue::PriorityQueue;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::cmp::Reverse;

use crate::grid::{Cost, Grid, Pos};

pub type Targets = FxHashSet<Pos>;

/// Cells walked from a start (excluded) to a goal (included), with the sum of
/// the step costs of those cells.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Path {
    pub steps: Vec<Pos>,
    pub cost: Cost,
}

impl Path {
    /// Path from a cell to itself.
    pub fn empty() -> Self {
        Path { steps: Vec::new(), cost: Cost::ZERO }
    }

    /// Sentinel returned when there is no way to the goal.
    pub fn unreachable() -> Self {
        Path { steps: Vec::new(), cost: Cost::INFINITE }
    }

    #[inline]
    pub fn is_reachable(&self) -> bool {
        self.cost.is_finite()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn goal(&self) -> Option<Pos> {
        self.steps.last().copied()
    }

    /// Appends `next`, which must start where this path ends.
    pub fn extend(&mut self, next: &Path) {
        self.steps.extend_from_slice(&next.steps);
        self.cost = self.cost + next.cost;
    }
}

type CameFrom = FxHashMap<Pos, Pos>;
type CostSoFar = FxHashMap<Pos, Cost>;

/// Result of one uniform-cost search: predecessors and costs of every cell
/// seen, plus which targets were settled (popped with their final cost).
struct SearchTree {
    start: Pos,
    came_from: CameFrom,
    cost_so_far: CostSoFar,
    reached: Targets,
}

impl SearchTree {
    fn reconstruct_path(&self, goal: &Pos) -> Option<Path> {
        if !self.reached.contains(goal) {
            return None;
        }
        let cost = *self.cost_so_far.get(goal)?;
        let mut steps = Vec::new();
        let mut current = *goal;
        while current != self.start {
            steps.push(current);
            current = *self.came_from.get(&current)?;
        }
        steps.reverse();
        Some(Path { steps, cost })
    }
}

/// Uniform-cost search over the hex grid. Holds no state between searches,
/// so the grid can change between calls.
pub struct Pathfinder<'a> {
    pub grid: &'a Grid,
}

impl<'a> Pathfinder<'a> {
    pub fn new(grid: &'a Grid) -> Self {
        Pathfinder { grid }
    }

    fn uniform_cost_search(
        &self, start: &Pos, targets: &Targets, stop_on_first: bool
        ) -> SearchTree {
        let mut tree = SearchTree {
            start: *start,
            came_from: CameFrom::default(),
            cost_so_far: CostSoFar::default(),
            reached: Targets::default(),
        };
        if !self.grid.contains(start) {
            return tree;
        }
        let mut remaining = targets.clone();

        // Ties on cost are broken by position, so results are reproducible.
        let mut frontier: PriorityQueue<Pos, Reverse<(Cost, Pos)>> = PriorityQueue::new();
        frontier.push(*start, Reverse((Cost::ZERO, *start)));
        tree.came_from.insert(*start, *start);
        tree.cost_so_far.insert(*start, Cost::ZERO);
        let mut expanded = 0usize;

        while let Some((current, Reverse((cost, _)))) = frontier.pop() {
            if remaining.remove(&current) {
                tree.reached.insert(current);
                if stop_on_first || remaining.is_empty() {
                    break;
                }
            }
            expanded += 1;

            for next in self.grid.neighbors(current) {
                let new_cost = cost + self.grid.step_cost(&next);
                let old_cost = tree.cost_so_far.get(&next);
                if old_cost.map_or(true, |&old| new_cost < old) {
                    tree.cost_so_far.insert(next, new_cost);
                    tree.came_from.insert(next, current);
                    // Updates the priority if 'next' is already queued.
                    frontier.push(next, Reverse((new_cost, next)));
                }
            }
        }
        debug!("Search from {start} expanded {expanded} cells, reached {}/{} targets",
               tree.reached.len(), targets.len());
        tree
    }

    /// Cheapest path from `start` to `goal`, or `Path::unreachable()`.
    pub fn shortest_path(&self, start: &Pos, goal: &Pos) -> Path {
        let targets = Targets::from_iter([*goal]);
        self.uniform_cost_search(start, &targets, /*stop_on_first=*/true)
            .reconstruct_path(goal)
            .unwrap_or_else(Path::unreachable)
    }

    pub fn distance(&self, start: &Pos, goal: &Pos) -> Cost {
        self.shortest_path(start, goal).cost
    }

    /// Paths to every reachable target, from a single search. Unreachable
    /// targets are left out.
    pub fn paths_to_all_targets(
        &self, start: &Pos, targets: &Targets
        ) -> FxHashMap<Pos, Path> {
        let tree = self.uniform_cost_search(start, targets, /*stop_on_first=*/false);
        targets.iter()
            .filter_map(|target| tree.reconstruct_path(target).map(|path| (*target, path)))
            .collect()
    }

    /// Whether `path` walks adjacent, open cells from `start` and its cost
    /// matches the cells entered.
    pub fn is_valid_path(&self, start: &Pos, path: &Path) -> bool {
        let mut current = *start;
        let mut cost = Cost::ZERO;
        for step in &path.steps {
            if !self.grid.neighbors(current).contains(step) {
                return false;
            }
            cost = cost + self.grid.step_cost(step);
            current = *step;
        }
        cost == path.cost
    }
}
