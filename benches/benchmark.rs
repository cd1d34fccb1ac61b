use criterion::{criterion_group, criterion_main, Criterion};

use hex_treasure::graph::TargetGraph;
use hex_treasure::grid::Grid;
use hex_treasure::maps::random_grid;
use hex_treasure::pathfinding::{Pathfinder, Targets};
use hex_treasure::solvers::{HeldKarpSolver, NearestNeighborSolver, PermutationSolver, Solver};

fn make_grid() -> Grid {
    random_grid(30, 40, 8, /*seed=*/42)
}

fn make_graph(grid: &Grid) -> TargetGraph {
    let targets = Targets::from_iter(grid.treasures());
    TargetGraph::new(grid, grid.start().expect("random maps have a start"), &targets, false)
}

fn bench_pathfinding(c: &mut Criterion) {
    let grid = make_grid();
    let start = grid.start().expect("random maps have a start");
    let targets = Targets::from_iter(grid.treasures());
    let mut group = c.benchmark_group("pathfinding");
    group.bench_function("one search per target", |b| b.iter(|| {
        let pathfinder = Pathfinder::new(&grid);
        targets.iter().map(|t| pathfinder.shortest_path(&start, t)).count()
    }));
    group.bench_function("one search for all targets", |b| b.iter(|| {
        Pathfinder::new(&grid).paths_to_all_targets(&start, &targets)
    }));
    group.bench_function("target graph", |b| b.iter(|| make_graph(&grid)));
    group.finish();
}

fn bench_solvers(c: &mut Criterion) {
    let grid = make_grid();
    let graph = make_graph(&grid);
    let mut group = c.benchmark_group("solvers");
    group.bench_function("permutations", |b| b.iter(|| {
        PermutationSolver::default().do_solve(&graph)
    }));
    group.bench_function("held_karp", |b| b.iter(|| {
        HeldKarpSolver::default().do_solve(&graph)
    }));
    group.bench_function("nearest_neighbor", |b| b.iter(|| {
        NearestNeighborSolver::default().do_solve(&graph)
    }));
    group.finish();
}

criterion_group!{
    name = benches;
    // Limit sample size given the slow processing. Results will be noisy.
    config = Criterion::default().sample_size(20);
    targets = bench_pathfinding, bench_solvers,
}
criterion_main!(benches);
