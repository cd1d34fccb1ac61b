pub mod graph;
pub mod grid;
pub mod held_karp;
pub mod maps;
pub mod pathfinding;
pub mod route;
pub mod solvers;
pub mod tiles;
