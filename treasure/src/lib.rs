pub mod artifacts;
pub mod collector;
pub mod config;
pub mod error;
pub mod find;
pub mod grid;
pub mod knapsack;
pub mod table;
pub mod util;

pub use artifacts::{ArtifactSink, FileArtifacts, MemoryArtifacts, NoArtifacts};
pub use collector::PathCollector;
pub use error::SolverError;
pub use find::{MapStorage, MazeTrait, NodeReference, Treasure};
pub use grid::{Cell, CellStorage, GridMaze, Point};
pub use knapsack::{Algorithm, Item, Knapsack, KnapsackResult, RecursionTrace};
pub use table::DpTable;
