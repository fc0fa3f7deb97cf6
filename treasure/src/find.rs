use std::{
    fmt::{Debug, Display},
    hash::Hash,
};

use serde::{Deserialize, Serialize};

/// Supertrait that collects all the requirements on the NodeReference values
/// Must be copy, comparable, hashable and not references (hence 'static). The ordering is the one
/// used to sort treasures before they are handed to the knapsack solvers.
pub trait NodeReference: Copy + Eq + Ord + Hash + Debug + Display + 'static {}

/// Raw treasure data as stored in a maze. Signed so that malformed input can be represented and
/// rejected when it is turned into a knapsack item.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Treasure {
    pub weight: i64,
    pub value: i64,
}

impl Treasure {
    pub fn new(weight: i64, value: i64) -> Self {
        Self { weight, value }
    }
}

pub trait MazeTrait {
    /// The type that can be used to reference cells in the maze
    type Reference: NodeReference;

    /// The type that the maze uses for per-cell storage
    type Storage<T: Default + Copy + Clone + 'static>: MapStorage<T, Reference = Self::Reference>;

    /// Check if the provided cell reference lies inside the maze
    fn is_valid(&self, node: Self::Reference) -> bool;

    /// Return an iterator over the neighbours of the provided cell, walls are not taken into account
    fn neighbours(&self, node: Self::Reference) -> impl Iterator<Item = Self::Reference>;

    /// True if one cannot move directly between `a` and `b`
    fn has_wall(&self, a: Self::Reference, b: Self::Reference) -> bool;

    /// Return an iterator over all treasure cells, in no particular order
    fn treasures(&self) -> impl Iterator<Item = (Self::Reference, Treasure)>;

    fn treasure_at(&self, node: Self::Reference) -> Option<Treasure>;

    /// Create a storage for values of type T
    fn create_storage<T: Default + Copy + Clone + 'static>(&self) -> Self::Storage<T>;
}

pub trait MapStorage<T> {
    type Reference: NodeReference;

    fn get(&self, node: Self::Reference) -> T;
    fn get_mut(&mut self, node: Self::Reference) -> &mut T;
}

/// Bookkeeping for the breadth-first traversal, one entry per maze cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visit<R> {
    Unvisited,
    /// The cell the traversal started from
    Seed,
    /// Reached from the given cell
    From(R),
}

impl<R> Default for Visit<R> {
    fn default() -> Self {
        Visit::Unvisited
    }
}

impl<R> Visit<R> {
    pub fn is_visited(&self) -> bool {
        !matches!(self, Visit::Unvisited)
    }
}
