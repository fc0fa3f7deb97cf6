use std::collections::{HashSet, VecDeque};

use log::{debug, info};

use crate::{
    error::{Result, SolverError},
    find::{MapStorage, MazeTrait, NodeReference, Treasure, Visit},
    knapsack::{Item, Knapsack},
};

/// Walks a maze breadth first from the entrance towards the exit and greedily fills its knapsack
/// with every treasure that still fits, in the order the cells are reached.
#[derive(Debug, Clone)]
pub struct PathCollector<R> {
    knapsack: Knapsack<R>,
    solver_path: Vec<R>,
    cells_explored: usize,
    entrance_used: Option<R>,
    exit_used: Option<R>,
    reward: Option<i64>,
}

impl<R: NodeReference> PathCollector<R> {
    pub fn new(knapsack: Knapsack<R>) -> Self {
        Self {
            knapsack,
            solver_path: Vec::new(),
            cells_explored: 0,
            entrance_used: None,
            exit_used: None,
            reward: None,
        }
    }

    /// Find a path from `entrance` to `exit`, collecting treasures on the way.
    ///
    /// The knapsack's `optimal_*` fields are cleared first and then hold the greedy collection. On
    /// success the solver path runs from the first open cell after the entrance up to and
    /// including the exit. On failure the solver path is the order in which cells were explored,
    /// and the entrance, exit and reward stay unset. Treasure data that cannot be collected
    /// (negative, or a value total that overflows) also empties the knapsack again.
    pub fn solve_maze<M: MazeTrait<Reference = R>>(
        &mut self,
        maze: &M,
        entrance: R,
        exit: R,
    ) -> Result<()> {
        self.knapsack.reset();
        self.solver_path.clear();
        self.cells_explored = 0;
        self.entrance_used = None;
        self.exit_used = None;
        self.reward = None;

        let start = maze
            .neighbours(entrance)
            .find(|neighbour| !maze.has_wall(entrance, *neighbour))
            .ok_or_else(|| SolverError::NoAccessibleStart(entrance.to_string()))?;
        debug!("entering maze at {} through {}", start, entrance);

        let unreachable = || SolverError::ExitUnreachable {
            start: start.to_string(),
            exit: exit.to_string(),
        };
        if !maze.is_valid(exit) {
            return Err(unreachable());
        }

        let mut visited = maze.create_storage::<Visit<R>>();
        let mut explored = HashSet::new();
        let mut queue = VecDeque::from([start]);
        *visited.get_mut(start) = Visit::Seed;

        let mut found = false;
        while let Some(current) = queue.pop_front() {
            self.solver_path.push(current);
            explored.insert(current);
            self.cells_explored = explored.len();

            if let Some(treasure) = maze.treasure_at(current) {
                if let Err(err) = self.pick_up(current, treasure) {
                    self.knapsack.reset();
                    return Err(err);
                }
            }

            if maze
                .neighbours(current)
                .any(|neighbour| neighbour == exit && !maze.has_wall(current, neighbour))
            {
                // a seed on the exit keeps its link, the path is then just the exit
                if visited.get(exit) != Visit::Seed {
                    *visited.get_mut(exit) = Visit::From(current);
                }
                found = true;
                break;
            }

            for neighbour in maze.neighbours(current) {
                if !visited.get(neighbour).is_visited() && !maze.has_wall(current, neighbour) {
                    *visited.get_mut(neighbour) = Visit::From(current);
                    queue.push_back(neighbour);
                }
            }
        }

        if !found {
            debug!(
                "explored {} cells without reaching {}",
                self.cells_explored, exit
            );
            return Err(unreachable());
        }

        self.solver_path = backtrack(&visited, exit)?;
        self.cells_explored = self.solver_path.iter().collect::<HashSet<_>>().len();

        let reward = match i64::try_from(self.knapsack.optimal_value) {
            Ok(value) => value - self.cells_explored as i64,
            Err(_) => {
                self.knapsack.reset();
                return Err(SolverError::ValueOverflow(exit.to_string()));
            }
        };
        self.entrance_used = Some(entrance);
        self.exit_used = Some(exit);
        self.reward = Some(reward);

        info!(
            "collected value {} (weight {}/{}) along {} cells, reward {}",
            self.knapsack.optimal_value,
            self.knapsack.optimal_weight,
            self.knapsack.capacity(),
            self.cells_explored,
            reward
        );

        Ok(())
    }

    fn pick_up(&mut self, at: R, treasure: Treasure) -> Result<()> {
        let item = Item::new(at, treasure)?;
        if self.knapsack.offer(&item)? {
            debug!(
                "picked up treasure at {} (weight {}, value {})",
                at, item.weight, item.value
            );
        }
        Ok(())
    }

    pub fn solver_path(&self) -> &[R] {
        &self.solver_path
    }

    pub fn cells_explored(&self) -> usize {
        self.cells_explored
    }

    pub fn entrance_used(&self) -> Option<R> {
        self.entrance_used
    }

    pub fn exit_used(&self) -> Option<R> {
        self.exit_used
    }

    /// `optimal_value - cells_explored` of the last successful run
    pub fn reward(&self) -> Option<i64> {
        self.reward
    }

    pub fn knapsack(&self) -> &Knapsack<R> {
        &self.knapsack
    }

    pub fn knapsack_mut(&mut self) -> &mut Knapsack<R> {
        &mut self.knapsack
    }

    pub fn into_knapsack(self) -> Knapsack<R> {
        self.knapsack
    }
}

/// Follow the parent links from `exit` back to the seed and return the path in walking order
fn backtrack<R: NodeReference, S: MapStorage<Visit<R>, Reference = R>>(
    visited: &S,
    exit: R,
) -> Result<Vec<R>> {
    let mut path = vec![exit];
    let mut node = exit;

    loop {
        node = match visited.get(node) {
            Visit::Seed => break,
            Visit::From(from) => {
                path.push(from);
                from
            }
            Visit::Unvisited => {
                return Err(SolverError::IncompletePath {
                    at: node.to_string(),
                })
            }
        }
    }

    path.reverse();
    Ok(path)
}
