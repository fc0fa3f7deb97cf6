use std::{fmt::Display, str::FromStr};

use log::{debug, info};

use crate::{
    artifacts::ArtifactSink,
    error::{Result, SolverError},
    find::{MazeTrait, NodeReference, Treasure},
    table::DpTable,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Algorithm {
    Recursive,
    Dynamic,
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Algorithm::Recursive => "recursive",
                Algorithm::Dynamic => "dynamic",
            }
        )
    }
}

impl FromStr for Algorithm {
    type Err = SolverError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "recursive" | "recur" => Ok(Algorithm::Recursive),
            "dynamic" => Ok(Algorithm::Dynamic),
            _ => Err(SolverError::InvalidConfiguration(s.to_string())),
        }
    }
}

/// A treasure that has been validated for use by the solvers
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Item<R> {
    pub location: R,
    pub weight: usize,
    pub value: u64,
}

impl<R: NodeReference> Item<R> {
    pub fn new(location: R, treasure: Treasure) -> Result<Self> {
        match (
            usize::try_from(treasure.weight),
            u64::try_from(treasure.value),
        ) {
            (Ok(weight), Ok(value)) => Ok(Self {
                location,
                weight,
                value,
            }),
            _ => Err(SolverError::InvalidInput {
                location: location.to_string(),
                weight: treasure.weight,
                value: treasure.value,
            }),
        }
    }
}

/// Builds the item list from a maze's treasures, sorted by location.
pub fn items_from_maze<M: MazeTrait>(maze: &M) -> Result<Vec<Item<M::Reference>>> {
    let mut treasures: Vec<_> = maze.treasures().collect();
    treasures.sort_by_key(|(location, _)| *location);

    treasures
        .into_iter()
        .map(|(location, treasure)| Item::new(location, treasure))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnapsackResult<R> {
    pub cells: Vec<R>,
    pub weight: usize,
    pub value: u64,
}

impl<R> Default for KnapsackResult<R> {
    fn default() -> Self {
        Self {
            cells: Vec::new(),
            weight: 0,
            value: 0,
        }
    }
}

/// Counters collected while running the plain recursion. Threaded through every call and handed to
/// the artifact sink once, after the root call returns.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RecursionTrace {
    /// Number of recursive invocations, the root included
    pub calls: u64,
    /// Number of invocations that ended in the base case
    pub base_cases: u64,
    /// Value of `calls` when the base case was hit for the first time
    pub calls_to_first_base_case: Option<u64>,
}

impl RecursionTrace {
    fn enter(&mut self) {
        self.calls += 1;
    }

    fn base_case(&mut self) {
        self.base_cases += 1;
        self.calls_to_first_base_case.get_or_insert(self.calls);
    }
}

/// Add an item's value to a running total
fn add_value<R: NodeReference>(total: u64, item: &Item<R>) -> Result<u64> {
    total
        .checked_add(item.value)
        .ok_or_else(|| SolverError::ValueOverflow(item.location.to_string()))
}

/// Exact 0/1 knapsack by exhaustive recursion over the items, last to first.
pub fn recursive_knapsack<R: NodeReference>(
    items: &[Item<R>],
    capacity: usize,
    trace: &mut RecursionTrace,
) -> Result<KnapsackResult<R>> {
    recurse(items, capacity, items.len(), trace)
}

fn recurse<R: NodeReference>(
    items: &[Item<R>],
    capacity: usize,
    num_items: usize,
    trace: &mut RecursionTrace,
) -> Result<KnapsackResult<R>> {
    trace.enter();

    if capacity == 0 || num_items == 0 {
        trace.base_case();
        return Ok(KnapsackResult::default());
    }

    let item = &items[num_items - 1];

    if item.weight > capacity {
        return recurse(items, capacity, num_items - 1, trace);
    }

    let mut include = recurse(items, capacity - item.weight, num_items - 1, trace)?;
    include.cells.push(item.location);
    include.weight += item.weight;
    include.value = add_value(include.value, item)?;

    let exclude = recurse(items, capacity, num_items - 1, trace)?;

    // ties go to the exclude branch
    Ok(if include.value > exclude.value {
        include
    } else {
        exclude
    })
}

/// Exact 0/1 knapsack by top-down memoization. Only the cells reachable from `(N, capacity)` are
/// filled in, the returned table keeps the rest unresolved.
pub fn dynamic_knapsack<R: NodeReference>(
    items: &[Item<R>],
    capacity: usize,
) -> Result<(KnapsackResult<R>, DpTable)> {
    let mut table = DpTable::new(
        items.iter().map(|item| (item.weight, item.value)).collect(),
        capacity,
    );

    let value = memo(items, &mut table, items.len(), capacity)?;

    // walk back through the table to find which items made the difference
    let mut cells = Vec::new();
    let mut weight = 0;
    let mut remaining = capacity;
    for i in (1..=items.len()).rev() {
        // every state without capacity left is worth 0, nothing more can be taken
        if remaining == 0 {
            break;
        }
        match table.get(i, remaining) {
            None => continue,
            Some(v) if Some(v) == table.get(i - 1, remaining) => continue,
            Some(_) => {
                let item = &items[i - 1];
                cells.push(item.location);
                weight += item.weight;
                remaining -= item.weight;
            }
        }
    }
    cells.reverse();

    Ok((
        KnapsackResult {
            cells,
            weight,
            value,
        },
        table,
    ))
}

fn memo<R: NodeReference>(
    items: &[Item<R>],
    table: &mut DpTable,
    i: usize,
    c: usize,
) -> Result<u64> {
    if let Some(value) = table.get(i, c) {
        return Ok(value);
    }

    if i == 0 || c == 0 {
        table.set(i, c, 0);
        return Ok(0);
    }

    let item = &items[i - 1];
    let best = if item.weight > c {
        memo(items, table, i - 1, c)?
    } else {
        let exclude = memo(items, table, i - 1, c)?;
        let include = add_value(memo(items, table, i - 1, c - item.weight)?, item)?;
        exclude.max(include)
    };

    table.set(i, c, best);
    Ok(best)
}

/// Run the selected algorithm on an already sorted item list and pass its diagnostics to `sink`.
pub fn solve_items<R: NodeReference>(
    items: &[Item<R>],
    capacity: usize,
    algorithm: Algorithm,
    sink: &mut impl ArtifactSink,
) -> Result<KnapsackResult<R>> {
    debug!(
        "solving knapsack: {} items, capacity {}, {} algorithm",
        items.len(),
        capacity,
        algorithm
    );

    let result = match algorithm {
        Algorithm::Recursive => {
            let mut trace = RecursionTrace::default();
            let result = recursive_knapsack(items, capacity, &mut trace)?;
            debug!(
                "recursion made {} calls, {} base cases, first base case after {:?} calls",
                trace.calls, trace.base_cases, trace.calls_to_first_base_case
            );
            sink.record_trace(&trace)?;
            result
        }
        Algorithm::Dynamic => {
            let (result, table) = dynamic_knapsack(items, capacity)?;
            debug!(
                "dp table resolved {} of {} cells",
                table.resolved(),
                table.rows() * (table.capacity() + 1)
            );
            sink.record_table(&table)?;
            result
        }
    };

    Ok(result)
}

/// Mutable solver state. The `optimal_*` fields hold the outcome of the last solve, or what the
/// path collector has gathered so far.
#[derive(Debug, Clone)]
pub struct Knapsack<R> {
    capacity: usize,
    algorithm: Algorithm,
    pub optimal_value: u64,
    pub optimal_weight: usize,
    pub optimal_cells: Vec<R>,
}

impl<R: NodeReference> Knapsack<R> {
    pub fn new(capacity: usize, algorithm: Algorithm) -> Self {
        Self {
            capacity,
            algorithm,
            optimal_value: 0,
            optimal_weight: 0,
            optimal_cells: Vec::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Extract the maze's treasures, sort them and run the selected algorithm. Overwrites the
    /// `optimal_*` fields.
    pub fn solve<M: MazeTrait<Reference = R>>(
        &mut self,
        maze: &M,
        sink: &mut impl ArtifactSink,
    ) -> Result<KnapsackResult<R>> {
        let items = items_from_maze(maze)?;
        let result = solve_items(&items, self.capacity, self.algorithm, sink)?;

        info!(
            "knapsack ({}): value {}, weight {}/{}, {} cells",
            self.algorithm,
            result.value,
            result.weight,
            self.capacity,
            result.cells.len()
        );

        self.optimal_cells = result.cells.clone();
        self.optimal_weight = result.weight;
        self.optimal_value = result.value;

        Ok(result)
    }

    pub fn reset(&mut self) {
        self.optimal_cells.clear();
        self.optimal_weight = 0;
        self.optimal_value = 0;
    }

    /// Take the item if it still fits, returns whether it was taken
    pub fn offer(&mut self, item: &Item<R>) -> Result<bool> {
        let fits = self
            .capacity
            .checked_sub(self.optimal_weight)
            .is_some_and(|room| item.weight <= room);
        if !fits {
            return Ok(false);
        }
        self.optimal_value = add_value(self.optimal_value, item)?;
        self.optimal_cells.push(item.location);
        self.optimal_weight += item.weight;
        Ok(true)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        artifacts::{MemoryArtifacts, NoArtifacts},
        grid::{GridMaze, Point},
    };

    fn item(row: usize, col: usize, weight: usize, value: u64) -> Item<Point> {
        Item {
            location: Point::new(row, col),
            weight,
            value,
        }
    }

    fn both(items: &[Item<Point>], capacity: usize) -> [KnapsackResult<Point>; 2] {
        [
            solve_items(items, capacity, Algorithm::Recursive, &mut NoArtifacts).unwrap(),
            solve_items(items, capacity, Algorithm::Dynamic, &mut NoArtifacts).unwrap(),
        ]
    }

    /// Leaves of the plain recursion tree, counted without running the solver
    fn reference_leaves(weights: &[usize], n: usize, c: usize) -> u64 {
        if n == 0 || c == 0 {
            return 1;
        }
        let w = weights[n - 1];
        if w > c {
            reference_leaves(weights, n - 1, c)
        } else {
            reference_leaves(weights, n - 1, c - w) + reference_leaves(weights, n - 1, c)
        }
    }

    /// Small deterministic generator so the sweeps are reproducible
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self, bound: u64) -> u64 {
            self.0 = self
                .0
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (self.0 >> 33) % bound
        }
    }

    fn random_items(rng: &mut Lcg, n: usize) -> Vec<Item<Point>> {
        (0..n)
            .map(|i| item(i, 0, rng.next(8) as usize, rng.next(20)))
            .collect()
    }

    #[test]
    fn test_algorithm_names() {
        assert_eq!("recursive".parse::<Algorithm>().unwrap(), Algorithm::Recursive);
        assert_eq!("recur".parse::<Algorithm>().unwrap(), Algorithm::Recursive);
        assert_eq!("dynamic".parse::<Algorithm>().unwrap(), Algorithm::Dynamic);
        assert!(matches!(
            "greedy".parse::<Algorithm>(),
            Err(SolverError::InvalidConfiguration(name)) if name == "greedy"
        ));
    }

    #[test]
    fn test_zero_capacity() {
        let items = vec![item(0, 0, 1, 5), item(0, 1, 0, 3)];
        for result in both(&items, 0) {
            assert_eq!(result, KnapsackResult::default());
        }
    }

    #[test]
    fn test_single_item_fits_exactly() {
        let items = vec![item(2, 3, 5, 10)];
        for result in both(&items, 5) {
            assert_eq!(result.cells, vec![Point::new(2, 3)]);
            assert_eq!(result.weight, 5);
            assert_eq!(result.value, 10);
        }
    }

    #[test]
    fn test_better_single_item_wins() {
        let items = vec![item(0, 0, 3, 4), item(0, 1, 4, 5)];
        for result in both(&items, 5) {
            assert_eq!(result.cells, vec![Point::new(0, 1)]);
            assert_eq!(result.weight, 4);
            assert_eq!(result.value, 5);
        }
    }

    #[test]
    fn test_tie_prefers_exclusion() {
        // both items are worth the same, the last one is considered first and gets excluded
        let items = vec![item(0, 0, 2, 7), item(0, 1, 2, 7)];
        let mut trace = RecursionTrace::default();
        let result = recursive_knapsack(&items, 2, &mut trace).unwrap();
        assert_eq!(result.cells, vec![Point::new(0, 0)]);
        assert_eq!(result.value, 7);
    }

    #[test]
    fn test_selection_keeps_item_order() {
        let items = vec![item(0, 0, 1, 1), item(0, 1, 10, 1), item(1, 0, 2, 3), item(1, 1, 3, 4)];
        for result in both(&items, 6) {
            assert_eq!(
                result.cells,
                vec![Point::new(0, 0), Point::new(1, 0), Point::new(1, 1)]
            );
            assert_eq!(result.weight, 6);
            assert_eq!(result.value, 8);
        }
    }

    #[test]
    fn test_algorithms_agree() {
        let mut rng = Lcg(42);
        for _ in 0..200 {
            let n = rng.next(9) as usize;
            let capacity = rng.next(25) as usize;
            let items = random_items(&mut rng, n);

            let [recursive, dynamic] = both(&items, capacity);
            assert_eq!(recursive.value, dynamic.value, "items {:?}", items);
            assert!(recursive.weight <= capacity);
            assert!(dynamic.weight <= capacity);

            for result in [recursive, dynamic] {
                let chosen: Vec<_> = items
                    .iter()
                    .filter(|i| result.cells.contains(&i.location))
                    .collect();
                assert_eq!(chosen.len(), result.cells.len());
                assert_eq!(chosen.iter().map(|i| i.weight).sum::<usize>(), result.weight);
                assert_eq!(chosen.iter().map(|i| i.value).sum::<u64>(), result.value);
            }
        }
    }

    #[test]
    fn test_trace_counts() {
        let items = vec![item(0, 0, 3, 4), item(0, 1, 4, 5)];
        let mut trace = RecursionTrace::default();
        recursive_knapsack(&items, 5, &mut trace).unwrap();

        assert_eq!(
            trace,
            RecursionTrace {
                calls: 6,
                base_cases: 3,
                calls_to_first_base_case: Some(3),
            }
        );
    }

    #[test]
    fn test_trace_matches_recursion_tree() {
        let mut rng = Lcg(7);
        for _ in 0..50 {
            let n = rng.next(10) as usize;
            let capacity = rng.next(30) as usize;
            let items = random_items(&mut rng, n);
            let weights: Vec<_> = items.iter().map(|i| i.weight).collect();

            let mut sink = MemoryArtifacts::default();
            solve_items(&items, capacity, Algorithm::Recursive, &mut sink).unwrap();

            let trace = sink.trace.unwrap();
            assert_eq!(trace.base_cases, reference_leaves(&weights, n, capacity));
            assert!(sink.table.is_none());
        }
    }

    #[test]
    fn test_dp_table_layout() {
        let items = vec![item(0, 0, 3, 4), item(0, 1, 4, 5)];
        let (_, table) = dynamic_knapsack(&items, 5).unwrap();

        assert_eq!(
            table.to_string(),
            ",0,1,2,3,4,5\r\n\
             ,0,0,0,0,0,0\r\n\
             \"(3, 4)\",#,0,#,#,#,4\r\n\
             \"(4, 5)\",#,#,#,#,#,5\r\n"
        );
    }

    #[test]
    fn test_dp_table_properties() {
        let mut rng = Lcg(1234);
        for _ in 0..100 {
            let n = rng.next(12) as usize;
            let capacity = rng.next(40) as usize;
            let items = random_items(&mut rng, n);

            let mut sink = MemoryArtifacts::default();
            let result = solve_items(&items, capacity, Algorithm::Dynamic, &mut sink).unwrap();
            let table = sink.table.unwrap();

            assert_eq!(table.rows(), n + 1);
            assert!(table.row(0).iter().all(|c| *c == Some(0)));
            assert_eq!(table.get(n, capacity), Some(result.value));

            for i in 0..table.rows() {
                let resolved: Vec<u64> = table.row(i).iter().flatten().copied().collect();
                assert!(resolved.windows(2).all(|w| w[0] <= w[1]), "row {}", i);
            }
        }
    }

    #[test]
    fn test_negative_treasure_rejected() {
        let mut maze = GridMaze::new(2, 2);
        maze.set_treasure(Point::new(0, 0), Treasure::new(1, 1)).unwrap();
        maze.set_treasure(Point::new(1, 1), Treasure::new(-2, 1)).unwrap();

        let mut knapsack = Knapsack::new(5, Algorithm::Dynamic);
        assert!(matches!(
            knapsack.solve(&maze, &mut NoArtifacts),
            Err(SolverError::InvalidInput { weight: -2, .. })
        ));

        assert!(Item::new(Point::new(0, 0), Treasure::new(1, -1)).is_err());
    }

    #[test]
    fn test_solve_from_maze_overwrites_state() {
        let mut maze = GridMaze::new(3, 3);
        maze.set_treasure(Point::new(2, 0), Treasure::new(4, 5)).unwrap();
        maze.set_treasure(Point::new(0, 2), Treasure::new(3, 4)).unwrap();

        let mut knapsack = Knapsack::new(5, Algorithm::Recursive);
        knapsack.optimal_cells = vec![Point::new(1, 1)];
        knapsack.optimal_value = 100;

        let mut sink = MemoryArtifacts::default();
        let result = knapsack.solve(&maze, &mut sink).unwrap();

        // (0, 2) sorts first, so it is item 1
        assert_eq!(result.cells, vec![Point::new(2, 0)]);
        assert_eq!(knapsack.optimal_cells, vec![Point::new(2, 0)]);
        assert_eq!(knapsack.optimal_value, 5);
        assert_eq!(knapsack.optimal_weight, 4);
        assert_eq!(sink.trace.unwrap().base_cases, 3);

        maze.remove_treasure(Point::new(2, 0));
        knapsack.solve(&maze, &mut sink).unwrap();
        assert_eq!(knapsack.optimal_cells, vec![Point::new(0, 2)]);
        assert_eq!(knapsack.optimal_value, 4);
    }

    #[test]
    fn test_value_overflow_rejected() {
        let max = i64::MAX as u64;
        let items = vec![item(0, 0, 1, max), item(0, 1, 1, max), item(0, 2, 1, max)];

        for algorithm in [Algorithm::Recursive, Algorithm::Dynamic] {
            assert!(matches!(
                solve_items(&items, 3, algorithm, &mut NoArtifacts),
                Err(SolverError::ValueOverflow(_))
            ));
        }

        // two of them still fit in the value type
        for result in both(&items[..2], 3) {
            assert_eq!(result.value, 2 * max);
        }
    }

    #[test]
    fn test_value_overflow_from_maze() {
        let mut maze = GridMaze::new(1, 3);
        for col in 0..3 {
            maze.set_treasure(Point::new(0, col), Treasure::new(1, i64::MAX))
                .unwrap();
        }

        let mut knapsack = Knapsack::new(3, Algorithm::Dynamic);
        assert!(matches!(
            knapsack.solve(&maze, &mut NoArtifacts),
            Err(SolverError::ValueOverflow(_))
        ));
        assert_eq!(knapsack.optimal_value, 0);
    }

    #[test]
    fn test_offer_value_overflow() {
        let max = i64::MAX as u64;
        let mut knapsack = Knapsack::new(5, Algorithm::Dynamic);
        assert!(knapsack.offer(&item(0, 0, 1, max)).unwrap());
        assert!(knapsack.offer(&item(0, 1, 1, max)).unwrap());
        assert!(matches!(
            knapsack.offer(&item(0, 2, 1, max)),
            Err(SolverError::ValueOverflow(at)) if at == "(0, 2)"
        ));
        assert_eq!(knapsack.optimal_cells.len(), 2);
        assert_eq!(knapsack.optimal_weight, 2);
    }

    #[test]
    fn test_offer_heavy_item() {
        let mut knapsack = Knapsack::new(usize::MAX, Algorithm::Dynamic);
        assert!(knapsack.offer(&item(0, 0, 1, 1)).unwrap());
        assert!(!knapsack.offer(&item(0, 1, usize::MAX, 1)).unwrap());
        assert_eq!(knapsack.optimal_weight, 1);
    }

    #[test]
    fn test_offer_respects_capacity() {
        let mut knapsack = Knapsack::new(5, Algorithm::Dynamic);
        assert!(knapsack.offer(&item(0, 0, 3, 1)).unwrap());
        assert!(!knapsack.offer(&item(0, 1, 3, 9)).unwrap());
        assert!(knapsack.offer(&item(0, 2, 2, 2)).unwrap());
        assert_eq!(knapsack.optimal_weight, 5);
        assert_eq!(knapsack.optimal_value, 3);

        knapsack.reset();
        assert!(knapsack.optimal_cells.is_empty());
        assert_eq!(knapsack.optimal_value, 0);
    }
}
