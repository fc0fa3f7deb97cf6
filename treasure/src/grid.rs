use crate::find::{MapStorage, MazeTrait, NodeReference, Treasure};
use std::collections::BTreeMap;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Invalid,
    Valid,
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Cell::Invalid => "X",
                Cell::Valid => " ",
            }
        )
    }
}

/// A MazeTrait implementation that uses a rectangular grid of cells. Two cells are separated by a
/// wall unless they are orthogonally adjacent and both valid.
#[derive(Debug, Clone)]
pub struct GridMaze {
    pub rows: usize,
    pub columns: usize,
    pub cells: Vec<Vec<Cell>>,
    treasures: BTreeMap<Point, Treasure>,
}

impl GridMaze {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            cells: vec![vec![Cell::Valid; columns]; rows],
            treasures: BTreeMap::new(),
        }
    }

    pub fn from_cells(cells: Vec<Vec<Cell>>) -> Result<Self, anyhow::Error> {
        let rows = cells.len();
        let columns = cells.first().map(|r| r.len()).unwrap_or(0);

        if let Some(row) = cells.iter().position(|r| r.len() != columns) {
            return Err(anyhow::anyhow!(
                "Row {} has {} columns, expected {}",
                row,
                cells[row].len(),
                columns
            ));
        }

        Ok(Self {
            rows,
            columns,
            cells,
            treasures: BTreeMap::new(),
        })
    }

    pub fn cell(&self, point: Point) -> Cell {
        self.cells[point.row][point.col]
    }

    /// Place a treasure on an open cell, replacing any treasure already there
    pub fn set_treasure(&mut self, point: Point, treasure: Treasure) -> Result<(), anyhow::Error> {
        if !self.is_valid(point) {
            return Err(anyhow::anyhow!(
                "Treasure at {} lies outside the {}x{} maze",
                point,
                self.rows,
                self.columns
            ));
        }
        if self.cell(point) == Cell::Invalid {
            return Err(anyhow::anyhow!("Treasure at {} lies inside a wall", point));
        }
        self.treasures.insert(point, treasure);
        Ok(())
    }

    pub fn remove_treasure(&mut self, point: Point) -> Option<Treasure> {
        self.treasures.remove(&point)
    }
}

/// A MapStorage with one entry per grid cell
#[derive(Debug)]
pub struct CellStorage<T>(Vec<Vec<T>>);

impl<T: Copy + 'static> MapStorage<T> for CellStorage<T> {
    type Reference = Point;

    fn get(&self, node: Self::Reference) -> T {
        self.0[node.row][node.col]
    }

    fn get_mut(&mut self, node: Self::Reference) -> &mut T {
        &mut self.0[node.row][node.col]
    }
}

/// Field order matters: the derived ordering is row-major (row first, then column).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub row: usize,
    pub col: usize,
}

impl Point {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn is_adjacent(&self, other: &Point) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl NodeReference for Point {}

impl Display for GridMaze {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (row, cells) in self.cells.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                if self.treasures.contains_key(&Point { row, col }) {
                    write!(f, "$")?;
                } else {
                    write!(f, "{}", cell)?;
                }
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl MazeTrait for GridMaze {
    type Reference = Point;
    type Storage<T: Default + Copy + Clone + 'static> = CellStorage<T>;

    fn is_valid(&self, node: Self::Reference) -> bool {
        node.row < self.rows && node.col < self.columns
    }

    fn neighbours(&self, node: Self::Reference) -> impl Iterator<Item = Self::Reference> {
        let mut points = Vec::with_capacity(4);

        if !self.is_valid(node) {
            return points.into_iter();
        }

        if node.row > 0 {
            points.push(Point {
                row: node.row - 1,
                col: node.col,
            });
        }
        if node.col > 0 {
            points.push(Point {
                col: node.col - 1,
                row: node.row,
            });
        }
        if node.row < self.rows - 1 {
            points.push(Point {
                row: node.row + 1,
                col: node.col,
            });
        }
        if node.col < self.columns - 1 {
            points.push(Point {
                col: node.col + 1,
                row: node.row,
            });
        }

        points.into_iter()
    }

    fn has_wall(&self, a: Self::Reference, b: Self::Reference) -> bool {
        !(self.is_valid(a)
            && self.is_valid(b)
            && a.is_adjacent(&b)
            && self.cell(a) == Cell::Valid
            && self.cell(b) == Cell::Valid)
    }

    fn treasures(&self) -> impl Iterator<Item = (Self::Reference, Treasure)> {
        self.treasures.iter().map(|(p, t)| (*p, *t))
    }

    fn treasure_at(&self, node: Self::Reference) -> Option<Treasure> {
        self.treasures.get(&node).copied()
    }

    fn create_storage<T: Default + Copy + Clone + 'static>(&self) -> Self::Storage<T> {
        CellStorage(vec![vec![Default::default(); self.columns]; self.rows])
    }
}
