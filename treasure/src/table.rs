use std::fmt::Display;

/// Placeholder used when exporting cells the memoized recursion never reached
pub const UNRESOLVED: &str = "#";

/// Memoization table for the dynamic knapsack, indexed by `[item prefix length][capacity]`.
///
/// Cells start out unresolved (`None`) except for row 0, which is the base case of no items and is
/// zero for every capacity. Each row past the first is labelled with its item's `(weight, value)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DpTable {
    width: usize,
    cells: Vec<Option<u64>>,
    labels: Vec<(usize, u64)>,
}

impl DpTable {
    pub fn new(labels: Vec<(usize, u64)>, capacity: usize) -> Self {
        let width = capacity + 1;
        let mut cells = vec![None; width * (labels.len() + 1)];
        cells[..width].fill(Some(0));

        Self {
            width,
            cells,
            labels,
        }
    }

    /// Number of rows, including the base case row
    pub fn rows(&self) -> usize {
        self.labels.len() + 1
    }

    pub fn capacity(&self) -> usize {
        self.width - 1
    }

    pub fn get(&self, item: usize, capacity: usize) -> Option<u64> {
        self.cells[item * self.width + capacity]
    }

    pub fn set(&mut self, item: usize, capacity: usize, value: u64) {
        self.cells[item * self.width + capacity] = Some(value);
    }

    pub fn row(&self, item: usize) -> &[Option<u64>] {
        &self.cells[item * self.width..(item + 1) * self.width]
    }

    /// The `(weight, value)` label of row `item`, `None` for the base case row
    pub fn label(&self, item: usize) -> Option<(usize, u64)> {
        item.checked_sub(1).map(|i| self.labels[i])
    }

    pub fn resolved(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

/// Record terminator, as in RFC 4180
const CRLF: &str = "\r\n";

/// Renders the table as CSV: a header of capacities, the base case row, then one row per item.
impl Display for DpTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for capacity in 0..self.width {
            write!(f, ",{}", capacity)?;
        }
        f.write_str(CRLF)?;

        for item in 0..self.rows() {
            if let Some((weight, value)) = self.label(item) {
                // the label contains the delimiter so it has to be quoted
                write!(f, "\"({}, {})\"", weight, value)?;
            }
            for cell in self.row(item) {
                match cell {
                    Some(value) => write!(f, ",{}", value)?,
                    None => write!(f, ",{}", UNRESOLVED)?,
                }
            }
            f.write_str(CRLF)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_base_row_is_zero() {
        let table = DpTable::new(vec![(1, 2), (3, 4)], 4);

        assert_eq!(table.rows(), 3);
        assert_eq!(table.capacity(), 4);
        assert!(table.row(0).iter().all(|c| *c == Some(0)));
        assert!(table.row(1).iter().all(|c| c.is_none()));
        assert_eq!(table.resolved(), 5);
    }

    #[test]
    fn test_csv_distinguishes_unresolved_from_zero() {
        let mut table = DpTable::new(vec![(2, 3)], 2);
        table.set(1, 0, 0);
        table.set(1, 2, 3);

        assert_eq!(table.to_string(), ",0,1,2\r\n,0,0,0\r\n\"(2, 3)\",0,#,3\r\n");
    }

    #[test]
    fn test_labels() {
        let table = DpTable::new(vec![(5, 10)], 0);
        assert_eq!(table.label(0), None);
        assert_eq!(table.label(1), Some((5, 10)));
        assert_eq!(table.to_string(), ",0\r\n,0\r\n\"(5, 10)\",#\r\n");
    }
}
