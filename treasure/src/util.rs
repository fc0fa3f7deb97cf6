use image::{DynamicImage, GenericImageView};

use crate::{Cell, GridMaze};

/// Dark pixels are walls, everything else is open
pub fn parse_img(img: &DynamicImage) -> Result<GridMaze, anyhow::Error> {
    let width = img.width() as usize;
    let height = img.height() as usize;

    let mut cells = vec![vec![Cell::Invalid; width]; height];

    for (row, row_cells) in cells.iter_mut().enumerate() {
        for (col, cell) in row_cells.iter_mut().enumerate() {
            let p = img.get_pixel(col as u32, row as u32);

            *cell = if p.0[0] < 128 {
                Cell::Invalid
            } else {
                Cell::Valid
            }
        }
    }

    GridMaze::from_cells(cells)
}

/// One string per row, `X` or `#` is a wall and any other character an open cell
pub fn parse_text<S: AsRef<str>>(lines: &[S]) -> Result<GridMaze, anyhow::Error> {
    if lines.is_empty() {
        return Err(anyhow::anyhow!("Maze layout has no rows"));
    }

    let cells = lines
        .iter()
        .map(|line| {
            line.as_ref()
                .chars()
                .map(|c| match c {
                    'X' | '#' => Cell::Invalid,
                    _ => Cell::Valid,
                })
                .collect()
        })
        .collect();

    GridMaze::from_cells(cells)
}
