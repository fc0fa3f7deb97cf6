//! Scenario files: a maze layout, its treasures and the parameters of a run, stored as JSON.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    find::Treasure,
    grid::{GridMaze, Point},
    knapsack::Algorithm,
    util::{parse_img, parse_text},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MazeLayout {
    /// One string per row, see [`parse_text`]
    Text(Vec<String>),
    /// Path to a black and white image, relative to the scenario file
    Image(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasureEntry {
    pub row: usize,
    pub col: usize,
    pub weight: i64,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub maze: MazeLayout,
    #[serde(default)]
    pub treasures: Vec<TreasureEntry>,
    pub entrance: Point,
    pub exit: Point,
    pub capacity: usize,
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    /// Base name for the `.txt`/`.csv` artifacts, relative to the scenario file
    #[serde(default)]
    pub artifacts: Option<PathBuf>,
    #[serde(skip)]
    base_dir: PathBuf,
}

fn default_algorithm() -> String {
    Algorithm::Dynamic.to_string()
}

impl Scenario {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let path = path.as_ref();
        debug!("loading scenario from {}", path.display());

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        let mut scenario = Self::from_json(&contents)
            .with_context(|| format!("Failed to parse scenario {}", path.display()))?;
        scenario.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

        Ok(scenario)
    }

    pub fn from_json(json: &str) -> Result<Self, anyhow::Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn algorithm(&self) -> Result<Algorithm, anyhow::Error> {
        Ok(self.algorithm.parse::<Algorithm>()?)
    }

    /// Resolve a path from the scenario against the directory the scenario was loaded from
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.base_dir.join(path)
    }

    pub fn artifacts_base(&self) -> Option<PathBuf> {
        self.artifacts.as_deref().map(|p| self.resolve(p))
    }

    /// Build the maze and place all treasures on it
    pub fn build_maze(&self) -> Result<GridMaze, anyhow::Error> {
        let mut maze = match &self.maze {
            MazeLayout::Text(rows) => parse_text(rows)?,
            MazeLayout::Image(path) => {
                let path = self.resolve(path);
                let img = image::open(&path)
                    .with_context(|| format!("Failed to open maze image {}", path.display()))?;
                parse_img(&img)?
            }
        };

        for t in &self.treasures {
            maze.set_treasure(Point::new(t.row, t.col), Treasure::new(t.weight, t.value))?;
        }

        Ok(maze)
    }
}
