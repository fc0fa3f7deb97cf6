use std::{
    ffi::OsString,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use log::debug;

use crate::{knapsack::RecursionTrace, table::DpTable};

/// Destination for the diagnostic side channels of the knapsack solvers. Each solve hands over at
/// most one trace (recursive) or one table (dynamic).
pub trait ArtifactSink {
    fn record_trace(&mut self, trace: &RecursionTrace) -> io::Result<()>;
    fn record_table(&mut self, table: &DpTable) -> io::Result<()>;
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoArtifacts;

impl ArtifactSink for NoArtifacts {
    fn record_trace(&mut self, _trace: &RecursionTrace) -> io::Result<()> {
        Ok(())
    }

    fn record_table(&mut self, _table: &DpTable) -> io::Result<()> {
        Ok(())
    }
}

/// Keeps the last trace and table in memory
#[derive(Debug, Default, Clone)]
pub struct MemoryArtifacts {
    pub trace: Option<RecursionTrace>,
    pub table: Option<DpTable>,
}

impl ArtifactSink for MemoryArtifacts {
    fn record_trace(&mut self, trace: &RecursionTrace) -> io::Result<()> {
        self.trace = Some(*trace);
        Ok(())
    }

    fn record_table(&mut self, table: &DpTable) -> io::Result<()> {
        self.table = Some(table.clone());
        Ok(())
    }
}

/// Writes `<base>.txt` (base case count) and `<base>.csv` (DP table) next to each other
#[derive(Debug, Clone)]
pub struct FileArtifacts {
    base: PathBuf,
}

impl FileArtifacts {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn trace_path(&self) -> PathBuf {
        self.with_suffix(".txt")
    }

    pub fn table_path(&self) -> PathBuf {
        self.with_suffix(".csv")
    }

    // not `with_extension`, a base like "run.v2" must keep its dot
    fn with_suffix(&self, suffix: &str) -> PathBuf {
        let mut name = OsString::from(self.base.as_os_str());
        name.push(suffix);
        PathBuf::from(name)
    }

    fn create(path: &Path) -> io::Result<fs::File> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::File::create(path)
    }
}

impl ArtifactSink for FileArtifacts {
    fn record_trace(&mut self, trace: &RecursionTrace) -> io::Result<()> {
        let path = self.trace_path();
        debug!("writing recursion trace to {}", path.display());
        let mut file = Self::create(&path)?;
        write!(file, "{}", trace.base_cases)
    }

    fn record_table(&mut self, table: &DpTable) -> io::Result<()> {
        let path = self.table_path();
        debug!("writing dp table to {}", path.display());
        let mut file = Self::create(&path)?;
        write!(file, "{}", table)
    }
}
