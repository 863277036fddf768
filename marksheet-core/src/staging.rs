use crate::error::ScoreError;
use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Explicit run context replacing process-global staging directories.
///
/// Owns the on-disk layout for exactly one scoring run: the caller stages
/// this candidate's input documents directly under `dir`, intermediate
/// tabular artifacts land under `dir/work`, and the emitter purges
/// everything once the report is out. Concurrent runs must use separate
/// contexts — nothing here locks.
pub struct RunContext {
    run_id: Uuid,
    dir: PathBuf,
}

impl RunContext {
    /// Open a staging directory that already holds this run's inputs
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(dir.join("work"))?;
        Ok(Self {
            run_id: Uuid::new_v4(),
            dir,
        })
    }

    /// Create a fresh run-scoped staging directory under `root`
    pub fn create_under(root: &Path) -> Result<Self> {
        let run_id = Uuid::new_v4();
        let dir = root.join(run_id.to_string());
        fs::create_dir_all(dir.join("work"))?;
        Ok(Self { run_id, dir })
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn work_dir(&self) -> PathBuf {
        self.dir.join("work")
    }

    pub fn responses_table(&self) -> PathBuf {
        self.work_dir().join("response_data.json")
    }

    pub fn key_table(&self) -> PathBuf {
        self.work_dir().join("correct_answers.json")
    }

    pub fn comparison_table(&self) -> PathBuf {
        self.work_dir().join("comparison.json")
    }

    /// Staged input documents, sorted by path for deterministic
    /// processing order
    pub fn staged_files(&self) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Remove staged inputs and every intermediate artifact.
    ///
    /// Unconditional cleanup, not error recovery — missing files are fine.
    /// Directory removal itself is best-effort since the caller may own
    /// the staging root.
    pub fn purge(&self) -> Result<()> {
        for table in [
            self.responses_table(),
            self.key_table(),
            self.comparison_table(),
        ] {
            remove_if_present(&table)?;
        }
        fs::remove_dir(self.work_dir()).ok();

        if self.dir.exists() {
            for path in self.staged_files()? {
                remove_if_present(&path)?;
            }
            fs::remove_dir(&self.dir).ok();
        }
        Ok(())
    }
}

fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Persist a record table as a JSON artifact
pub fn write_table<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json)?;
    Ok(())
}

/// Re-read a record table. Shape drift in the artifact (missing or
/// mistyped fields) surfaces as [`ScoreError::SchemaMismatch`].
pub fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let json = fs::read_to_string(path)?;
    let records = serde_json::from_str(&json).map_err(|e| ScoreError::SchemaMismatch {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(records)
}
