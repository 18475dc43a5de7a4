//! Persistent configuration records, one file per fraid.
//!
//! The on-disk layout is the external contract: a fixed directory holding
//! one plain-text file per fraid, file name = fraid name, content = one
//! storage directory per line in creation order. Existing installations
//! written by earlier versions of the tool read back unchanged.

use crate::error::{Error, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Store of fraid config records under a single directory.
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    /// Open the store, creating the config directory if absent.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Directory this store persists into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether a record exists for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.record_path(name).is_file()
    }

    /// Write a new record. Rejects duplicates even though the engine
    /// checks first.
    pub fn create(&self, name: &str, dirs: &[PathBuf]) -> Result<()> {
        let path = self.record_path(name);
        if path.exists() {
            return Err(Error::AlreadyExists(name.to_string()));
        }
        let mut file = fs::File::create(&path)?;
        for dir in dirs {
            writeln!(file, "{}", dir.display())?;
        }
        Ok(())
    }

    /// Read the ordered directory list for `name`.
    pub fn read(&self, name: &str) -> Result<Vec<PathBuf>> {
        let path = self.record_path(name);
        if !path.is_file() {
            return Err(Error::NotFound(name.to_string()));
        }
        let content = fs::read_to_string(&path)?;
        Ok(content
            .lines()
            .filter(|line| !line.is_empty())
            .map(PathBuf::from)
            .collect())
    }

    /// All fraid names with a record, sorted.
    pub fn names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Remove the record for `name`.
    pub fn delete(&self, name: &str) -> Result<()> {
        let path = self.record_path(name);
        if !path.is_file() {
            return Err(Error::NotFound(name.to_string()));
        }
        fs::remove_file(&path)?;
        Ok(())
    }

    fn record_path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}
