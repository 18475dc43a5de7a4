//! Live device inventory, recomputed fresh for every command.

use crate::error::Result;
use crate::sys::{ArrayService, LoopService};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Snapshot of the loop and array namespaces at one point in time.
///
/// Never cached across commands: kernel state can change underneath the
/// tool, so decisions are always made against a snapshot taken just
/// before them.
#[derive(Debug, Default)]
pub struct Inventory {
    /// Backing file path to bound loop device.
    pub loops: BTreeMap<PathBuf, String>,
    /// Names of currently assembled arrays.
    pub arrays: BTreeSet<String>,
}

impl Inventory {
    /// Query both namespaces and return a normalized snapshot.
    pub fn snapshot(loops: &impl LoopService, arrays: &impl ArrayService) -> Result<Self> {
        Ok(Self {
            loops: loops.bindings()?,
            arrays: arrays.active()?,
        })
    }

    /// Whether an array device exists for `name`.
    pub fn is_active(&self, name: &str) -> bool {
        self.arrays.contains(name)
    }

    /// Loop device currently bound to `file`, if any.
    pub fn binding(&self, file: &Path) -> Option<&str> {
        self.loops.get(file).map(String::as_str)
    }
}
