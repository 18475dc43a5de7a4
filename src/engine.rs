//! Lifecycle engine: the state machine behind every fraid command.
//!
//! A fraid is in one of three states: undefined (no config record),
//! defined-inactive (record exists, no array device), or defined-active
//! (record exists, array device present). Every public method re-reads
//! the config store and takes a fresh device [`Inventory`] snapshot
//! before deciding anything, validates the requested transition, and only
//! then touches the external services.

use crate::config::{backing_file, GB, STRIPE_LEVEL};
use crate::error::{Error, Result};
use crate::inventory::Inventory;
use crate::store::ConfigStore;
use crate::sys::{Allocator, ArrayService, LoopService};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::thread;
use tracing::{debug, info, warn};

/// Report line for one fraid, produced by [`Engine::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FraidStatus {
    pub name: String,
    pub active: bool,
    /// Total capacity in decimal GB (per-file size x file count / 10^9).
    pub capacity_gb: u64,
    /// Backing files in striping order.
    pub files: Vec<PathBuf>,
}

/// Lifecycle engine over a config store and the three external services.
pub struct Engine<A, L, Z> {
    store: ConfigStore,
    arrays: A,
    loops: L,
    alloc: Z,
}

impl<A, L, Z> Engine<A, L, Z>
where
    A: ArrayService,
    L: LoopService,
    Z: Allocator,
{
    pub fn new(store: ConfigStore, arrays: A, loops: L, alloc: Z) -> Self {
        Self {
            store,
            arrays,
            loops,
            alloc,
        }
    }

    /// Define a new fraid: allocate one backing file per directory (in
    /// parallel), persist the config record, then activate it.
    ///
    /// All validation happens before any file is touched. A failed
    /// allocation is not rolled back: files already written stay behind,
    /// but no config record is created.
    pub fn create(&self, name: &str, size_gib: u64, dirs: &[PathBuf]) -> Result<()> {
        if !crate::config::is_valid_name(name) {
            return Err(Error::InvalidName(name.to_string()));
        }
        if size_gib == 0 {
            return Err(Error::InvalidSize(size_gib.to_string()));
        }
        let mut seen = HashSet::new();
        for dir in dirs {
            if !seen.insert(dir) {
                return Err(Error::DuplicateDirectory(dir.clone()));
            }
        }
        if self.store.contains(name) {
            return Err(Error::AlreadyExists(name.to_string()));
        }

        let files: Vec<PathBuf> = dirs.iter().map(|d| backing_file(d, name)).collect();
        info!("allocating {} backing files for fraid {}", files.len(), name);

        // One allocation task per directory; join all before going on.
        let alloc = &self.alloc;
        let results: Vec<Result<()>> = thread::scope(|scope| {
            let handles: Vec<_> = files
                .iter()
                .map(|file| scope.spawn(move || alloc.allocate(file, size_gib)))
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle.join().unwrap_or_else(|_| {
                        Err(Error::SystemQuery {
                            program: "allocate".to_string(),
                            details: "allocation task panicked".to_string(),
                        })
                    })
                })
                .collect()
        });

        if let Some(err) = results.into_iter().find_map(Result::err) {
            let leftover: Vec<_> = files.iter().filter(|f| f.exists()).collect();
            if !leftover.is_empty() {
                warn!(
                    "fraid {} not created; leftover backing files: {:?}",
                    name, leftover
                );
            }
            return Err(err);
        }

        self.store.create(name, dirs)?;
        self.activate(name)
    }

    /// Bring a fraid up: bind every backing file to a loop device (reusing
    /// live bindings) and assemble the striped array in record order.
    pub fn activate(&self, name: &str) -> Result<()> {
        let dirs = self.store.read(name)?;
        let inventory = Inventory::snapshot(&self.loops, &self.arrays)?;
        if inventory.is_active(name) {
            return Err(Error::AlreadyActive(name.to_string()));
        }

        // Directory order in the record is the striping order; the device
        // list below must follow it exactly.
        let mut devices = Vec::with_capacity(dirs.len());
        for dir in &dirs {
            let file = backing_file(dir, name);
            let device = match inventory.binding(&file) {
                Some(device) => {
                    debug!("reusing loop device {} for {}", device, file.display());
                    device.to_string()
                }
                None => self.loops.attach(&file)?,
            };
            devices.push(device);
        }

        self.arrays.assemble(name, STRIPE_LEVEL, &devices)?;
        info!("assembled array for fraid {}", name);
        Ok(())
    }

    /// Bring a fraid down: stop its array, then release the loop bindings
    /// of its backing files.
    pub fn deactivate(&self, name: &str) -> Result<()> {
        let dirs = self.store.read(name)?;
        let inventory = Inventory::snapshot(&self.loops, &self.arrays)?;
        if !inventory.is_active(name) {
            return Err(Error::NotActive(name.to_string()));
        }

        self.arrays.stop(name)?;

        // Re-query after the stop; bindings may have shifted while the
        // array was being torn down.
        let inventory = Inventory::snapshot(&self.loops, &self.arrays)?;
        for dir in &dirs {
            let file = backing_file(dir, name);
            if let Some(device) = inventory.binding(&file) {
                self.loops.detach(device)?;
            }
        }
        info!("fraid {} deactivated", name);
        Ok(())
    }

    /// Destroy a fraid: remove every backing file and the config record.
    ///
    /// `confirm` is consulted after the preconditions pass; returning
    /// `false` aborts with no side effect. Returns whether anything was
    /// deleted. Backing files already missing are skipped so a damaged
    /// fraid can still be removed.
    pub fn delete(&self, name: &str, confirm: impl FnOnce() -> bool) -> Result<bool> {
        let dirs = self.store.read(name)?;
        let inventory = Inventory::snapshot(&self.loops, &self.arrays)?;
        if inventory.is_active(name) {
            return Err(Error::StillActive(name.to_string()));
        }
        if !confirm() {
            return Ok(false);
        }

        for dir in &dirs {
            let file = backing_file(dir, name);
            match fs::remove_file(&file) {
                Ok(()) => debug!("removed {}", file.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!("backing file {} was already gone", file.display());
                }
                Err(e) => return Err(e.into()),
            }
        }
        self.store.delete(name)?;
        info!("fraid {} deleted", name);
        Ok(true)
    }

    /// Status of every defined fraid: name, activity, capacity, files.
    pub fn list(&self) -> Result<Vec<FraidStatus>> {
        let inventory = Inventory::snapshot(&self.loops, &self.arrays)?;
        let mut statuses = Vec::new();
        for name in self.store.names()? {
            let dirs = self.store.read(&name)?;
            let files: Vec<PathBuf> = dirs.iter().map(|d| backing_file(d, &name)).collect();
            // Stripe members are equal-size; the first file's size stands
            // for all of them, 0 if it is missing.
            let per_file = files
                .first()
                .and_then(|f| fs::metadata(f).ok())
                .map(|m| m.len())
                .unwrap_or(0);
            statuses.push(FraidStatus {
                active: inventory.is_active(&name),
                capacity_gb: per_file * files.len() as u64 / GB,
                name,
                files,
            });
        }
        Ok(statuses)
    }
}
