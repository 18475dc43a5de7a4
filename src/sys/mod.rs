//! External service adapters.
//!
//! This module defines the narrow interfaces the lifecycle engine talks
//! through and their process-backed implementations:
//! - Array assembly and teardown via `mdadm`
//! - Loop bindings via `losetup`
//! - Zero-filled file allocation via `dd`

mod alloc;
mod losetup;
mod mdadm;

pub use alloc::ZeroFill;
pub use losetup::Losetup;
pub use mdadm::Mdadm;

use crate::error::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Array-management service: assembles and stops striped block devices.
pub trait ArrayService {
    /// Assemble an array named `name` at the given RAID level from an
    /// ordered device list.
    fn assemble(&self, name: &str, level: u32, devices: &[String]) -> Result<()>;

    /// Stop the array device for `name`.
    fn stop(&self, name: &str) -> Result<()>;

    /// Names of all currently active arrays. Empty if the array namespace
    /// does not exist.
    fn active(&self) -> Result<BTreeSet<String>>;
}

/// Loop-device service: binds regular files to virtual block devices.
pub trait LoopService {
    /// Create a new loop binding for `file` and return the device path.
    fn attach(&self, file: &Path) -> Result<String>;

    /// Release the binding held by `device`.
    fn detach(&self, device: &str) -> Result<()>;

    /// Current bindings, keyed by backing file path. Empty if none exist.
    fn bindings(&self) -> Result<BTreeMap<PathBuf, String>>;
}

/// File-allocation service. `Sync` so allocations can run on scoped
/// threads, one per storage directory.
pub trait Allocator: Sync {
    /// Create a zero-filled file of `size_gib` GiB at `file`.
    fn allocate(&self, file: &Path, size_gib: u64) -> Result<()>;
}

/// Run a command and return its trimmed stdout, mapping any spawn failure
/// or non-zero exit to [`Error::SystemQuery`].
fn run_capture(mut cmd: Command, program: &str) -> Result<String> {
    let output = cmd
        .stdin(Stdio::null())
        .output()
        .map_err(|e| Error::SystemQuery {
            program: program.to_string(),
            details: e.to_string(),
        })?;
    if !output.status.success() {
        return Err(Error::SystemQuery {
            program: program.to_string(),
            details: stderr_excerpt(&output.stderr, output.status.code()),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Condense captured stderr into a single error detail line.
fn stderr_excerpt(stderr: &[u8], code: Option<i32>) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    if text.is_empty() {
        match code {
            Some(code) => format!("exited with status {}", code),
            None => "terminated by signal".to_string(),
        }
    } else {
        text.lines().last().unwrap_or(text).to_string()
    }
}
