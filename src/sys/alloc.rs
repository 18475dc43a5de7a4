//! Zero-filled backing file allocation through `dd`.

use crate::error::{Error, Result};
use crate::sys::{stderr_excerpt, Allocator};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// Adapter that shells out to `dd if=/dev/zero` for allocation.
pub struct ZeroFill;

impl Allocator for ZeroFill {
    fn allocate(&self, file: &Path, size_gib: u64) -> Result<()> {
        debug!("allocating {} GiB at {}", size_gib, file.display());
        let output = Command::new("dd")
            .arg("if=/dev/zero")
            .arg(format!("of={}", file.display()))
            .arg("bs=1G")
            .arg(format!("count={}", size_gib))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| Error::AllocationFailed {
                file: file.to_path_buf(),
                details: e.to_string(),
            })?;
        if !output.status.success() {
            return Err(Error::AllocationFailed {
                file: file.to_path_buf(),
                details: stderr_excerpt(&output.stderr, output.status.code()),
            });
        }
        Ok(())
    }
}
