//! Loop bindings through the `losetup` utility.

use crate::error::{Error, Result};
use crate::sys::{run_capture, LoopService};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Adapter that shells out to `losetup`.
pub struct Losetup;

impl Losetup {
    pub fn new() -> Self {
        Self
    }

    /// Attempt to load the loop kernel module. Callers treat failure as a
    /// warning; the module may already be built in.
    pub fn enable_module(&self) -> Result<()> {
        let mut cmd = Command::new("modprobe");
        cmd.arg("loop");
        run_capture(cmd, "modprobe")?;
        Ok(())
    }
}

impl Default for Losetup {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopService for Losetup {
    fn attach(&self, file: &Path) -> Result<String> {
        debug!("attaching loop device for {}", file.display());
        let mut cmd = Command::new("losetup");
        cmd.arg("-f").arg("--show").arg(file);
        run_capture(cmd, "losetup").map_err(|e| match e {
            Error::SystemQuery { details, .. } => Error::LoopAttachFailed {
                file: file.to_path_buf(),
                details,
            },
            other => other,
        })
    }

    fn detach(&self, device: &str) -> Result<()> {
        debug!("detaching loop device {}", device);
        let mut cmd = Command::new("losetup");
        cmd.arg("-d").arg(device);
        run_capture(cmd, "losetup").map_err(|e| match e {
            Error::SystemQuery { details, .. } => Error::LoopDetachFailed {
                device: device.to_string(),
                details,
            },
            other => other,
        })?;
        Ok(())
    }

    fn bindings(&self) -> Result<BTreeMap<PathBuf, String>> {
        let mut cmd = Command::new("losetup");
        cmd.arg("-a");
        let output = run_capture(cmd, "losetup")?;
        Ok(output.lines().filter_map(parse_binding).collect())
    }
}

/// Parse one `losetup -a` line into a (backing file, device) pair.
///
/// Lines look like `/dev/loop0: []: (/mnt/a/myraid.fdisk)`; the device is
/// everything before the first colon and the file sits in the final
/// parenthesized group.
fn parse_binding(line: &str) -> Option<(PathBuf, String)> {
    let device = line.split(':').next()?.trim();
    let start = line.rfind('(')?;
    let end = line.rfind(')')?;
    if device.is_empty() || end <= start + 1 {
        return None;
    }
    let file = &line[start + 1..end];
    Some((PathBuf::from(file), device.to_string()))
}
