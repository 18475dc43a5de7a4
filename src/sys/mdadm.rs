//! Array management through the `mdadm` utility.

use crate::config::MD_DEVICE_DIR;
use crate::error::{Error, Result};
use crate::sys::{run_capture, stderr_excerpt, ArrayService};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// Adapter that shells out to `mdadm` and reads the md device namespace.
pub struct Mdadm {
    md_dir: PathBuf,
}

impl Mdadm {
    /// Adapter over the standard `/dev/md` namespace.
    pub fn new() -> Self {
        Self {
            md_dir: PathBuf::from(MD_DEVICE_DIR),
        }
    }

    /// Adapter over an alternate namespace directory.
    pub fn with_md_dir(md_dir: impl Into<PathBuf>) -> Self {
        Self {
            md_dir: md_dir.into(),
        }
    }

    /// Check that the `mdadm` binary is present and runnable. Fatal at
    /// startup if it is not.
    pub fn ensure_installed(&self) -> Result<()> {
        let mut cmd = Command::new("mdadm");
        cmd.arg("--help");
        run_capture(cmd, "mdadm")?;
        Ok(())
    }

    fn device_path(&self, name: &str) -> PathBuf {
        self.md_dir.join(name)
    }
}

impl Default for Mdadm {
    fn default() -> Self {
        Self::new()
    }
}

impl ArrayService for Mdadm {
    fn assemble(&self, name: &str, level: u32, devices: &[String]) -> Result<()> {
        let device = self.device_path(name);
        debug!("assembling {} from {} devices", device.display(), devices.len());

        // mdadm asks for confirmation before clobbering file contents;
        // answer yes on stdin as the interactive tool would.
        let mut child = Command::new("mdadm")
            .arg("--create")
            .arg(&device)
            .arg(format!("--level={}", level))
            .arg(format!("--raid-devices={}", devices.len()))
            .args(devices)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::ArrayCreateFailed {
                name: name.to_string(),
                details: e.to_string(),
            })?;

        if let Some(stdin) = child.stdin.as_mut() {
            // Ignore a closed pipe: mdadm may not ask at all.
            let _ = stdin.write_all(b"y\n");
        }

        let output = child
            .wait_with_output()
            .map_err(|e| Error::ArrayCreateFailed {
                name: name.to_string(),
                details: e.to_string(),
            })?;
        if !output.status.success() {
            return Err(Error::ArrayCreateFailed {
                name: name.to_string(),
                details: stderr_excerpt(&output.stderr, output.status.code()),
            });
        }
        Ok(())
    }

    fn stop(&self, name: &str) -> Result<()> {
        let device = self.device_path(name);
        debug!("stopping array {}", device.display());

        let mut cmd = Command::new("mdadm");
        cmd.arg("--stop").arg(&device);
        run_capture(cmd, "mdadm").map_err(|e| match e {
            Error::SystemQuery { details, .. } => Error::ArrayStopFailed {
                name: name.to_string(),
                details,
            },
            other => other,
        })?;
        Ok(())
    }

    fn active(&self) -> Result<BTreeSet<String>> {
        active_in(&self.md_dir)
    }
}

/// List array names present under `md_dir`; a missing directory means no
/// array is active.
fn active_in(md_dir: &Path) -> Result<BTreeSet<String>> {
    let entries = match std::fs::read_dir(md_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeSet::new()),
        Err(e) => return Err(e.into()),
    };
    let mut names = BTreeSet::new();
    for entry in entries {
        let entry = entry?;
        if let Some(name) = entry.file_name().to_str() {
            names.insert(name.to_string());
        }
    }
    Ok(names)
}
