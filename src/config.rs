//! Configuration constants and path helpers for fraid.

use std::path::{Path, PathBuf};

/// Default directory holding one config record per fraid.
pub const DEFAULT_CONFIG_DIR: &str = "/etc/fraid";

/// Namespace where assembled array devices appear.
pub const MD_DEVICE_DIR: &str = "/dev/md";

/// Extension of the backing file placed in each storage directory.
pub const BACKING_SUFFIX: &str = "fdisk";

/// RAID level used for every fraid (striping, no parity).
pub const STRIPE_LEVEL: u32 = 0;

/// One GiB, the allocation unit for backing files.
pub const GIB: u64 = 1 << 30;

/// Decimal divisor used when reporting capacity in GB.
///
/// The original tool divides by 10^9, not 2^30; kept for compatible output.
pub const GB: u64 = 1_000_000_000;

/// Check that a fraid name is non-empty and uses only `[A-Za-z0-9_]`.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Path of the backing file for `name` inside `dir`.
pub fn backing_file(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.{}", name, BACKING_SUFFIX))
}

/// Path of the array device for `name`.
pub fn array_device(name: &str) -> PathBuf {
    Path::new(MD_DEVICE_DIR).join(name)
}
