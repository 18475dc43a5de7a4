//! fraid - striped virtual disks backed by ordinary files.
//!
//! A fraid is a RAID-0 volume assembled from equal-size backing files,
//! each living on a different physical directory or mount. The crate
//! keeps the bookkeeping honest: which fraids are defined, which
//! directories back them, and how the persisted records line up with the
//! live loop and md device state.
//!
//! # Architecture
//!
//! ```text
//! Command -> Lifecycle Engine -> Inventory snapshot + Config Store
//!                             -> mdadm / losetup / dd adapters
//! ```
//!
//! The engine re-reads both the config store and a fresh device inventory
//! before every decision; nothing live is cached between commands.
//!
//! # Example
//!
//! ```rust,no_run
//! use fraid::{ConfigStore, Engine};
//! use fraid::sys::{Losetup, Mdadm, ZeroFill};
//! use std::path::PathBuf;
//!
//! let store = ConfigStore::open("/etc/fraid").unwrap();
//! let engine = Engine::new(store, Mdadm::new(), Losetup::new(), ZeroFill);
//!
//! // Create a 1 GiB-per-file fraid striped over two mounts.
//! let dirs = vec![PathBuf::from("/mnt/a"), PathBuf::from("/mnt/b")];
//! engine.create("myraid", 1, &dirs).unwrap();
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod inventory;
pub mod shell;
pub mod store;
pub mod sys;

pub use engine::{Engine, FraidStatus};
pub use error::{Error, Result};
pub use store::ConfigStore;
