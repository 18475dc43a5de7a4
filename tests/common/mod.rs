//! Shared test fixture: in-memory fakes for the mdadm/losetup/dd adapters
//! plus a temp-directory environment with two storage mounts.

#![allow(dead_code)]

use fraid::config::GIB;
use fraid::error::{Error, Result};
use fraid::sys::{Allocator, ArrayService, LoopService};
use fraid::{ConfigStore, Engine};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tempfile::TempDir;

/// Mutable fake kernel state shared by the three adapter roles.
#[derive(Default)]
pub struct SysState {
    /// Backing file -> loop device.
    pub loops: BTreeMap<PathBuf, String>,
    /// Array name -> device list it was assembled from.
    pub arrays: BTreeMap<String, Vec<String>>,
    /// Next loop device number to hand out.
    pub next_loop: usize,
    /// Every allocation performed, in call order.
    pub allocations: Vec<PathBuf>,
    /// Every assemble call, in call order.
    pub assembled: Vec<(String, Vec<String>)>,
    /// Fail allocations for files under this directory.
    pub fail_allocation_in: Option<PathBuf>,
    /// Fail the next assemble calls.
    pub fail_assemble: bool,
    /// Fail loop-binding queries.
    pub fail_bindings: bool,
}

/// Fake system implementing all three adapter traits over shared state.
#[derive(Clone, Default)]
pub struct FakeSys(Arc<Mutex<SysState>>);

impl FakeSys {
    pub fn state(&self) -> MutexGuard<'_, SysState> {
        self.0.lock().unwrap()
    }
}

impl Allocator for FakeSys {
    fn allocate(&self, file: &Path, size_gib: u64) -> Result<()> {
        {
            let mut state = self.state();
            if let Some(dir) = &state.fail_allocation_in {
                if file.starts_with(dir) {
                    return Err(Error::AllocationFailed {
                        file: file.to_path_buf(),
                        details: "no space left on device".to_string(),
                    });
                }
            }
            state.allocations.push(file.to_path_buf());
        }
        // Sparse file of the right apparent size.
        let handle = std::fs::File::create(file)?;
        handle.set_len(size_gib * GIB)?;
        Ok(())
    }
}

impl LoopService for FakeSys {
    fn attach(&self, file: &Path) -> Result<String> {
        if !file.is_file() {
            return Err(Error::LoopAttachFailed {
                file: file.to_path_buf(),
                details: "No such file or directory".to_string(),
            });
        }
        let mut state = self.state();
        let device = format!("/dev/loop{}", state.next_loop);
        state.next_loop += 1;
        state.loops.insert(file.to_path_buf(), device.clone());
        Ok(device)
    }

    fn detach(&self, device: &str) -> Result<()> {
        self.state().loops.retain(|_, bound| bound != device);
        Ok(())
    }

    fn bindings(&self) -> Result<BTreeMap<PathBuf, String>> {
        let state = self.state();
        if state.fail_bindings {
            return Err(Error::SystemQuery {
                program: "losetup".to_string(),
                details: "permission denied".to_string(),
            });
        }
        Ok(state.loops.clone())
    }
}

impl ArrayService for FakeSys {
    fn assemble(&self, name: &str, level: u32, devices: &[String]) -> Result<()> {
        assert_eq!(level, 0, "fraid arrays are always striped");
        let mut state = self.state();
        if state.fail_assemble {
            return Err(Error::ArrayCreateFailed {
                name: name.to_string(),
                details: "device or resource busy".to_string(),
            });
        }
        state
            .assembled
            .push((name.to_string(), devices.to_vec()));
        state.arrays.insert(name.to_string(), devices.to_vec());
        Ok(())
    }

    fn stop(&self, name: &str) -> Result<()> {
        if self.state().arrays.remove(name).is_none() {
            return Err(Error::ArrayStopFailed {
                name: name.to_string(),
                details: "no such array".to_string(),
            });
        }
        Ok(())
    }

    fn active(&self) -> Result<std::collections::BTreeSet<String>> {
        Ok(self.state().arrays.keys().cloned().collect())
    }
}

/// Engine over fakes plus two storage directories and a temp config dir.
pub struct TestEnv {
    pub tmp: TempDir,
    pub sys: FakeSys,
    pub engine: Engine<FakeSys, FakeSys, FakeSys>,
    pub dir_a: PathBuf,
    pub dir_b: PathBuf,
}

pub fn setup() -> TestEnv {
    let tmp = TempDir::new().expect("failed to create temp dir");
    let dir_a = tmp.path().join("mnt_a");
    let dir_b = tmp.path().join("mnt_b");
    std::fs::create_dir(&dir_a).unwrap();
    std::fs::create_dir(&dir_b).unwrap();

    let store = ConfigStore::open(tmp.path().join("etc_fraid")).unwrap();
    let sys = FakeSys::default();
    let engine = Engine::new(store, sys.clone(), sys.clone(), sys.clone());

    TestEnv {
        tmp,
        sys,
        engine,
        dir_a,
        dir_b,
    }
}
