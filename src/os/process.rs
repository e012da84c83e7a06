use std::process;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use super::{Native, System, SystemError};
use crate::path::{OwnedPath, Path};

static INITIAL: OnceLock<Result<OwnedPath, SystemError>> = OnceLock::new();
static UNIQUE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// The current working directory of the process.
pub fn current() -> Result<OwnedPath, SystemError> {
    Native::current_dir()
}

pub fn set_current<P: AsRef<Path>>(path: P) -> Result<(), SystemError> {
    let path = path.as_ref();
    capture_initial();
    log::trace!("set current directory to {path}");
    Native::set_current_dir(path)
}

/// The working directory captured the first time this module is used, other than through
/// [`current`]. Later calls return the same value even after [`set_current`].
pub fn initial() -> Result<OwnedPath, SystemError> {
    INITIAL.get_or_init(current).clone()
}

/// The path of the running executable.
pub fn executable() -> Result<OwnedPath, SystemError> {
    capture_initial();
    Native::executable()
}

pub fn home() -> Result<OwnedPath, SystemError> {
    capture_initial();
    Native::home_dir()
}

pub fn temp() -> Result<OwnedPath, SystemError> {
    capture_initial();
    Native::temp_dir()
}

/// A relative filename that is very unlikely to exist anywhere, built from the current time, the
/// process id and a per-process counter.
pub fn unique() -> OwnedPath {
    capture_initial();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos());
    let count = UNIQUE_COUNTER.fetch_add(1, Ordering::Relaxed);
    OwnedPath::from(format!("{nanos:x}-{:x}-{count:x}", process::id()))
}

fn capture_initial() {
    let _ = INITIAL.get_or_init(current);
}
