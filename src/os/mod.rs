//! A thin wrapper around the operating system services that consume paths.
//!
//! Each supported platform family has one backend implementing [`System`], and [`Native`] names the
//! one this crate was built for. The free functions in [`thread`], [`metadata`] and [`process`]
//! forward to [`Native`] and are what most callers should use.

mod error;
pub mod metadata;
pub mod process;
pub mod thread;

#[cfg(target_os = "linux")]
mod posix;
#[cfg(windows)]
mod windows;

mod tests;

use std::thread::JoinHandle;
use std::time::Duration;

pub use error::*;
pub use metadata::{Attributes, FileType, Metadata, Permissions};
pub use thread::{CpuSet, ThreadPriority};

#[cfg(target_os = "linux")]
pub use posix::Posix;
#[cfg(windows)]
pub use windows::Windows;

use crate::path::{OwnedPath, Path};
use crate::util::sealed::Sealed;

#[cfg(target_os = "linux")]
pub type Native = Posix;
#[cfg(windows)]
pub type Native = Windows;

/// The calls a platform backend provides. Backends are uninhabited types, so every method is an
/// associated function.
pub trait System: Sealed {
    /// The native handle of a thread: `pthread_t` or a thread `HANDLE`.
    type Thread: Copy;

    fn current_thread_id() -> u64;

    fn current_cpu() -> u32;

    fn current_thread() -> Self::Thread;

    /// The native handle of a spawned thread. Only valid while `handle` is borrowed.
    fn thread_of<T>(handle: &JoinHandle<T>) -> Self::Thread;

    fn affinity(thread: Self::Thread) -> Result<CpuSet, SystemError>;

    fn set_affinity(thread: Self::Thread, cpus: CpuSet) -> Result<(), SystemError>;

    fn priority(thread: Self::Thread) -> Result<ThreadPriority, SystemError>;

    fn set_priority(thread: Self::Thread, priority: ThreadPriority) -> Result<(), SystemError>;

    fn sleep(duration: Duration);

    fn yield_now();

    /// Reads the metadata of `path`. With `follow_links` false, a final symlink is described
    /// rather than its target.
    fn metadata(path: &Path, follow_links: bool) -> Result<Metadata, SystemError>;

    fn set_permissions(path: &Path, permissions: Permissions) -> Result<(), SystemError>;

    fn set_attributes(path: &Path, attributes: Attributes) -> Result<(), SystemError>;

    fn current_dir() -> Result<OwnedPath, SystemError>;

    fn set_current_dir(path: &Path) -> Result<(), SystemError>;

    fn executable() -> Result<OwnedPath, SystemError>;

    fn home_dir() -> Result<OwnedPath, SystemError>;

    fn temp_dir() -> Result<OwnedPath, SystemError>;
}
