use std::thread::JoinHandle;
use std::time::Duration;

use super::{Native, System, SystemError};

/// Scheduling priority of a thread, from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ThreadPriority {
    Idle,
    Lowest,
    Low,
    #[default]
    Normal,
    High,
    Highest,
    Realtime,
}

/// A set of up to 64 CPUs, as used for thread affinity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CpuSet(u64);

impl CpuSet {
    pub const CAPACITY: usize = u64::BITS as usize;

    pub const fn empty() -> CpuSet {
        CpuSet(0)
    }

    pub const fn from_bits(bits: u64) -> CpuSet {
        CpuSet(bits)
    }

    pub const fn bits(&self) -> u64 {
        self.0
    }

    /// Returns a copy of this set with `cpu` added. CPUs beyond [`CAPACITY`](CpuSet::CAPACITY) are
    /// ignored.
    pub const fn with(self, cpu: usize) -> CpuSet {
        if cpu < CpuSet::CAPACITY {
            CpuSet(self.0 | 1 << cpu)
        } else {
            self
        }
    }

    pub const fn contains(&self, cpu: usize) -> bool {
        cpu < CpuSet::CAPACITY && self.0 & 1 << cpu != 0
    }

    pub const fn count(&self) -> u32 {
        self.0.count_ones()
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..CpuSet::CAPACITY).filter(|cpu| self.contains(*cpu))
    }
}

impl FromIterator<usize> for CpuSet {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> CpuSet {
        iter.into_iter().fold(CpuSet::empty(), CpuSet::with)
    }
}

pub fn current_thread_id() -> u64 {
    Native::current_thread_id()
}

/// The CPU the calling thread is running on right now.
pub fn current_cpu() -> u32 {
    Native::current_cpu()
}

pub fn affinity() -> Result<CpuSet, SystemError> {
    Native::affinity(Native::current_thread())
}

/// The CPUs the thread behind `handle` may run on.
pub fn affinity_of<T>(handle: &JoinHandle<T>) -> Result<CpuSet, SystemError> {
    Native::affinity(Native::thread_of(handle))
}

pub fn set_affinity(cpus: CpuSet) -> Result<(), SystemError> {
    log::trace!("set thread affinity to {:#x}", cpus.bits());
    Native::set_affinity(Native::current_thread(), cpus)
}

pub fn set_affinity_of<T>(handle: &JoinHandle<T>, cpus: CpuSet) -> Result<(), SystemError> {
    log::trace!("set affinity of thread {:?} to {:#x}", handle.thread().id(), cpus.bits());
    Native::set_affinity(Native::thread_of(handle), cpus)
}

pub fn priority() -> Result<ThreadPriority, SystemError> {
    Native::priority(Native::current_thread())
}

pub fn priority_of<T>(handle: &JoinHandle<T>) -> Result<ThreadPriority, SystemError> {
    Native::priority(Native::thread_of(handle))
}

/// Changes the priority of the calling thread. On POSIX this switches the thread to round-robin
/// scheduling, which usually requires elevated privileges.
pub fn set_priority(priority: ThreadPriority) -> Result<(), SystemError> {
    log::trace!("set thread priority to {priority:?}");
    Native::set_priority(Native::current_thread(), priority)
}

/// Like [`set_priority`], for the thread behind `handle`.
pub fn set_priority_of<T>(handle: &JoinHandle<T>, priority: ThreadPriority) -> Result<(), SystemError> {
    log::trace!("set priority of thread {:?} to {priority:?}", handle.thread().id());
    Native::set_priority(Native::thread_of(handle), priority)
}

/// Sleeps for at least `duration`, resuming after interruptions. A zero duration yields instead.
pub fn sleep(duration: Duration) {
    Native::sleep(duration);
}

pub fn yield_now() {
    Native::yield_now();
}
