use std::env;
use std::ffi::{CStr, CString, OsString};
use std::mem::{self, MaybeUninit};
use std::os::unix::ffi::OsStringExt;
use std::os::unix::thread::JoinHandleExt;
use std::ptr;
use std::thread::JoinHandle;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use libc::{EINTR, ERANGE, c_char, c_int, stat as Stat};

use super::{
    Attributes, CpuSet, FileType, Metadata, Operation, Permissions, System, SystemError,
    ThreadPriority,
};
use crate::path::{OwnedPath, Path};
use crate::util::{self, sealed::Sealed};

/// The Linux backend, built on `libc`.
pub enum Posix {}

impl Sealed for Posix {}

// SCHED_RR priority for each level, lowest first.
const LEVELS: [c_int; 7] = [1, 15, 30, 50, 70, 85, 99];

pub(crate) const fn level_of(priority: ThreadPriority) -> c_int {
    LEVELS[priority as usize]
}

pub(crate) const fn priority_from_level(level: c_int) -> ThreadPriority {
    use ThreadPriority::*;
    match level {
        ..15 => Idle,
        15..30 => Lowest,
        30..50 => Low,
        50..70 => Normal,
        70..85 => High,
        85..99 => Highest,
        _ => Realtime,
    }
}

impl FileType {
    pub(crate) const fn from_stat_mode(st_mode: u32) -> FileType {
        use FileType::*;
        match st_mode & libc::S_IFMT {
            libc::S_IFBLK => BlockDevice,
            libc::S_IFCHR => CharDevice,
            libc::S_IFDIR => Directory,
            libc::S_IFIFO => Fifo,
            libc::S_IFLNK => Symlink,
            libc::S_IFREG => Regular,
            libc::S_IFSOCK => Socket,
            _ => Other,
        }
    }
}

fn timestamp(secs: i64, nanos: i64) -> SystemTime {
    let nanos = Duration::from_nanos(nanos.clamp(0, 999_999_999) as u64);
    if secs >= 0 {
        UNIX_EPOCH + Duration::from_secs(secs as u64) + nanos
    } else {
        UNIX_EPOCH - Duration::from_secs(secs.unsigned_abs()) + nanos
    }
}

fn attributes_of(path: &Path, permissions: Permissions) -> Attributes {
    let mut attributes = Attributes::NORMAL;
    if permissions.is_readonly() {
        attributes |= Attributes::READONLY;
    }
    let name = path.filename().as_str();
    if name.starts_with('.') && name != "." && name != ".." {
        attributes |= Attributes::HIDDEN;
    }
    attributes
}

impl Metadata {
    #[allow(clippy::unnecessary_cast)]
    fn from_stat(path: &Path, raw: Stat) -> Metadata {
        let permissions = Permissions::from_bits(raw.st_mode & 0o7777);
        Metadata {
            file_type: FileType::from_stat_mode(raw.st_mode),
            permissions,
            attributes: attributes_of(path, permissions),
            size: raw.st_size as u64,
            hardlinks: raw.st_nlink as u64,
            created: timestamp(raw.st_ctime as i64, raw.st_ctime_nsec as i64),
            modified: timestamp(raw.st_mtime as i64, raw.st_mtime_nsec as i64),
            accessed: timestamp(raw.st_atime as i64, raw.st_atime_nsec as i64),
        }
    }
}

fn c_path(path: &Path, operation: Operation) -> Result<CString, SystemError> {
    CString::new(path.as_str()).map_err(|_| SystemError::new(operation, libc::EINVAL))
}

fn lossy_path(bytes: Vec<u8>) -> OwnedPath {
    match String::from_utf8(bytes) {
        Ok(text) => OwnedPath::from(text),
        Err(err) => OwnedPath::from(String::from_utf8_lossy(err.as_bytes()).into_owned()),
    }
}

fn env_path(name: &str) -> Option<OwnedPath> {
    env::var_os(name)
        .filter(|value| !value.is_empty())
        .map(|value| lossy_path(OsString::into_vec(value)))
}

impl System for Posix {
    type Thread = libc::pthread_t;

    #[allow(clippy::unnecessary_cast)]
    fn current_thread_id() -> u64 {
        Posix::current_thread() as u64
    }

    fn current_cpu() -> u32 {
        // SAFETY: sched_getcpu takes no arguments and reports failure as -1.
        let cpu = unsafe { libc::sched_getcpu() };
        u32::try_from(cpu).unwrap_or(0)
    }

    fn current_thread() -> libc::pthread_t {
        // SAFETY: pthread_self always succeeds.
        unsafe { libc::pthread_self() }
    }

    #[allow(clippy::unnecessary_cast)]
    fn thread_of<T>(handle: &JoinHandle<T>) -> libc::pthread_t {
        handle.as_pthread_t() as libc::pthread_t
    }

    fn affinity(thread: libc::pthread_t) -> Result<CpuSet, SystemError> {
        // SAFETY: An all-zero cpu_set_t is the empty set.
        let mut set: libc::cpu_set_t = unsafe { mem::zeroed() };
        // SAFETY: set is a valid cpu_set_t of the given size.
        let result = unsafe {
            libc::pthread_getaffinity_np(thread, mem::size_of::<libc::cpu_set_t>(), &mut set)
        };
        if result != 0 {
            Err(SystemError::new(Operation::GetAffinity, result))?
        }

        Ok((0..CpuSet::CAPACITY)
            // SAFETY: CPU_ISSET bounds checks the index against the set.
            .filter(|cpu| unsafe { libc::CPU_ISSET(*cpu, &set) })
            .collect())
    }

    fn set_affinity(thread: libc::pthread_t, cpus: CpuSet) -> Result<(), SystemError> {
        // SAFETY: An all-zero cpu_set_t is the empty set.
        let mut set: libc::cpu_set_t = unsafe { mem::zeroed() };
        for cpu in cpus.iter() {
            // SAFETY: cpu is below 64, well within the capacity of cpu_set_t.
            unsafe { libc::CPU_SET(cpu, &mut set) };
        }
        // SAFETY: set is a valid cpu_set_t of the given size.
        let result = unsafe {
            libc::pthread_setaffinity_np(thread, mem::size_of::<libc::cpu_set_t>(), &set)
        };
        if result != 0 {
            Err(SystemError::new(Operation::SetAffinity, result))?
        }
        Ok(())
    }

    fn priority(thread: libc::pthread_t) -> Result<ThreadPriority, SystemError> {
        let mut policy: c_int = 0;
        // SAFETY: sched_param is plain data.
        let mut param: libc::sched_param = unsafe { mem::zeroed() };
        // SAFETY: Both out pointers are valid for writes.
        let result = unsafe { libc::pthread_getschedparam(thread, &mut policy, &mut param) };
        if result != 0 {
            Err(SystemError::new(Operation::GetPriority, result))?
        }

        if policy == libc::SCHED_FIFO || policy == libc::SCHED_RR {
            Ok(priority_from_level(param.sched_priority))
        } else {
            Ok(ThreadPriority::Normal)
        }
    }

    fn set_priority(thread: libc::pthread_t, priority: ThreadPriority) -> Result<(), SystemError> {
        // SAFETY: sched_param is plain data.
        let mut param: libc::sched_param = unsafe { mem::zeroed() };
        param.sched_priority = level_of(priority);
        // SAFETY: param is a valid sched_param for the duration of the call.
        let result = unsafe { libc::pthread_setschedparam(thread, libc::SCHED_RR, &param) };
        if result != 0 {
            Err(SystemError::new(Operation::SetPriority, result))?
        }
        Ok(())
    }

    #[allow(clippy::unnecessary_cast)]
    fn sleep(duration: Duration) {
        if duration.is_zero() {
            return Posix::yield_now();
        }

        // SAFETY: timespec is plain data.
        let mut request: libc::timespec = unsafe { mem::zeroed() };
        request.tv_sec = duration.as_secs().min(libc::time_t::MAX as u64) as libc::time_t;
        request.tv_nsec = duration.subsec_nanos() as libc::c_long;
        // SAFETY: timespec is plain data.
        let mut remaining: libc::timespec = unsafe { mem::zeroed() };
        // SAFETY: Both timespecs are valid for the duration of the call.
        while unsafe { libc::nanosleep(&request, &mut remaining) } == -1 {
            if util::fs::err_no() != EINTR {
                break;
            }
            request = remaining;
        }
    }

    fn yield_now() {
        // SAFETY: sched_yield takes no arguments and always succeeds on Linux.
        unsafe { libc::sched_yield() };
    }

    fn metadata(path: &Path, follow_links: bool) -> Result<Metadata, SystemError> {
        let pathname = c_path(path, Operation::GetMetadata)?;
        let mut raw_meta: MaybeUninit<Stat> = MaybeUninit::uninit();
        // SAFETY: pathname is nul-terminated and raw_meta is valid for writes.
        let result = unsafe {
            if follow_links {
                libc::stat(pathname.as_ptr(), raw_meta.as_mut_ptr())
            } else {
                libc::lstat(pathname.as_ptr(), raw_meta.as_mut_ptr())
            }
        };
        if result == -1 {
            Err(SystemError::new(Operation::GetMetadata, util::fs::err_no()))?
        }
        // SAFETY: stat either initializes raw_meta or returns an error and diverges.
        let raw = unsafe { raw_meta.assume_init() };

        Ok(Metadata::from_stat(path, raw))
    }

    fn set_permissions(path: &Path, permissions: Permissions) -> Result<(), SystemError> {
        let pathname = c_path(path, Operation::SetPermissions)?;
        // SAFETY: pathname is nul-terminated.
        if unsafe { libc::chmod(pathname.as_ptr(), permissions.bits() & 0o7777) } == -1 {
            Err(SystemError::new(Operation::SetPermissions, util::fs::err_no()))?
        }
        Ok(())
    }

    fn set_attributes(path: &Path, attributes: Attributes) -> Result<(), SystemError> {
        let current = Posix::metadata(path, true)
            .map_err(|err| SystemError::new(Operation::SetAttributes, err.code))?
            .permissions;
        let permissions = if attributes.contains(Attributes::READONLY) {
            current & !Permissions::WRITE
        } else {
            current | Permissions::IWUSR
        };
        Posix::set_permissions(path, permissions)
            .map_err(|err| SystemError::new(Operation::SetAttributes, err.code))
    }

    fn current_dir() -> Result<OwnedPath, SystemError> {
        let mut buf: Vec<u8> = Vec::with_capacity(256);
        loop {
            // SAFETY: buf has room for capacity bytes, which getcwd never exceeds.
            let ptr = unsafe { libc::getcwd(buf.as_mut_ptr().cast::<c_char>(), buf.capacity()) };
            if !ptr.is_null() {
                // SAFETY: On success getcwd wrote a nul-terminated string into buf.
                let len = unsafe { CStr::from_ptr(ptr) }.to_bytes().len();
                // SAFETY: The first len bytes were initialized by getcwd.
                unsafe { buf.set_len(len) };
                return Ok(lossy_path(buf));
            }

            let err = util::fs::err_no();
            if err != ERANGE {
                Err(SystemError::new(Operation::GetCurrentDir, err))?
            }
            buf.reserve(buf.capacity() * 2);
        }
    }

    fn set_current_dir(path: &Path) -> Result<(), SystemError> {
        let pathname = c_path(path, Operation::SetCurrentDir)?;
        // SAFETY: pathname is nul-terminated.
        if unsafe { libc::chdir(pathname.as_ptr()) } == -1 {
            Err(SystemError::new(Operation::SetCurrentDir, util::fs::err_no()))?
        }
        Ok(())
    }

    fn executable() -> Result<OwnedPath, SystemError> {
        let link = c"/proc/self/exe";
        let mut buf: Vec<u8> = Vec::with_capacity(libc::PATH_MAX as usize);
        loop {
            // SAFETY: link is nul-terminated and buf has room for capacity bytes.
            let len = unsafe {
                libc::readlink(link.as_ptr(), buf.as_mut_ptr().cast::<c_char>(), buf.capacity())
            };
            if len == -1 {
                Err(SystemError::new(Operation::GetExecutable, util::fs::err_no()))?
            }

            let len = len as usize;
            if len < buf.capacity() {
                // SAFETY: readlink initialized the first len bytes.
                unsafe { buf.set_len(len) };
                return Ok(lossy_path(buf));
            }
            // The target may have been truncated.
            buf.reserve(buf.capacity() * 2);
        }
    }

    fn home_dir() -> Result<OwnedPath, SystemError> {
        if let Some(home) = env_path("HOME") {
            return Ok(home);
        }

        // SAFETY: passwd is plain data.
        let mut passwd: libc::passwd = unsafe { mem::zeroed() };
        let mut buf: Vec<c_char> = vec![0; 4096];
        let mut found: *mut libc::passwd = ptr::null_mut();
        // SAFETY: Every pointer is valid for writes and buf.len() is the size of buf.
        let result = unsafe {
            libc::getpwuid_r(libc::getuid(), &mut passwd, buf.as_mut_ptr(), buf.len(), &mut found)
        };
        if result != 0 {
            Err(SystemError::new(Operation::GetHome, result))?
        }
        if found.is_null() || passwd.pw_dir.is_null() {
            Err(SystemError::new(Operation::GetHome, libc::ENOENT))?
        }

        // SAFETY: pw_dir points to a nul-terminated string inside buf.
        let dir = unsafe { CStr::from_ptr(passwd.pw_dir) };
        Ok(lossy_path(dir.to_bytes().to_vec()))
    }

    fn temp_dir() -> Result<OwnedPath, SystemError> {
        Ok(env_path("TMPDIR").unwrap_or_else(|| OwnedPath::from("/tmp")))
    }
}
