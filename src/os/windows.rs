use std::env;
use std::ffi::OsStr;
use std::fs::OpenOptions;
use std::iter;
use std::mem::MaybeUninit;
use std::os::windows::ffi::OsStrExt;
use std::os::windows::fs::OpenOptionsExt;
use std::os::windows::io::AsRawHandle;
use std::thread::JoinHandle;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use windows_sys::Win32::Foundation::{ERROR_ENVVAR_NOT_FOUND, FILETIME, GetLastError, HANDLE};
use windows_sys::Win32::Storage::FileSystem::{
    BY_HANDLE_FILE_INFORMATION, FILE_ATTRIBUTE_ARCHIVE, FILE_ATTRIBUTE_DIRECTORY,
    FILE_ATTRIBUTE_HIDDEN, FILE_ATTRIBUTE_NORMAL, FILE_ATTRIBUTE_NOT_CONTENT_INDEXED,
    FILE_ATTRIBUTE_OFFLINE, FILE_ATTRIBUTE_READONLY, FILE_ATTRIBUTE_REPARSE_POINT,
    FILE_ATTRIBUTE_SYSTEM, FILE_ATTRIBUTE_TEMPORARY, FILE_FLAG_BACKUP_SEMANTICS,
    FILE_FLAG_OPEN_REPARSE_POINT, GetFileInformationByHandle, SetFileAttributesW,
};
use windows_sys::Win32::System::Threading::{
    GetCurrentProcess, GetCurrentProcessorNumber, GetCurrentThread, GetCurrentThreadId,
    GetProcessAffinityMask, GetThreadPriority, SetThreadAffinityMask, SetThreadPriority, Sleep,
    SwitchToThread, THREAD_PRIORITY_ABOVE_NORMAL, THREAD_PRIORITY_BELOW_NORMAL,
    THREAD_PRIORITY_HIGHEST, THREAD_PRIORITY_IDLE, THREAD_PRIORITY_LOWEST, THREAD_PRIORITY_NORMAL,
    THREAD_PRIORITY_TIME_CRITICAL,
};

use super::{
    Attributes, CpuSet, FileType, Metadata, Operation, Permissions, System, SystemError,
    ThreadPriority,
};
use crate::path::{OwnedPath, Path};
use crate::util::sealed::Sealed;

/// The Windows backend, built on `windows-sys`.
pub enum Windows {}

impl Sealed for Windows {}

const PRIORITY_ERROR_RETURN: i32 = i32::MAX;

// 100ns intervals between 1601-01-01 and 1970-01-01.
const EPOCH_DIFFERENCE: u64 = 116_444_736_000_000_000;

const ATTRIBUTE_FLAGS: [(Attributes, u32); 7] = [
    (Attributes::ARCHIVED, FILE_ATTRIBUTE_ARCHIVE),
    (Attributes::HIDDEN, FILE_ATTRIBUTE_HIDDEN),
    (Attributes::OFFLINE, FILE_ATTRIBUTE_OFFLINE),
    (Attributes::READONLY, FILE_ATTRIBUTE_READONLY),
    (Attributes::SYSTEM, FILE_ATTRIBUTE_SYSTEM),
    (Attributes::TEMPORARY, FILE_ATTRIBUTE_TEMPORARY),
    (Attributes::NORMAL, FILE_ATTRIBUTE_NORMAL),
];

fn last_error(operation: Operation) -> SystemError {
    // SAFETY: GetLastError only reads thread-local state.
    SystemError::new(operation, unsafe { GetLastError() } as i32)
}

fn wide(path: &Path) -> Vec<u16> {
    OsStr::new(path.as_str()).encode_wide().chain(iter::once(0)).collect()
}

fn timestamp(time: FILETIME) -> SystemTime {
    let ticks = (u64::from(time.dwHighDateTime) << 32) | u64::from(time.dwLowDateTime);
    if ticks >= EPOCH_DIFFERENCE {
        UNIX_EPOCH + Duration::from_nanos((ticks - EPOCH_DIFFERENCE) * 100)
    } else {
        UNIX_EPOCH - Duration::from_nanos((EPOCH_DIFFERENCE - ticks) * 100)
    }
}

fn attributes_from_raw(raw: u32) -> Attributes {
    let mut attributes = ATTRIBUTE_FLAGS
        .iter()
        .filter(|(_, flag)| raw & flag != 0)
        .fold(Attributes::empty(), |acc, (attribute, _)| acc | *attribute);
    // Content indexing is on unless explicitly disabled.
    if raw & FILE_ATTRIBUTE_NOT_CONTENT_INDEXED == 0 {
        attributes |= Attributes::INDEXED;
    }
    attributes
}

fn attributes_to_raw(attributes: Attributes) -> u32 {
    let mut raw = ATTRIBUTE_FLAGS
        .iter()
        .filter(|(attribute, _)| attributes.contains(*attribute))
        .fold(0, |acc, (_, flag)| acc | flag);
    if !attributes.contains(Attributes::INDEXED) {
        raw |= FILE_ATTRIBUTE_NOT_CONTENT_INDEXED;
    }
    // NORMAL is only valid alone.
    if raw != FILE_ATTRIBUTE_NORMAL {
        raw &= !FILE_ATTRIBUTE_NORMAL;
    }
    if raw == 0 {
        raw = FILE_ATTRIBUTE_NORMAL;
    }
    raw
}

impl Metadata {
    fn from_info(info: &BY_HANDLE_FILE_INFORMATION, follow_links: bool) -> Metadata {
        let raw = info.dwFileAttributes;
        let file_type = if raw & FILE_ATTRIBUTE_REPARSE_POINT != 0 && !follow_links {
            FileType::Symlink
        } else if raw & FILE_ATTRIBUTE_DIRECTORY != 0 {
            FileType::Directory
        } else {
            FileType::Regular
        };
        let mut permissions = if raw & FILE_ATTRIBUTE_READONLY != 0 {
            Permissions::IRUSR | Permissions::IRGRP | Permissions::IROTH
        } else {
            Permissions::IRUSR | Permissions::IWUSR | Permissions::IRGRP | Permissions::IROTH
        };
        if file_type.is_directory() {
            permissions |= Permissions::IXUSR | Permissions::IXGRP | Permissions::IXOTH;
        }

        Metadata {
            file_type,
            permissions,
            attributes: attributes_from_raw(raw),
            size: (u64::from(info.nFileSizeHigh) << 32) | u64::from(info.nFileSizeLow),
            hardlinks: u64::from(info.nNumberOfLinks),
            created: timestamp(info.ftCreationTime),
            modified: timestamp(info.ftLastWriteTime),
            accessed: timestamp(info.ftLastAccessTime),
        }
    }
}

fn set_raw_attributes(path: &Path, raw: u32, operation: Operation) -> Result<(), SystemError> {
    let name = wide(path);
    // SAFETY: name is nul-terminated.
    if unsafe { SetFileAttributesW(name.as_ptr(), raw) } == 0 {
        Err(last_error(operation))?
    }
    Ok(())
}

fn env_path(name: &str) -> Option<OwnedPath> {
    env::var_os(name)
        .filter(|value| !value.is_empty())
        .map(|value| OwnedPath::from(value.to_string_lossy().into_owned()))
}

impl System for Windows {
    type Thread = HANDLE;

    fn current_thread_id() -> u64 {
        // SAFETY: GetCurrentThreadId always succeeds.
        u64::from(unsafe { GetCurrentThreadId() })
    }

    fn current_cpu() -> u32 {
        // SAFETY: GetCurrentProcessorNumber always succeeds.
        unsafe { GetCurrentProcessorNumber() }
    }

    fn current_thread() -> HANDLE {
        // SAFETY: GetCurrentThread returns a pseudo handle and always succeeds.
        unsafe { GetCurrentThread() }
    }

    fn thread_of<T>(handle: &JoinHandle<T>) -> HANDLE {
        handle.as_raw_handle()
    }

    fn affinity(thread: HANDLE) -> Result<CpuSet, SystemError> {
        let mut process = 0;
        let mut system = 0;
        // SAFETY: Both out pointers are valid for writes.
        if unsafe { GetProcessAffinityMask(GetCurrentProcess(), &mut process, &mut system) } == 0 {
            Err(last_error(Operation::GetAffinity))?
        }
        // There's no getter, so set the widest mask and restore the previous one.
        // SAFETY: thread is either the current thread's pseudo handle or borrowed from a JoinHandle.
        let previous = unsafe { SetThreadAffinityMask(thread, process) };
        if previous == 0 {
            Err(last_error(Operation::GetAffinity))?
        }
        // SAFETY: As above.
        unsafe { SetThreadAffinityMask(thread, previous) };

        Ok(CpuSet::from_bits(previous as u64))
    }

    fn set_affinity(thread: HANDLE, cpus: CpuSet) -> Result<(), SystemError> {
        // SAFETY: thread is either the current thread's pseudo handle or borrowed from a JoinHandle.
        if unsafe { SetThreadAffinityMask(thread, cpus.bits() as usize) } == 0 {
            Err(last_error(Operation::SetAffinity))?
        }
        Ok(())
    }

    fn priority(thread: HANDLE) -> Result<ThreadPriority, SystemError> {
        use ThreadPriority::*;
        // SAFETY: thread is either the current thread's pseudo handle or borrowed from a JoinHandle.
        let level = unsafe { GetThreadPriority(thread) };
        if level == PRIORITY_ERROR_RETURN {
            Err(last_error(Operation::GetPriority))?
        }

        Ok(match level {
            _ if level < THREAD_PRIORITY_LOWEST => Idle,
            _ if level < THREAD_PRIORITY_BELOW_NORMAL => Lowest,
            _ if level < THREAD_PRIORITY_NORMAL => Low,
            _ if level < THREAD_PRIORITY_ABOVE_NORMAL => Normal,
            _ if level < THREAD_PRIORITY_HIGHEST => High,
            _ if level < THREAD_PRIORITY_TIME_CRITICAL => Highest,
            _ => Realtime,
        })
    }

    fn set_priority(thread: HANDLE, priority: ThreadPriority) -> Result<(), SystemError> {
        use ThreadPriority::*;
        let level = match priority {
            Idle => THREAD_PRIORITY_IDLE,
            Lowest => THREAD_PRIORITY_LOWEST,
            Low => THREAD_PRIORITY_BELOW_NORMAL,
            Normal => THREAD_PRIORITY_NORMAL,
            High => THREAD_PRIORITY_ABOVE_NORMAL,
            Highest => THREAD_PRIORITY_HIGHEST,
            Realtime => THREAD_PRIORITY_TIME_CRITICAL,
        };
        // SAFETY: thread is either the current thread's pseudo handle or borrowed from a JoinHandle.
        if unsafe { SetThreadPriority(thread, level) } == 0 {
            Err(last_error(Operation::SetPriority))?
        }
        Ok(())
    }

    fn sleep(duration: Duration) {
        if duration.is_zero() {
            return Windows::yield_now();
        }
        // Whole milliseconds, rounded up.
        let millis = duration.as_nanos().div_ceil(1_000_000).min(u128::from(u32::MAX - 1)) as u32;
        // SAFETY: Sleep has no preconditions.
        unsafe { Sleep(millis) };
    }

    fn yield_now() {
        // SAFETY: SwitchToThread has no preconditions.
        unsafe { SwitchToThread() };
    }

    fn metadata(path: &Path, follow_links: bool) -> Result<Metadata, SystemError> {
        let mut flags = FILE_FLAG_BACKUP_SEMANTICS;
        if !follow_links {
            flags |= FILE_FLAG_OPEN_REPARSE_POINT;
        }
        let file = OpenOptions::new()
            .access_mode(0)
            .custom_flags(flags)
            .open(path.as_std_path())
            .map_err(|err| SystemError::from_io(Operation::GetMetadata, &err))?;

        let mut info: MaybeUninit<BY_HANDLE_FILE_INFORMATION> = MaybeUninit::uninit();
        // SAFETY: The handle stays open for the call and info is valid for writes.
        if unsafe { GetFileInformationByHandle(file.as_raw_handle(), info.as_mut_ptr()) } == 0 {
            Err(last_error(Operation::GetMetadata))?
        }
        // SAFETY: GetFileInformationByHandle either initializes info or returns an error and
        // diverges.
        let info = unsafe { info.assume_init() };

        Ok(Metadata::from_info(&info, follow_links))
    }

    fn set_permissions(path: &Path, permissions: Permissions) -> Result<(), SystemError> {
        let mut attributes = Windows::metadata(path, true)
            .map_err(|err| SystemError::new(Operation::SetPermissions, err.code))?
            .attributes;
        if permissions.is_readonly() {
            attributes |= Attributes::READONLY;
        } else {
            attributes &= !Attributes::READONLY;
        }
        set_raw_attributes(path, attributes_to_raw(attributes), Operation::SetPermissions)
    }

    fn set_attributes(path: &Path, attributes: Attributes) -> Result<(), SystemError> {
        set_raw_attributes(path, attributes_to_raw(attributes), Operation::SetAttributes)
    }

    fn current_dir() -> Result<OwnedPath, SystemError> {
        env::current_dir()
            .map(|dir| OwnedPath::from(dir.to_string_lossy().into_owned()))
            .map_err(|err| SystemError::from_io(Operation::GetCurrentDir, &err))
    }

    fn set_current_dir(path: &Path) -> Result<(), SystemError> {
        env::set_current_dir(path.as_std_path())
            .map_err(|err| SystemError::from_io(Operation::SetCurrentDir, &err))
    }

    fn executable() -> Result<OwnedPath, SystemError> {
        env::current_exe()
            .map(|exe| OwnedPath::from(exe.to_string_lossy().into_owned()))
            .map_err(|err| SystemError::from_io(Operation::GetExecutable, &err))
    }

    fn home_dir() -> Result<OwnedPath, SystemError> {
        env_path("USERPROFILE").ok_or_else(|| SystemError::new(Operation::GetHome, ERROR_ENVVAR_NOT_FOUND as i32))
    }

    fn temp_dir() -> Result<OwnedPath, SystemError> {
        Ok(OwnedPath::from(env::temp_dir().to_string_lossy().into_owned()))
    }
}
