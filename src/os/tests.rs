#![cfg(test)]

use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread as std_thread;
use std::time::{Duration, Instant, UNIX_EPOCH};

use tempfile::TempDir;

use super::metadata::{self as meta, Metadata};
use super::*;
use crate::path::{OwnedPath, Path};

fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create a temporary directory.")
}

fn path_in(dir: &TempDir, name: &str) -> OwnedPath {
    let root = fs::canonicalize(dir.path()).expect("Failed to canonicalize the temporary directory.");
    OwnedPath::from(root.to_string_lossy().into_owned()).join(name)
}

fn write_file(path: &Path, contents: &str) {
    fs::write(path.as_std_path(), contents).expect("Failed to write the test file.");
}

#[test]
fn test_error_display() {
    let err = SystemError {
        operation: Operation::SetPriority,
        code: 1,
    };
    assert_eq!(
        err.to_string(),
        "failed to set the current thread priority (os error 1)"
    );
}

#[test]
fn test_file_metadata() {
    let dir = temp_dir();
    let file = path_in(&dir, "data.txt");
    write_file(&file, "hello");

    let info: Metadata = meta::metadata(&file).expect("Metadata of an existing file.");
    assert!(info.is_regular_file(), "{file} should be a regular file.");
    assert!(!info.is_directory());
    assert_eq!(info.size, 5);
    assert!(info.hardlinks >= 1, "A file should have at least one hardlink.");
    assert!(info.created > UNIX_EPOCH);
    assert!(info.modified > UNIX_EPOCH);
    assert!(info.accessed > UNIX_EPOCH);

    assert_eq!(meta::exists(&file), Ok(true));
    assert_eq!(meta::is_regular_file(&file), Ok(true));
    assert_eq!(meta::is_directory(&file), Ok(false));
    assert_eq!(meta::is_symlink(&file), Ok(false));
}

#[test]
fn test_directory_metadata() {
    let dir = temp_dir();
    let root = path_in(&dir, "");
    assert_eq!(meta::is_directory(&root), Ok(true));
    assert_eq!(meta::is_regular_file(&root), Ok(false));
    assert_eq!(meta::metadata(&root).map(|info| info.file_type), Ok(FileType::Directory));
}

#[test]
fn test_missing_path() {
    let dir = temp_dir();
    let missing = path_in(&dir, "missing").join("child");

    let err = meta::metadata(&missing).expect_err("Metadata of a missing path should fail.");
    assert!(err.is_not_found(), "{err} should be a not found error.");
    assert_eq!(err.operation, Operation::GetMetadata);

    assert_eq!(meta::exists(&missing), Ok(false));
    assert_eq!(meta::is_directory(&missing), Ok(false));
    assert_eq!(meta::is_regular_file(&missing), Ok(false));
    assert_eq!(meta::is_symlink(&missing), Ok(false));
}

#[cfg(target_os = "linux")]
#[test]
fn test_symlink_metadata() {
    let dir = temp_dir();
    let target = path_in(&dir, "target");
    let link = path_in(&dir, "link");
    write_file(&target, "abc");
    std::os::unix::fs::symlink(target.as_std_path(), link.as_std_path())
        .expect("Failed to create a symlink.");

    assert_eq!(meta::is_symlink(&link), Ok(true));
    assert_eq!(meta::is_regular_file(&link), Ok(true), "metadata should follow the link.");
    assert_eq!(meta::symlink_metadata(&link).map(|info| info.file_type), Ok(FileType::Symlink));
    assert_eq!(meta::metadata(&link).map(|info| info.size), Ok(3));
}

#[test]
fn test_set_permissions() {
    let dir = temp_dir();
    let file = path_in(&dir, "perms.txt");
    write_file(&file, "");

    let readonly = Permissions::IRUSR | Permissions::IRGRP | Permissions::IROTH;
    meta::set_permissions(&file, readonly).expect("Failed to make the file read-only.");
    let info = meta::metadata(&file).expect("Metadata after set_permissions.");
    assert!(info.permissions.is_readonly());
    assert!(info.attributes.contains(Attributes::READONLY));
    #[cfg(target_os = "linux")]
    assert_eq!(info.permissions, readonly);

    meta::set_permissions(&file, readonly | Permissions::IWUSR)
        .expect("Failed to make the file writable.");
    let info = meta::metadata(&file).expect("Metadata after set_permissions.");
    assert!(info.permissions.contains(Permissions::IWUSR));
    assert!(!info.attributes.contains(Attributes::READONLY));
}

#[test]
fn test_set_attributes() {
    let dir = temp_dir();
    let file = path_in(&dir, "attrs.txt");
    write_file(&file, "");

    meta::set_attributes(&file, Attributes::READONLY).expect("Failed to set READONLY.");
    let info = meta::metadata(&file).expect("Metadata after set_attributes.");
    assert!(info.attributes.contains(Attributes::READONLY));
    assert!(info.permissions.is_readonly());

    meta::set_attributes(&file, Attributes::NORMAL).expect("Failed to clear READONLY.");
    let info = meta::metadata(&file).expect("Metadata after set_attributes.");
    assert!(!info.attributes.contains(Attributes::READONLY));
    assert!(!info.permissions.is_readonly());
}

#[cfg(target_os = "linux")]
#[test]
fn test_hidden_attribute() {
    let dir = temp_dir();
    let hidden = path_in(&dir, ".hidden");
    let visible = path_in(&dir, "visible");
    write_file(&hidden, "");
    write_file(&visible, "");

    let attributes = |path: &Path| meta::metadata(path).map(|info| info.attributes);
    assert!(attributes(&hidden).is_ok_and(|attrs| attrs.contains(Attributes::HIDDEN)));
    assert!(attributes(&visible).is_ok_and(|attrs| !attrs.contains(Attributes::HIDDEN)));
    assert!(attributes(&visible).is_ok_and(|attrs| attrs.contains(Attributes::NORMAL)));
}

#[test]
fn test_flag_sets() {
    let rw = Permissions::IRUSR | Permissions::IWUSR;
    assert_eq!(rw.bits(), 0o600);
    assert!(Permissions::IRWXU.contains(rw));
    assert!(!rw.contains(Permissions::IRWXU));
    assert!(rw.intersects(Permissions::IRWXU));
    assert!(!rw.is_readonly());
    assert!((rw & !Permissions::WRITE).is_readonly());
    assert!(Permissions::empty().is_empty());

    let attrs = Attributes::HIDDEN | Attributes::SYSTEM;
    assert!(attrs.contains(Attributes::HIDDEN));
    assert!(!attrs.contains(Attributes::READONLY));
    assert_eq!(Attributes::from_bits(attrs.bits()), attrs);
}

#[test]
fn test_process_paths() {
    let initial = process::initial().expect("Initial directory.");
    assert!(!initial.is_empty());
    assert!(initial.is_absolute(), "{initial} should be absolute.");
    assert_eq!(meta::is_directory(&initial), Ok(true));

    let temp = process::temp().expect("Temporary directory.");
    assert_eq!(meta::is_directory(&temp), Ok(true), "{temp} should be a directory.");

    let home = process::home().expect("Home directory.");
    assert!(!home.is_empty());

    let exe = process::executable().expect("Executable path.");
    assert_eq!(meta::is_regular_file(&exe), Ok(true), "{exe} should be a regular file.");
}

#[test]
fn test_unique() {
    let first = process::unique();
    let second = process::unique();
    assert!(!first.is_empty());
    assert_ne!(first, second, "Unique paths should never repeat.");
    assert!(!first.has_parent(), "A unique path should be a bare filename.");

    let temp = process::temp().expect("Temporary directory.");
    assert_eq!(meta::exists(temp.join(&first)), Ok(false));
}

// The only test that changes the working directory, everything else uses absolute paths.
#[test]
fn test_current_directory() {
    let initial = process::initial().expect("Initial directory.");
    let current = process::current().expect("Current directory.");

    let dir = temp_dir();
    let mut target = path_in(&dir, "");
    target.remove_trailing_separators();
    process::set_current(&target).expect("Failed to change directory.");
    assert_eq!(process::current(), Ok(target.clone()));
    assert_eq!(process::initial(), Ok(initial), "The initial directory should never change.");

    process::set_current(&current).expect("Failed to restore the directory.");
    assert_eq!(process::current(), Ok(current));

    let missing = target.join(process::unique());
    let err = process::set_current(&missing).expect_err("Changing into a missing directory.");
    assert_eq!(err.operation, Operation::SetCurrentDir);
    assert!(err.is_not_found());
}

#[test]
fn test_cpu_set() {
    let set = CpuSet::empty().with(0).with(3).with(CpuSet::CAPACITY);
    assert_eq!(set.bits(), 0b1001);
    assert_eq!(set.count(), 2);
    assert!(set.contains(3));
    assert!(!set.contains(1));
    assert!(!set.contains(CpuSet::CAPACITY));
    assert_eq!(set.iter().collect::<Vec<_>>(), vec![0, 3]);
    assert_eq!([3, 0].into_iter().collect::<CpuSet>(), set);
}

#[test]
fn test_affinity() {
    let original = thread::affinity().expect("Current affinity.");
    assert!(!original.is_empty(), "A running thread has at least one CPU.");

    let cpu = thread::current_cpu() as usize;
    if cpu < CpuSet::CAPACITY {
        assert!(original.contains(cpu), "Running on CPU {cpu} outside of {original:?}.");
    }

    let first = original.iter().next().unwrap_or(0);
    thread::set_affinity(CpuSet::empty().with(first)).expect("Failed to pin the thread.");
    assert_eq!(thread::affinity(), Ok(CpuSet::empty().with(first)));
    thread::set_affinity(original).expect("Failed to restore the affinity.");
    assert_eq!(thread::affinity(), Ok(original));
}

#[test]
fn test_priority() {
    let priority = std_thread::spawn(thread::priority)
        .join()
        .expect("The thread panicked.");
    assert_eq!(priority, Ok(ThreadPriority::Normal));
    assert!(ThreadPriority::Idle < ThreadPriority::Normal);
    assert!(ThreadPriority::Normal < ThreadPriority::Realtime);
}

#[test]
fn test_other_thread() {
    let done = Arc::new(AtomicBool::new(false));
    let handle = std_thread::spawn({
        let done = Arc::clone(&done);
        move || {
            while !done.load(Ordering::Acquire) {
                std_thread::park();
            }
        }
    });

    assert_eq!(thread::priority_of(&handle), Ok(ThreadPriority::Normal));
    let cpus = thread::affinity_of(&handle).expect("Affinity of a parked thread.");
    assert!(!cpus.is_empty(), "A parked thread still has at least one CPU.");
    thread::set_affinity_of(&handle, cpus).expect("Failed to reapply the affinity.");
    assert_eq!(thread::affinity_of(&handle), Ok(cpus));

    done.store(true, Ordering::Release);
    handle.thread().unpark();
    handle.join().expect("The thread panicked.");
}

#[cfg(target_os = "linux")]
#[test]
fn test_priority_levels() {
    use ThreadPriority::*;
    for priority in [Idle, Lowest, Low, Normal, High, Highest, Realtime] {
        assert_eq!(
            posix::priority_from_level(posix::level_of(priority)),
            priority,
            "{priority:?} should survive a round trip through its round-robin level."
        );
    }
    assert_eq!(posix::priority_from_level(0), Idle);
    assert_eq!(posix::priority_from_level(49), Low);
    assert_eq!(posix::priority_from_level(98), Highest);
}

#[test]
fn test_thread_ids() {
    let main = thread::current_thread_id();
    assert_eq!(main, thread::current_thread_id());
    let other = std_thread::spawn(thread::current_thread_id)
        .join()
        .expect("The thread panicked.");
    assert_ne!(main, other);
}

#[test]
fn test_sleep() {
    let start = Instant::now();
    thread::sleep(Duration::from_millis(20));
    assert!(start.elapsed() >= Duration::from_millis(20));

    let start = Instant::now();
    thread::sleep(Duration::from_micros(100));
    assert!(
        start.elapsed() >= Duration::from_micros(100),
        "A sub-millisecond sleep should not end early."
    );

    thread::sleep(Duration::ZERO);
    thread::yield_now();
}
