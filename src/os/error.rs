use std::io;

use derive_more::{Display, Error};

/// The system operation that failed, used as the first half of a [`SystemError`] message.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    #[display("get the current thread CPU affinity")]
    GetAffinity,
    #[display("set the current thread CPU affinity")]
    SetAffinity,
    #[display("get the current thread priority")]
    GetPriority,
    #[display("set the current thread priority")]
    SetPriority,
    #[display("get the metadata of a path")]
    GetMetadata,
    #[display("set the permissions of a path")]
    SetPermissions,
    #[display("set the attributes of a path")]
    SetAttributes,
    #[display("get the current directory")]
    GetCurrentDir,
    #[display("set the current directory")]
    SetCurrentDir,
    #[display("get the executable path")]
    GetExecutable,
    #[display("get the home directory")]
    GetHome,
    #[display("get the temporary directory")]
    GetTemp,
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("failed to {operation} (os error {code})")]
pub struct SystemError {
    pub operation: Operation,
    pub code: i32,
}

impl SystemError {
    pub fn new(operation: Operation, code: i32) -> SystemError {
        log::debug!("failed to {operation}: os error {code}");
        SystemError {
            operation,
            code,
        }
    }

    /// Builds an error from the calling thread's last OS error.
    pub fn last(operation: Operation) -> SystemError {
        SystemError::from_io(operation, &io::Error::last_os_error())
    }

    pub fn from_io(operation: Operation, error: &io::Error) -> SystemError {
        SystemError::new(operation, error.raw_os_error().unwrap_or(-1))
    }

    /// Returns true if the error means that the path, or one of its parents, doesn't exist.
    pub fn is_not_found(&self) -> bool {
        #[cfg(target_os = "linux")]
        {
            self.code == libc::ENOENT || self.code == libc::ENOTDIR
        }
        #[cfg(windows)]
        {
            use windows_sys::Win32::Foundation::{ERROR_FILE_NOT_FOUND, ERROR_PATH_NOT_FOUND};
            self.code as u32 == ERROR_FILE_NOT_FOUND || self.code as u32 == ERROR_PATH_NOT_FOUND
        }
    }
}
