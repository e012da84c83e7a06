//! Lexical manipulation of file system paths, plus a thin wrapper around the operating system
//! services that consume them.
//!
//! # Purpose
//! [`path`] takes a path apart into its root, relative part, parent, filename, stem and extension,
//! and puts modified paths back together. It understands POSIX paths, Windows drive paths, UNC
//! shares and `\\?\` long paths on every platform, and reproduces their edge cases exactly: empty
//! paths, `.` and `..`, trailing and repeated separators.
//!
//! # Method
//! The path types never touch the file system. Every decomposition borrows from the path it was
//! called on and every manipulation edits the owned text in place, so none of them allocate beyond
//! the text itself and none of them can fail.
//!
//! # Error Handling
//! Only the [`os`] module can fail. It reports failures with a single strongly typed
//! [`SystemError`](os::SystemError), naming the operation and carrying the OS error code, in the
//! style of the derive macros used throughout.
//!
//! # Dependencies
//! The [`os`] module relies on `libc` (Linux) or `windows-sys` (Windows) for its thin syscall
//! wrappers and on `log` for reporting failed calls. It is enabled by the default `os` feature;
//! without it this crate is pure string manipulation.
//!
//! This crate also depends on some derive macros because they're helpful and remove the need for
//! some very repetitive programming.

#![warn(clippy::missing_safety_doc)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(clippy::missing_const_for_fn)]
#![warn(clippy::missing_panics_doc)]
#![warn(clippy::unwrap_used)]
#![allow(clippy::module_inception)]

pub mod path;

#[cfg(all(feature = "os", any(target_os = "linux", windows)))]
pub mod os;

pub(crate) mod util;

pub use path::{OwnedPath, Path};
