//! Lexical path manipulation.
//!
//! [`Path`] and [`OwnedPath`] split a path's text into root, relative part, parent, filename, stem
//! and extension, and rebuild modified paths from those pieces. Nothing here touches the file
//! system: every operation is a pure function of the text and none of them can fail.
//!
//! # Grammar
//! Both `/` and `\` are separators on every platform. The root is recognized in this order:
//! - Long-path marker: `\\?\`, optionally followed by a drive, e.g. `\\?\C:\`.
//! - UNC share: `//net/`, with at most one separator after the host name.
//! - Drive: `C:` or `C:/`.
//! - POSIX: a leading separator, with any repeats moved out of the root, so `///foo` has the root
//!   `/` and the relative part `foo`.
//!
//! # Comparison
//! Separators are normalized when comparing, ordering and hashing paths, so `a\b == a/b`. The
//! stored text only changes through [`OwnedPath::make_preferred`].

mod cmp;
mod display;
mod grammar;
mod iter;
mod path;
mod proptests;

pub use display::*;
pub use grammar::{Prefix, is_separator};
pub use iter::*;
pub use path::*;
