use std::fmt::{self, Display, Formatter, Write};

use super::grammar;
use super::{OwnedPath, Path};

/// Helper for printing a [`Path`], returned by [`Path::display`]. Prints the text as stored unless
/// one of the normalizing adapters is selected.
pub struct DisplayPath<'a> {
    pub(crate) inner: &'a Path,
}

/// Prints every separator as [`Path::SEPARATOR`].
pub struct DisplayPreferred<'a> {
    pub(crate) inner: &'a Path,
}

/// Prints every separator as `/`.
pub struct DisplayGeneric<'a> {
    pub(crate) inner: &'a Path,
}

impl Path {
    pub const fn display(&self) -> DisplayPath<'_> {
        DisplayPath {
            inner: self,
        }
    }
}

impl<'a> DisplayPath<'a> {
    pub const fn preferred(&self) -> DisplayPreferred<'a> {
        DisplayPreferred {
            inner: self.inner,
        }
    }

    pub const fn generic(&self) -> DisplayGeneric<'a> {
        DisplayGeneric {
            inner: self.inner,
        }
    }
}

fn write_with_separator(f: &mut Formatter<'_>, path: &Path, separator: char) -> fmt::Result {
    for ch in path.as_str().chars() {
        if ch.is_ascii() && grammar::is_separator(ch as u8) {
            f.write_char(separator)?;
        } else {
            f.write_char(ch)?;
        }
    }
    Ok(())
}

impl<'a> Display for DisplayPath<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.pad(self.inner.as_str())
    }
}

impl<'a> Display for DisplayPreferred<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_with_separator(f, self.inner, Path::SEPARATOR)
    }
}

impl<'a> Display for DisplayGeneric<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_with_separator(f, self.inner, '/')
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.display(), f)
    }
}

impl Display for OwnedPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.display(), f)
    }
}
