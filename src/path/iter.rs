use std::iter::FusedIterator;
use std::mem;

use super::grammar;
use super::Path;

/// Iterator over the root and segments of a [`Path`], see [`Path::components`].
///
/// Repeated separators never produce empty segments. A path with a relative part that ends in a
/// separator yields a final `.`, matching [`Path::filename`].
pub struct Components<'a> {
    pub(crate) path: &'a str,
    pub(crate) root_end: Option<usize>,
    pub(crate) head: usize,
    pub(crate) trailing: bool,
}

impl<'a> Components<'a> {
    pub(crate) fn new(path: &'a Path) -> Components<'a> {
        let span = path.span();
        Components {
            path: path.as_str(),
            root_end: Some(span.end).filter(|end| *end > 0),
            head: span.relative_start,
            trailing: span.relative_start < path.len() && path.ends_with_separator(),
        }
    }
}

impl<'a> Iterator for Components<'a> {
    type Item = &'a Path;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(end) = self.root_end.take() {
            return Some(Path::from_str_ref(&self.path[..end]));
        }

        let bytes = self.path.as_bytes();
        while let Some(ch) = bytes.get(self.head) && grammar::is_separator(*ch) {
            self.head += 1;
        }

        if self.head < bytes.len() {
            let start = self.head;
            while let Some(ch) = bytes.get(self.head) && !grammar::is_separator(*ch) {
                self.head += 1;
            }
            return Some(Path::from_str_ref(&self.path[start..self.head]));
        }

        if mem::take(&mut self.trailing) {
            return Some(Path::new("."));
        }
        None
    }
}

impl FusedIterator for Components<'_> {}

/// Iterator over a [`Path`] and each of its parents, see [`Path::ancestors`]. Stops before the
/// empty path.
pub struct Ancestors<'a> {
    pub(crate) next: Option<&'a Path>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Path;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take().filter(|path| !path.is_empty())?;
        // Every parent is strictly shorter than its child, so this terminates.
        self.next = Some(current.parent());
        Some(current)
    }
}

impl FusedIterator for Ancestors<'_> {}
