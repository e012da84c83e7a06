use std::borrow::{Borrow, Cow};
use std::convert::Infallible;
use std::fmt::{self, Debug, Formatter};
use std::mem;
use std::ops::{Deref, Range};
use std::str::FromStr;

use super::grammar::{self, Prefix, RootSpan};
use super::{Ancestors, Components};

/// A borrowed path, backed by `str`. All decompositions live here and return slices of the
/// receiver, so none of them allocate.
///
/// Two paths which differ only in separator style are equal, see [`PartialEq`] and [`Ord`].
#[repr(transparent)]
pub struct Path {
    pub(crate) inner: str,
}

/// An owned, mutable path. Dereferences to [`Path`] for decompositions and provides the
/// manipulation methods, which all return `&mut Self` so that they can be chained.
#[derive(Clone, Default)]
pub struct OwnedPath {
    pub(crate) inner: String,
}

const EMPTY: &str = "";
const CURRENT: &str = ".";

impl Path {
    /// The separator preferred by the target platform. Both `/` and `\` are recognized as
    /// separators everywhere, this is only the one produced by [`OwnedPath::make_preferred`] and
    /// [`OwnedPath::append`].
    pub const SEPARATOR: char = if cfg!(windows) { '\\' } else { '/' };

    pub fn new<S: AsRef<str> + ?Sized>(value: &S) -> &Path {
        Path::from_str_ref(value.as_ref())
    }

    pub(crate) const fn from_str_ref(value: &str) -> &Path {
        // SAFETY: Path is repr(transparent) over str, so the layout and metadata are identical.
        unsafe { &*(value as *const str as *const Path) }
    }

    pub const fn separator() -> char {
        Path::SEPARATOR
    }

    pub const fn as_str(&self) -> &str {
        &self.inner
    }

    pub fn as_std_path(&self) -> &std::path::Path {
        std::path::Path::new(&self.inner)
    }

    pub const fn len(&self) -> usize {
        self.inner.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn to_owned_path(&self) -> OwnedPath {
        OwnedPath::from(&self.inner)
    }

    fn slice(&self, range: Range<usize>) -> &Path {
        Path::from_str_ref(&self.inner[range])
    }

    pub(crate) fn span(&self) -> RootSpan {
        grammar::parse_root(&self.inner)
    }

    pub(crate) fn ends_with_separator(&self) -> bool {
        self.inner.bytes().last().is_some_and(grammar::is_separator)
    }

    /// The byte range of the filename. For a path ending in a separator this is the empty range at
    /// the end of the text, standing in for the implicit `.` reported by [`Path::filename`].
    pub(crate) fn filename_range(&self) -> Range<usize> {
        let len = self.len();
        if self.ends_with_separator() {
            return len..len;
        }
        let span = self.span();
        let start = grammar::last_separator(self.inner.as_bytes(), span.relative_start)
            .map_or(span.relative_start, |i| i + 1);
        start..len
    }

    /// The byte range replaced by [`OwnedPath::replace_extension`] and removed by
    /// [`OwnedPath::remove_extension`]. Wider than [`Path::extension`]: `.` and `..` are replaced
    /// entirely and a trailing dot counts as an (empty) extension.
    pub(crate) fn extension_range(&self) -> Range<usize> {
        let name = self.filename_range();
        let filename = &self.inner[name.clone()];

        if filename == "." || filename == ".." {
            name
        } else if filename.ends_with('.') {
            name.end - 1..name.end
        } else {
            match grammar::extension_start(filename) {
                Some(i) => name.start + i..name.end,
                None => name.end..name.end,
            }
        }
    }

    /// The kind of root this path starts with.
    pub fn prefix(&self) -> Prefix {
        self.span().prefix
    }

    /// The root of the path: a drive (`C:/`), share (`//net/`), long-path prefix (`\\?\C:/`) or a
    /// single leading separator. Repeated leading separators collapse to one.
    pub fn root(&self) -> &Path {
        self.slice(0..self.span().end)
    }

    /// The root without its directory separator, e.g. `C:` or `//net`. Empty for POSIX roots.
    pub fn root_name(&self) -> &Path {
        self.slice(0..self.span().name_end)
    }

    /// The separator following the root name, or the leading `/` of a POSIX path.
    pub fn root_directory(&self) -> &Path {
        let span = self.span();
        self.slice(span.name_end..span.end)
    }

    /// Everything after the root and any separators repeated directly after it.
    pub fn relative(&self) -> &Path {
        self.slice(self.span().relative_start..self.len())
    }

    /// The path with its last segment removed.
    ///
    /// A trailing separator counts as the last segment. A single segment after a root yields the
    /// root name if there is one, or the POSIX root otherwise. Paths without a parent yield the
    /// empty path.
    pub fn parent(&self) -> &Path {
        let span = self.span();
        let bytes = self.inner.as_bytes();

        if span.relative_start == bytes.len() {
            return if span.has_directory() {
                self.slice(0..span.name_end)
            } else {
                self.slice(0..0)
            };
        }

        let trimmed = grammar::trim_separators(bytes, span.relative_start);
        if trimmed < bytes.len() {
            return self.slice(0..trimmed);
        }

        match grammar::last_separator(bytes, span.relative_start) {
            Some(i) => self.slice(0..grammar::trim_separators(&bytes[..i], span.relative_start)),
            None if span.has_name() => self.slice(0..span.name_end),
            None => self.slice(0..span.end),
        }
    }

    /// The last segment of the path, `.` if the path ends in a separator, or empty for empty and
    /// root-only paths.
    pub fn filename(&self) -> &Path {
        if self.ends_with_separator() {
            Path::new(CURRENT)
        } else {
            self.slice(self.filename_range())
        }
    }

    /// The filename without its extension.
    pub fn stem(&self) -> &Path {
        let filename = self.filename();
        match grammar::extension_start(filename.as_str()) {
            Some(i) => filename.slice(0..i),
            None => filename,
        }
    }

    /// The extension of the filename, including its leading dot. Names with a single leading or
    /// trailing dot, `.` and `..` have none.
    pub fn extension(&self) -> &Path {
        let filename = self.filename();
        match grammar::extension_start(filename.as_str()) {
            Some(i) => filename.slice(i..filename.len()),
            None => Path::new(EMPTY),
        }
    }

    pub fn has_root(&self) -> bool {
        !self.root().is_empty()
    }

    pub fn has_root_name(&self) -> bool {
        self.span().has_name()
    }

    pub fn has_root_directory(&self) -> bool {
        self.span().has_directory()
    }

    pub fn has_relative(&self) -> bool {
        !self.relative().is_empty()
    }

    pub fn has_parent(&self) -> bool {
        !self.parent().is_empty()
    }

    pub fn has_filename(&self) -> bool {
        !self.filename().is_empty()
    }

    pub fn has_stem(&self) -> bool {
        !self.stem().is_empty()
    }

    pub fn has_extension(&self) -> bool {
        !self.extension().is_empty()
    }

    /// A path is considered absolute when it has any kind of root, including a bare drive
    /// specifier.
    pub fn is_absolute(&self) -> bool {
        self.has_root()
    }

    pub fn is_relative(&self) -> bool {
        !self.is_absolute()
    }

    pub fn components(&self) -> Components<'_> {
        Components::new(self)
    }

    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors {
            next: Some(self),
        }
    }

    /// Returns a copy of the path with every separator replaced by [`Path::SEPARATOR`]. Borrows if
    /// nothing needs replacing.
    pub fn to_preferred(&self) -> Cow<'_, Path> {
        let alternate = if Path::SEPARATOR == '/' { '\\' } else { '/' };
        if self.inner.contains(alternate) {
            let mut owned = self.to_owned_path();
            owned.make_preferred();
            Cow::Owned(owned)
        } else {
            Cow::Borrowed(self)
        }
    }

    pub fn join<P: AsRef<Path>>(&self, segment: P) -> OwnedPath {
        let mut owned = self.to_owned_path();
        owned.append(segment);
        owned
    }
}

impl OwnedPath {
    pub const fn new() -> OwnedPath {
        OwnedPath {
            inner: String::new(),
        }
    }

    pub fn as_path(&self) -> &Path {
        Path::from_str_ref(&self.inner)
    }

    pub fn into_string(self) -> String {
        self.inner
    }

    /// Joins `segment` onto the path, inserting [`Path::SEPARATOR`] unless the path is empty or
    /// already ends with a separator. The segment itself is never inspected.
    pub fn append<P: AsRef<Path>>(&mut self, segment: P) -> &mut Self {
        if !self.inner.is_empty() && !self.ends_with_separator() {
            self.inner.push(Path::SEPARATOR);
        }
        self.inner.push_str(segment.as_ref().as_str());
        self
    }

    /// Appends `text` verbatim, without inserting or collapsing any separators.
    pub fn concat<P: AsRef<Path>>(&mut self, text: P) -> &mut Self {
        self.inner.push_str(text.as_ref().as_str());
        self
    }

    /// Replaces the filename with `filename`. When the path has no filename span (it is empty,
    /// root-only or ends in a separator) this behaves like [`OwnedPath::append`].
    pub fn replace_filename<P: AsRef<Path>>(&mut self, filename: P) -> &mut Self {
        let range = self.filename_range();
        if range.is_empty() {
            return self.append(filename);
        }
        self.inner.replace_range(range, filename.as_ref().as_str());
        self
    }

    /// Replaces the extension with `extension`, adding the leading dot if it is missing. An empty
    /// `extension` removes the current one.
    pub fn replace_extension<P: AsRef<Path>>(&mut self, extension: P) -> &mut Self {
        let extension = extension.as_ref().as_str();
        let range = self.extension_range();

        if extension.is_empty() || extension.starts_with('.') {
            self.inner.replace_range(range, extension);
        } else {
            self.inner.replace_range(range, &format!(".{extension}"));
        }
        self
    }

    /// Removes the filename along with the run of separators before it.
    pub fn remove_filename(&mut self) -> &mut Self {
        let span = self.span();
        let bytes = self.inner.as_bytes();
        let end = match grammar::last_separator(bytes, span.name_end) {
            Some(i) => grammar::trim_separators(&bytes[..i], span.name_end),
            None => self.filename_range().start,
        };
        self.inner.truncate(end);
        self
    }

    pub fn remove_extension(&mut self) -> &mut Self {
        let range = self.extension_range();
        self.inner.replace_range(range, "");
        self
    }

    /// Strips trailing separators. The separator of a root with a root name (`C:/`, `//net/`) is
    /// kept, a bare POSIX root is not.
    pub fn remove_trailing_separators(&mut self) -> &mut Self {
        let span = self.span();
        let floor = if span.has_name() { span.end } else { 0 };
        let end = grammar::trim_separators(self.inner.as_bytes(), floor);
        self.inner.truncate(end);
        self
    }

    /// Rewrites every separator as [`Path::SEPARATOR`].
    pub fn make_preferred(&mut self) -> &mut Self {
        let alternate = if Path::SEPARATOR == '/' { '\\' } else { '/' };
        if self.inner.contains(alternate) {
            self.inner = mem::take(&mut self.inner).replace(alternate, &Path::SEPARATOR.to_string());
        }
        self
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }
}

impl Deref for OwnedPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        self.as_path()
    }
}

impl Borrow<Path> for OwnedPath {
    fn borrow(&self) -> &Path {
        self.as_path()
    }
}

impl ToOwned for Path {
    type Owned = OwnedPath;

    fn to_owned(&self) -> Self::Owned {
        self.to_owned_path()
    }
}

impl AsRef<Path> for Path {
    fn as_ref(&self) -> &Path {
        self
    }
}

impl AsRef<Path> for OwnedPath {
    fn as_ref(&self) -> &Path {
        self.as_path()
    }
}

impl AsRef<Path> for str {
    fn as_ref(&self) -> &Path {
        Path::from_str_ref(self)
    }
}

impl AsRef<Path> for String {
    fn as_ref(&self) -> &Path {
        Path::from_str_ref(self)
    }
}

impl AsRef<str> for Path {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl AsRef<str> for OwnedPath {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl AsRef<std::path::Path> for Path {
    fn as_ref(&self) -> &std::path::Path {
        self.as_std_path()
    }
}

impl AsRef<std::path::Path> for OwnedPath {
    fn as_ref(&self) -> &std::path::Path {
        self.as_std_path()
    }
}

impl<'a> From<&'a str> for &'a Path {
    fn from(value: &'a str) -> Self {
        Path::from_str_ref(value)
    }
}

impl From<&str> for OwnedPath {
    fn from(value: &str) -> Self {
        OwnedPath {
            inner: value.to_owned(),
        }
    }
}

impl From<&String> for OwnedPath {
    fn from(value: &String) -> Self {
        OwnedPath::from(value.as_str())
    }
}

impl From<String> for OwnedPath {
    fn from(value: String) -> Self {
        OwnedPath {
            inner: value,
        }
    }
}

impl From<&Path> for OwnedPath {
    fn from(value: &Path) -> Self {
        value.to_owned_path()
    }
}

impl From<OwnedPath> for String {
    fn from(value: OwnedPath) -> Self {
        value.inner
    }
}

impl FromStr for OwnedPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(OwnedPath::from(s))
    }
}

impl Debug for Path {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.inner, f)
    }
}

impl Debug for OwnedPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(self.as_path(), f)
    }
}
