//! Character-level classification of path text.
//!
//! Every function here works on bytes. All characters the grammar cares about are ASCII, so any
//! offset produced here is also a valid `str` boundary.

use derive_more::IsVariant;

/// Returns true for both separator styles, regardless of the target platform.
#[inline(always)]
pub const fn is_separator(ch: u8) -> bool {
    matches!(ch, b'/' | b'\\')
}

/// Returns true if `bytes` begins with a drive specifier such as `C:`.
pub const fn starts_with_drive(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Returns true if `bytes` begins with the long-path marker `\\?\`, in either separator style.
pub const fn starts_with_long_path(bytes: &[u8]) -> bool {
    bytes.len() >= 4
        && is_separator(bytes[0])
        && is_separator(bytes[1])
        && bytes[2] == b'?'
        && is_separator(bytes[3])
}

/// Returns the end of the host name if `bytes` begins with a UNC prefix such as `//net`.
pub fn unc_name_end(bytes: &[u8]) -> Option<usize> {
    if bytes.len() < 3 || !is_separator(bytes[0]) || !is_separator(bytes[1]) || is_separator(bytes[2]) {
        None?
    }
    Some(2 + bytes[2..].iter().take_while(|ch| !is_separator(**ch)).count())
}

/// The shape of the root found at the start of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IsVariant)]
pub enum Prefix {
    /// `\\?\`, optionally followed by a drive specifier.
    LongPath { drive: bool },
    /// `//host`.
    Unc,
    /// `C:`.
    Drive,
    /// A leading `/`.
    Posix,
    /// No root at all.
    None,
}

/// Offsets describing the root of a path. Always satisfies
/// `name_end <= end <= relative_start <= text.len()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootSpan {
    pub prefix: Prefix,
    /// End of the root name: the drive, share or long-path marker. Zero for POSIX roots.
    pub name_end: usize,
    /// End of the root, including its directory separator when present.
    pub end: usize,
    /// Start of the relative part. Separators repeated after the root are skipped.
    pub relative_start: usize,
}

impl RootSpan {
    pub const fn has_name(&self) -> bool {
        self.name_end > 0
    }

    pub const fn has_directory(&self) -> bool {
        self.end > self.name_end
    }
}

/// Classifies the root of `text`. Shapes are tried in priority order: long-path marker, UNC
/// share, drive specifier and finally a POSIX leading separator.
pub fn parse_root(text: &str) -> RootSpan {
    let bytes = text.as_bytes();

    let (prefix, name_end) = if starts_with_long_path(bytes) {
        if starts_with_drive(&bytes[4..]) {
            (Prefix::LongPath { drive: true }, 6)
        } else {
            (Prefix::LongPath { drive: false }, 4)
        }
    } else if let Some(end) = unc_name_end(bytes) {
        (Prefix::Unc, end)
    } else if starts_with_drive(bytes) {
        (Prefix::Drive, 2)
    } else if bytes.first().is_some_and(|ch| is_separator(*ch)) {
        (Prefix::Posix, 0)
    } else {
        (Prefix::None, 0)
    };

    let end = match prefix {
        Prefix::None => 0,
        Prefix::Posix => 1,
        // The bare marker already ends with its own separator.
        Prefix::LongPath { drive: false } => name_end,
        _ if bytes.get(name_end).is_some_and(|ch| is_separator(*ch)) => name_end + 1,
        _ => name_end,
    };

    let relative_start = end + bytes[end..].iter().take_while(|ch| is_separator(**ch)).count();

    RootSpan {
        prefix,
        name_end,
        end,
        relative_start,
    }
}

/// Returns the offset after stripping trailing separators from `bytes`, never going below `floor`.
pub fn trim_separators(bytes: &[u8], floor: usize) -> usize {
    let mut end = bytes.len();
    while end > floor && is_separator(bytes[end - 1]) {
        end -= 1;
    }
    end
}

/// Returns the offset of the last separator in `bytes[from..]`, if any.
pub fn last_separator(bytes: &[u8], from: usize) -> Option<usize> {
    bytes[from..].iter().rposition(|ch| is_separator(*ch)).map(|i| from + i)
}

/// Returns the offset within `name` where its extension begins. `.` and `..` never have one, and
/// neither do names whose only dot is leading or trailing.
pub fn extension_start(name: &str) -> Option<usize> {
    if name == "." || name == ".." {
        None?
    }
    match name.rfind('.') {
        Some(0) | None => None,
        Some(i) if i + 1 == name.len() => None,
        Some(i) => Some(i),
    }
}
