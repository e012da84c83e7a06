//! Comparison and hashing of paths. All of these look at the text with every separator normalized,
//! without requiring [`OwnedPath::make_preferred`] to be called first.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use super::grammar;
use super::{OwnedPath, Path};

impl Path {
    fn normalized_bytes(&self) -> impl Iterator<Item = u8> + '_ {
        self.inner.bytes().map(|ch| if grammar::is_separator(ch) { b'/' } else { ch })
    }
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.normalized_bytes().eq(other.normalized_bytes())
    }
}

impl Eq for Path {}

impl PartialOrd for Path {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Path {
    fn cmp(&self, other: &Self) -> Ordering {
        self.normalized_bytes().cmp(other.normalized_bytes())
    }
}

impl Hash for Path {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for ch in self.normalized_bytes() {
            state.write_u8(ch);
        }
        // Same terminator as str, so that prefixes don't collide when hashed in sequence.
        state.write_u8(0xff);
    }
}

impl PartialEq for OwnedPath {
    fn eq(&self, other: &Self) -> bool {
        self.as_path() == other.as_path()
    }
}

impl Eq for OwnedPath {}

impl PartialOrd for OwnedPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OwnedPath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_path().cmp(other.as_path())
    }
}

impl Hash for OwnedPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_path().hash(state);
    }
}

macro_rules! impl_cmp {
    ($lhs:ty, $rhs:ty) => {
        impl<'a> PartialEq<$rhs> for $lhs {
            fn eq(&self, other: &$rhs) -> bool {
                <Path as PartialEq>::eq(self.as_ref(), other.as_ref())
            }
        }

        impl<'a> PartialEq<$lhs> for $rhs {
            fn eq(&self, other: &$lhs) -> bool {
                <Path as PartialEq>::eq(self.as_ref(), other.as_ref())
            }
        }

        impl<'a> PartialOrd<$rhs> for $lhs {
            fn partial_cmp(&self, other: &$rhs) -> Option<Ordering> {
                Some(<Path as Ord>::cmp(self.as_ref(), other.as_ref()))
            }
        }

        impl<'a> PartialOrd<$lhs> for $rhs {
            fn partial_cmp(&self, other: &$lhs) -> Option<Ordering> {
                Some(<Path as Ord>::cmp(self.as_ref(), other.as_ref()))
            }
        }
    };
}

impl_cmp!(OwnedPath, Path);
impl_cmp!(OwnedPath, &'a Path);
impl_cmp!(Path, str);
impl_cmp!(Path, &'a str);
impl_cmp!(&'a Path, str);
impl_cmp!(Path, String);
impl_cmp!(OwnedPath, str);
impl_cmp!(OwnedPath, &'a str);
impl_cmp!(OwnedPath, String);
