use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};
use std::time::SystemTime;

use derive_more::IsVariant;

use super::{Native, System, SystemError};
use crate::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IsVariant)]
pub enum FileType {
    BlockDevice,
    CharDevice,
    Directory,
    Fifo,
    Symlink,
    Regular,
    Socket,
    Other,
}

macro_rules! flag_set {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$flag_meta:meta])* $flag:ident = $value:expr;)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name(u32);

        impl $name {
            $($(#[$flag_meta])* pub const $flag: $name = $name($value);)*

            pub const fn empty() -> $name {
                $name(0)
            }

            pub const fn from_bits(bits: u32) -> $name {
                $name(bits)
            }

            pub const fn bits(&self) -> u32 {
                self.0
            }

            pub const fn is_empty(&self) -> bool {
                self.0 == 0
            }

            /// Returns true if every flag in `other` is set.
            pub const fn contains(&self, other: $name) -> bool {
                self.0 & other.0 == other.0
            }

            /// Returns true if any flag in `other` is set.
            pub const fn intersects(&self, other: $name) -> bool {
                self.0 & other.0 != 0
            }
        }

        impl BitOr for $name {
            type Output = $name;

            fn bitor(self, rhs: $name) -> $name {
                $name(self.0 | rhs.0)
            }
        }

        impl BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: $name) {
                self.0 |= rhs.0;
            }
        }

        impl BitAnd for $name {
            type Output = $name;

            fn bitand(self, rhs: $name) -> $name {
                $name(self.0 & rhs.0)
            }
        }

        impl BitAndAssign for $name {
            fn bitand_assign(&mut self, rhs: $name) {
                self.0 &= rhs.0;
            }
        }

        impl Not for $name {
            type Output = $name;

            fn not(self) -> $name {
                $name(!self.0)
            }
        }
    };
}

flag_set! {
    /// POSIX mode bits. On Windows only the write bits are meaningful, mapping to the read-only
    /// attribute.
    Permissions {
        IRUSR = 0o400;
        IWUSR = 0o200;
        IXUSR = 0o100;
        IRWXU = 0o700;
        IRGRP = 0o040;
        IWGRP = 0o020;
        IXGRP = 0o010;
        IRWXG = 0o070;
        IROTH = 0o004;
        IWOTH = 0o002;
        IXOTH = 0o001;
        IRWXO = 0o007;
        ISUID = 0o4000;
        ISGID = 0o2000;
        ISVTX = 0o1000;
    }
}

impl Permissions {
    pub const WRITE: Permissions = Permissions(0o222);

    pub const fn is_readonly(&self) -> bool {
        !self.intersects(Permissions::WRITE)
    }
}

flag_set! {
    /// Windows-style file attributes. On POSIX, [`READONLY`](Attributes::READONLY) is derived
    /// from the write bits and [`HIDDEN`](Attributes::HIDDEN) from a leading dot in the filename.
    Attributes {
        NORMAL = 1 << 0;
        ARCHIVED = 1 << 1;
        HIDDEN = 1 << 2;
        INDEXED = 1 << 3;
        OFFLINE = 1 << 4;
        READONLY = 1 << 5;
        SYSTEM = 1 << 6;
        TEMPORARY = 1 << 7;
    }
}

/// A snapshot of the information the OS keeps about a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub file_type: FileType,
    pub permissions: Permissions,
    pub attributes: Attributes,
    pub size: u64,
    pub hardlinks: u64,
    /// Creation time on Windows, the last status change on POSIX.
    pub created: SystemTime,
    pub modified: SystemTime,
    pub accessed: SystemTime,
}

impl Metadata {
    pub const fn is_directory(&self) -> bool {
        self.file_type.is_directory()
    }

    pub const fn is_regular_file(&self) -> bool {
        self.file_type.is_regular()
    }

    pub const fn is_symlink(&self) -> bool {
        self.file_type.is_symlink()
    }
}

/// Reads the metadata of `path`, following symlinks.
pub fn metadata<P: AsRef<Path>>(path: P) -> Result<Metadata, SystemError> {
    Native::metadata(path.as_ref(), true)
}

/// Reads the metadata of `path` itself, without following a final symlink.
pub fn symlink_metadata<P: AsRef<Path>>(path: P) -> Result<Metadata, SystemError> {
    Native::metadata(path.as_ref(), false)
}

fn probe(
    result: Result<Metadata, SystemError>,
    check: fn(&Metadata) -> bool,
) -> Result<bool, SystemError> {
    match result {
        Ok(meta) => Ok(check(&meta)),
        Err(err) if err.is_not_found() => Ok(false),
        Err(err) => Err(err),
    }
}

/// Returns false rather than an error when `path` doesn't exist.
pub fn exists<P: AsRef<Path>>(path: P) -> Result<bool, SystemError> {
    probe(metadata(path), |_| true)
}

pub fn is_directory<P: AsRef<Path>>(path: P) -> Result<bool, SystemError> {
    probe(metadata(path), Metadata::is_directory)
}

pub fn is_regular_file<P: AsRef<Path>>(path: P) -> Result<bool, SystemError> {
    probe(metadata(path), Metadata::is_regular_file)
}

pub fn is_symlink<P: AsRef<Path>>(path: P) -> Result<bool, SystemError> {
    probe(symlink_metadata(path), Metadata::is_symlink)
}

pub fn set_permissions<P: AsRef<Path>>(path: P, permissions: Permissions) -> Result<(), SystemError> {
    let path = path.as_ref();
    log::trace!("set permissions of {path} to {:o}", permissions.bits());
    Native::set_permissions(path, permissions)
}

pub fn set_attributes<P: AsRef<Path>>(path: P, attributes: Attributes) -> Result<(), SystemError> {
    let path = path.as_ref();
    log::trace!("set attributes of {path} to {:#x}", attributes.bits());
    Native::set_attributes(path, attributes)
}
