/// Prevents implementations of a public trait outside of this crate.
pub trait Sealed {}
