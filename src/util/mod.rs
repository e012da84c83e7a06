#[cfg(all(feature = "os", target_os = "linux"))]
pub mod fs;
#[cfg(all(feature = "os", any(target_os = "linux", windows)))]
pub mod sealed;
