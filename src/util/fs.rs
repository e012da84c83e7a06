use std::io;

use libc::c_int;

/// The calling thread's `errno`, read right after a failed libc call.
pub fn err_no() -> c_int {
    io::Error::last_os_error().raw_os_error().unwrap_or(libc::EIO)
}
