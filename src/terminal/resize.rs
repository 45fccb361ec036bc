//! Window-resize notification.
//!
//! The `SIGWINCH` handler only raises a flag. The event loop polls the flag
//! at a safe point, after the current event has been fully processed, and
//! forwards the new size to [`Session::notify_resize`](crate::Session::notify_resize).

#![allow(unsafe_code)]

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

static RESIZE_PENDING: AtomicBool = AtomicBool::new(false);

extern "C" fn on_sigwinch(_signum: libc::c_int) {
    RESIZE_PENDING.store(true, Ordering::SeqCst);
}

/// Install the `SIGWINCH` handler.
pub fn install_resize_handler() -> io::Result<()> {
    // SAFETY: the handler only stores to an atomic, which is async-signal-safe.
    let previous = unsafe {
        libc::signal(
            libc::SIGWINCH,
            on_sigwinch as extern "C" fn(libc::c_int) as libc::sighandler_t,
        )
    };
    if previous == libc::SIG_ERR {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

/// Raise the resize flag by hand.
pub fn request_resize() {
    RESIZE_PENDING.store(true, Ordering::SeqCst);
}

/// Consume the resize flag. Returns `true` at most once per notification.
pub fn take_resize_pending() -> bool {
    RESIZE_PENDING.swap(false, Ordering::SeqCst)
}
