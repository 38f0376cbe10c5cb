//! Scoped override of the process's global locale.
//!
//! Textual sub-formats embedded in cached payloads (per-layer metadata with
//! floating-point attributes) are sensitive to the active numeric locale:
//! under a comma-decimal locale they would serialize and parse differently.
//! Every cache operation therefore pins the locale to `"C"` for its
//! duration and restores the prior locale on every exit path, including
//! callback failure.

use std::ffi::{CStr, CString};
use std::os::raw::c_int;

/// RAII guard that binds a locale category to `"C"` within a scope.
///
/// Construction captures the current locale for the category and installs
/// `"C"`; dropping the guard restores the captured locale unconditionally.
/// The underlying `setlocale` state is process-global, so the override is
/// visible to all threads while the guard is alive.
pub struct ScopedLocale {
    category: c_int,
    previous: Option<CString>,
}

impl ScopedLocale {
    /// Installs the `"C"` locale for `category` (e.g. [`libc::LC_ALL`]),
    /// capturing the current locale for restoration on drop.
    pub fn posix(category: c_int) -> Self {
        // setlocale returns a pointer that the next setlocale call may
        // invalidate, so the previous value is copied out immediately.
        let previous = unsafe {
            let prev = libc::setlocale(category, std::ptr::null());
            if prev.is_null() {
                None
            } else {
                Some(CStr::from_ptr(prev).to_owned())
            }
        };
        unsafe {
            libc::setlocale(category, c"C".as_ptr());
        }
        Self { category, previous }
    }
}

impl Drop for ScopedLocale {
    fn drop(&mut self) {
        if let Some(prev) = &self.previous {
            unsafe {
                libc::setlocale(self.category, prev.as_ptr());
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Mutex;

    /// Serializes tests that mutate or observe the process-global locale.
    pub(crate) static LOCALE_LOCK: Mutex<()> = Mutex::new(());
}
