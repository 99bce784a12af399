//! Deduplicated, colored warnings on stderr.
//!
//! The default diagnostic reporter prints through here. Each distinct message
//! appears once until [`clear_warnings`] is called.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// ANSI color codes for terminal output
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Print a warning for `component` unless the same message was already printed.
///
/// Returns `true` when the message was printed, `false` when it was a repeat.
///
/// # Example
/// ```ignore
/// warn_once("Scanner", "unknown entity reference &bogus;");
/// ```
pub fn warn_once(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    let should_print = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if should_print {
        eprintln!("{YELLOW}[Quokka {component}] ⚠ {message}{RESET}");
    }
    should_print
}

/// Forget every recorded warning (call before parsing a new document).
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeat_is_suppressed_until_cleared() {
        let message = "warning-module-self-test";
        let _ = warn_once("Test", message);
        assert!(!warn_once("Test", message));
        clear_warnings();
        assert!(warn_once("Test", message));
    }

    #[test]
    fn test_components_are_distinct() {
        let _ = warn_once("Alpha", "shared-message-self-test");
        assert!(warn_once("Beta", "shared-message-self-test"));
    }
}
