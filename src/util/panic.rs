//! Helpers for turning caught panics into task errors.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::core::error::{AppResult, TaskPanic};

/// Render a panic payload as text.
#[must_use]
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Run `f`, converting a panic into a [`TaskPanic`] error.
///
/// # Errors
///
/// Returns the closure's own error, or a `TaskPanic` if it panicked.
pub fn catch_task_panic<T>(f: impl FnOnce() -> AppResult<T>) -> AppResult<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(TaskPanic {
            message: panic_message(payload.as_ref()),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catch_task_panic_str_payload() {
        let err = catch_task_panic::<()>(|| panic!("boom")).unwrap_err();
        assert!(err.is::<TaskPanic>());
        assert_eq!(err.to_string(), "task panicked: boom");
    }

    #[test]
    fn test_catch_task_panic_formatted_payload() {
        let err = catch_task_panic::<()>(|| panic!("boom {}", 7)).unwrap_err();
        assert_eq!(err.to_string(), "task panicked: boom 7");
    }

    #[test]
    fn test_catch_task_panic_passes_through() {
        assert_eq!(catch_task_panic(|| Ok(3)).unwrap(), 3);
        let err = catch_task_panic::<()>(|| Err(anyhow::anyhow!("plain"))).unwrap_err();
        assert_eq!(err.to_string(), "plain");
    }

    #[test]
    fn test_panic_message_non_string_payload() {
        let payload = panic::catch_unwind(|| std::panic::panic_any(42_u32)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }
}
