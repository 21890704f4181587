use mpipi::engine::error::EngineError;
use std::cell::RefCell;
use std::ffi::{CString, c_char};
use std::panic::{self, AssertUnwindSafe};

/// Result code of every fallible C entry point.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpipiStatus {
    Success = 0,
    UnknownResidueType = 1,
    ParticleOverlap = 2,
    InconsistentInput = 3,
    InvalidArgument = 4,
    Configuration = 5,
    Internal = 6,
}

impl From<&EngineError> for MpipiStatus {
    fn from(error: &EngineError) -> Self {
        match error {
            EngineError::UnknownResidueType(_) => Self::UnknownResidueType,
            EngineError::ParticleOverlap { .. } => Self::ParticleOverlap,
            EngineError::InconsistentInput(_) | EngineError::BoxTooSmall { .. } => {
                Self::InconsistentInput
            }
            EngineError::Config { .. }
            | EngineError::Parameter(_)
            | EngineError::Topology { .. } => Self::Configuration,
            EngineError::Internal(_) => Self::Internal,
        }
    }
}

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

pub(crate) fn set_last_error(message: impl Into<String>) {
    // Interior NULs would truncate the message on the C side.
    let sanitized = message.into().replace('\0', " ");
    let message = CString::new(sanitized).ok();
    LAST_ERROR.with(|slot| *slot.borrow_mut() = message);
}

pub(crate) fn clear_last_error() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}

/// Records `error` as the last error and returns its status code.
pub(crate) fn report(error: &EngineError) -> MpipiStatus {
    set_last_error(error.to_string());
    MpipiStatus::from(error)
}

pub(crate) fn invalid_argument(message: impl Into<String>) -> MpipiStatus {
    set_last_error(message);
    MpipiStatus::InvalidArgument
}

/// Pointer to the last error message of the calling thread, or null.
///
/// The pointer stays valid until the next fallible call on the same thread.
pub(crate) fn last_error_ptr() -> *const c_char {
    LAST_ERROR.with(|slot| {
        slot.borrow()
            .as_ref()
            .map_or(std::ptr::null(), |message| message.as_ptr())
    })
}

/// Runs `body`, turning a panic into [`MpipiStatus::Internal`].
pub(crate) fn catch_unwind<F>(body: F) -> MpipiStatus
where
    F: FnOnce() -> MpipiStatus,
{
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(status) => status,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            set_last_error(format!("Panic in mpipi: {message}"));
            MpipiStatus::Internal
        }
    }
}
