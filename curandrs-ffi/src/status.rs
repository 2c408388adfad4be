//! Status codes, boundary errors and the panic boundary.

use std::panic::{catch_unwind, AssertUnwindSafe};

use curand::status_name;
use curand_sys::*;
use libc::{c_char, c_int};
use thiserror::Error;

use crate::host::{ExceptionKind, HostError, ManagedHost};

/// Returned when the failure happened on this side of the boundary.
///
/// Negative, so it never collides with a cuRAND status.
pub const CURANDRS_STATUS_INTERNAL_ERROR: c_int = -32786;

/// Failures detected by the binding itself. The native call is either never
/// made or its outcome is discarded.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoundaryError {
    #[error("Parameter '{param}' is null for {function}")]
    NullArgument {
        function: &'static str,
        param: &'static str,
    },

    #[error("Parameter '{param}' must have a size >= {required} for {function}, got {actual}")]
    IllegalSize {
        function: &'static str,
        param: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("{function}: {source}")]
    Host {
        function: &'static str,
        #[source]
        source: HostError,
    },

    #[error("Could not resolve buffer '{param}' for {function}: {reason}")]
    Unresolvable {
        function: &'static str,
        param: &'static str,
        reason: String,
    },

    #[error("Could not release buffer '{param}' for {function}")]
    ReleaseFailed {
        function: &'static str,
        param: &'static str,
    },

    #[error("Unknown set type for {function}: {set}")]
    UnknownVectorSet { function: &'static str, set: c_int },

    #[error("{function} returned a null table")]
    NullNativeTable { function: &'static str },

    #[error("Could not create {what} for {function}")]
    ArrayConstruction {
        function: &'static str,
        what: &'static str,
    },

    #[error("Exception pending after writing {what} for {function}")]
    PendingException {
        function: &'static str,
        what: &'static str,
    },

    #[error("the cuRAND binding has not been loaded")]
    NotLoaded,
}

impl BoundaryError {
    /// Exception raised into the host for this error, if any. Only argument
    /// errors become exceptions; everything else is reported as a status.
    pub fn exception(&self) -> Option<ExceptionKind> {
        match self {
            BoundaryError::NullArgument { .. } => Some(ExceptionKind::NullPointer),
            BoundaryError::IllegalSize { .. } => Some(ExceptionKind::IllegalArgument),
            _ => None,
        }
    }

    pub fn host(function: &'static str) -> impl FnOnce(HostError) -> BoundaryError {
        move |source| BoundaryError::Host { function, source }
    }
}

/// Surface a boundary error: throw into the host where required, log it and
/// return the internal error status.
pub fn report<H: ManagedHost + ?Sized>(host: &H, error: &BoundaryError) -> c_int {
    let message = error.to_string();
    match error.exception() {
        Some(kind) => {
            log::debug!("Throwing {:?}: {}", kind, message);
            host.throw(kind, &message);
        }
        None => log::error!("{}", message),
    }
    CURANDRS_STATUS_INTERNAL_ERROR
}

/// Symbolic name for any status this crate can return.
pub fn status_label(status: c_int) -> &'static str {
    if status == CURANDRS_STATUS_INTERNAL_ERROR {
        "CURANDRS_STATUS_INTERNAL_ERROR"
    } else {
        status_name(status)
    }
}

fn status_cstr(status: c_int) -> &'static [u8] {
    match status {
        CURANDRS_STATUS_INTERNAL_ERROR => b"CURANDRS_STATUS_INTERNAL_ERROR\0",
        CURAND_STATUS_SUCCESS => b"CURAND_STATUS_SUCCESS\0",
        CURAND_STATUS_VERSION_MISMATCH => b"CURAND_STATUS_VERSION_MISMATCH\0",
        CURAND_STATUS_NOT_INITIALIZED => b"CURAND_STATUS_NOT_INITIALIZED\0",
        CURAND_STATUS_ALLOCATION_FAILED => b"CURAND_STATUS_ALLOCATION_FAILED\0",
        CURAND_STATUS_TYPE_ERROR => b"CURAND_STATUS_TYPE_ERROR\0",
        CURAND_STATUS_OUT_OF_RANGE => b"CURAND_STATUS_OUT_OF_RANGE\0",
        CURAND_STATUS_LENGTH_NOT_MULTIPLE => b"CURAND_STATUS_LENGTH_NOT_MULTIPLE\0",
        CURAND_STATUS_DOUBLE_PRECISION_REQUIRED => b"CURAND_STATUS_DOUBLE_PRECISION_REQUIRED\0",
        CURAND_STATUS_LAUNCH_FAILURE => b"CURAND_STATUS_LAUNCH_FAILURE\0",
        CURAND_STATUS_PREEXISTING_FAILURE => b"CURAND_STATUS_PREEXISTING_FAILURE\0",
        CURAND_STATUS_INITIALIZATION_FAILED => b"CURAND_STATUS_INITIALIZATION_FAILED\0",
        CURAND_STATUS_ARCH_MISMATCH => b"CURAND_STATUS_ARCH_MISMATCH\0",
        CURAND_STATUS_INTERNAL_ERROR => b"CURAND_STATUS_INTERNAL_ERROR\0",
        _ => b"INVALID curandStatus_t\0",
    }
}

/// Get the name of a status code as a static C string.
#[no_mangle]
pub extern "C" fn curandrs_get_status_string(status: c_int) -> *const c_char {
    status_cstr(status).as_ptr() as *const c_char
}

/// Run an export body, turning a panic into the internal error status.
pub fn with_panic_boundary<F>(context: &str, f: F) -> c_int
where
    F: FnOnce() -> c_int,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(_) => {
            log::error!("panic in {}", context);
            CURANDRS_STATUS_INTERNAL_ERROR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeHost;
    use std::ffi::CStr;

    #[test]
    fn test_internal_error_overlaps_no_native_status() {
        for code in [0, 100, 101, 102, 103, 104, 105, 106, 201, 202, 203, 204, 999] {
            assert_ne!(code, CURANDRS_STATUS_INTERNAL_ERROR);
            assert_ne!(status_label(code), "CURANDRS_STATUS_INTERNAL_ERROR");
        }
    }

    #[test]
    fn test_null_argument_throws() {
        let host = FakeHost::new();
        let err = BoundaryError::NullArgument {
            function: "curandGenerate",
            param: "outputPtr",
        };
        assert_eq!(report(&host, &err), CURANDRS_STATUS_INTERNAL_ERROR);
        let thrown = host.exceptions();
        assert_eq!(thrown.len(), 1);
        assert_eq!(thrown[0].0, ExceptionKind::NullPointer);
        assert_eq!(thrown[0].1, "Parameter 'outputPtr' is null for curandGenerate");
    }

    #[test]
    fn test_non_argument_errors_do_not_throw() {
        let host = FakeHost::new();
        let err = BoundaryError::UnknownVectorSet {
            function: "curandGetDirectionVectors32",
            set: 7,
        };
        assert_eq!(report(&host, &err), CURANDRS_STATUS_INTERNAL_ERROR);
        assert!(host.exceptions().is_empty());
    }

    #[test]
    fn test_status_strings() {
        let name = unsafe { CStr::from_ptr(curandrs_get_status_string(CURAND_STATUS_OUT_OF_RANGE)) };
        assert_eq!(name.to_str().unwrap(), "CURAND_STATUS_OUT_OF_RANGE");
        let name = unsafe { CStr::from_ptr(curandrs_get_status_string(CURANDRS_STATUS_INTERNAL_ERROR)) };
        assert_eq!(name.to_str().unwrap(), "CURANDRS_STATUS_INTERNAL_ERROR");
        assert_eq!(status_label(-5), "INVALID curandStatus_t");
    }

    #[test]
    fn test_panic_boundary() {
        assert_eq!(with_panic_boundary("ok", || 104), 104);
        assert_eq!(
            with_panic_boundary("boom", || panic!("boom")),
            CURANDRS_STATUS_INTERNAL_ERROR
        );
    }
}
