//! Raw FFI bindings to the CUDA Runtime API.
//!
//! Only the pieces the cuRAND bridge touches are declared here: error codes,
//! the opaque stream type and pointer attribute queries.
//! For a safer interface, use the `cuda-runtime` crate.

#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
#![allow(non_upper_case_globals)]

use libc::{c_char, c_int, c_void};

// ============================================================================
// Error Types
// ============================================================================

pub type cudaError_t = c_int;

pub const cudaSuccess: cudaError_t = 0;
pub const cudaErrorInvalidValue: cudaError_t = 1;
pub const cudaErrorMemoryAllocation: cudaError_t = 2;
pub const cudaErrorInitializationError: cudaError_t = 3;
pub const cudaErrorCudartUnloading: cudaError_t = 4;
pub const cudaErrorInvalidDevicePointer: cudaError_t = 17;
pub const cudaErrorInsufficientDriver: cudaError_t = 35;
pub const cudaErrorNoDevice: cudaError_t = 100;
pub const cudaErrorInvalidDevice: cudaError_t = 101;
pub const cudaErrorIllegalAddress: cudaError_t = 700;
pub const cudaErrorHostMemoryAlreadyRegistered: cudaError_t = 712;
pub const cudaErrorHostMemoryNotRegistered: cudaError_t = 713;
pub const cudaErrorUnknown: cudaError_t = 999;

// ============================================================================
// Memory Types
// ============================================================================

pub type cudaMemoryType = c_int;

pub const cudaMemoryTypeUnregistered: cudaMemoryType = 0;
pub const cudaMemoryTypeHost: cudaMemoryType = 1;
pub const cudaMemoryTypeDevice: cudaMemoryType = 2;
pub const cudaMemoryTypeManaged: cudaMemoryType = 3;

// ============================================================================
// Opaque Types
// ============================================================================

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct CUstream_st {
    _unused: [u8; 0],
}
pub type cudaStream_t = *mut CUstream_st;

// ============================================================================
// Structures
// ============================================================================

/// Layout used since CUDA 11 (the `memoryType` field was removed).
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct cudaPointerAttributes {
    pub type_: cudaMemoryType,
    pub device: c_int,
    pub devicePointer: *mut c_void,
    pub hostPointer: *mut c_void,
}

impl Default for cudaPointerAttributes {
    fn default() -> Self {
        Self {
            type_: cudaMemoryTypeUnregistered,
            device: -1,
            devicePointer: std::ptr::null_mut(),
            hostPointer: std::ptr::null_mut(),
        }
    }
}

// ============================================================================
// External Functions
// ============================================================================

#[cfg(not(feature = "stub"))]
extern "C" {
    pub fn cudaGetErrorString(error: cudaError_t) -> *const c_char;
    pub fn cudaGetLastError() -> cudaError_t;
    pub fn cudaPointerGetAttributes(
        attributes: *mut cudaPointerAttributes,
        ptr: *const c_void,
    ) -> cudaError_t;
}

// ============================================================================
// Stub Implementations (no CUDA libraries linked)
// ============================================================================

#[cfg(feature = "stub")]
pub use stub::*;

#[cfg(feature = "stub")]
mod stub {
    use super::*;

    static ERROR_STR: &[u8] = b"CUDA runtime not available\0";

    pub unsafe fn cudaGetErrorString(_error: cudaError_t) -> *const c_char {
        ERROR_STR.as_ptr() as *const c_char
    }

    pub unsafe fn cudaGetLastError() -> cudaError_t {
        cudaSuccess
    }

    /// Without a runtime every address is ordinary host memory.
    pub unsafe fn cudaPointerGetAttributes(
        attributes: *mut cudaPointerAttributes,
        ptr: *const c_void,
    ) -> cudaError_t {
        if attributes.is_null() {
            return cudaErrorInvalidValue;
        }
        *attributes = cudaPointerAttributes {
            type_: cudaMemoryTypeUnregistered,
            device: -1,
            devicePointer: std::ptr::null_mut(),
            hostPointer: ptr as *mut c_void,
        };
        cudaSuccess
    }
}
