//! Safe Rust wrapper for the CUDA Runtime API.

use cuda_runtime_sys::*;
use libc::c_void;
use std::ffi::CStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("CUDA Runtime Error: {0} ({1})")]
pub struct CudaError(pub i32, pub &'static str);

impl CudaError {
    pub fn from_code(code: cudaError_t) -> Self {
        let msg = unsafe {
            let ptr = cudaGetErrorString(code);
            if ptr.is_null() {
                "Unknown error"
            } else {
                CStr::from_ptr(ptr).to_str().unwrap_or("Unknown error")
            }
        };
        CudaError(code, msg)
    }
}

pub type Result<T> = std::result::Result<T, CudaError>;

#[inline]
fn check(code: cudaError_t) -> Result<()> {
    if code == cudaSuccess {
        Ok(())
    } else {
        Err(CudaError::from_code(code))
    }
}

/// Where the memory behind an address lives, as reported by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryType {
    /// Host memory the runtime does not know about (pageable).
    Unregistered,
    /// Page-locked host memory (`cudaMallocHost` / `cudaHostRegister`).
    Host,
    /// Device memory.
    Device,
    /// Unified memory reachable from host and device.
    Managed,
}

impl MemoryType {
    fn from_raw(raw: cudaMemoryType) -> Self {
        match raw {
            cudaMemoryTypeHost => MemoryType::Host,
            cudaMemoryTypeDevice => MemoryType::Device,
            cudaMemoryTypeManaged => MemoryType::Managed,
            _ => MemoryType::Unregistered,
        }
    }
}

/// Ask the runtime where the memory behind an address lives.
///
/// Runtimes before CUDA 11 report unregistered host memory as
/// `cudaErrorInvalidValue` and leave that error pending; it is cleared here
/// and the address is reported as [`MemoryType::Unregistered`].
pub fn memory_type(ptr: *const c_void) -> Result<MemoryType> {
    let mut raw = cudaPointerAttributes::default();
    let code = unsafe { cudaPointerGetAttributes(&mut raw, ptr) };
    if code == cudaErrorInvalidValue {
        unsafe { cudaGetLastError() };
        return Ok(MemoryType::Unregistered);
    }
    check(code)?;
    Ok(MemoryType::from_raw(raw.type_))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_type_from_raw() {
        assert_eq!(MemoryType::from_raw(cudaMemoryTypeDevice), MemoryType::Device);
        assert_eq!(MemoryType::from_raw(cudaMemoryTypeManaged), MemoryType::Managed);
        assert_eq!(MemoryType::from_raw(cudaMemoryTypeHost), MemoryType::Host);
        assert_eq!(MemoryType::from_raw(42), MemoryType::Unregistered);
    }

    #[test]
    fn test_stack_address_is_never_device_memory() {
        // Without a device this either errors or reports host memory.
        let value = 7u32;
        if let Ok(kind) = memory_type(&value as *const u32 as *const c_void) {
            assert_ne!(kind, MemoryType::Device);
        }
    }
}
