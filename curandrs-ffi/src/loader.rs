//! Process-wide initialization.
//!
//! The host calls [`curandrs_on_load`] once, right after loading the library
//! and before any other export. Later calls are no-ops.

use std::ffi::CStr;
use std::sync::OnceLock;

use curand::SystemCurand;
use libc::{c_char, c_int};
use log::{error, info};
use thiserror::Error;

use crate::binding::CurandBinding;
use crate::bridge::{CudaAddressSpace, PointerBridge};
use crate::config::LoadOptions;
use crate::handles::NativeHandles;
use crate::host::HostError;
use crate::logging;
use crate::vtable::{CurandRsHostVtable, VtableHost};

/// Interface version reported by a successful load.
pub const CURANDRS_ABI_VERSION: c_int = 0x0001_0000;

pub type GlobalBinding = CurandBinding<VtableHost, SystemCurand, CudaAddressSpace>;

static BINDING: OnceLock<GlobalBinding> = OnceLock::new();

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("host function table is null")]
    NullVtable,

    #[error("host function table is missing `{0}`")]
    MissingEntry(&'static str),

    #[error("load options are not valid UTF-8")]
    OptionsEncoding,

    #[error("invalid load options: {0}")]
    Options(#[from] serde_json::Error),
}

/// The loaded binding, if `curandrs_on_load` has succeeded.
pub fn binding() -> Option<&'static GlobalBinding> {
    BINDING.get()
}

/// Validate the load arguments.
///
/// # Safety
/// `vtable` must be null or point to a valid table; `options_json` must be
/// null or a NUL-terminated string.
unsafe fn prepare(
    vtable: *const CurandRsHostVtable,
    options_json: *const c_char,
) -> Result<(VtableHost, LoadOptions), LoadError> {
    let table = vtable.as_ref().ok_or(LoadError::NullVtable)?;
    let host = VtableHost::new(table).map_err(|HostError(entry)| LoadError::MissingEntry(entry))?;
    let options = if options_json.is_null() {
        LoadOptions::default()
    } else {
        let json = CStr::from_ptr(options_json)
            .to_str()
            .map_err(|_| LoadError::OptionsEncoding)?;
        LoadOptions::from_json(json)?
    };
    Ok((host, options))
}

/// Initialize the binding.
///
/// Returns [`CURANDRS_ABI_VERSION`] on success and -1 when the host table is
/// incomplete or the options cannot be parsed.
#[no_mangle]
pub extern "C" fn curandrs_on_load(vtable: *const CurandRsHostVtable, options_json: *const c_char) -> c_int {
    if BINDING.get().is_some() {
        return CURANDRS_ABI_VERSION;
    }
    let (host, options) = match unsafe { prepare(vtable, options_json) } {
        Ok(prepared) => prepared,
        Err(e) => {
            // The logger may not exist yet.
            eprintln!("curandrs: load failed: {e}");
            error!("load failed: {}", e);
            return -1;
        }
    };

    if options.install_logger {
        logging::install();
    }
    logging::apply(options.log_level());

    let binding = CurandBinding::new(
        host,
        SystemCurand,
        PointerBridge::new(CudaAddressSpace),
        NativeHandles::new(),
    );
    if BINDING.set(binding).is_err() {
        info!("binding was initialized concurrently, keeping the first instance");
    }
    info!("loaded, log level {:?}", options.log_level());
    CURANDRS_ABI_VERSION
}
