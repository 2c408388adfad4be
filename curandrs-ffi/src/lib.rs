//! curandrs FFI - cuRAND for managed runtimes.
//!
//! This crate exposes cuRAND through a C ABI designed for a managed host
//! (a garbage-collected runtime with its own object model). The host passes a
//! function table to [`curandrs_on_load`]; afterwards every `curandrs_*`
//! export validates its managed arguments, translates handles and buffers,
//! calls cuRAND once and reports the status.
//!
//! Generators and distributions live in generation-stamped handle tables;
//! managed objects only ever store the handle id.

#![allow(clippy::missing_safety_doc)]

mod binding;
mod bridge;
mod config;
mod handles;
mod host;
mod loader;
mod logging;
mod rand_api;
mod status;
mod vtable;

#[cfg(test)]
mod testing;

pub use binding::{CurandBinding, FIXED_TABLE_DIMENSIONS};
pub use bridge::{
    AddressSpace, BufferRef, CudaAddressSpace, MemoryClass, PointerBridge, ResolveError, ResolvedBuffer,
    CURANDRS_BUFFER_MANAGED_ARRAY, CURANDRS_BUFFER_NATIVE,
};
pub use config::LoadOptions;
pub use handles::{DistributionRecord, GeneratorRecord, HandleId, HandleKind, HandleTable, NativeHandles, Placement};
pub use host::{ArrayClass, ExceptionKind, HostError, ManagedHost, ObjectRef, PinnedArray};
pub use loader::{binding as loaded_binding, curandrs_on_load, GlobalBinding, LoadError, CURANDRS_ABI_VERSION};
pub use logging::{curandrs_set_log_level, BindingLogger, LogLevel};
pub use rand_api::*;
pub use status::{
    curandrs_get_status_string, status_label, with_panic_boundary, BoundaryError, CURANDRS_STATUS_INTERNAL_ERROR,
};
pub use vtable::{CurandRsHostVtable, VtableHost};
