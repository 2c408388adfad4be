//! The managed host as seen from native code.
//!
//! Everything the binding needs from the host runtime goes through
//! [`ManagedHost`]: raising exceptions, reading and writing the native handle
//! attached to an object, pinning arrays for the duration of a call and
//! allocating result arrays.

use libc::c_void;
use thiserror::Error;

/// Reference to a managed object. Zero is the null reference.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ObjectRef(pub u64);

impl ObjectRef {
    pub const NULL: ObjectRef = ObjectRef(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// A host runtime operation reported failure.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("host runtime operation `{0}` failed")]
pub struct HostError(pub &'static str);

/// Exceptions the binding raises into the host.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionKind {
    NullPointer = 0,
    IllegalArgument = 1,
}

/// Element type of a freshly allocated object array.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayClass {
    /// Elements are `int[]`.
    IntArray = 0,
    /// Elements are `long[]`.
    LongArray = 1,
}

/// A managed array held in place for native access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinnedArray {
    pub address: *mut c_void,
    pub byte_len: usize,
    /// The host handed out a copy; it is written back on unpin.
    pub is_copy: bool,
}

pub trait ManagedHost: Send + Sync {
    fn throw(&self, kind: ExceptionKind, message: &str);
    fn exception_pending(&self) -> bool;

    /// Native handle value stored in a handle-bearing object.
    fn native_handle(&self, object: ObjectRef) -> Result<u64, HostError>;
    fn set_native_handle(&self, object: ObjectRef, value: u64) -> Result<(), HostError>;

    fn array_length(&self, array: ObjectRef) -> Result<usize, HostError>;

    /// Prevent the collector from moving or reclaiming `array` and expose its
    /// storage. Must be balanced by exactly one [`ManagedHost::unpin_array`].
    fn pin_array(&self, array: ObjectRef) -> Result<PinnedArray, HostError>;
    fn unpin_array(&self, array: ObjectRef, pinned: PinnedArray) -> Result<(), HostError>;

    fn set_int_element(&self, array: ObjectRef, index: usize, value: i32) -> Result<(), HostError>;
    fn new_int_array(&self, values: &[i32]) -> Result<ObjectRef, HostError>;
    fn new_long_array(&self, values: &[i64]) -> Result<ObjectRef, HostError>;
    fn new_object_array(&self, length: usize, class: ArrayClass) -> Result<ObjectRef, HostError>;
    fn set_object_element(&self, array: ObjectRef, index: usize, value: ObjectRef) -> Result<(), HostError>;

    /// Drop a reference the binding created and no longer needs.
    fn release_local(&self, object: ObjectRef);
}
