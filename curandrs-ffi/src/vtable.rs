//! Host function table supplied at load time.

use std::ffi::CString;

use libc::{c_char, c_int, c_void};

use crate::host::{ArrayClass, ExceptionKind, HostError, ManagedHost, ObjectRef, PinnedArray};

/// Callbacks into the managed runtime, passed to `curandrs_on_load`.
///
/// Every entry is required. Functions returning `bool` report success;
/// functions returning an object reference return 0 on failure.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct CurandRsHostVtable {
    /// Passed back as the first argument of every callback.
    pub context: *mut c_void,
    pub throw_exception: Option<unsafe extern "C" fn(*mut c_void, c_int, *const c_char)>,
    pub exception_pending: Option<unsafe extern "C" fn(*mut c_void) -> bool>,
    pub get_native_handle: Option<unsafe extern "C" fn(*mut c_void, u64, *mut u64) -> bool>,
    pub set_native_handle: Option<unsafe extern "C" fn(*mut c_void, u64, u64) -> bool>,
    pub array_length: Option<unsafe extern "C" fn(*mut c_void, u64, *mut usize) -> bool>,
    /// Returns the array storage and writes its byte length and whether it
    /// is a copy. Null on failure.
    pub pin_array: Option<unsafe extern "C" fn(*mut c_void, u64, *mut usize, *mut bool) -> *mut c_void>,
    pub unpin_array: Option<unsafe extern "C" fn(*mut c_void, u64, *mut c_void) -> bool>,
    pub set_int_element: Option<unsafe extern "C" fn(*mut c_void, u64, usize, i32) -> bool>,
    pub new_int_array: Option<unsafe extern "C" fn(*mut c_void, *const i32, usize) -> u64>,
    pub new_long_array: Option<unsafe extern "C" fn(*mut c_void, *const i64, usize) -> u64>,
    pub new_object_array: Option<unsafe extern "C" fn(*mut c_void, usize, c_int) -> u64>,
    pub set_object_element: Option<unsafe extern "C" fn(*mut c_void, u64, usize, u64) -> bool>,
    pub release_local: Option<unsafe extern "C" fn(*mut c_void, u64)>,
}

/// A validated [`CurandRsHostVtable`].
pub struct VtableHost {
    context: *mut c_void,
    throw_exception: unsafe extern "C" fn(*mut c_void, c_int, *const c_char),
    exception_pending: unsafe extern "C" fn(*mut c_void) -> bool,
    get_native_handle: unsafe extern "C" fn(*mut c_void, u64, *mut u64) -> bool,
    set_native_handle: unsafe extern "C" fn(*mut c_void, u64, u64) -> bool,
    array_length: unsafe extern "C" fn(*mut c_void, u64, *mut usize) -> bool,
    pin_array: unsafe extern "C" fn(*mut c_void, u64, *mut usize, *mut bool) -> *mut c_void,
    unpin_array: unsafe extern "C" fn(*mut c_void, u64, *mut c_void) -> bool,
    set_int_element: unsafe extern "C" fn(*mut c_void, u64, usize, i32) -> bool,
    new_int_array: unsafe extern "C" fn(*mut c_void, *const i32, usize) -> u64,
    new_long_array: unsafe extern "C" fn(*mut c_void, *const i64, usize) -> u64,
    new_object_array: unsafe extern "C" fn(*mut c_void, usize, c_int) -> u64,
    set_object_element: unsafe extern "C" fn(*mut c_void, u64, usize, u64) -> bool,
    release_local: unsafe extern "C" fn(*mut c_void, u64),
}

// The host guarantees its callbacks may be invoked from any thread that
// calls into the binding.
unsafe impl Send for VtableHost {}
unsafe impl Sync for VtableHost {}

macro_rules! required {
    ($table:ident . $field:ident) => {
        $table.$field.ok_or(HostError(stringify!($field)))?
    };
}

impl VtableHost {
    /// Check that every callback is present. The error names the first
    /// missing entry.
    pub fn new(table: &CurandRsHostVtable) -> Result<Self, HostError> {
        Ok(Self {
            context: table.context,
            throw_exception: required!(table.throw_exception),
            exception_pending: required!(table.exception_pending),
            get_native_handle: required!(table.get_native_handle),
            set_native_handle: required!(table.set_native_handle),
            array_length: required!(table.array_length),
            pin_array: required!(table.pin_array),
            unpin_array: required!(table.unpin_array),
            set_int_element: required!(table.set_int_element),
            new_int_array: required!(table.new_int_array),
            new_long_array: required!(table.new_long_array),
            new_object_array: required!(table.new_object_array),
            set_object_element: required!(table.set_object_element),
            release_local: required!(table.release_local),
        })
    }
}

fn object_or(raw: u64, op: &'static str) -> Result<ObjectRef, HostError> {
    if raw == 0 {
        Err(HostError(op))
    } else {
        Ok(ObjectRef(raw))
    }
}

fn ok_or(ok: bool, op: &'static str) -> Result<(), HostError> {
    if ok {
        Ok(())
    } else {
        Err(HostError(op))
    }
}

impl ManagedHost for VtableHost {
    fn throw(&self, kind: ExceptionKind, message: &str) {
        let mut bytes = message.as_bytes().to_vec();
        bytes.retain(|b| *b != 0);
        let message = CString::new(bytes).unwrap_or_default();
        unsafe { (self.throw_exception)(self.context, kind as c_int, message.as_ptr()) };
    }

    fn exception_pending(&self) -> bool {
        unsafe { (self.exception_pending)(self.context) }
    }

    fn native_handle(&self, object: ObjectRef) -> Result<u64, HostError> {
        let mut value = 0u64;
        let ok = unsafe { (self.get_native_handle)(self.context, object.0, &mut value) };
        ok_or(ok, "get_native_handle")?;
        Ok(value)
    }

    fn set_native_handle(&self, object: ObjectRef, value: u64) -> Result<(), HostError> {
        let ok = unsafe { (self.set_native_handle)(self.context, object.0, value) };
        ok_or(ok, "set_native_handle")
    }

    fn array_length(&self, array: ObjectRef) -> Result<usize, HostError> {
        let mut length = 0usize;
        let ok = unsafe { (self.array_length)(self.context, array.0, &mut length) };
        ok_or(ok, "array_length")?;
        Ok(length)
    }

    fn pin_array(&self, array: ObjectRef) -> Result<PinnedArray, HostError> {
        let mut byte_len = 0usize;
        let mut is_copy = false;
        let address = unsafe { (self.pin_array)(self.context, array.0, &mut byte_len, &mut is_copy) };
        if address.is_null() {
            return Err(HostError("pin_array"));
        }
        Ok(PinnedArray {
            address,
            byte_len,
            is_copy,
        })
    }

    fn unpin_array(&self, array: ObjectRef, pinned: PinnedArray) -> Result<(), HostError> {
        let ok = unsafe { (self.unpin_array)(self.context, array.0, pinned.address) };
        ok_or(ok, "unpin_array")
    }

    fn set_int_element(&self, array: ObjectRef, index: usize, value: i32) -> Result<(), HostError> {
        let ok = unsafe { (self.set_int_element)(self.context, array.0, index, value) };
        ok_or(ok, "set_int_element")
    }

    fn new_int_array(&self, values: &[i32]) -> Result<ObjectRef, HostError> {
        let raw = unsafe { (self.new_int_array)(self.context, values.as_ptr(), values.len()) };
        object_or(raw, "new_int_array")
    }

    fn new_long_array(&self, values: &[i64]) -> Result<ObjectRef, HostError> {
        let raw = unsafe { (self.new_long_array)(self.context, values.as_ptr(), values.len()) };
        object_or(raw, "new_long_array")
    }

    fn new_object_array(&self, length: usize, class: ArrayClass) -> Result<ObjectRef, HostError> {
        let raw = unsafe { (self.new_object_array)(self.context, length, class as c_int) };
        object_or(raw, "new_object_array")
    }

    fn set_object_element(&self, array: ObjectRef, index: usize, value: ObjectRef) -> Result<(), HostError> {
        let ok = unsafe { (self.set_object_element)(self.context, array.0, index, value.0) };
        ok_or(ok, "set_object_element")
    }

    fn release_local(&self, object: ObjectRef) {
        unsafe { (self.release_local)(self.context, object.0) }
    }
}
