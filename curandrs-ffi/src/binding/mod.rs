//! Call adapters.
//!
//! One method per cuRAND entry point. Each method null-checks its
//! non-primitive arguments, resolves handles and buffers, makes exactly one
//! native call and writes results back into managed storage. The returned
//! integer is the native status, or [`CURANDRS_STATUS_INTERNAL_ERROR`] when
//! the failure happened on this side of the boundary.

mod generate;
mod lifecycle;
mod query;
mod tables;

use std::mem::size_of;

use curand::{CurandError, CurandLibrary};
use curand_sys::{CURAND_STATUS_NOT_INITIALIZED, CURAND_STATUS_SUCCESS};
use libc::c_int;
use log::debug;

use crate::bridge::{AddressSpace, BufferRef, PointerBridge, ResolvedBuffer};
use crate::handles::{attached_id, DistributionRecord, GeneratorRecord, NativeHandles};
use crate::host::{ManagedHost, ObjectRef};
use crate::status::{report, BoundaryError};

pub use tables::FIXED_TABLE_DIMENSIONS;

/// How an adapter stopped early.
#[derive(Debug)]
pub(crate) enum Exit {
    /// A status to hand back unchanged.
    Status(c_int),
    Boundary(BoundaryError),
}

impl From<BoundaryError> for Exit {
    fn from(error: BoundaryError) -> Self {
        Exit::Boundary(error)
    }
}

impl From<CurandError> for Exit {
    fn from(error: CurandError) -> Self {
        Exit::Status(error.0)
    }
}

pub(crate) type Flow = Result<(), Exit>;

/// The binding over one host, one cuRAND library and one address space.
pub struct CurandBinding<H, L, A> {
    host: H,
    curand: L,
    bridge: PointerBridge<A>,
    handles: NativeHandles,
}

fn require(object: ObjectRef, function: &'static str, param: &'static str) -> Result<(), BoundaryError> {
    if object.is_null() {
        Err(BoundaryError::NullArgument { function, param })
    } else {
        Ok(())
    }
}

fn require_buffer<'b>(
    buffer: Option<&'b BufferRef>,
    function: &'static str,
    param: &'static str,
) -> Result<&'b BufferRef, BoundaryError> {
    buffer.ok_or(BoundaryError::NullArgument { function, param })
}

impl<H, L, A> CurandBinding<H, L, A>
where
    H: ManagedHost,
    L: CurandLibrary,
    A: AddressSpace,
{
    pub fn new(host: H, curand: L, bridge: PointerBridge<A>, handles: NativeHandles) -> Self {
        Self {
            host,
            curand,
            bridge,
            handles,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn curand(&self) -> &L {
        &self.curand
    }

    pub fn handles(&self) -> &NativeHandles {
        &self.handles
    }

    /// Run an adapter body and collapse its outcome into a status.
    fn run<F>(&self, body: F) -> c_int
    where
        F: FnOnce() -> Flow,
    {
        match body() {
            Ok(()) => CURAND_STATUS_SUCCESS,
            Err(Exit::Status(status)) => status,
            Err(Exit::Boundary(error)) => report(&self.host, &error),
        }
    }

    /// Check that `array` is non-null and holds at least one element.
    fn require_holder(&self, function: &'static str, param: &'static str, array: ObjectRef) -> Result<(), BoundaryError> {
        require(array, function, param)?;
        let length = self.host.array_length(array).map_err(BoundaryError::host(function))?;
        if length < 1 {
            return Err(BoundaryError::IllegalSize {
                function,
                param,
                required: 1,
                actual: length,
            });
        }
        Ok(())
    }

    /// The live generator attached to `object`, which must be non-null.
    fn generator(&self, function: &'static str, object: ObjectRef) -> Result<GeneratorRecord, Exit> {
        let record = attached_id(&self.host, object)
            .map_err(BoundaryError::host(function))?
            .and_then(|id| self.handles.generator(id));
        record.ok_or_else(|| {
            debug!("{}: no live generator attached to {:?}", function, object);
            Exit::Status(CURAND_STATUS_NOT_INITIALIZED)
        })
    }

    fn distribution(&self, function: &'static str, object: ObjectRef) -> Result<DistributionRecord, Exit> {
        let record = attached_id(&self.host, object)
            .map_err(BoundaryError::host(function))?
            .and_then(|id| self.handles.distribution(id));
        record.ok_or_else(|| {
            debug!("{}: no live distribution attached to {:?}", function, object);
            Exit::Status(CURAND_STATUS_NOT_INITIALIZED)
        })
    }

    /// Resolve a buffer that receives `n` elements of `T`.
    ///
    /// When the buffer size is known it must hold all `n` elements.
    fn output<T>(
        &self,
        function: &'static str,
        param: &'static str,
        buffer: &BufferRef,
        n: usize,
    ) -> Result<ResolvedBuffer<'_, H>, BoundaryError> {
        let resolved = self
            .bridge
            .resolve(&self.host, buffer)
            .map_err(|e| BoundaryError::Unresolvable {
                function,
                param,
                reason: e.to_string(),
            })?;
        if let Some(capacity) = resolved.capacity() {
            let required = n.checked_mul(size_of::<T>()).unwrap_or(usize::MAX);
            if required > capacity {
                return Err(BoundaryError::IllegalSize {
                    function,
                    param,
                    required,
                    actual: capacity,
                });
            }
        }
        Ok(resolved)
    }

    fn release(
        &self,
        function: &'static str,
        param: &'static str,
        buffer: ResolvedBuffer<'_, H>,
    ) -> Result<(), BoundaryError> {
        buffer
            .release()
            .map_err(|_| BoundaryError::ReleaseFailed { function, param })
    }
}
