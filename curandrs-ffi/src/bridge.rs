//! Pointer/buffer bridge.
//!
//! Turns a [`BufferRef`] coming from the host into a raw address that stays
//! valid for one native call. Device memory, page-locked host memory and
//! ordinary host memory are all handed over in place; managed arrays are
//! pinned by the host and unpinned again on release. Nothing is copied here.

use cuda_runtime::{memory_type, MemoryType};
use libc::{c_int, c_void};
use log::{debug, error, trace};
use thiserror::Error;

use crate::host::{HostError, ManagedHost, ObjectRef, PinnedArray};

pub const CURANDRS_BUFFER_NATIVE: c_int = 0;
pub const CURANDRS_BUFFER_MANAGED_ARRAY: c_int = 1;

/// Host description of a memory region.
///
/// `kind` selects the source: a native address (device, pinned or plain host
/// memory, told apart by querying the runtime) or a managed array that must
/// be pinned. `byte_offset` is added to the resolved base address.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferRef {
    pub kind: c_int,
    pub address: u64,
    pub array: ObjectRef,
    pub byte_offset: u64,
}

impl BufferRef {
    pub fn native(address: u64) -> Self {
        Self {
            kind: CURANDRS_BUFFER_NATIVE,
            address,
            array: ObjectRef::NULL,
            byte_offset: 0,
        }
    }

    pub fn managed_array(array: ObjectRef) -> Self {
        Self {
            kind: CURANDRS_BUFFER_MANAGED_ARRAY,
            address: 0,
            array,
            byte_offset: 0,
        }
    }

    pub fn with_byte_offset(mut self, byte_offset: u64) -> Self {
        self.byte_offset = byte_offset;
        self
    }
}

/// Where the bytes behind a resolved buffer live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryClass {
    Device,
    /// Unified memory, addressable from both sides.
    Unified,
    /// Page-locked host memory.
    PinnedHost,
    /// Ordinary host memory the runtime does not track.
    PageableHost,
    /// A managed array pinned by the host for this call.
    ManagedArray,
}

impl MemoryClass {
    pub fn is_device_accessible(self) -> bool {
        matches!(self, MemoryClass::Device | MemoryClass::Unified | MemoryClass::PinnedHost)
    }
}

/// Classifies native addresses.
pub trait AddressSpace: Send + Sync {
    fn classify(&self, address: u64) -> MemoryClass;
}

/// Classification through `cudaPointerGetAttributes`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CudaAddressSpace;

impl AddressSpace for CudaAddressSpace {
    fn classify(&self, address: u64) -> MemoryClass {
        match memory_type(address as usize as *const c_void) {
            Ok(kind) => match kind {
                MemoryType::Device => MemoryClass::Device,
                MemoryType::Managed => MemoryClass::Unified,
                MemoryType::Host => MemoryClass::PinnedHost,
                MemoryType::Unregistered => MemoryClass::PageableHost,
            },
            Err(e) => {
                debug!("Could not query attributes of {:#x}, assuming host memory: {}", address, e);
                MemoryClass::PageableHost
            }
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("unknown buffer kind {0}")]
    UnknownKind(c_int),

    #[error("managed array reference is null")]
    NullArray,

    #[error("byte offset overflows the address")]
    OffsetOverflow,

    #[error("byte offset {offset} is past the end of a {byte_len} byte array")]
    OffsetOutOfBounds { offset: u64, byte_len: usize },

    #[error(transparent)]
    Pin(#[from] HostError),
}

/// A buffer resolved for one native call.
///
/// Released exactly once: explicitly through [`ResolvedBuffer::release`], which
/// reports failure, or on drop for every other exit path.
pub struct ResolvedBuffer<'h, H: ManagedHost + ?Sized> {
    host: &'h H,
    class: MemoryClass,
    address: *mut c_void,
    capacity: Option<usize>,
    pinned: Option<(ObjectRef, PinnedArray)>,
    released: bool,
}

impl<'h, H: ManagedHost + ?Sized> ResolvedBuffer<'h, H> {
    pub fn address(&self) -> *mut c_void {
        self.address
    }

    pub fn as_mut_ptr<T>(&self) -> *mut T {
        self.address as *mut T
    }

    pub fn class(&self) -> MemoryClass {
        self.class
    }

    /// Bytes addressable from [`ResolvedBuffer::address`], when known.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn release(mut self) -> Result<(), HostError> {
        self.release_inner()
    }

    fn release_inner(&mut self) -> Result<(), HostError> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        match self.pinned.take() {
            Some((array, pinned)) => {
                trace!("Unpinning array {:?} (copy: {})", array, pinned.is_copy);
                self.host.unpin_array(array, pinned)
            }
            None => Ok(()),
        }
    }
}

impl<H: ManagedHost + ?Sized> Drop for ResolvedBuffer<'_, H> {
    fn drop(&mut self) {
        if let Err(e) = self.release_inner() {
            error!("Could not release buffer: {}", e);
        }
    }
}

/// Resolves [`BufferRef`]s against an address space.
pub struct PointerBridge<A> {
    space: A,
}

impl<A: AddressSpace> PointerBridge<A> {
    pub fn new(space: A) -> Self {
        Self { space }
    }

    pub fn resolve<'h, H: ManagedHost + ?Sized>(
        &self,
        host: &'h H,
        buffer: &BufferRef,
    ) -> Result<ResolvedBuffer<'h, H>, ResolveError> {
        match buffer.kind {
            CURANDRS_BUFFER_NATIVE => {
                let address = buffer
                    .address
                    .checked_add(buffer.byte_offset)
                    .ok_or(ResolveError::OffsetOverflow)?;
                let class = if buffer.address == 0 {
                    MemoryClass::PageableHost
                } else {
                    self.space.classify(buffer.address)
                };
                trace!("Resolved native address {:#x} as {:?}", address, class);
                Ok(ResolvedBuffer {
                    host,
                    class,
                    address: address as usize as *mut c_void,
                    capacity: None,
                    pinned: None,
                    released: false,
                })
            }
            CURANDRS_BUFFER_MANAGED_ARRAY => {
                if buffer.array.is_null() {
                    return Err(ResolveError::NullArray);
                }
                let pinned = host.pin_array(buffer.array).map_err(ResolveError::from)?;
                // From here on the guard owns the pin, so every error path unpins.
                let mut resolved = ResolvedBuffer {
                    host,
                    class: MemoryClass::ManagedArray,
                    address: pinned.address,
                    capacity: Some(pinned.byte_len),
                    pinned: Some((buffer.array, pinned)),
                    released: false,
                };
                let offset = usize::try_from(buffer.byte_offset)
                    .ok()
                    .filter(|offset| *offset <= pinned.byte_len)
                    .ok_or(ResolveError::OffsetOutOfBounds {
                        offset: buffer.byte_offset,
                        byte_len: pinned.byte_len,
                    })?;
                resolved.address = unsafe { (pinned.address as *mut u8).add(offset) } as *mut c_void;
                resolved.capacity = Some(pinned.byte_len - offset);
                trace!("Pinned array {:?} at {:p}", buffer.array, resolved.address);
                Ok(resolved)
            }
            other => Err(ResolveError::UnknownKind(other)),
        }
    }
}
