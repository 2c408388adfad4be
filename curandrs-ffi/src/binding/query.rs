//! Library version and property queries.

use curand::CurandLibrary;
use libc::c_int;
use log::trace;

use super::CurandBinding;
use crate::bridge::AddressSpace;
use crate::host::{ManagedHost, ObjectRef};
use crate::status::BoundaryError;

impl<H, L, A> CurandBinding<H, L, A>
where
    H: ManagedHost,
    L: CurandLibrary,
    A: AddressSpace,
{
    /// Store the library version in `version[0]`.
    pub fn get_version(&self, version: ObjectRef) -> c_int {
        const FUNCTION: &str = "curandGetVersion";
        self.run(|| {
            self.require_holder(FUNCTION, "version", version)?;
            trace!("Executing {}(version={:?})", FUNCTION, version);

            let value = self.curand.version()?;
            self.host
                .set_int_element(version, 0, value)
                .map_err(BoundaryError::host(FUNCTION))?;
            Ok(())
        })
    }

    /// Store a library property (major, minor, patch level) in `value[0]`.
    pub fn get_property(&self, kind: c_int, value: ObjectRef) -> c_int {
        const FUNCTION: &str = "curandGetProperty";
        self.run(|| {
            self.require_holder(FUNCTION, "value", value)?;
            trace!("Executing {}(type={}, value={:?})", FUNCTION, kind, value);

            let property = self.curand.property(kind)?;
            self.host
                .set_int_element(value, 0, property)
                .map_err(BoundaryError::host(FUNCTION))?;
            Ok(())
        })
    }
}
