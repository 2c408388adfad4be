//! Quasi-random direction vectors and scramble constants.
//!
//! cuRAND hands out pointers to static tables without reporting their
//! length. The tables are copied into freshly allocated managed arrays and
//! the result is stored at index 0 of the caller's holder array.

use std::slice;

use curand::CurandLibrary;
use curand_sys::{
    CURAND_DIRECTION_VECTORS_32_JOEKUO6, CURAND_DIRECTION_VECTORS_64_JOEKUO6,
    CURAND_SCRAMBLED_DIRECTION_VECTORS_32_JOEKUO6, CURAND_SCRAMBLED_DIRECTION_VECTORS_64_JOEKUO6,
};
use libc::c_int;
use log::trace;

use super::CurandBinding;
use crate::bridge::AddressSpace;
use crate::host::{ArrayClass, HostError, ManagedHost, ObjectRef};
use crate::status::BoundaryError;

/// Number of dimensions in every direction vector and scramble table.
pub const FIXED_TABLE_DIMENSIONS: usize = 20_000;

impl<H, L, A> CurandBinding<H, L, A>
where
    H: ManagedHost,
    L: CurandLibrary,
    A: AddressSpace,
{
    pub fn get_direction_vectors_32(&self, vectors: ObjectRef, set: c_int) -> c_int {
        const FUNCTION: &str = "curandGetDirectionVectors32";
        self.run(|| {
            self.require_holder(FUNCTION, "vectors", vectors)?;
            trace!("Executing {}(vectors={:?}, set={})", FUNCTION, vectors, set);

            let table = self.curand.direction_vectors_32(set);
            if !matches!(
                set,
                CURAND_DIRECTION_VECTORS_32_JOEKUO6 | CURAND_SCRAMBLED_DIRECTION_VECTORS_32_JOEKUO6
            ) {
                return Err(BoundaryError::UnknownVectorSet { function: FUNCTION, set }.into());
            }
            let table = table?;
            if table.is_null() {
                return Err(BoundaryError::NullNativeTable { function: FUNCTION }.into());
            }
            let rows = unsafe { slice::from_raw_parts(table, FIXED_TABLE_DIMENSIONS) };
            Ok(self.publish_rows(FUNCTION, vectors, ArrayClass::IntArray, rows, |host, row| {
                let values: Vec<i32> = row.iter().map(|&v| v as i32).collect();
                host.new_int_array(&values)
            })?)
        })
    }

    pub fn get_direction_vectors_64(&self, vectors: ObjectRef, set: c_int) -> c_int {
        const FUNCTION: &str = "curandGetDirectionVectors64";
        self.run(|| {
            self.require_holder(FUNCTION, "vectors", vectors)?;
            trace!("Executing {}(vectors={:?}, set={})", FUNCTION, vectors, set);

            let table = self.curand.direction_vectors_64(set);
            if !matches!(
                set,
                CURAND_DIRECTION_VECTORS_64_JOEKUO6 | CURAND_SCRAMBLED_DIRECTION_VECTORS_64_JOEKUO6
            ) {
                return Err(BoundaryError::UnknownVectorSet { function: FUNCTION, set }.into());
            }
            let table = table?;
            if table.is_null() {
                return Err(BoundaryError::NullNativeTable { function: FUNCTION }.into());
            }
            let rows = unsafe { slice::from_raw_parts(table, FIXED_TABLE_DIMENSIONS) };
            Ok(self.publish_rows(FUNCTION, vectors, ArrayClass::LongArray, rows, |host, row| {
                let values: Vec<i64> = row.iter().map(|&v| v as i64).collect();
                host.new_long_array(&values)
            })?)
        })
    }

    pub fn get_scramble_constants_32(&self, constants: ObjectRef) -> c_int {
        const FUNCTION: &str = "curandGetScrambleConstants32";
        self.run(|| {
            self.require_holder(FUNCTION, "constants", constants)?;
            trace!("Executing {}(constants={:?})", FUNCTION, constants);

            let table = self.curand.scramble_constants_32()?;
            if table.is_null() {
                return Err(BoundaryError::NullNativeTable { function: FUNCTION }.into());
            }
            let values: Vec<i32> = unsafe { slice::from_raw_parts(table, FIXED_TABLE_DIMENSIONS) }
                .iter()
                .map(|&v| v as i32)
                .collect();
            let array = self
                .host
                .new_int_array(&values)
                .map_err(|_| BoundaryError::ArrayConstruction {
                    function: FUNCTION,
                    what: "result array",
                })?;
            Ok(self.store_result(FUNCTION, constants, array)?)
        })
    }

    pub fn get_scramble_constants_64(&self, constants: ObjectRef) -> c_int {
        const FUNCTION: &str = "curandGetScrambleConstants64";
        self.run(|| {
            self.require_holder(FUNCTION, "constants", constants)?;
            trace!("Executing {}(constants={:?})", FUNCTION, constants);

            let table = self.curand.scramble_constants_64()?;
            if table.is_null() {
                return Err(BoundaryError::NullNativeTable { function: FUNCTION }.into());
            }
            let values: Vec<i64> = unsafe { slice::from_raw_parts(table, FIXED_TABLE_DIMENSIONS) }
                .iter()
                .map(|&v| v as i64)
                .collect();
            let array = self
                .host
                .new_long_array(&values)
                .map_err(|_| BoundaryError::ArrayConstruction {
                    function: FUNCTION,
                    what: "result array",
                })?;
            Ok(self.store_result(FUNCTION, constants, array)?)
        })
    }

    /// Build an array of per-dimension arrays and store it in `holder[0]`.
    ///
    /// On failure the partially built table is dropped, never stored.
    fn publish_rows<R>(
        &self,
        function: &'static str,
        holder: ObjectRef,
        class: ArrayClass,
        rows: &[R],
        make_row: impl Fn(&H, &R) -> Result<ObjectRef, HostError>,
    ) -> Result<(), BoundaryError> {
        let table = self
            .host
            .new_object_array(rows.len(), class)
            .map_err(|_| BoundaryError::ArrayConstruction {
                function,
                what: "outer result array",
            })?;
        let filled = rows.iter().enumerate().try_for_each(|(i, row)| {
            let inner = make_row(&self.host, row).map_err(|_| BoundaryError::ArrayConstruction {
                function,
                what: "inner result array",
            })?;
            let stored = self.host.set_object_element(table, i, inner);
            self.host.release_local(inner);
            stored.map_err(BoundaryError::host(function))?;
            self.check_pending(function, "inner result array")
        });
        if let Err(e) = filled {
            self.host.release_local(table);
            return Err(e);
        }
        self.store_result(function, holder, table)
    }

    fn store_result(&self, function: &'static str, holder: ObjectRef, value: ObjectRef) -> Result<(), BoundaryError> {
        let stored = self.host.set_object_element(holder, 0, value);
        self.host.release_local(value);
        stored.map_err(BoundaryError::host(function))?;
        self.check_pending(function, "result table")
    }

    fn check_pending(&self, function: &'static str, what: &'static str) -> Result<(), BoundaryError> {
        if self.host.exception_pending() {
            Err(BoundaryError::PendingException { function, what })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ExceptionKind;
    use crate::status::CURANDRS_STATUS_INTERNAL_ERROR;
    use crate::testing::{test_binding, FakeObject};
    use curand_sys::*;

    #[test]
    fn test_direction_vectors_32_match_native_table() {
        let binding = test_binding();
        let holder = binding.host().object_array(1);
        assert_eq!(
            binding.get_direction_vectors_32(holder, CURAND_DIRECTION_VECTORS_32_JOEKUO6),
            CURAND_STATUS_SUCCESS
        );

        let table = binding.host().elements(holder)[0];
        assert_eq!(
            binding.host().object(table),
            FakeObject::Objects(
                binding.host().elements(table),
                Some(ArrayClass::IntArray)
            )
        );
        let rows = binding.host().elements(table);
        assert_eq!(rows.len(), FIXED_TABLE_DIMENSIONS);
        // Outer array plus one per dimension.
        assert_eq!(binding.host().arrays_created(), FIXED_TABLE_DIMENSIONS + 1);
        let native = binding.curand().vectors32();
        for i in [0, 1, 9_999, FIXED_TABLE_DIMENSIONS - 1] {
            let row = binding.host().ints(rows[i]);
            assert_eq!(row.len(), 32);
            let expected: Vec<i32> = native[i].iter().map(|&v| v as i32).collect();
            assert_eq!(row, expected);
        }
        // The high bit survives the reinterpretation.
        assert!(binding.host().ints(rows[0])[0] < 0);
    }

    #[test]
    fn test_direction_vectors_64_match_native_table() {
        let binding = test_binding();
        let holder = binding.host().object_array(2);
        assert_eq!(
            binding.get_direction_vectors_64(holder, CURAND_SCRAMBLED_DIRECTION_VECTORS_64_JOEKUO6),
            CURAND_STATUS_SUCCESS
        );
        let elements = binding.host().elements(holder);
        assert_eq!(elements[1], ObjectRef::NULL);
        let rows = binding.host().elements(elements[0]);
        assert_eq!(rows.len(), FIXED_TABLE_DIMENSIONS);
        let last = binding.host().longs(rows[FIXED_TABLE_DIMENSIONS - 1]);
        assert_eq!(last.len(), 64);
        assert_eq!(last[5] as u64, binding.curand().vectors64()[FIXED_TABLE_DIMENSIONS - 1][5]);
    }

    #[test]
    fn test_wrong_width_set_is_rejected_before_any_array() {
        let binding = test_binding();
        let holder = binding.host().object_array(1);
        for set in [CURAND_DIRECTION_VECTORS_64_JOEKUO6, 0, 7] {
            assert_eq!(
                binding.get_direction_vectors_32(holder, set),
                CURANDRS_STATUS_INTERNAL_ERROR
            );
        }
        assert_eq!(
            binding.get_direction_vectors_64(holder, CURAND_SCRAMBLED_DIRECTION_VECTORS_32_JOEKUO6),
            CURANDRS_STATUS_INTERNAL_ERROR
        );
        assert_eq!(binding.host().arrays_created(), 0);
        assert_eq!(binding.host().elements(holder)[0], ObjectRef::NULL);
        assert!(binding.host().exceptions().is_empty());
    }

    #[test]
    fn test_native_failure_is_returned_without_tables() {
        let binding = test_binding();
        binding
            .curand()
            .set_status("curandGetDirectionVectors32", CURAND_STATUS_OUT_OF_RANGE);
        let holder = binding.host().object_array(1);
        assert_eq!(
            binding.get_direction_vectors_32(holder, CURAND_DIRECTION_VECTORS_32_JOEKUO6),
            CURAND_STATUS_OUT_OF_RANGE
        );
        assert_eq!(binding.host().arrays_created(), 0);
    }

    #[test]
    fn test_holder_checks() {
        let binding = test_binding();
        assert_eq!(
            binding.get_direction_vectors_32(ObjectRef::NULL, CURAND_DIRECTION_VECTORS_32_JOEKUO6),
            CURANDRS_STATUS_INTERNAL_ERROR
        );
        let empty = binding.host().object_array(0);
        assert_eq!(binding.get_scramble_constants_64(empty), CURANDRS_STATUS_INTERNAL_ERROR);
        assert_eq!(binding.curand().call_count(), 0);

        let thrown = binding.host().exceptions();
        assert_eq!(thrown[0].0, ExceptionKind::NullPointer);
        assert_eq!(thrown[0].1, "Parameter 'vectors' is null for curandGetDirectionVectors32");
        assert_eq!(thrown[1].0, ExceptionKind::IllegalArgument);
    }

    #[test]
    fn test_inner_allocation_failure_publishes_nothing() {
        let binding = test_binding();
        binding.host().fail_new_array_after(100);
        let holder = binding.host().object_array(1);
        assert_eq!(
            binding.get_direction_vectors_32(holder, CURAND_DIRECTION_VECTORS_32_JOEKUO6),
            CURANDRS_STATUS_INTERNAL_ERROR
        );
        assert_eq!(binding.host().elements(holder)[0], ObjectRef::NULL);
    }

    #[test]
    fn test_outer_allocation_failure() {
        let binding = test_binding();
        binding.host().fail_new_array_after(0);
        let holder = binding.host().object_array(1);
        assert_eq!(
            binding.get_direction_vectors_64(holder, CURAND_DIRECTION_VECTORS_64_JOEKUO6),
            CURANDRS_STATUS_INTERNAL_ERROR
        );
        assert_eq!(binding.host().elements(holder)[0], ObjectRef::NULL);
    }

    #[test]
    fn test_pending_exception_abandons_table() {
        let binding = test_binding();
        binding.host().pending_exception_after(3);
        let holder = binding.host().object_array(1);
        assert_eq!(
            binding.get_direction_vectors_32(holder, CURAND_SCRAMBLED_DIRECTION_VECTORS_32_JOEKUO6),
            CURANDRS_STATUS_INTERNAL_ERROR
        );
        assert_eq!(binding.host().elements(holder)[0], ObjectRef::NULL);
        // Three inner arrays plus the outer one.
        assert_eq!(binding.host().arrays_created(), 4);
    }

    #[test]
    fn test_local_references_are_released() {
        let binding = test_binding();
        let holder = binding.host().object_array(1);
        binding.get_direction_vectors_32(holder, CURAND_DIRECTION_VECTORS_32_JOEKUO6);
        assert_eq!(binding.host().released(), FIXED_TABLE_DIMENSIONS + 1);
    }

    #[test]
    fn test_scramble_constants() {
        let binding = test_binding();
        let holder = binding.host().object_array(1);
        assert_eq!(binding.get_scramble_constants_32(holder), CURAND_STATUS_SUCCESS);
        let ints = binding.host().ints(binding.host().elements(holder)[0]);
        assert_eq!(ints.len(), FIXED_TABLE_DIMENSIONS);
        assert_eq!(ints[0], -1);
        assert_eq!(ints[1] as u32, binding.curand().scramble32()[1]);

        assert_eq!(binding.get_scramble_constants_64(holder), CURAND_STATUS_SUCCESS);
        let longs = binding.host().longs(binding.host().elements(holder)[0]);
        assert_eq!(longs.len(), FIXED_TABLE_DIMENSIONS);
        assert_eq!(longs[2] as u64, binding.curand().scramble64()[2]);
    }

    #[test]
    fn test_scramble_status_passthrough() {
        let binding = test_binding();
        binding
            .curand()
            .set_status("curandGetScrambleConstants32", CURAND_STATUS_NOT_INITIALIZED);
        let holder = binding.host().object_array(1);
        assert_eq!(
            binding.get_scramble_constants_32(holder),
            CURAND_STATUS_NOT_INITIALIZED
        );
        assert_eq!(binding.host().arrays_created(), 0);
    }
}
