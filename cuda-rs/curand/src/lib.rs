//! Safe Rust access to cuRAND.
//!
//! All library entry points are reachable through the [`CurandLibrary`] trait
//! so callers can swap the linked library for a recording stand-in. Handles
//! are plain copies of the native pointers: nothing here destroys a generator
//! or distribution on drop, lifetimes are driven by explicit destroy calls.

use cuda_runtime_sys::cudaStream_t;
use curand_sys::*;
use std::ptr;
use thiserror::Error;

pub use curand_sys::{
    curandDirectionVectors32_t, curandDirectionVectors64_t, curandDirectionVectorSet_t,
    curandOrdering_t, curandRngType_t, curandStatus_t, libraryPropertyType,
};

/// A non-success cuRAND status, carried verbatim.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("cuRAND Error: {0} ({name})", name = status_name(*.0))]
pub struct CurandError(pub i32);

pub type Result<T> = std::result::Result<T, CurandError>;

#[inline]
pub fn check(code: curandStatus_t) -> Result<()> {
    if code == CURAND_STATUS_SUCCESS {
        Ok(())
    } else {
        Err(CurandError(code))
    }
}

/// Collapse a result back into the raw status code.
#[inline]
pub fn status_code(result: Result<()>) -> curandStatus_t {
    match result {
        Ok(()) => CURAND_STATUS_SUCCESS,
        Err(CurandError(code)) => code,
    }
}

/// Symbolic name of a cuRAND status code.
pub fn status_name(code: curandStatus_t) -> &'static str {
    match code {
        CURAND_STATUS_SUCCESS => "CURAND_STATUS_SUCCESS",
        CURAND_STATUS_VERSION_MISMATCH => "CURAND_STATUS_VERSION_MISMATCH",
        CURAND_STATUS_NOT_INITIALIZED => "CURAND_STATUS_NOT_INITIALIZED",
        CURAND_STATUS_ALLOCATION_FAILED => "CURAND_STATUS_ALLOCATION_FAILED",
        CURAND_STATUS_TYPE_ERROR => "CURAND_STATUS_TYPE_ERROR",
        CURAND_STATUS_OUT_OF_RANGE => "CURAND_STATUS_OUT_OF_RANGE",
        CURAND_STATUS_LENGTH_NOT_MULTIPLE => "CURAND_STATUS_LENGTH_NOT_MULTIPLE",
        CURAND_STATUS_DOUBLE_PRECISION_REQUIRED => "CURAND_STATUS_DOUBLE_PRECISION_REQUIRED",
        CURAND_STATUS_LAUNCH_FAILURE => "CURAND_STATUS_LAUNCH_FAILURE",
        CURAND_STATUS_PREEXISTING_FAILURE => "CURAND_STATUS_PREEXISTING_FAILURE",
        CURAND_STATUS_INITIALIZATION_FAILED => "CURAND_STATUS_INITIALIZATION_FAILED",
        CURAND_STATUS_ARCH_MISMATCH => "CURAND_STATUS_ARCH_MISMATCH",
        CURAND_STATUS_INTERNAL_ERROR => "CURAND_STATUS_INTERNAL_ERROR",
        _ => "INVALID curandStatus_t",
    }
}

/// Native generator pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawGenerator(pub curandGenerator_t);

/// Native discrete distribution pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawDistribution(pub curandDiscreteDistribution_t);

// Both are opaque tokens owned by cuRAND; moving the pointer value between
// threads does not touch the state behind it.
unsafe impl Send for RawGenerator {}
unsafe impl Sync for RawGenerator {}
unsafe impl Send for RawDistribution {}
unsafe impl Sync for RawDistribution {}

/// The cuRAND entry points, one method per library function.
///
/// Enumerated arguments are the raw library values; implementations must
/// pass them on unchanged.
pub trait CurandLibrary: Send + Sync {
    fn create_generator(&self, rng_type: curandRngType_t) -> Result<RawGenerator>;
    fn create_generator_host(&self, rng_type: curandRngType_t) -> Result<RawGenerator>;
    fn destroy_generator(&self, generator: RawGenerator) -> Result<()>;

    fn set_stream(&self, generator: RawGenerator, stream: cudaStream_t) -> Result<()>;
    fn set_seed(&self, generator: RawGenerator, seed: u64) -> Result<()>;
    fn set_offset(&self, generator: RawGenerator, offset: u64) -> Result<()>;
    fn set_ordering(&self, generator: RawGenerator, order: curandOrdering_t) -> Result<()>;
    fn set_quasi_dimensions(&self, generator: RawGenerator, num_dimensions: u32) -> Result<()>;
    fn generate_seeds(&self, generator: RawGenerator) -> Result<()>;

    /// # Safety
    /// `output` must address `n` writable elements for the whole call.
    unsafe fn generate(&self, generator: RawGenerator, output: *mut u32, n: usize) -> Result<()>;
    /// # Safety
    /// `output` must address `n` writable elements for the whole call.
    unsafe fn generate_long_long(&self, generator: RawGenerator, output: *mut u64, n: usize) -> Result<()>;
    /// # Safety
    /// `output` must address `n` writable elements for the whole call.
    unsafe fn generate_uniform(&self, generator: RawGenerator, output: *mut f32, n: usize) -> Result<()>;
    /// # Safety
    /// `output` must address `n` writable elements for the whole call.
    unsafe fn generate_uniform_double(&self, generator: RawGenerator, output: *mut f64, n: usize) -> Result<()>;
    /// # Safety
    /// `output` must address `n` writable elements for the whole call.
    unsafe fn generate_normal(
        &self,
        generator: RawGenerator,
        output: *mut f32,
        n: usize,
        mean: f32,
        stddev: f32,
    ) -> Result<()>;
    /// # Safety
    /// `output` must address `n` writable elements for the whole call.
    unsafe fn generate_normal_double(
        &self,
        generator: RawGenerator,
        output: *mut f64,
        n: usize,
        mean: f64,
        stddev: f64,
    ) -> Result<()>;
    /// # Safety
    /// `output` must address `n` writable elements for the whole call.
    unsafe fn generate_log_normal(
        &self,
        generator: RawGenerator,
        output: *mut f32,
        n: usize,
        mean: f32,
        stddev: f32,
    ) -> Result<()>;
    /// # Safety
    /// `output` must address `n` writable elements for the whole call.
    unsafe fn generate_log_normal_double(
        &self,
        generator: RawGenerator,
        output: *mut f64,
        n: usize,
        mean: f64,
        stddev: f64,
    ) -> Result<()>;
    /// # Safety
    /// `output` must address `n` writable elements for the whole call.
    unsafe fn generate_poisson(&self, generator: RawGenerator, output: *mut u32, n: usize, lambda: f64) -> Result<()>;

    fn create_poisson_distribution(&self, lambda: f64) -> Result<RawDistribution>;
    fn destroy_distribution(&self, distribution: RawDistribution) -> Result<()>;

    /// Library-owned direction vector table; its length is not reported.
    fn direction_vectors_32(&self, set: curandDirectionVectorSet_t) -> Result<*const curandDirectionVectors32_t>;
    fn direction_vectors_64(&self, set: curandDirectionVectorSet_t) -> Result<*const curandDirectionVectors64_t>;
    /// Library-owned scramble constants; their length is not reported.
    fn scramble_constants_32(&self) -> Result<*const u32>;
    fn scramble_constants_64(&self) -> Result<*const u64>;

    fn version(&self) -> Result<i32>;
    fn property(&self, kind: libraryPropertyType) -> Result<i32>;
}

/// The linked cuRAND library.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCurand;

impl CurandLibrary for SystemCurand {
    fn create_generator(&self, rng_type: curandRngType_t) -> Result<RawGenerator> {
        let mut handle = ptr::null_mut();
        unsafe { check(curandCreateGenerator(&mut handle, rng_type))? };
        Ok(RawGenerator(handle))
    }

    fn create_generator_host(&self, rng_type: curandRngType_t) -> Result<RawGenerator> {
        let mut handle = ptr::null_mut();
        unsafe { check(curandCreateGeneratorHost(&mut handle, rng_type))? };
        Ok(RawGenerator(handle))
    }

    fn destroy_generator(&self, generator: RawGenerator) -> Result<()> {
        unsafe { check(curandDestroyGenerator(generator.0)) }
    }

    fn set_stream(&self, generator: RawGenerator, stream: cudaStream_t) -> Result<()> {
        unsafe { check(curandSetStream(generator.0, stream)) }
    }

    fn set_seed(&self, generator: RawGenerator, seed: u64) -> Result<()> {
        unsafe { check(curandSetPseudoRandomGeneratorSeed(generator.0, seed)) }
    }

    fn set_offset(&self, generator: RawGenerator, offset: u64) -> Result<()> {
        unsafe { check(curandSetGeneratorOffset(generator.0, offset)) }
    }

    fn set_ordering(&self, generator: RawGenerator, order: curandOrdering_t) -> Result<()> {
        unsafe { check(curandSetGeneratorOrdering(generator.0, order)) }
    }

    fn set_quasi_dimensions(&self, generator: RawGenerator, num_dimensions: u32) -> Result<()> {
        unsafe { check(curandSetQuasiRandomGeneratorDimensions(generator.0, num_dimensions)) }
    }

    fn generate_seeds(&self, generator: RawGenerator) -> Result<()> {
        unsafe { check(curandGenerateSeeds(generator.0)) }
    }

    unsafe fn generate(&self, generator: RawGenerator, output: *mut u32, n: usize) -> Result<()> {
        check(curandGenerate(generator.0, output, n))
    }

    unsafe fn generate_long_long(&self, generator: RawGenerator, output: *mut u64, n: usize) -> Result<()> {
        check(curandGenerateLongLong(generator.0, output, n))
    }

    unsafe fn generate_uniform(&self, generator: RawGenerator, output: *mut f32, n: usize) -> Result<()> {
        check(curandGenerateUniform(generator.0, output, n))
    }

    unsafe fn generate_uniform_double(&self, generator: RawGenerator, output: *mut f64, n: usize) -> Result<()> {
        check(curandGenerateUniformDouble(generator.0, output, n))
    }

    unsafe fn generate_normal(
        &self,
        generator: RawGenerator,
        output: *mut f32,
        n: usize,
        mean: f32,
        stddev: f32,
    ) -> Result<()> {
        check(curandGenerateNormal(generator.0, output, n, mean, stddev))
    }

    unsafe fn generate_normal_double(
        &self,
        generator: RawGenerator,
        output: *mut f64,
        n: usize,
        mean: f64,
        stddev: f64,
    ) -> Result<()> {
        check(curandGenerateNormalDouble(generator.0, output, n, mean, stddev))
    }

    unsafe fn generate_log_normal(
        &self,
        generator: RawGenerator,
        output: *mut f32,
        n: usize,
        mean: f32,
        stddev: f32,
    ) -> Result<()> {
        check(curandGenerateLogNormal(generator.0, output, n, mean, stddev))
    }

    unsafe fn generate_log_normal_double(
        &self,
        generator: RawGenerator,
        output: *mut f64,
        n: usize,
        mean: f64,
        stddev: f64,
    ) -> Result<()> {
        check(curandGenerateLogNormalDouble(generator.0, output, n, mean, stddev))
    }

    unsafe fn generate_poisson(&self, generator: RawGenerator, output: *mut u32, n: usize, lambda: f64) -> Result<()> {
        check(curandGeneratePoisson(generator.0, output, n, lambda))
    }

    fn create_poisson_distribution(&self, lambda: f64) -> Result<RawDistribution> {
        let mut handle = ptr::null_mut();
        unsafe { check(curandCreatePoissonDistribution(lambda, &mut handle))? };
        Ok(RawDistribution(handle))
    }

    fn destroy_distribution(&self, distribution: RawDistribution) -> Result<()> {
        unsafe { check(curandDestroyDistribution(distribution.0)) }
    }

    fn direction_vectors_32(&self, set: curandDirectionVectorSet_t) -> Result<*const curandDirectionVectors32_t> {
        let mut vectors = ptr::null_mut();
        unsafe { check(curandGetDirectionVectors32(&mut vectors, set))? };
        Ok(vectors as *const _)
    }

    fn direction_vectors_64(&self, set: curandDirectionVectorSet_t) -> Result<*const curandDirectionVectors64_t> {
        let mut vectors = ptr::null_mut();
        unsafe { check(curandGetDirectionVectors64(&mut vectors, set))? };
        Ok(vectors as *const _)
    }

    fn scramble_constants_32(&self) -> Result<*const u32> {
        let mut constants = ptr::null_mut();
        unsafe { check(curandGetScrambleConstants32(&mut constants))? };
        Ok(constants as *const u32)
    }

    fn scramble_constants_64(&self) -> Result<*const u64> {
        let mut constants = ptr::null_mut();
        unsafe { check(curandGetScrambleConstants64(&mut constants))? };
        Ok(constants as *const u64)
    }

    fn version(&self) -> Result<i32> {
        let mut version = 0;
        unsafe { check(curandGetVersion(&mut version))? };
        Ok(version)
    }

    fn property(&self, kind: libraryPropertyType) -> Result<i32> {
        let mut value = 0;
        unsafe { check(curandGetProperty(kind, &mut value))? };
        Ok(value)
    }
}
