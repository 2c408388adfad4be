//! Raw FFI bindings to cuRAND.
//!
//! cuRAND is NVIDIA's GPU-accelerated library for random number generation.

#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
#![allow(non_upper_case_globals)]

use cuda_runtime_sys::cudaStream_t;
use libc::{c_double, c_int, c_uint, c_ulonglong, size_t};

// ============================================================================
// Types
// ============================================================================

pub type curandStatus_t = c_int;

pub const CURAND_STATUS_SUCCESS: curandStatus_t = 0;
pub const CURAND_STATUS_VERSION_MISMATCH: curandStatus_t = 100;
pub const CURAND_STATUS_NOT_INITIALIZED: curandStatus_t = 101;
pub const CURAND_STATUS_ALLOCATION_FAILED: curandStatus_t = 102;
pub const CURAND_STATUS_TYPE_ERROR: curandStatus_t = 103;
pub const CURAND_STATUS_OUT_OF_RANGE: curandStatus_t = 104;
pub const CURAND_STATUS_LENGTH_NOT_MULTIPLE: curandStatus_t = 105;
pub const CURAND_STATUS_DOUBLE_PRECISION_REQUIRED: curandStatus_t = 106;
pub const CURAND_STATUS_LAUNCH_FAILURE: curandStatus_t = 201;
pub const CURAND_STATUS_PREEXISTING_FAILURE: curandStatus_t = 202;
pub const CURAND_STATUS_INITIALIZATION_FAILED: curandStatus_t = 203;
pub const CURAND_STATUS_ARCH_MISMATCH: curandStatus_t = 204;
pub const CURAND_STATUS_INTERNAL_ERROR: curandStatus_t = 999;

pub type curandRngType_t = c_int;

pub const CURAND_RNG_TEST: curandRngType_t = 0;
pub const CURAND_RNG_PSEUDO_DEFAULT: curandRngType_t = 100;
pub const CURAND_RNG_PSEUDO_XORWOW: curandRngType_t = 101;
pub const CURAND_RNG_PSEUDO_MRG32K3A: curandRngType_t = 121;
pub const CURAND_RNG_PSEUDO_MTGP32: curandRngType_t = 141;
pub const CURAND_RNG_PSEUDO_MT19937: curandRngType_t = 142;
pub const CURAND_RNG_PSEUDO_PHILOX4_32_10: curandRngType_t = 161;
pub const CURAND_RNG_QUASI_DEFAULT: curandRngType_t = 200;
pub const CURAND_RNG_QUASI_SOBOL32: curandRngType_t = 201;
pub const CURAND_RNG_QUASI_SCRAMBLED_SOBOL32: curandRngType_t = 202;
pub const CURAND_RNG_QUASI_SOBOL64: curandRngType_t = 203;
pub const CURAND_RNG_QUASI_SCRAMBLED_SOBOL64: curandRngType_t = 204;

pub type curandOrdering_t = c_int;

pub const CURAND_ORDERING_PSEUDO_BEST: curandOrdering_t = 100;
pub const CURAND_ORDERING_PSEUDO_DEFAULT: curandOrdering_t = 101;
pub const CURAND_ORDERING_PSEUDO_SEEDED: curandOrdering_t = 102;
pub const CURAND_ORDERING_PSEUDO_LEGACY: curandOrdering_t = 103;
pub const CURAND_ORDERING_PSEUDO_DYNAMIC: curandOrdering_t = 104;
pub const CURAND_ORDERING_QUASI_DEFAULT: curandOrdering_t = 201;

pub type curandDirectionVectorSet_t = c_int;

pub const CURAND_DIRECTION_VECTORS_32_JOEKUO6: curandDirectionVectorSet_t = 101;
pub const CURAND_SCRAMBLED_DIRECTION_VECTORS_32_JOEKUO6: curandDirectionVectorSet_t = 102;
pub const CURAND_DIRECTION_VECTORS_64_JOEKUO6: curandDirectionVectorSet_t = 103;
pub const CURAND_SCRAMBLED_DIRECTION_VECTORS_64_JOEKUO6: curandDirectionVectorSet_t = 104;

pub type libraryPropertyType = c_int;

pub const MAJOR_VERSION: libraryPropertyType = 0;
pub const MINOR_VERSION: libraryPropertyType = 1;
pub const PATCH_LEVEL: libraryPropertyType = 2;

pub type curandDirectionVectors32_t = [c_uint; 32];
pub type curandDirectionVectors64_t = [c_ulonglong; 64];

// ============================================================================
// Opaque Types
// ============================================================================

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct curandGenerator_st {
    _unused: [u8; 0],
}
pub type curandGenerator_t = *mut curandGenerator_st;

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct curandDiscreteDistribution_st {
    _unused: [u8; 0],
}
pub type curandDiscreteDistribution_t = *mut curandDiscreteDistribution_st;

// ============================================================================
// External Functions - Generator Management
// ============================================================================

#[cfg(not(feature = "stub"))]
extern "C" {
    pub fn curandCreateGenerator(
        generator: *mut curandGenerator_t,
        rng_type: curandRngType_t,
    ) -> curandStatus_t;

    pub fn curandCreateGeneratorHost(
        generator: *mut curandGenerator_t,
        rng_type: curandRngType_t,
    ) -> curandStatus_t;

    pub fn curandDestroyGenerator(generator: curandGenerator_t) -> curandStatus_t;

    pub fn curandSetStream(generator: curandGenerator_t, stream: cudaStream_t) -> curandStatus_t;

    pub fn curandSetPseudoRandomGeneratorSeed(
        generator: curandGenerator_t,
        seed: c_ulonglong,
    ) -> curandStatus_t;

    pub fn curandSetGeneratorOffset(
        generator: curandGenerator_t,
        offset: c_ulonglong,
    ) -> curandStatus_t;

    pub fn curandSetGeneratorOrdering(
        generator: curandGenerator_t,
        order: curandOrdering_t,
    ) -> curandStatus_t;

    pub fn curandSetQuasiRandomGeneratorDimensions(
        generator: curandGenerator_t,
        num_dimensions: c_uint,
    ) -> curandStatus_t;

    pub fn curandGenerateSeeds(generator: curandGenerator_t) -> curandStatus_t;
}

// ============================================================================
// External Functions - Generation
// ============================================================================

#[cfg(not(feature = "stub"))]
extern "C" {
    pub fn curandGenerate(
        generator: curandGenerator_t,
        outputPtr: *mut c_uint,
        num: size_t,
    ) -> curandStatus_t;

    pub fn curandGenerateLongLong(
        generator: curandGenerator_t,
        outputPtr: *mut c_ulonglong,
        num: size_t,
    ) -> curandStatus_t;

    pub fn curandGenerateUniform(
        generator: curandGenerator_t,
        outputPtr: *mut f32,
        num: size_t,
    ) -> curandStatus_t;

    pub fn curandGenerateUniformDouble(
        generator: curandGenerator_t,
        outputPtr: *mut c_double,
        num: size_t,
    ) -> curandStatus_t;

    pub fn curandGenerateNormal(
        generator: curandGenerator_t,
        outputPtr: *mut f32,
        n: size_t,
        mean: f32,
        stddev: f32,
    ) -> curandStatus_t;

    pub fn curandGenerateNormalDouble(
        generator: curandGenerator_t,
        outputPtr: *mut c_double,
        n: size_t,
        mean: c_double,
        stddev: c_double,
    ) -> curandStatus_t;

    pub fn curandGenerateLogNormal(
        generator: curandGenerator_t,
        outputPtr: *mut f32,
        n: size_t,
        mean: f32,
        stddev: f32,
    ) -> curandStatus_t;

    pub fn curandGenerateLogNormalDouble(
        generator: curandGenerator_t,
        outputPtr: *mut c_double,
        n: size_t,
        mean: c_double,
        stddev: c_double,
    ) -> curandStatus_t;

    pub fn curandGeneratePoisson(
        generator: curandGenerator_t,
        outputPtr: *mut c_uint,
        n: size_t,
        lambda: c_double,
    ) -> curandStatus_t;
}

// ============================================================================
// External Functions - Distributions
// ============================================================================

#[cfg(not(feature = "stub"))]
extern "C" {
    pub fn curandCreatePoissonDistribution(
        lambda: c_double,
        discrete_distribution: *mut curandDiscreteDistribution_t,
    ) -> curandStatus_t;

    pub fn curandDestroyDistribution(
        discrete_distribution: curandDiscreteDistribution_t,
    ) -> curandStatus_t;
}

// ============================================================================
// External Functions - Quasi-random Tables
// ============================================================================

#[cfg(not(feature = "stub"))]
extern "C" {
    pub fn curandGetDirectionVectors32(
        vectors: *mut *mut curandDirectionVectors32_t,
        set: curandDirectionVectorSet_t,
    ) -> curandStatus_t;

    pub fn curandGetScrambleConstants32(constants: *mut *mut c_uint) -> curandStatus_t;

    pub fn curandGetDirectionVectors64(
        vectors: *mut *mut curandDirectionVectors64_t,
        set: curandDirectionVectorSet_t,
    ) -> curandStatus_t;

    pub fn curandGetScrambleConstants64(constants: *mut *mut c_ulonglong) -> curandStatus_t;
}

// ============================================================================
// External Functions - Version
// ============================================================================

#[cfg(not(feature = "stub"))]
extern "C" {
    pub fn curandGetVersion(version: *mut c_int) -> curandStatus_t;
    pub fn curandGetProperty(type_: libraryPropertyType, value: *mut c_int) -> curandStatus_t;
}

// ============================================================================
// Stub Implementations (no CUDA libraries linked)
// ============================================================================

#[cfg(feature = "stub")]
pub use stub::*;

/// Stand-ins that report an uninitialized library. Creation calls fail with
/// `CURAND_STATUS_INITIALIZATION_FAILED`, everything taking a generator fails
/// with `CURAND_STATUS_NOT_INITIALIZED`.
#[cfg(feature = "stub")]
mod stub {
    use super::*;

    pub unsafe fn curandCreateGenerator(
        generator: *mut curandGenerator_t,
        _rng_type: curandRngType_t,
    ) -> curandStatus_t {
        if !generator.is_null() {
            *generator = std::ptr::null_mut();
        }
        CURAND_STATUS_INITIALIZATION_FAILED
    }

    pub unsafe fn curandCreateGeneratorHost(
        generator: *mut curandGenerator_t,
        _rng_type: curandRngType_t,
    ) -> curandStatus_t {
        if !generator.is_null() {
            *generator = std::ptr::null_mut();
        }
        CURAND_STATUS_INITIALIZATION_FAILED
    }

    pub unsafe fn curandDestroyGenerator(_generator: curandGenerator_t) -> curandStatus_t {
        CURAND_STATUS_NOT_INITIALIZED
    }

    pub unsafe fn curandSetStream(_generator: curandGenerator_t, _stream: cudaStream_t) -> curandStatus_t {
        CURAND_STATUS_NOT_INITIALIZED
    }

    pub unsafe fn curandSetPseudoRandomGeneratorSeed(
        _generator: curandGenerator_t,
        _seed: c_ulonglong,
    ) -> curandStatus_t {
        CURAND_STATUS_NOT_INITIALIZED
    }

    pub unsafe fn curandSetGeneratorOffset(
        _generator: curandGenerator_t,
        _offset: c_ulonglong,
    ) -> curandStatus_t {
        CURAND_STATUS_NOT_INITIALIZED
    }

    pub unsafe fn curandSetGeneratorOrdering(
        _generator: curandGenerator_t,
        _order: curandOrdering_t,
    ) -> curandStatus_t {
        CURAND_STATUS_NOT_INITIALIZED
    }

    pub unsafe fn curandSetQuasiRandomGeneratorDimensions(
        _generator: curandGenerator_t,
        _num_dimensions: c_uint,
    ) -> curandStatus_t {
        CURAND_STATUS_NOT_INITIALIZED
    }

    pub unsafe fn curandGenerateSeeds(_generator: curandGenerator_t) -> curandStatus_t {
        CURAND_STATUS_NOT_INITIALIZED
    }

    pub unsafe fn curandGenerate(
        _generator: curandGenerator_t,
        _outputPtr: *mut c_uint,
        _num: size_t,
    ) -> curandStatus_t {
        CURAND_STATUS_NOT_INITIALIZED
    }

    pub unsafe fn curandGenerateLongLong(
        _generator: curandGenerator_t,
        _outputPtr: *mut c_ulonglong,
        _num: size_t,
    ) -> curandStatus_t {
        CURAND_STATUS_NOT_INITIALIZED
    }

    pub unsafe fn curandGenerateUniform(
        _generator: curandGenerator_t,
        _outputPtr: *mut f32,
        _num: size_t,
    ) -> curandStatus_t {
        CURAND_STATUS_NOT_INITIALIZED
    }

    pub unsafe fn curandGenerateUniformDouble(
        _generator: curandGenerator_t,
        _outputPtr: *mut c_double,
        _num: size_t,
    ) -> curandStatus_t {
        CURAND_STATUS_NOT_INITIALIZED
    }

    pub unsafe fn curandGenerateNormal(
        _generator: curandGenerator_t,
        _outputPtr: *mut f32,
        _n: size_t,
        _mean: f32,
        _stddev: f32,
    ) -> curandStatus_t {
        CURAND_STATUS_NOT_INITIALIZED
    }

    pub unsafe fn curandGenerateNormalDouble(
        _generator: curandGenerator_t,
        _outputPtr: *mut c_double,
        _n: size_t,
        _mean: c_double,
        _stddev: c_double,
    ) -> curandStatus_t {
        CURAND_STATUS_NOT_INITIALIZED
    }

    pub unsafe fn curandGenerateLogNormal(
        _generator: curandGenerator_t,
        _outputPtr: *mut f32,
        _n: size_t,
        _mean: f32,
        _stddev: f32,
    ) -> curandStatus_t {
        CURAND_STATUS_NOT_INITIALIZED
    }

    pub unsafe fn curandGenerateLogNormalDouble(
        _generator: curandGenerator_t,
        _outputPtr: *mut c_double,
        _n: size_t,
        _mean: c_double,
        _stddev: c_double,
    ) -> curandStatus_t {
        CURAND_STATUS_NOT_INITIALIZED
    }

    pub unsafe fn curandGeneratePoisson(
        _generator: curandGenerator_t,
        _outputPtr: *mut c_uint,
        _n: size_t,
        _lambda: c_double,
    ) -> curandStatus_t {
        CURAND_STATUS_NOT_INITIALIZED
    }

    pub unsafe fn curandCreatePoissonDistribution(
        _lambda: c_double,
        discrete_distribution: *mut curandDiscreteDistribution_t,
    ) -> curandStatus_t {
        if !discrete_distribution.is_null() {
            *discrete_distribution = std::ptr::null_mut();
        }
        CURAND_STATUS_INITIALIZATION_FAILED
    }

    pub unsafe fn curandDestroyDistribution(
        _discrete_distribution: curandDiscreteDistribution_t,
    ) -> curandStatus_t {
        CURAND_STATUS_NOT_INITIALIZED
    }

    pub unsafe fn curandGetDirectionVectors32(
        vectors: *mut *mut curandDirectionVectors32_t,
        _set: curandDirectionVectorSet_t,
    ) -> curandStatus_t {
        if !vectors.is_null() {
            *vectors = std::ptr::null_mut();
        }
        CURAND_STATUS_INITIALIZATION_FAILED
    }

    pub unsafe fn curandGetScrambleConstants32(constants: *mut *mut c_uint) -> curandStatus_t {
        if !constants.is_null() {
            *constants = std::ptr::null_mut();
        }
        CURAND_STATUS_INITIALIZATION_FAILED
    }

    pub unsafe fn curandGetDirectionVectors64(
        vectors: *mut *mut curandDirectionVectors64_t,
        _set: curandDirectionVectorSet_t,
    ) -> curandStatus_t {
        if !vectors.is_null() {
            *vectors = std::ptr::null_mut();
        }
        CURAND_STATUS_INITIALIZATION_FAILED
    }

    pub unsafe fn curandGetScrambleConstants64(constants: *mut *mut c_ulonglong) -> curandStatus_t {
        if !constants.is_null() {
            *constants = std::ptr::null_mut();
        }
        CURAND_STATUS_INITIALIZATION_FAILED
    }

    pub unsafe fn curandGetVersion(version: *mut c_int) -> curandStatus_t {
        if !version.is_null() {
            *version = 0;
        }
        CURAND_STATUS_INITIALIZATION_FAILED
    }

    pub unsafe fn curandGetProperty(_type_: libraryPropertyType, value: *mut c_int) -> curandStatus_t {
        if !value.is_null() {
            *value = 0;
        }
        CURAND_STATUS_INITIALIZATION_FAILED
    }
}
