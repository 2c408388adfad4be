//! cuRAND FFI exports.
//!
//! Every function returns a cuRAND status, or
//! [`CURANDRS_STATUS_INTERNAL_ERROR`] when the call failed inside the
//! binding. Managed objects are passed as [`ObjectRef`]s, memory regions as
//! pointers to [`BufferRef`] (null for a null managed reference).

use libc::c_int;
use log::error;

use crate::bridge::BufferRef;
use crate::host::ObjectRef;
use crate::loader::{binding, GlobalBinding};
use crate::status::{with_panic_boundary, BoundaryError, CURANDRS_STATUS_INTERNAL_ERROR};

fn dispatch<B, F>(function: &'static str, loaded: Option<&B>, f: F) -> c_int
where
    F: FnOnce(&B) -> c_int,
{
    with_panic_boundary(function, || match loaded {
        Some(b) => f(b),
        None => {
            error!("{}: {}", function, BoundaryError::NotLoaded);
            CURANDRS_STATUS_INTERNAL_ERROR
        }
    })
}

fn with_binding<F>(function: &'static str, f: F) -> c_int
where
    F: FnOnce(&GlobalBinding) -> c_int,
{
    dispatch(function, binding(), f)
}

fn buffer<'a>(ptr: *const BufferRef) -> Option<&'a BufferRef> {
    unsafe { ptr.as_ref() }
}

// ============================================================================
// Generator lifecycle
// ============================================================================

#[no_mangle]
pub extern "C" fn curandrs_create_generator(generator: ObjectRef, rng_type: c_int) -> c_int {
    with_binding("curandCreateGenerator", |b| b.create_generator(generator, rng_type))
}

#[no_mangle]
pub extern "C" fn curandrs_create_generator_host(generator: ObjectRef, rng_type: c_int) -> c_int {
    with_binding("curandCreateGeneratorHost", |b| b.create_generator_host(generator, rng_type))
}

#[no_mangle]
pub extern "C" fn curandrs_destroy_generator(generator: ObjectRef) -> c_int {
    with_binding("curandDestroyGenerator", |b| b.destroy_generator(generator))
}

// ============================================================================
// Library queries
// ============================================================================

/// Writes the library version to `version[0]`.
#[no_mangle]
pub extern "C" fn curandrs_get_version(version: ObjectRef) -> c_int {
    with_binding("curandGetVersion", |b| b.get_version(version))
}

/// Writes the requested property to `value[0]`.
#[no_mangle]
pub extern "C" fn curandrs_get_property(kind: c_int, value: ObjectRef) -> c_int {
    with_binding("curandGetProperty", |b| b.get_property(kind, value))
}

// ============================================================================
// Generator configuration
// ============================================================================

/// `stream` carries the raw `cudaStream_t` as its native handle.
#[no_mangle]
pub extern "C" fn curandrs_set_stream(generator: ObjectRef, stream: ObjectRef) -> c_int {
    with_binding("curandSetStream", |b| b.set_stream(generator, stream))
}

#[no_mangle]
pub extern "C" fn curandrs_set_pseudo_random_generator_seed(generator: ObjectRef, seed: i64) -> c_int {
    with_binding("curandSetPseudoRandomGeneratorSeed", |b| {
        b.set_pseudo_random_generator_seed(generator, seed)
    })
}

#[no_mangle]
pub extern "C" fn curandrs_set_generator_offset(generator: ObjectRef, offset: i64) -> c_int {
    with_binding("curandSetGeneratorOffset", |b| b.set_generator_offset(generator, offset))
}

#[no_mangle]
pub extern "C" fn curandrs_set_generator_ordering(generator: ObjectRef, order: c_int) -> c_int {
    with_binding("curandSetGeneratorOrdering", |b| b.set_generator_ordering(generator, order))
}

#[no_mangle]
pub extern "C" fn curandrs_set_quasi_random_generator_dimensions(generator: ObjectRef, num_dimensions: c_int) -> c_int {
    with_binding("curandSetQuasiRandomGeneratorDimensions", |b| {
        b.set_quasi_random_generator_dimensions(generator, num_dimensions)
    })
}

#[no_mangle]
pub extern "C" fn curandrs_generate_seeds(generator: ObjectRef) -> c_int {
    with_binding("curandGenerateSeeds", |b| b.generate_seeds(generator))
}

// ============================================================================
// Generation
// ============================================================================

#[no_mangle]
pub extern "C" fn curandrs_generate(generator: ObjectRef, output: *const BufferRef, num: i64) -> c_int {
    with_binding("curandGenerate", |b| b.generate(generator, buffer(output), num))
}

#[no_mangle]
pub extern "C" fn curandrs_generate_long_long(generator: ObjectRef, output: *const BufferRef, num: i64) -> c_int {
    with_binding("curandGenerateLongLong", |b| {
        b.generate_long_long(generator, buffer(output), num)
    })
}

#[no_mangle]
pub extern "C" fn curandrs_generate_uniform(generator: ObjectRef, output: *const BufferRef, num: i64) -> c_int {
    with_binding("curandGenerateUniform", |b| b.generate_uniform(generator, buffer(output), num))
}

#[no_mangle]
pub extern "C" fn curandrs_generate_uniform_double(generator: ObjectRef, output: *const BufferRef, num: i64) -> c_int {
    with_binding("curandGenerateUniformDouble", |b| {
        b.generate_uniform_double(generator, buffer(output), num)
    })
}

#[no_mangle]
pub extern "C" fn curandrs_generate_normal(
    generator: ObjectRef,
    output: *const BufferRef,
    n: i64,
    mean: f32,
    stddev: f32,
) -> c_int {
    with_binding("curandGenerateNormal", |b| {
        b.generate_normal(generator, buffer(output), n, mean, stddev)
    })
}

#[no_mangle]
pub extern "C" fn curandrs_generate_normal_double(
    generator: ObjectRef,
    output: *const BufferRef,
    n: i64,
    mean: f64,
    stddev: f64,
) -> c_int {
    with_binding("curandGenerateNormalDouble", |b| {
        b.generate_normal_double(generator, buffer(output), n, mean, stddev)
    })
}

#[no_mangle]
pub extern "C" fn curandrs_generate_log_normal(
    generator: ObjectRef,
    output: *const BufferRef,
    n: i64,
    mean: f32,
    stddev: f32,
) -> c_int {
    with_binding("curandGenerateLogNormal", |b| {
        b.generate_log_normal(generator, buffer(output), n, mean, stddev)
    })
}

#[no_mangle]
pub extern "C" fn curandrs_generate_log_normal_double(
    generator: ObjectRef,
    output: *const BufferRef,
    n: i64,
    mean: f64,
    stddev: f64,
) -> c_int {
    with_binding("curandGenerateLogNormalDouble", |b| {
        b.generate_log_normal_double(generator, buffer(output), n, mean, stddev)
    })
}

#[no_mangle]
pub extern "C" fn curandrs_generate_poisson(
    generator: ObjectRef,
    output: *const BufferRef,
    n: i64,
    lambda: f64,
) -> c_int {
    with_binding("curandGeneratePoisson", |b| {
        b.generate_poisson(generator, buffer(output), n, lambda)
    })
}

// ============================================================================
// Discrete distributions
// ============================================================================

#[no_mangle]
pub extern "C" fn curandrs_create_poisson_distribution(lambda: f64, discrete_distribution: ObjectRef) -> c_int {
    with_binding("curandCreatePoissonDistribution", |b| {
        b.create_poisson_distribution(lambda, discrete_distribution)
    })
}

#[no_mangle]
pub extern "C" fn curandrs_destroy_distribution(discrete_distribution: ObjectRef) -> c_int {
    with_binding("curandDestroyDistribution", |b| b.destroy_distribution(discrete_distribution))
}

// ============================================================================
// Quasi-random tables
// ============================================================================

/// Stores an `int[20000][32]` table in `vectors[0]`.
#[no_mangle]
pub extern "C" fn curandrs_get_direction_vectors32(vectors: ObjectRef, set: c_int) -> c_int {
    with_binding("curandGetDirectionVectors32", |b| b.get_direction_vectors_32(vectors, set))
}

/// Stores an `int[20000]` array in `constants[0]`.
#[no_mangle]
pub extern "C" fn curandrs_get_scramble_constants32(constants: ObjectRef) -> c_int {
    with_binding("curandGetScrambleConstants32", |b| b.get_scramble_constants_32(constants))
}

/// Stores a `long[20000][64]` table in `vectors[0]`.
#[no_mangle]
pub extern "C" fn curandrs_get_direction_vectors64(vectors: ObjectRef, set: c_int) -> c_int {
    with_binding("curandGetDirectionVectors64", |b| b.get_direction_vectors_64(vectors, set))
}

/// Stores a `long[20000]` array in `constants[0]`.
#[no_mangle]
pub extern "C" fn curandrs_get_scramble_constants64(constants: ObjectRef) -> c_int {
    with_binding("curandGetScrambleConstants64", |b| b.get_scramble_constants_64(constants))
}
