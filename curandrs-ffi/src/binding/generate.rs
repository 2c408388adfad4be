//! Generation into caller buffers.

use std::fmt;

use curand::{CurandLibrary, RawGenerator};
use libc::c_int;
use log::{trace, warn};

use super::{require, require_buffer, CurandBinding};
use crate::bridge::{AddressSpace, BufferRef};
use crate::handles::Placement;
use crate::host::{ManagedHost, ObjectRef};

/// Widen a managed element count to `size_t` the way a C cast does.
fn element_count(function: &'static str, num: i64) -> usize {
    if num < 0 {
        warn!("{}: negative count {} wraps to {}", function, num, num as usize);
    }
    num as usize
}

impl<H, L, A> CurandBinding<H, L, A>
where
    H: ManagedHost,
    L: CurandLibrary,
    A: AddressSpace,
{
    /// Shared body of every generation call writing `n` elements of `T`.
    fn generate_into<T>(
        &self,
        function: &'static str,
        generator: ObjectRef,
        output: Option<&BufferRef>,
        n: usize,
        details: fmt::Arguments<'_>,
        call: impl FnOnce(RawGenerator, *mut T) -> curand::Result<()>,
    ) -> c_int {
        self.run(|| {
            require(generator, function, "generator")?;
            let output = require_buffer(output, function, "outputPtr")?;
            trace!(
                "Executing {}(generator={:?}, outputPtr={:?}, {})",
                function,
                generator,
                output,
                details
            );

            let record = self.generator(function, generator)?;
            let buffer = self.output::<T>(function, "outputPtr", output, n)?;
            if record.placement == Placement::Device && !buffer.class().is_device_accessible() {
                warn!(
                    "{}: device generator writing to {:?} memory at {:p}",
                    function,
                    buffer.class(),
                    buffer.address()
                );
            }
            let result = call(record.raw, buffer.as_mut_ptr::<T>());
            self.release(function, "outputPtr", buffer)?;
            Ok(result?)
        })
    }

    pub fn generate(&self, generator: ObjectRef, output: Option<&BufferRef>, num: i64) -> c_int {
        let n = element_count("curandGenerate", num);
        self.generate_into(
            "curandGenerate",
            generator,
            output,
            n,
            format_args!("num={}", num),
            |g, out: *mut u32| unsafe { self.curand.generate(g, out, n) },
        )
    }

    pub fn generate_long_long(&self, generator: ObjectRef, output: Option<&BufferRef>, num: i64) -> c_int {
        let n = element_count("curandGenerateLongLong", num);
        self.generate_into(
            "curandGenerateLongLong",
            generator,
            output,
            n,
            format_args!("num={}", num),
            |g, out: *mut u64| unsafe { self.curand.generate_long_long(g, out, n) },
        )
    }

    pub fn generate_uniform(&self, generator: ObjectRef, output: Option<&BufferRef>, num: i64) -> c_int {
        let n = element_count("curandGenerateUniform", num);
        self.generate_into(
            "curandGenerateUniform",
            generator,
            output,
            n,
            format_args!("num={}", num),
            |g, out: *mut f32| unsafe { self.curand.generate_uniform(g, out, n) },
        )
    }

    pub fn generate_uniform_double(&self, generator: ObjectRef, output: Option<&BufferRef>, num: i64) -> c_int {
        let n = element_count("curandGenerateUniformDouble", num);
        self.generate_into(
            "curandGenerateUniformDouble",
            generator,
            output,
            n,
            format_args!("num={}", num),
            |g, out: *mut f64| unsafe { self.curand.generate_uniform_double(g, out, n) },
        )
    }

    pub fn generate_normal(
        &self,
        generator: ObjectRef,
        output: Option<&BufferRef>,
        num: i64,
        mean: f32,
        stddev: f32,
    ) -> c_int {
        let n = element_count("curandGenerateNormal", num);
        self.generate_into(
            "curandGenerateNormal",
            generator,
            output,
            n,
            format_args!("n={}, mean={}, stddev={}", num, mean, stddev),
            |g, out: *mut f32| unsafe { self.curand.generate_normal(g, out, n, mean, stddev) },
        )
    }

    pub fn generate_normal_double(
        &self,
        generator: ObjectRef,
        output: Option<&BufferRef>,
        num: i64,
        mean: f64,
        stddev: f64,
    ) -> c_int {
        let n = element_count("curandGenerateNormalDouble", num);
        self.generate_into(
            "curandGenerateNormalDouble",
            generator,
            output,
            n,
            format_args!("n={}, mean={}, stddev={}", num, mean, stddev),
            |g, out: *mut f64| unsafe { self.curand.generate_normal_double(g, out, n, mean, stddev) },
        )
    }

    pub fn generate_log_normal(
        &self,
        generator: ObjectRef,
        output: Option<&BufferRef>,
        num: i64,
        mean: f32,
        stddev: f32,
    ) -> c_int {
        let n = element_count("curandGenerateLogNormal", num);
        self.generate_into(
            "curandGenerateLogNormal",
            generator,
            output,
            n,
            format_args!("n={}, mean={}, stddev={}", num, mean, stddev),
            |g, out: *mut f32| unsafe { self.curand.generate_log_normal(g, out, n, mean, stddev) },
        )
    }

    pub fn generate_log_normal_double(
        &self,
        generator: ObjectRef,
        output: Option<&BufferRef>,
        num: i64,
        mean: f64,
        stddev: f64,
    ) -> c_int {
        let n = element_count("curandGenerateLogNormalDouble", num);
        self.generate_into(
            "curandGenerateLogNormalDouble",
            generator,
            output,
            n,
            format_args!("n={}, mean={}, stddev={}", num, mean, stddev),
            |g, out: *mut f64| unsafe { self.curand.generate_log_normal_double(g, out, n, mean, stddev) },
        )
    }

    pub fn generate_poisson(&self, generator: ObjectRef, output: Option<&BufferRef>, num: i64, lambda: f64) -> c_int {
        let n = element_count("curandGeneratePoisson", num);
        self.generate_into(
            "curandGeneratePoisson",
            generator,
            output,
            n,
            format_args!("n={}, lambda={}", num, lambda),
            |g, out: *mut u32| unsafe { self.curand.generate_poisson(g, out, n, lambda) },
        )
    }
}
