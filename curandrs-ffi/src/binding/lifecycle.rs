//! Generator and distribution lifecycle, generator configuration.

use cuda_runtime_sys::cudaStream_t;
use curand::{CurandLibrary, RawGenerator};
use curand_sys::CURAND_STATUS_NOT_INITIALIZED;
use libc::{c_int, c_void};
use log::{debug, trace, warn};

use super::{require, CurandBinding, Exit, Flow};
use crate::bridge::AddressSpace;
use crate::handles::{attach, attached_id, detach, DistributionRecord, GeneratorRecord, HandleId, Placement};
use crate::host::{ManagedHost, ObjectRef};
use crate::status::BoundaryError;

impl<H, L, A> CurandBinding<H, L, A>
where
    H: ManagedHost,
    L: CurandLibrary,
    A: AddressSpace,
{
    pub fn create_generator(&self, generator: ObjectRef, rng_type: c_int) -> c_int {
        self.run(|| self.create_generator_with("curandCreateGenerator", generator, rng_type, Placement::Device))
    }

    pub fn create_generator_host(&self, generator: ObjectRef, rng_type: c_int) -> c_int {
        self.run(|| self.create_generator_with("curandCreateGeneratorHost", generator, rng_type, Placement::Host))
    }

    fn create_generator_with(
        &self,
        function: &'static str,
        object: ObjectRef,
        rng_type: c_int,
        placement: Placement,
    ) -> Flow {
        require(object, function, "generator")?;
        trace!("Executing {}(generator={:?}, rng_type={})", function, object, rng_type);

        let previous = attached_id(&self.host, object).map_err(BoundaryError::host(function))?;
        if previous.and_then(|id| self.handles.generator(id)).is_some() {
            warn!("{}: {:?} already holds a live generator, replacing it", function, object);
        }

        let raw = match placement {
            Placement::Device => self.curand.create_generator(rng_type)?,
            Placement::Host => self.curand.create_generator_host(rng_type)?,
        };
        let id = self.handles.insert_generator(GeneratorRecord {
            raw,
            placement,
            rng_type,
        });
        if let Err(source) = attach(&self.host, object, id) {
            self.handles.remove_generator(id);
            if let Err(e) = self.curand.destroy_generator(raw) {
                warn!("{}: could not destroy unattached generator: {}", function, e);
            }
            return Err(BoundaryError::Host { function, source }.into());
        }
        debug!("{}: {:?} -> {:p} as {:#x}", function, object, raw.0, id.as_raw());
        Ok(())
    }

    pub fn destroy_generator(&self, generator: ObjectRef) -> c_int {
        const FUNCTION: &str = "curandDestroyGenerator";
        self.run(|| {
            require(generator, FUNCTION, "generator")?;
            trace!("Executing {}(generator={:?})", FUNCTION, generator);

            // Claim the entry first so a concurrent destroy of the same
            // object finds nothing.
            let record = self
                .claim(FUNCTION, generator, |id| self.handles.remove_generator(id))?
                .ok_or(Exit::Status(CURAND_STATUS_NOT_INITIALIZED))?;
            let result = self.curand.destroy_generator(record.raw);
            detach(&self.host, generator).map_err(BoundaryError::host(FUNCTION))?;
            debug!("{}: {:?} released {:p}", FUNCTION, generator, record.raw.0);
            Ok(result?)
        })
    }

    pub fn create_poisson_distribution(&self, lambda: f64, distribution: ObjectRef) -> c_int {
        const FUNCTION: &str = "curandCreatePoissonDistribution";
        self.run(|| {
            require(distribution, FUNCTION, "discrete_distribution")?;
            trace!(
                "Executing {}(lambda={}, discrete_distribution={:?})",
                FUNCTION,
                lambda,
                distribution
            );

            let previous = attached_id(&self.host, distribution).map_err(BoundaryError::host(FUNCTION))?;
            if previous.and_then(|id| self.handles.distribution(id)).is_some() {
                warn!("{}: {:?} already holds a live distribution, replacing it", FUNCTION, distribution);
            }

            let raw = self.curand.create_poisson_distribution(lambda)?;
            let id = self.handles.insert_distribution(DistributionRecord { raw, lambda });
            if let Err(source) = attach(&self.host, distribution, id) {
                self.handles.remove_distribution(id);
                if let Err(e) = self.curand.destroy_distribution(raw) {
                    warn!("{}: could not destroy unattached distribution: {}", FUNCTION, e);
                }
                return Err(BoundaryError::Host {
                    function: FUNCTION,
                    source,
                }
                .into());
            }
            Ok(())
        })
    }

    pub fn destroy_distribution(&self, distribution: ObjectRef) -> c_int {
        const FUNCTION: &str = "curandDestroyDistribution";
        self.run(|| {
            require(distribution, FUNCTION, "discrete_distribution")?;
            trace!("Executing {}(discrete_distribution={:?})", FUNCTION, distribution);

            let record = self
                .claim(FUNCTION, distribution, |id| self.handles.remove_distribution(id))?
                .ok_or(Exit::Status(CURAND_STATUS_NOT_INITIALIZED))?;
            let result = self.curand.destroy_distribution(record.raw);
            detach(&self.host, distribution).map_err(BoundaryError::host(FUNCTION))?;
            debug!(
                "{}: {:?} released {:p} (lambda={})",
                FUNCTION, distribution, record.raw.0, record.lambda
            );
            Ok(result?)
        })
    }

    /// Remove the entry attached to `object` from its table.
    fn claim<T>(
        &self,
        function: &'static str,
        object: ObjectRef,
        remove: impl FnOnce(HandleId) -> Option<T>,
    ) -> Result<Option<T>, BoundaryError> {
        let id = attached_id(&self.host, object).map_err(BoundaryError::host(function))?;
        let record = id.and_then(remove);
        if record.is_none() {
            debug!("{}: nothing attached to {:?}", function, object);
        }
        Ok(record)
    }

    /// Look up the generator of a configuration call and run it.
    fn configure(
        &self,
        function: &'static str,
        generator: ObjectRef,
        call: impl FnOnce(RawGenerator) -> curand::Result<()>,
    ) -> Flow {
        let record = self.generator(function, generator)?;
        Ok(call(record.raw)?)
    }

    pub fn set_stream(&self, generator: ObjectRef, stream: ObjectRef) -> c_int {
        const FUNCTION: &str = "curandSetStream";
        self.run(|| {
            require(generator, FUNCTION, "generator")?;
            require(stream, FUNCTION, "stream")?;
            trace!("Executing {}(generator={:?}, stream={:?})", FUNCTION, generator, stream);

            let raw_stream = self
                .host
                .native_handle(stream)
                .map_err(BoundaryError::host(FUNCTION))?;
            let raw_stream = raw_stream as usize as *mut c_void as cudaStream_t;
            self.configure(FUNCTION, generator, |g| self.curand.set_stream(g, raw_stream))
        })
    }

    pub fn set_pseudo_random_generator_seed(&self, generator: ObjectRef, seed: i64) -> c_int {
        const FUNCTION: &str = "curandSetPseudoRandomGeneratorSeed";
        self.run(|| {
            require(generator, FUNCTION, "generator")?;
            trace!("Executing {}(generator={:?}, seed={})", FUNCTION, generator, seed);
            self.configure(FUNCTION, generator, |g| self.curand.set_seed(g, seed as u64))
        })
    }

    pub fn set_generator_offset(&self, generator: ObjectRef, offset: i64) -> c_int {
        const FUNCTION: &str = "curandSetGeneratorOffset";
        self.run(|| {
            require(generator, FUNCTION, "generator")?;
            trace!("Executing {}(generator={:?}, offset={})", FUNCTION, generator, offset);
            self.configure(FUNCTION, generator, |g| self.curand.set_offset(g, offset as u64))
        })
    }

    pub fn set_generator_ordering(&self, generator: ObjectRef, order: c_int) -> c_int {
        const FUNCTION: &str = "curandSetGeneratorOrdering";
        self.run(|| {
            require(generator, FUNCTION, "generator")?;
            trace!("Executing {}(generator={:?}, order={})", FUNCTION, generator, order);
            self.configure(FUNCTION, generator, |g| self.curand.set_ordering(g, order))
        })
    }

    pub fn set_quasi_random_generator_dimensions(&self, generator: ObjectRef, num_dimensions: c_int) -> c_int {
        const FUNCTION: &str = "curandSetQuasiRandomGeneratorDimensions";
        self.run(|| {
            require(generator, FUNCTION, "generator")?;
            trace!(
                "Executing {}(generator={:?}, num_dimensions={})",
                FUNCTION,
                generator,
                num_dimensions
            );
            self.configure(FUNCTION, generator, |g| {
                self.curand.set_quasi_dimensions(g, num_dimensions as u32)
            })
        })
    }

    pub fn generate_seeds(&self, generator: ObjectRef) -> c_int {
        const FUNCTION: &str = "curandGenerateSeeds";
        self.run(|| {
            require(generator, FUNCTION, "generator")?;
            trace!("Executing {}(generator={:?})", FUNCTION, generator);
            self.configure(FUNCTION, generator, |g| self.curand.generate_seeds(g))
        })
    }
}
