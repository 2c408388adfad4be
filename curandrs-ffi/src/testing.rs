//! In-memory stand-ins for the host runtime and cuRAND.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use cuda_runtime_sys::cudaStream_t;
use curand::{
    curandDirectionVectorSet_t, curandDirectionVectors32_t, curandDirectionVectors64_t, curandOrdering_t,
    curandRngType_t, libraryPropertyType, CurandError, CurandLibrary, RawDistribution, RawGenerator,
};
use libc::c_void;

use crate::bridge::{AddressSpace, MemoryClass, PointerBridge};
use crate::binding::CurandBinding;
use crate::handles::NativeHandles;
use crate::host::{ArrayClass, ExceptionKind, HostError, ManagedHost, ObjectRef, PinnedArray};

#[derive(Debug, Clone, PartialEq)]
pub enum FakeObject {
    /// A handle-bearing object (generator, distribution, stream).
    Handle(u64),
    Ints(Vec<i32>),
    Longs(Vec<i64>),
    Objects(Vec<ObjectRef>, Option<ArrayClass>),
}

#[derive(Default)]
struct Heap {
    next: u64,
    objects: HashMap<u64, FakeObject>,
    exceptions: Vec<(ExceptionKind, String)>,
    released: Vec<ObjectRef>,
}

/// A managed heap held in memory.
#[derive(Default)]
pub struct FakeHost {
    heap: Mutex<Heap>,
    pins: AtomicUsize,
    unpins: AtomicUsize,
    arrays_created: AtomicUsize,
    fail_pin: AtomicBool,
    fail_unpin: AtomicBool,
    fail_set_handle: AtomicBool,
    /// Fail array allocation once this many arrays have been created.
    fail_new_array_after: Mutex<Option<usize>>,
    /// Raise a pending exception once this many object elements were stored.
    pending_after_sets: Mutex<Option<usize>>,
    element_sets: AtomicUsize,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&self, object: FakeObject) -> ObjectRef {
        let mut heap = self.heap.lock().unwrap();
        heap.next += 1;
        let id = heap.next;
        heap.objects.insert(id, object);
        ObjectRef(id)
    }

    pub fn handle_object(&self) -> ObjectRef {
        self.alloc(FakeObject::Handle(0))
    }

    pub fn handle_object_with(&self, value: u64) -> ObjectRef {
        self.alloc(FakeObject::Handle(value))
    }

    pub fn int_array(&self, values: &[i32]) -> ObjectRef {
        self.alloc(FakeObject::Ints(values.to_vec()))
    }

    pub fn long_array(&self, values: &[i64]) -> ObjectRef {
        self.alloc(FakeObject::Longs(values.to_vec()))
    }

    pub fn object_array(&self, length: usize) -> ObjectRef {
        self.alloc(FakeObject::Objects(vec![ObjectRef::NULL; length], None))
    }

    pub fn object(&self, object: ObjectRef) -> FakeObject {
        self.heap.lock().unwrap().objects[&object.0].clone()
    }

    pub fn handle_value(&self, object: ObjectRef) -> u64 {
        match self.object(object) {
            FakeObject::Handle(value) => value,
            other => panic!("not a handle object: {other:?}"),
        }
    }

    pub fn ints(&self, array: ObjectRef) -> Vec<i32> {
        match self.object(array) {
            FakeObject::Ints(values) => values,
            other => panic!("not an int array: {other:?}"),
        }
    }

    pub fn longs(&self, array: ObjectRef) -> Vec<i64> {
        match self.object(array) {
            FakeObject::Longs(values) => values,
            other => panic!("not a long array: {other:?}"),
        }
    }

    pub fn elements(&self, array: ObjectRef) -> Vec<ObjectRef> {
        match self.object(array) {
            FakeObject::Objects(values, _) => values,
            other => panic!("not an object array: {other:?}"),
        }
    }

    pub fn exceptions(&self) -> Vec<(ExceptionKind, String)> {
        self.heap.lock().unwrap().exceptions.clone()
    }

    pub fn released(&self) -> usize {
        self.heap.lock().unwrap().released.len()
    }

    pub fn pin_count(&self) -> usize {
        self.pins.load(Ordering::SeqCst)
    }

    pub fn unpin_count(&self) -> usize {
        self.unpins.load(Ordering::SeqCst)
    }

    pub fn arrays_created(&self) -> usize {
        self.arrays_created.load(Ordering::SeqCst)
    }

    pub fn fail_pin(&self, fail: bool) {
        self.fail_pin.store(fail, Ordering::SeqCst);
    }

    pub fn fail_unpin(&self, fail: bool) {
        self.fail_unpin.store(fail, Ordering::SeqCst);
    }

    pub fn fail_set_handle(&self, fail: bool) {
        self.fail_set_handle.store(fail, Ordering::SeqCst);
    }

    pub fn fail_new_array_after(&self, count: usize) {
        *self.fail_new_array_after.lock().unwrap() = Some(count);
    }

    pub fn pending_exception_after(&self, sets: usize) {
        *self.pending_after_sets.lock().unwrap() = Some(sets);
    }

    fn count_new_array(&self) -> Result<(), HostError> {
        let created = self.arrays_created.fetch_add(1, Ordering::SeqCst);
        match *self.fail_new_array_after.lock().unwrap() {
            Some(limit) if created >= limit => Err(HostError("new_array")),
            _ => Ok(()),
        }
    }
}

impl ManagedHost for FakeHost {
    fn throw(&self, kind: ExceptionKind, message: &str) {
        self.heap.lock().unwrap().exceptions.push((kind, message.to_string()));
    }

    fn exception_pending(&self) -> bool {
        if !self.heap.lock().unwrap().exceptions.is_empty() {
            return true;
        }
        match *self.pending_after_sets.lock().unwrap() {
            Some(limit) => self.element_sets.load(Ordering::SeqCst) >= limit,
            None => false,
        }
    }

    fn native_handle(&self, object: ObjectRef) -> Result<u64, HostError> {
        match self.heap.lock().unwrap().objects.get(&object.0) {
            Some(FakeObject::Handle(value)) => Ok(*value),
            _ => Err(HostError("get_native_handle")),
        }
    }

    fn set_native_handle(&self, object: ObjectRef, value: u64) -> Result<(), HostError> {
        if self.fail_set_handle.load(Ordering::SeqCst) {
            return Err(HostError("set_native_handle"));
        }
        match self.heap.lock().unwrap().objects.get_mut(&object.0) {
            Some(FakeObject::Handle(slot)) => {
                *slot = value;
                Ok(())
            }
            _ => Err(HostError("set_native_handle")),
        }
    }

    fn array_length(&self, array: ObjectRef) -> Result<usize, HostError> {
        match self.heap.lock().unwrap().objects.get(&array.0) {
            Some(FakeObject::Ints(v)) => Ok(v.len()),
            Some(FakeObject::Longs(v)) => Ok(v.len()),
            Some(FakeObject::Objects(v, _)) => Ok(v.len()),
            _ => Err(HostError("array_length")),
        }
    }

    fn pin_array(&self, array: ObjectRef) -> Result<PinnedArray, HostError> {
        if self.fail_pin.load(Ordering::SeqCst) {
            return Err(HostError("pin_array"));
        }
        let mut heap = self.heap.lock().unwrap();
        let (address, byte_len) = match heap.objects.get_mut(&array.0) {
            Some(FakeObject::Ints(v)) => (v.as_mut_ptr() as *mut c_void, v.len() * 4),
            Some(FakeObject::Longs(v)) => (v.as_mut_ptr() as *mut c_void, v.len() * 8),
            _ => return Err(HostError("pin_array")),
        };
        self.pins.fetch_add(1, Ordering::SeqCst);
        Ok(PinnedArray {
            address,
            byte_len,
            is_copy: false,
        })
    }

    fn unpin_array(&self, _array: ObjectRef, _pinned: PinnedArray) -> Result<(), HostError> {
        self.unpins.fetch_add(1, Ordering::SeqCst);
        if self.fail_unpin.load(Ordering::SeqCst) {
            Err(HostError("unpin_array"))
        } else {
            Ok(())
        }
    }

    fn set_int_element(&self, array: ObjectRef, index: usize, value: i32) -> Result<(), HostError> {
        match self.heap.lock().unwrap().objects.get_mut(&array.0) {
            Some(FakeObject::Ints(v)) if index < v.len() => {
                v[index] = value;
                Ok(())
            }
            _ => Err(HostError("set_int_element")),
        }
    }

    fn new_int_array(&self, values: &[i32]) -> Result<ObjectRef, HostError> {
        self.count_new_array()?;
        Ok(self.alloc(FakeObject::Ints(values.to_vec())))
    }

    fn new_long_array(&self, values: &[i64]) -> Result<ObjectRef, HostError> {
        self.count_new_array()?;
        Ok(self.alloc(FakeObject::Longs(values.to_vec())))
    }

    fn new_object_array(&self, length: usize, class: ArrayClass) -> Result<ObjectRef, HostError> {
        self.count_new_array()?;
        Ok(self.alloc(FakeObject::Objects(vec![ObjectRef::NULL; length], Some(class))))
    }

    fn set_object_element(&self, array: ObjectRef, index: usize, value: ObjectRef) -> Result<(), HostError> {
        self.element_sets.fetch_add(1, Ordering::SeqCst);
        match self.heap.lock().unwrap().objects.get_mut(&array.0) {
            Some(FakeObject::Objects(v, _)) if index < v.len() => {
                v[index] = value;
                Ok(())
            }
            _ => Err(HostError("set_object_element")),
        }
    }

    fn release_local(&self, object: ObjectRef) {
        self.heap.lock().unwrap().released.push(object);
    }
}

/// Classifies every address the same way.
pub struct FixedSpace(pub MemoryClass);

impl AddressSpace for FixedSpace {
    fn classify(&self, _address: u64) -> MemoryClass {
        self.0
    }
}

/// One recorded native call. Floating point arguments are stored as bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeCall {
    pub name: &'static str,
    pub args: Vec<u64>,
}

pub const TABLE_ROWS: usize = 20_000;

/// Records every call and answers with configurable status codes.
pub struct CountingCurand {
    calls: Mutex<Vec<NativeCall>>,
    statuses: Mutex<HashMap<&'static str, i32>>,
    next_address: AtomicUsize,
    /// Write a recognizable pattern into generation outputs.
    write_outputs: AtomicBool,
    vectors32: Vec<curandDirectionVectors32_t>,
    vectors64: Vec<curandDirectionVectors64_t>,
    scramble32: Vec<u32>,
    scramble64: Vec<u64>,
}

impl Default for CountingCurand {
    fn default() -> Self {
        Self::new()
    }
}

impl CountingCurand {
    pub fn new() -> Self {
        let vectors32 = (0..TABLE_ROWS)
            .map(|i| std::array::from_fn(|j| (i as u32).wrapping_mul(32).wrapping_add(j as u32) | 0x8000_0000))
            .collect();
        let vectors64 = (0..TABLE_ROWS)
            .map(|i| std::array::from_fn(|j| ((i as u64) << 32) | j as u64 | 0x8000_0000_0000_0000))
            .collect();
        Self {
            calls: Mutex::new(Vec::new()),
            statuses: Mutex::new(HashMap::new()),
            next_address: AtomicUsize::new(0x1000),
            write_outputs: AtomicBool::new(false),
            vectors32,
            vectors64,
            scramble32: (0..TABLE_ROWS as u32).map(|i| u32::MAX - i).collect(),
            scramble64: (0..TABLE_ROWS as u64).map(|i| u64::MAX - i).collect(),
        }
    }

    /// Make `name` return `status` from now on.
    pub fn set_status(&self, name: &'static str, status: i32) {
        self.statuses.lock().unwrap().insert(name, status);
    }

    pub fn write_outputs(&self, write: bool) {
        self.write_outputs.store(write, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<NativeCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_call(&self) -> Option<NativeCall> {
        self.calls.lock().unwrap().last().cloned()
    }

    pub fn vectors32(&self) -> &[curandDirectionVectors32_t] {
        &self.vectors32
    }

    pub fn vectors64(&self) -> &[curandDirectionVectors64_t] {
        &self.vectors64
    }

    pub fn scramble32(&self) -> &[u32] {
        &self.scramble32
    }

    pub fn scramble64(&self) -> &[u64] {
        &self.scramble64
    }

    fn record(&self, name: &'static str, args: Vec<u64>) -> curand::Result<()> {
        self.calls.lock().unwrap().push(NativeCall { name, args });
        match self.statuses.lock().unwrap().get(name) {
            Some(&status) if status != 0 => Err(CurandError(status)),
            _ => Ok(()),
        }
    }

    fn fresh_address(&self) -> usize {
        self.next_address.fetch_add(0x100, Ordering::SeqCst)
    }

    unsafe fn fill<T: Copy>(&self, output: *mut T, n: usize, value: impl Fn(usize) -> T) {
        if self.write_outputs.load(Ordering::SeqCst) {
            for i in 0..n {
                *output.add(i) = value(i);
            }
        }
    }
}

fn gen(generator: RawGenerator) -> u64 {
    generator.0 as usize as u64
}

fn ptr<T>(p: *mut T) -> u64 {
    p as usize as u64
}

impl CurandLibrary for CountingCurand {
    fn create_generator(&self, rng_type: curandRngType_t) -> curand::Result<RawGenerator> {
        self.record("curandCreateGenerator", vec![rng_type as u64])?;
        Ok(RawGenerator(self.fresh_address() as *mut _))
    }

    fn create_generator_host(&self, rng_type: curandRngType_t) -> curand::Result<RawGenerator> {
        self.record("curandCreateGeneratorHost", vec![rng_type as u64])?;
        Ok(RawGenerator(self.fresh_address() as *mut _))
    }

    fn destroy_generator(&self, generator: RawGenerator) -> curand::Result<()> {
        self.record("curandDestroyGenerator", vec![gen(generator)])
    }

    fn set_stream(&self, generator: RawGenerator, stream: cudaStream_t) -> curand::Result<()> {
        self.record("curandSetStream", vec![gen(generator), ptr(stream)])
    }

    fn set_seed(&self, generator: RawGenerator, seed: u64) -> curand::Result<()> {
        self.record("curandSetPseudoRandomGeneratorSeed", vec![gen(generator), seed])
    }

    fn set_offset(&self, generator: RawGenerator, offset: u64) -> curand::Result<()> {
        self.record("curandSetGeneratorOffset", vec![gen(generator), offset])
    }

    fn set_ordering(&self, generator: RawGenerator, order: curandOrdering_t) -> curand::Result<()> {
        self.record("curandSetGeneratorOrdering", vec![gen(generator), order as u64])
    }

    fn set_quasi_dimensions(&self, generator: RawGenerator, num_dimensions: u32) -> curand::Result<()> {
        self.record(
            "curandSetQuasiRandomGeneratorDimensions",
            vec![gen(generator), u64::from(num_dimensions)],
        )
    }

    fn generate_seeds(&self, generator: RawGenerator) -> curand::Result<()> {
        self.record("curandGenerateSeeds", vec![gen(generator)])
    }

    unsafe fn generate(&self, generator: RawGenerator, output: *mut u32, n: usize) -> curand::Result<()> {
        self.record("curandGenerate", vec![gen(generator), ptr(output), n as u64])?;
        self.fill(output, n, |i| i as u32 + 1);
        Ok(())
    }

    unsafe fn generate_long_long(&self, generator: RawGenerator, output: *mut u64, n: usize) -> curand::Result<()> {
        self.record("curandGenerateLongLong", vec![gen(generator), ptr(output), n as u64])?;
        self.fill(output, n, |i| i as u64 + 1);
        Ok(())
    }

    unsafe fn generate_uniform(&self, generator: RawGenerator, output: *mut f32, n: usize) -> curand::Result<()> {
        self.record("curandGenerateUniform", vec![gen(generator), ptr(output), n as u64])?;
        self.fill(output, n, |_| 0.5f32);
        Ok(())
    }

    unsafe fn generate_uniform_double(&self, generator: RawGenerator, output: *mut f64, n: usize) -> curand::Result<()> {
        self.record("curandGenerateUniformDouble", vec![gen(generator), ptr(output), n as u64])?;
        self.fill(output, n, |_| 0.25f64);
        Ok(())
    }

    unsafe fn generate_normal(
        &self,
        generator: RawGenerator,
        output: *mut f32,
        n: usize,
        mean: f32,
        stddev: f32,
    ) -> curand::Result<()> {
        self.record(
            "curandGenerateNormal",
            vec![gen(generator), ptr(output), n as u64, u64::from(mean.to_bits()), u64::from(stddev.to_bits())],
        )?;
        self.fill(output, n, |_| mean);
        Ok(())
    }

    unsafe fn generate_normal_double(
        &self,
        generator: RawGenerator,
        output: *mut f64,
        n: usize,
        mean: f64,
        stddev: f64,
    ) -> curand::Result<()> {
        self.record(
            "curandGenerateNormalDouble",
            vec![gen(generator), ptr(output), n as u64, mean.to_bits(), stddev.to_bits()],
        )?;
        self.fill(output, n, |_| mean);
        Ok(())
    }

    unsafe fn generate_log_normal(
        &self,
        generator: RawGenerator,
        output: *mut f32,
        n: usize,
        mean: f32,
        stddev: f32,
    ) -> curand::Result<()> {
        self.record(
            "curandGenerateLogNormal",
            vec![gen(generator), ptr(output), n as u64, u64::from(mean.to_bits()), u64::from(stddev.to_bits())],
        )?;
        self.fill(output, n, |_| mean.exp());
        Ok(())
    }

    unsafe fn generate_log_normal_double(
        &self,
        generator: RawGenerator,
        output: *mut f64,
        n: usize,
        mean: f64,
        stddev: f64,
    ) -> curand::Result<()> {
        self.record(
            "curandGenerateLogNormalDouble",
            vec![gen(generator), ptr(output), n as u64, mean.to_bits(), stddev.to_bits()],
        )?;
        self.fill(output, n, |_| mean.exp());
        Ok(())
    }

    unsafe fn generate_poisson(&self, generator: RawGenerator, output: *mut u32, n: usize, lambda: f64) -> curand::Result<()> {
        self.record(
            "curandGeneratePoisson",
            vec![gen(generator), ptr(output), n as u64, lambda.to_bits()],
        )?;
        self.fill(output, n, |_| lambda as u32);
        Ok(())
    }

    fn create_poisson_distribution(&self, lambda: f64) -> curand::Result<RawDistribution> {
        self.record("curandCreatePoissonDistribution", vec![lambda.to_bits()])?;
        Ok(RawDistribution(self.fresh_address() as *mut _))
    }

    fn destroy_distribution(&self, distribution: RawDistribution) -> curand::Result<()> {
        self.record("curandDestroyDistribution", vec![distribution.0 as usize as u64])
    }

    fn direction_vectors_32(&self, set: curandDirectionVectorSet_t) -> curand::Result<*const curandDirectionVectors32_t> {
        self.record("curandGetDirectionVectors32", vec![set as u64])?;
        Ok(self.vectors32.as_ptr())
    }

    fn direction_vectors_64(&self, set: curandDirectionVectorSet_t) -> curand::Result<*const curandDirectionVectors64_t> {
        self.record("curandGetDirectionVectors64", vec![set as u64])?;
        Ok(self.vectors64.as_ptr())
    }

    fn scramble_constants_32(&self) -> curand::Result<*const u32> {
        self.record("curandGetScrambleConstants32", vec![])?;
        Ok(self.scramble32.as_ptr())
    }

    fn scramble_constants_64(&self) -> curand::Result<*const u64> {
        self.record("curandGetScrambleConstants64", vec![])?;
        Ok(self.scramble64.as_ptr())
    }

    fn version(&self) -> curand::Result<i32> {
        self.record("curandGetVersion", vec![])?;
        Ok(10_300)
    }

    fn property(&self, kind: libraryPropertyType) -> curand::Result<i32> {
        self.record("curandGetProperty", vec![kind as u64])?;
        Ok(match kind {
            0 => 10,
            1 => 3,
            _ => 2,
        })
    }
}

pub type TestBinding = CurandBinding<FakeHost, CountingCurand, FixedSpace>;

/// A binding over fresh fakes, classifying every native address as device memory.
pub fn test_binding() -> TestBinding {
    binding_with_space(MemoryClass::Device)
}

pub fn binding_with_space(class: MemoryClass) -> TestBinding {
    CurandBinding::new(
        FakeHost::new(),
        CountingCurand::new(),
        PointerBridge::new(FixedSpace(class)),
        NativeHandles::new(),
    )
}
