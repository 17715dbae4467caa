//! Compute runtime seams.
//!
//! The session logic is written against [`ComputeRuntime`] and
//! [`ExecutionQueue`] rather than against OpenCL directly:
//! - [`opencl`] is the production implementation
//! - tests drive the same code through a recording mock
//!
//! Every fallible call reports the runtime's raw status code so callers can
//! surface it verbatim.

pub mod opencl;

use crate::error::StatusCode;

/// Key/value pairs tying a compute context to the current GL context.
///
/// Built by the graphics side (it knows the native context/display handles)
/// and consumed by [`ComputeRuntime::create_context`].
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct InteropProperties {
    pairs: Vec<(isize, isize)>,
}

impl InteropProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: isize, value: isize) -> Self {
        self.pairs.push((key, value));
        self
    }

    pub fn pairs(&self) -> &[(isize, isize)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Flattens into the zero-terminated list expected by context creation.
    ///
    /// `prefix` pairs are emitted first.
    pub fn to_terminated_list(&self, prefix: &[(isize, isize)]) -> Vec<isize> {
        let mut out = Vec::with_capacity((prefix.len() + self.pairs.len()) * 2 + 1);
        for &(k, v) in prefix.iter().chain(self.pairs.iter()) {
            out.push(k);
            out.push(v);
        }
        out.push(0);
        out
    }
}

/// One kernel argument.
///
/// Arguments 0 and 1 are owned by the session (output target, frame size);
/// callers fill the remaining slots.
#[derive(Debug)]
pub enum KernelArg<'a, M> {
    /// Passed by value; the bytes are copied at bind time.
    Value(&'a [u8]),
    /// `__local` buffer of the given size in bytes.
    Local(usize),
    /// A compute memory object.
    Mem(&'a M),
}

impl<'a, M> KernelArg<'a, M> {
    /// By-value argument from any plain-old-data value (scalars, vectors,
    /// `#[repr(C)]` structs).
    pub fn value<T: bytemuck::Pod>(value: &'a T) -> Self {
        KernelArg::Value(bytemuck::bytes_of(value))
    }

    /// Byte size the runtime will be told about.
    pub fn size(&self) -> usize {
        match self {
            KernelArg::Value(bytes) => bytes.len(),
            KernelArg::Local(size) => *size,
            KernelArg::Mem(_) => std::mem::size_of::<usize>(),
        }
    }
}

/// Descriptive attributes of a compute device.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct DeviceInfo {
    pub name: String,
    /// Space-separated extension list as reported by the driver.
    pub extensions: String,
}

impl DeviceInfo {
    pub fn supports(&self, extension: &str) -> bool {
        self.extensions.split_whitespace().any(|e| e == extension)
    }
}

/// Compute runtime entry points used by the session.
///
/// Handles returned from this trait release themselves on drop; the session
/// orders its fields so children are dropped before their context.
pub trait ComputeRuntime {
    type Platform;
    type Device: Clone;
    type Context;
    type Queue: ExecutionQueue<Kernel = Self::Kernel, Mem = Self::Mem>;
    type Program;
    type Kernel;
    type Mem;

    fn platforms(&self) -> Result<Vec<Self::Platform>, StatusCode>;

    fn platform_version(&self, platform: &Self::Platform) -> Result<String, StatusCode>;

    /// GPU-class devices only.
    fn gpu_devices(&self, platform: &Self::Platform) -> Result<Vec<Self::Device>, StatusCode>;

    fn device_info(&self, device: &Self::Device) -> Result<DeviceInfo, StatusCode>;

    fn create_context(
        &self,
        device: &Self::Device,
        properties: &InteropProperties,
    ) -> Result<Self::Context, StatusCode>;

    fn create_queue(
        &self,
        context: &Self::Context,
        device: &Self::Device,
    ) -> Result<Self::Queue, StatusCode>;

    fn create_program(&self, context: &Self::Context, source: &str) -> Result<Self::Program, StatusCode>;

    fn build_program(
        &self,
        program: &mut Self::Program,
        device: &Self::Device,
        options: &str,
    ) -> Result<(), StatusCode>;

    fn build_log(&self, program: &Self::Program, device: &Self::Device) -> Result<String, StatusCode>;

    fn create_kernel(&self, program: &Self::Program, name: &str) -> Result<Self::Kernel, StatusCode>;

    fn set_kernel_arg(
        &self,
        kernel: &Self::Kernel,
        index: u32,
        arg: KernelArg<'_, Self::Mem>,
    ) -> Result<(), StatusCode>;

    /// Wraps a GL renderbuffer as a write-only compute memory object.
    fn share_renderbuffer(&self, context: &Self::Context, renderbuffer: u32) -> Result<Self::Mem, StatusCode>;
}

/// In-order command queue.
///
/// Enqueue calls return immediately; `wait`, `flush` and `finish` are the
/// only synchronization points.
pub trait ExecutionQueue {
    type Kernel;
    type Mem;
    type Event;

    fn enqueue_acquire_gl_objects(&self, objects: &[&Self::Mem]) -> StatusCode;

    fn enqueue_release_gl_objects(&self, objects: &[&Self::Mem]) -> StatusCode;

    /// Dispatches `kernel` over a `global[0] × global[1]` index space with the
    /// work-group size left to the runtime.
    fn enqueue_kernel_2d(&self, kernel: &Self::Kernel, global: [usize; 2]) -> Result<Self::Event, StatusCode>;

    /// Blocks until `event` completes. No timeout.
    fn wait(&self, event: &Self::Event) -> StatusCode;

    fn flush(&self) -> StatusCode;

    fn finish(&self) -> StatusCode;
}
