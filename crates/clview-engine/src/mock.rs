//! Recording test doubles for the compute, graphics and surface seams.
//!
//! Every call and every handle release is appended to one shared journal so
//! tests can assert ordering across subsystems.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::compute::{ComputeRuntime, DeviceInfo, ExecutionQueue, InteropProperties, KernelArg};
use crate::error::{Error, Result, StatusCode};
use crate::graphics::GraphicsApi;
use crate::surface::Surface;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Call {
    CreateContext,
    CreateQueue,
    CreateProgram(usize),
    BuildProgram { program: usize, options: String },
    BuildLog(usize),
    CreateKernel(usize),
    SetArg { kernel: usize, index: u32, size: usize },
    ShareRenderbuffer(u32),

    Acquire(usize),
    Finish,
    Dispatch([usize; 2]),
    Wait,
    Release(usize),
    Flush,

    CreateTarget { width: u32, height: u32 },
    Blit { width: u32, height: u32 },
    DeleteTarget(u32),
    Show,
    Swap,

    Released(Handle),
}

/// Handle kinds whose release is journaled.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Handle {
    Context,
    Queue,
    Program(usize),
    Kernel(usize),
    Mem(u32),
}

pub type Journal = Rc<RefCell<Vec<Call>>>;

fn record(journal: &Journal, call: Call) {
    journal.borrow_mut().push(call);
}

// ── Faults ────────────────────────────────────────────────────────────────

/// Status codes the mock returns instead of success.
#[derive(Debug, Clone, Default)]
pub struct Faults {
    pub context: Option<StatusCode>,
    pub queue: Option<StatusCode>,
    pub share: Option<StatusCode>,
    pub set_arg: Option<(u32, StatusCode)>,
    pub acquire: StatusCode,
    pub dispatch: Option<StatusCode>,
    pub wait: StatusCode,
    pub release: StatusCode,
    pub flush: StatusCode,
    pub finish: StatusCode,
}

// ── Runtime ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MockPlatform {
    version: String,
    devices: Vec<String>,
    version_fails: bool,
}

#[derive(Debug, Clone)]
pub struct MockDevice {
    pub name: String,
}

pub struct MockContext {
    journal: Journal,
}

impl Drop for MockContext {
    fn drop(&mut self) {
        record(&self.journal, Call::Released(Handle::Context));
    }
}

pub struct MockProgram {
    pub id: usize,
    source: String,
    journal: Journal,
}

impl Drop for MockProgram {
    fn drop(&mut self) {
        record(&self.journal, Call::Released(Handle::Program(self.id)));
    }
}

pub struct MockKernel {
    pub program: usize,
    journal: Journal,
}

impl Drop for MockKernel {
    fn drop(&mut self) {
        record(&self.journal, Call::Released(Handle::Kernel(self.program)));
    }
}

pub struct MockMem {
    pub renderbuffer: u32,
    journal: Journal,
}

impl Drop for MockMem {
    fn drop(&mut self) {
        record(&self.journal, Call::Released(Handle::Mem(self.renderbuffer)));
    }
}

pub struct MockQueue {
    journal: Journal,
    faults: Rc<RefCell<Faults>>,
}

impl Drop for MockQueue {
    fn drop(&mut self) {
        record(&self.journal, Call::Released(Handle::Queue));
    }
}

pub struct MockEvent;

#[derive(Clone)]
pub struct MockRuntime {
    journal: Journal,
    platforms: Vec<MockPlatform>,
    faults: Rc<RefCell<Faults>>,
    next_program: Rc<Cell<usize>>,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self {
            journal: Journal::default(),
            platforms: Vec::new(),
            faults: Rc::default(),
            next_program: Rc::default(),
        }
    }

    /// One OpenCL 3.0 platform with a single GPU.
    pub fn single_gpu() -> Self {
        Self::new().platform("OpenCL 3.0 mock", &["mock gpu"])
    }

    pub fn platform(mut self, version: &str, devices: &[&str]) -> Self {
        self.platforms.push(MockPlatform {
            version: version.to_string(),
            devices: devices.iter().map(|d| d.to_string()).collect(),
            version_fails: false,
        });
        self
    }

    pub fn failing_version(mut self, platform: usize) -> Self {
        self.platforms[platform].version_fails = true;
        self
    }

    pub fn faults(&self) -> std::cell::RefMut<'_, Faults> {
        self.faults.borrow_mut()
    }

    pub fn journal(&self) -> Vec<Call> {
        self.journal.borrow().clone()
    }

    pub fn journal_handle(&self) -> Journal {
        self.journal.clone()
    }
}

impl ComputeRuntime for MockRuntime {
    type Platform = MockPlatform;
    type Device = MockDevice;
    type Context = MockContext;
    type Queue = MockQueue;
    type Program = MockProgram;
    type Kernel = MockKernel;
    type Mem = MockMem;

    fn platforms(&self) -> std::result::Result<Vec<MockPlatform>, StatusCode> {
        Ok(self.platforms.clone())
    }

    fn platform_version(&self, platform: &MockPlatform) -> std::result::Result<String, StatusCode> {
        if platform.version_fails {
            return Err(-30);
        }
        Ok(platform.version.clone())
    }

    fn gpu_devices(&self, platform: &MockPlatform) -> std::result::Result<Vec<MockDevice>, StatusCode> {
        Ok(platform
            .devices
            .iter()
            .map(|name| MockDevice { name: name.clone() })
            .collect())
    }

    fn device_info(&self, device: &MockDevice) -> std::result::Result<DeviceInfo, StatusCode> {
        Ok(DeviceInfo {
            name: device.name.clone(),
            extensions: "cl_khr_gl_sharing".to_string(),
        })
    }

    fn create_context(
        &self,
        _device: &MockDevice,
        _properties: &InteropProperties,
    ) -> std::result::Result<MockContext, StatusCode> {
        record(&self.journal, Call::CreateContext);
        if let Some(code) = self.faults.borrow().context {
            return Err(code);
        }
        Ok(MockContext { journal: self.journal.clone() })
    }

    fn create_queue(
        &self,
        _context: &MockContext,
        _device: &MockDevice,
    ) -> std::result::Result<MockQueue, StatusCode> {
        record(&self.journal, Call::CreateQueue);
        if let Some(code) = self.faults.borrow().queue {
            return Err(code);
        }
        Ok(MockQueue {
            journal: self.journal.clone(),
            faults: self.faults.clone(),
        })
    }

    fn create_program(&self, _context: &MockContext, source: &str) -> std::result::Result<MockProgram, StatusCode> {
        let id = self.next_program.get();
        self.next_program.set(id + 1);
        record(&self.journal, Call::CreateProgram(id));
        Ok(MockProgram {
            id,
            source: source.to_string(),
            journal: self.journal.clone(),
        })
    }

    /// Fails for any source containing `#error`.
    fn build_program(
        &self,
        program: &mut MockProgram,
        _device: &MockDevice,
        options: &str,
    ) -> std::result::Result<(), StatusCode> {
        record(
            &self.journal,
            Call::BuildProgram { program: program.id, options: options.to_string() },
        );
        if program.source.contains("#error") {
            return Err(-11);
        }
        Ok(())
    }

    fn build_log(&self, program: &MockProgram, _device: &MockDevice) -> std::result::Result<String, StatusCode> {
        record(&self.journal, Call::BuildLog(program.id));
        let log = program
            .source
            .lines()
            .enumerate()
            .filter(|(_, l)| l.contains("#error"))
            .map(|(n, l)| format!("<kernel>:{}: error: {}", n + 1, l.trim()))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(log)
    }

    fn create_kernel(&self, program: &MockProgram, name: &str) -> std::result::Result<MockKernel, StatusCode> {
        record(&self.journal, Call::CreateKernel(program.id));
        if !program.source.contains(name) {
            return Err(-46);
        }
        Ok(MockKernel {
            program: program.id,
            journal: self.journal.clone(),
        })
    }

    fn set_kernel_arg(
        &self,
        kernel: &MockKernel,
        index: u32,
        arg: KernelArg<'_, MockMem>,
    ) -> std::result::Result<(), StatusCode> {
        record(
            &self.journal,
            Call::SetArg { kernel: kernel.program, index, size: arg.size() },
        );
        match self.faults.borrow().set_arg {
            Some((i, code)) if i == index => Err(code),
            _ => Ok(()),
        }
    }

    fn share_renderbuffer(&self, _context: &MockContext, renderbuffer: u32) -> std::result::Result<MockMem, StatusCode> {
        record(&self.journal, Call::ShareRenderbuffer(renderbuffer));
        if let Some(code) = self.faults.borrow().share {
            return Err(code);
        }
        Ok(MockMem {
            renderbuffer,
            journal: self.journal.clone(),
        })
    }
}

impl ExecutionQueue for MockQueue {
    type Kernel = MockKernel;
    type Mem = MockMem;
    type Event = MockEvent;

    fn enqueue_acquire_gl_objects(&self, objects: &[&MockMem]) -> StatusCode {
        record(&self.journal, Call::Acquire(objects.len()));
        self.faults.borrow().acquire
    }

    fn enqueue_release_gl_objects(&self, objects: &[&MockMem]) -> StatusCode {
        record(&self.journal, Call::Release(objects.len()));
        self.faults.borrow().release
    }

    fn enqueue_kernel_2d(&self, _kernel: &MockKernel, global: [usize; 2]) -> std::result::Result<MockEvent, StatusCode> {
        record(&self.journal, Call::Dispatch(global));
        match self.faults.borrow().dispatch {
            Some(code) => Err(code),
            None => Ok(MockEvent),
        }
    }

    fn wait(&self, _event: &MockEvent) -> StatusCode {
        record(&self.journal, Call::Wait);
        self.faults.borrow().wait
    }

    fn flush(&self) -> StatusCode {
        record(&self.journal, Call::Flush);
        self.faults.borrow().flush
    }

    fn finish(&self) -> StatusCode {
        record(&self.journal, Call::Finish);
        self.faults.borrow().finish
    }
}

// ── Graphics ──────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockGraphics {
    journal: Journal,
    next_name: Rc<Cell<u32>>,
    /// Status returned by the next render target creations.
    pub target_fault: Rc<Cell<Option<StatusCode>>>,
}

impl MockGraphics {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            next_name: Rc::new(Cell::new(1)),
            target_fault: Rc::new(Cell::new(None)),
        }
    }
}

impl GraphicsApi for MockGraphics {
    type Framebuffer = u32;
    type Renderbuffer = u32;

    fn create_render_target(&self, width: u32, height: u32) -> std::result::Result<(u32, u32), StatusCode> {
        record(&self.journal, Call::CreateTarget { width, height });
        if let Some(code) = self.target_fault.get() {
            return Err(code);
        }
        let name = self.next_name.get();
        self.next_name.set(name + 2);
        Ok((name, name + 1))
    }

    fn renderbuffer_name(&self, renderbuffer: u32) -> u32 {
        renderbuffer
    }

    fn blit_to_default(&self, _source: u32, width: u32, height: u32) {
        record(&self.journal, Call::Blit { width, height });
    }

    fn delete_render_target(&self, _framebuffer: u32, renderbuffer: u32) {
        record(&self.journal, Call::DeleteTarget(renderbuffer));
    }
}

// ── Surface ───────────────────────────────────────────────────────────────

pub struct MockSurface {
    journal: Journal,
    pub size: (u32, u32),
    pub swap_error: Option<String>,
}

impl MockSurface {
    pub fn new(journal: &Journal, width: u32, height: u32) -> Self {
        Self {
            journal: journal.clone(),
            size: (width, height),
            swap_error: None,
        }
    }
}

impl Surface for MockSurface {
    fn framebuffer_size(&self) -> (u32, u32) {
        self.size
    }

    fn interop_properties(&self) -> Result<InteropProperties> {
        Ok(InteropProperties::new().with(0x2008, 1))
    }

    fn show(&self) {
        record(&self.journal, Call::Show);
    }

    fn swap_buffers(&self) -> Result<()> {
        record(&self.journal, Call::Swap);
        match &self.swap_error {
            Some(msg) => Err(Error::Present(msg.clone())),
            None => Ok(()),
        }
    }
}
