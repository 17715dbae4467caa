//! Session ownership hierarchy and the per-frame protocol.
//!
//! A [`Session`] owns every compute and GL object of the window. Fields are
//! declared in teardown order, so dropping a session releases the shared
//! target, then the kernel and programs, then the queue, and the context last.

use crate::compute::{ComputeRuntime, ExecutionQueue, KernelArg};
use crate::device::{select_device, ComputeDevice, SelectionPolicy};
use crate::error::{Error, FrameCode, Result};
use crate::graphics::GraphicsApi;
use crate::interop::create_interop_context;
use crate::program::ProgramSet;
use crate::surface::Surface;
use crate::target::{create_shared_target, SharedTarget};

/// Position of the session within the frame protocol.
///
/// `render` walks `Idle → Acquired → Dispatched → Released`; `present`
/// moves to `Presented`. The shared target belongs to compute only between
/// `Acquired` and `Released`.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum FrameStage {
    #[default]
    Idle,
    Acquired,
    Dispatched,
    Released,
    Presented,
}

pub struct Session<R, G, S>
where
    R: ComputeRuntime,
    G: GraphicsApi,
    S: Surface,
{
    target: Option<SharedTarget<R::Mem, G>>,
    programs: ProgramSet<R>,
    queue: R::Queue,
    context: R::Context,
    device: ComputeDevice<R>,
    runtime: R,
    graphics: G,
    surface: S,
    stage: FrameStage,
    /// Set when creating the shared target failed; it is never retried.
    target_failure: Option<Error>,
}

impl<R, G, S> Session<R, G, S>
where
    R: ComputeRuntime,
    G: GraphicsApi,
    S: Surface,
{
    /// Selects a device and creates the interop context and queue.
    ///
    /// `surface`'s GL context must be current on the calling thread.
    pub fn new(runtime: R, graphics: G, surface: S, policy: &dyn SelectionPolicy) -> Result<Self> {
        let device = select_device(&runtime, policy)?;
        let (context, queue) = create_interop_context(&runtime, &device, &surface)?;

        Ok(Self {
            target: None,
            programs: ProgramSet::new(),
            queue,
            context,
            device,
            runtime,
            graphics,
            surface,
            stage: FrameStage::Idle,
            target_failure: None,
        })
    }

    /// Builds `source` and makes its `render` kernel active.
    ///
    /// If the shared target already exists it is bound to the new kernel
    /// first; when that fails the previous kernel stays active.
    pub fn set_program_code(&mut self, source: &str, options: &str) -> Result<()> {
        let runtime = &self.runtime;
        let target = self.target.as_ref();
        self.programs.build_then(
            runtime,
            &self.context,
            self.device.handle(),
            source,
            options,
            |kernel| match target {
                Some(target) => target.bind(runtime, kernel),
                None => Ok(()),
            },
        )?;
        Ok(())
    }

    /// Sets a caller-owned argument slot (index 2 and up) on the active kernel.
    pub fn set_kernel_arg(&self, index: u32, arg: KernelArg<'_, R::Mem>) -> Result<()> {
        self.programs.set_arg(&self.runtime, index, arg)
    }

    /// Makes the surface visible, then renders and presents the first frame.
    pub fn show(&mut self) -> Result<FrameCode> {
        self.surface.show();
        let code = self.render()?;
        self.present()?;
        Ok(code)
    }

    /// Runs the compute half of one frame.
    ///
    /// Creates the shared target on first use. Step failures do not abort
    /// the frame; their codes are ORed into the returned [`FrameCode`].
    pub fn render(&mut self) -> Result<FrameCode> {
        self.ensure_target()?;
        let kernel = self.programs.active_kernel()?;
        let Some(target) = self.target.as_ref() else {
            unreachable!("shared target exists after ensure_target");
        };

        let queue = &self.queue;
        let objects = target.shared_objects();
        let mut code = FrameCode::OK;
        self.stage = FrameStage::Idle;

        // GL must have let go of the target before compute touches it.
        code.accumulate(queue.enqueue_acquire_gl_objects(&objects));
        code.accumulate(queue.finish());
        self.stage = FrameStage::Acquired;

        match queue.enqueue_kernel_2d(kernel, target.global_size()) {
            Ok(event) => code.accumulate(queue.wait(&event)),
            Err(status) => code.accumulate(status),
        }
        self.stage = FrameStage::Dispatched;

        // Kernel writes must be visible before GL reads.
        code.accumulate(queue.enqueue_release_gl_objects(&objects));
        code.accumulate(queue.flush());
        code.accumulate(queue.finish());
        self.stage = FrameStage::Released;

        if !code.is_ok() {
            log::trace!("frame completed with {code}");
        }
        Ok(code)
    }

    /// Blits the shared target onto the default framebuffer and swaps.
    pub fn present(&mut self) -> Result<()> {
        if let Some(target) = &self.target {
            let (w, h) = target.extent();
            self.graphics.blit_to_default(target.framebuffer(), w, h);
        }
        self.surface.swap_buffers()?;
        self.stage = FrameStage::Presented;
        Ok(())
    }

    fn ensure_target(&mut self) -> Result<()> {
        if self.target.is_some() {
            return Ok(());
        }
        if let Some(err) = &self.target_failure {
            return Err(err.clone());
        }

        let kernel = self.programs.active_kernel()?;
        match create_shared_target(
            &self.runtime,
            &self.graphics,
            &self.context,
            kernel,
            self.surface.framebuffer_size(),
        ) {
            Ok(target) => {
                self.target = Some(target);
                Ok(())
            }
            Err(err) => {
                log::error!("{err}");
                self.target_failure = Some(err.clone());
                Err(err)
            }
        }
    }

    pub fn stage(&self) -> FrameStage {
        self.stage
    }

    /// Extent of the shared target, once created.
    pub fn target_extent(&self) -> Option<(u32, u32)> {
        self.target.as_ref().map(|t| t.extent())
    }

    pub fn kernel(&self) -> Option<&R::Kernel> {
        self.programs.kernel()
    }

    pub fn context(&self) -> &R::Context {
        &self.context
    }

    pub fn queue(&self) -> &R::Queue {
        &self.queue
    }

    pub fn device(&self) -> &ComputeDevice<R> {
        &self.device
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn graphics(&self) -> &G {
        &self.graphics
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Number of programs built so far, including failed builds.
    pub fn program_count(&self) -> usize {
        self.programs.len()
    }
}

impl<R, G, S> Drop for Session<R, G, S>
where
    R: ComputeRuntime,
    G: GraphicsApi,
    S: Surface,
{
    fn drop(&mut self) {
        log::debug!(
            "tearing down session ({} programs, target: {})",
            self.programs.len(),
            self.target.is_some()
        );
    }
}
