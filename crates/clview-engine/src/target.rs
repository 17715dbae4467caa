//! The framebuffer shared between the compute kernel and GL.

use std::mem::ManuallyDrop;

use crate::compute::{ComputeRuntime, KernelArg};
use crate::error::{Error, Result};
use crate::graphics::GraphicsApi;
use crate::program::{FRAME_SIZE_ARG, TARGET_ARG};

/// One GPU allocation with two identities: a GL renderbuffer attached to an
/// off-screen framebuffer, and a write-only compute memory object.
///
/// Sized once at creation; later window resizes are not reflected.
pub struct SharedTarget<M, G: GraphicsApi> {
    /// Released before the GL objects it wraps.
    mem: ManuallyDrop<M>,
    framebuffer: G::Framebuffer,
    renderbuffer: G::Renderbuffer,
    width: u32,
    height: u32,
    graphics: G,
}

impl<M, G: GraphicsApi> SharedTarget<M, G> {
    /// Objects handed over by the acquire/release protocol.
    pub fn shared_objects(&self) -> [&M; 1] {
        [&*self.mem]
    }

    pub fn framebuffer(&self) -> G::Framebuffer {
        self.framebuffer
    }

    pub fn extent(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Kernel index space covering every pixel.
    pub fn global_size(&self) -> [usize; 2] {
        [self.width as usize, self.height as usize]
    }

    /// Binds the target and the frame size to `kernel`'s reserved slots.
    pub fn bind<R>(&self, runtime: &R, kernel: &R::Kernel) -> Result<()>
    where
        R: ComputeRuntime<Mem = M>,
    {
        runtime
            .set_kernel_arg(kernel, TARGET_ARG, KernelArg::Mem(&*self.mem))
            .map_err(|code| Error::ArgumentBindFailed { index: TARGET_ARG, code })?;

        let size = [gl_int(self.width), gl_int(self.height)];
        runtime
            .set_kernel_arg(kernel, FRAME_SIZE_ARG, KernelArg::value(&size))
            .map_err(|code| Error::ArgumentBindFailed { index: FRAME_SIZE_ARG, code })
    }
}

impl<M, G: GraphicsApi> Drop for SharedTarget<M, G> {
    fn drop(&mut self) {
        // SAFETY: `mem` is never touched again after this point.
        unsafe { ManuallyDrop::drop(&mut self.mem) };
        self.graphics
            .delete_render_target(self.framebuffer, self.renderbuffer);
    }
}

/// Creates the shared target at `extent` and binds it to `kernel`.
pub fn create_shared_target<R, G>(
    runtime: &R,
    graphics: &G,
    context: &R::Context,
    kernel: &R::Kernel,
    extent: (u32, u32),
) -> Result<SharedTarget<R::Mem, G>>
where
    R: ComputeRuntime,
    G: GraphicsApi,
{
    let (width, height) = (extent.0.max(1), extent.1.max(1));
    let (framebuffer, renderbuffer) = graphics
        .create_render_target(width, height)
        .map_err(|code| Error::SharedTargetCreationFailed { code })?;

    let mem = match runtime.share_renderbuffer(context, graphics.renderbuffer_name(renderbuffer)) {
        Ok(mem) => mem,
        Err(code) => {
            graphics.delete_render_target(framebuffer, renderbuffer);
            return Err(Error::SharedTargetCreationFailed { code });
        }
    };

    let target = SharedTarget {
        mem: ManuallyDrop::new(mem),
        framebuffer,
        renderbuffer,
        width,
        height,
        graphics: graphics.clone(),
    };
    target.bind(runtime, kernel)?;

    log::info!("shared render target created ({width}x{height}, RGBA32F)");
    Ok(target)
}

fn gl_int(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}
