use std::rc::Rc;

use glow::HasContext;

use crate::error::StatusCode;

use super::GraphicsApi;

/// `glow` implementation of [`GraphicsApi`].
///
/// Must only be used while its GL context is current on the calling thread.
#[derive(Clone)]
pub struct GlGraphics {
    gl: Rc<glow::Context>,
}

impl GlGraphics {
    pub fn new(gl: glow::Context) -> Self {
        Self { gl: Rc::new(gl) }
    }

    /// Raw `glow` context for callers issuing their own GL commands.
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }
}

impl GraphicsApi for GlGraphics {
    type Framebuffer = glow::NativeFramebuffer;
    type Renderbuffer = glow::NativeRenderbuffer;

    fn create_render_target(
        &self,
        width: u32,
        height: u32,
    ) -> Result<(glow::NativeFramebuffer, glow::NativeRenderbuffer), StatusCode> {
        let gl = &*self.gl;
        let (w, h) = (gl_extent(width), gl_extent(height));

        unsafe {
            let framebuffer = gl.create_framebuffer().map_err(|e| gl_failure(gl, &e))?;
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(framebuffer));

            let renderbuffer = match gl.create_renderbuffer() {
                Ok(rb) => rb,
                Err(e) => {
                    let code = gl_failure(gl, &e);
                    gl.bind_framebuffer(glow::FRAMEBUFFER, None);
                    gl.delete_framebuffer(framebuffer);
                    return Err(code);
                }
            };
            gl.bind_renderbuffer(glow::RENDERBUFFER, Some(renderbuffer));

            // 32-bit float channels: kernels accumulate beyond 8-bit display depth.
            gl.renderbuffer_storage(glow::RENDERBUFFER, glow::RGBA32F, w, h);
            gl.framebuffer_renderbuffer(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0,
                glow::RENDERBUFFER,
                Some(renderbuffer),
            );

            let status = gl.check_framebuffer_status(glow::FRAMEBUFFER);

            gl.bind_renderbuffer(glow::RENDERBUFFER, None);
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
            gl.clear_color(0.0, 0.0, 0.0, 1.0);

            if status != glow::FRAMEBUFFER_COMPLETE {
                gl.delete_framebuffer(framebuffer);
                gl.delete_renderbuffer(renderbuffer);
                log::error!("framebuffer incomplete (status {status:#x})");
                return Err(status as StatusCode);
            }

            Ok((framebuffer, renderbuffer))
        }
    }

    fn renderbuffer_name(&self, renderbuffer: glow::NativeRenderbuffer) -> u32 {
        renderbuffer.0.get()
    }

    fn blit_to_default(&self, source: glow::NativeFramebuffer, width: u32, height: u32) {
        let gl = &*self.gl;
        let (w, h) = (gl_extent(width), gl_extent(height));

        unsafe {
            gl.bind_framebuffer(glow::DRAW_FRAMEBUFFER, None);
            gl.draw_buffer(glow::BACK);
            gl.clear(glow::COLOR_BUFFER_BIT);
            gl.finish();

            gl.bind_framebuffer(glow::READ_FRAMEBUFFER, Some(source));
            gl.read_buffer(glow::COLOR_ATTACHMENT0);

            gl.blit_framebuffer(
                0,
                0,
                w,
                h,
                0,
                0,
                w,
                h,
                glow::COLOR_BUFFER_BIT,
                glow::NEAREST,
            );
        }
    }

    fn delete_render_target(
        &self,
        framebuffer: glow::NativeFramebuffer,
        renderbuffer: glow::NativeRenderbuffer,
    ) {
        unsafe {
            self.gl.delete_framebuffer(framebuffer);
            self.gl.delete_renderbuffer(renderbuffer);
        }
    }
}

/// Logs a failed GL allocation and returns the pending GL error.
unsafe fn gl_failure(gl: &glow::Context, message: &str) -> StatusCode {
    let error = unsafe { gl.get_error() };
    log::error!("GL allocation failed (error {error:#x}): {message}");
    if error == glow::NO_ERROR {
        glow::OUT_OF_MEMORY as StatusCode
    } else {
        error as StatusCode
    }
}

fn gl_extent(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}
