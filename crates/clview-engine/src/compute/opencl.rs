//! OpenCL implementation of the compute seams.
//!
//! Context, queue, program and kernel handles come from `opencl3` and release
//! themselves on drop. GL sharing entry points are called through `cl3`.

use std::ffi::c_void;
use std::ptr;

use opencl3::command_queue::CommandQueue;
use opencl3::context::Context;
use opencl3::device::{Device, CL_DEVICE_TYPE_GPU};
use opencl3::error_codes::ClError;
use opencl3::event::Event;
use opencl3::kernel::Kernel;
use opencl3::memory::CL_MEM_WRITE_ONLY;
use opencl3::platform::{get_platforms, Platform};
use opencl3::program::Program;
use opencl3::types::{cl_context_properties, cl_mem, cl_uint};

use crate::error::StatusCode;

use super::{ComputeRuntime, DeviceInfo, ExecutionQueue, InteropProperties, KernelArg};

const CL_CONTEXT_PLATFORM: cl_context_properties = 0x1084;
const CL_DEVICE_NOT_FOUND: StatusCode = -1;

fn code(err: ClError) -> StatusCode {
    err.0
}

fn status(result: Result<(), ClError>) -> StatusCode {
    result.err().map_or(0, code)
}

/// The system OpenCL runtime (ICD loader).
#[derive(Debug, Copy, Clone, Default)]
pub struct OpenCl;

/// Reference-counted OpenCL memory object.
#[derive(Debug)]
pub struct MemObject {
    raw: cl_mem,
}

impl MemObject {
    /// Wraps `raw`, taking an additional reference; the caller keeps its own.
    ///
    /// # Safety
    /// `raw` must be a valid memory object.
    pub unsafe fn retain(raw: cl_mem) -> Result<Self, StatusCode> {
        unsafe { cl3::memory::retain_mem_object(raw)? };
        Ok(Self { raw })
    }

    pub fn get(&self) -> cl_mem {
        self.raw
    }
}

impl Drop for MemObject {
    fn drop(&mut self) {
        if let Err(code) = unsafe { cl3::memory::release_mem_object(self.raw) } {
            log::warn!("failed to release memory object (code {code})");
        }
    }
}

impl ComputeRuntime for OpenCl {
    type Platform = Platform;
    type Device = Device;
    type Context = Context;
    type Queue = ClQueue;
    type Program = Program;
    type Kernel = Kernel;
    type Mem = MemObject;

    fn platforms(&self) -> Result<Vec<Platform>, StatusCode> {
        get_platforms().map_err(code)
    }

    fn platform_version(&self, platform: &Platform) -> Result<String, StatusCode> {
        platform.version().map_err(code)
    }

    fn gpu_devices(&self, platform: &Platform) -> Result<Vec<Device>, StatusCode> {
        match platform.get_devices(CL_DEVICE_TYPE_GPU) {
            Ok(ids) => Ok(ids.into_iter().map(Device::new).collect()),
            Err(ClError(CL_DEVICE_NOT_FOUND)) => Ok(Vec::new()),
            Err(e) => Err(code(e)),
        }
    }

    fn device_info(&self, device: &Device) -> Result<DeviceInfo, StatusCode> {
        Ok(DeviceInfo {
            name: device.name().map_err(code)?,
            extensions: device.extensions().map_err(code)?,
        })
    }

    fn create_context(
        &self,
        device: &Device,
        properties: &InteropProperties,
    ) -> Result<Context, StatusCode> {
        let platform = device.platform().map_err(code)?;
        let list = properties.to_terminated_list(&[(CL_CONTEXT_PLATFORM, platform as cl_context_properties)]);
        Context::from_devices(&[device.id()], &list, None, ptr::null_mut()).map_err(code)
    }

    fn create_queue(&self, context: &Context, device: &Device) -> Result<ClQueue, StatusCode> {
        let queue = unsafe { CommandQueue::create_with_properties(context, device.id(), 0, 0) }
            .map_err(code)?;
        Ok(ClQueue { queue })
    }

    fn create_program(&self, context: &Context, source: &str) -> Result<Program, StatusCode> {
        Program::create_from_source(context, source).map_err(code)
    }

    fn build_program(&self, program: &mut Program, device: &Device, options: &str) -> Result<(), StatusCode> {
        program.build(&[device.id()], options).map_err(code)
    }

    fn build_log(&self, program: &Program, device: &Device) -> Result<String, StatusCode> {
        program.get_build_log(device.id()).map_err(code)
    }

    fn create_kernel(&self, program: &Program, name: &str) -> Result<Kernel, StatusCode> {
        Kernel::create(program, name).map_err(code)
    }

    fn set_kernel_arg(
        &self,
        kernel: &Kernel,
        index: u32,
        arg: KernelArg<'_, MemObject>,
    ) -> Result<(), StatusCode> {
        let size = arg.size();
        let value: *const c_void = match &arg {
            KernelArg::Value(bytes) => bytes.as_ptr().cast(),
            KernelArg::Local(_) => ptr::null(),
            KernelArg::Mem(mem) => (&mem.raw as *const cl_mem).cast(),
        };
        unsafe { cl3::kernel::set_kernel_arg(kernel.get(), index as cl_uint, size, value) }
    }

    fn share_renderbuffer(&self, context: &Context, renderbuffer: u32) -> Result<MemObject, StatusCode> {
        let raw = unsafe {
            cl3::gl::create_from_gl_render_buffer(context.get(), CL_MEM_WRITE_ONLY, renderbuffer)
        }?;
        Ok(MemObject { raw })
    }
}

/// In-order OpenCL command queue.
pub struct ClQueue {
    queue: CommandQueue,
}

impl ClQueue {
    pub fn get(&self) -> &CommandQueue {
        &self.queue
    }

    fn gl_objects(objects: &[&MemObject]) -> Vec<cl_mem> {
        objects.iter().map(|m| m.raw).collect()
    }
}

impl ExecutionQueue for ClQueue {
    type Kernel = Kernel;
    type Mem = MemObject;
    type Event = Event;

    fn enqueue_acquire_gl_objects(&self, objects: &[&MemObject]) -> StatusCode {
        let raw = Self::gl_objects(objects);
        let result = unsafe {
            cl3::gl::enqueue_acquire_gl_objects(
                self.queue.get(),
                raw.len() as cl_uint,
                raw.as_ptr(),
                0,
                ptr::null(),
            )
        };
        match result {
            Ok(event) => {
                drop(Event::new(event));
                0
            }
            Err(code) => code,
        }
    }

    fn enqueue_release_gl_objects(&self, objects: &[&MemObject]) -> StatusCode {
        let raw = Self::gl_objects(objects);
        let result = unsafe {
            cl3::gl::enqueue_release_gl_objects(
                self.queue.get(),
                raw.len() as cl_uint,
                raw.as_ptr(),
                0,
                ptr::null(),
            )
        };
        match result {
            Ok(event) => {
                drop(Event::new(event));
                0
            }
            Err(code) => code,
        }
    }

    fn enqueue_kernel_2d(&self, kernel: &Kernel, global: [usize; 2]) -> Result<Event, StatusCode> {
        unsafe {
            self.queue.enqueue_nd_range_kernel(
                kernel.get(),
                2,
                ptr::null(),
                global.as_ptr(),
                ptr::null(),
                &[],
            )
        }
        .map_err(code)
    }

    fn wait(&self, event: &Event) -> StatusCode {
        status(event.wait())
    }

    fn flush(&self) -> StatusCode {
        status(self.queue.flush())
    }

    fn finish(&self) -> StatusCode {
        status(self.queue.finish())
    }
}
