//! Kernel program compilation and the active kernel.

use crate::compute::{ComputeRuntime, KernelArg};
use crate::error::{Error, Result};

/// Entry point every kernel source must define.
pub const ENTRY_POINT: &str = "render";

/// Argument slot of the shared output target.
pub const TARGET_ARG: u32 = 0;

/// Argument slot of the `(width, height)` frame size (`int2`).
pub const FRAME_SIZE_ARG: u32 = 1;

/// Every program built during a session, plus the kernel of the newest
/// successful build.
///
/// Programs are retained until the set is dropped, including ones whose
/// build failed.
pub struct ProgramSet<R: ComputeRuntime> {
    // Declared first: the kernel is released before the programs.
    kernel: Option<R::Kernel>,
    programs: Vec<R::Program>,
}

impl<R: ComputeRuntime> ProgramSet<R> {
    pub fn new() -> Self {
        Self {
            kernel: None,
            programs: Vec::new(),
        }
    }

    /// Compiles `source` for `device` and makes its [`ENTRY_POINT`] the active
    /// kernel.
    ///
    /// On a build failure the device's build log is embedded in the error and
    /// the previously active kernel, if any, stays active.
    pub fn build(
        &mut self,
        runtime: &R,
        context: &R::Context,
        device: &R::Device,
        source: &str,
        options: &str,
    ) -> Result<&R::Kernel> {
        self.build_then(runtime, context, device, source, options, |_| Ok(()))
    }

    /// Like [`build`](Self::build), but runs `prepare` on the new kernel
    /// before it becomes active.
    ///
    /// If `prepare` fails the new kernel is released and the previous one
    /// stays active. The program is retained either way.
    pub fn build_then<F>(
        &mut self,
        runtime: &R,
        context: &R::Context,
        device: &R::Device,
        source: &str,
        options: &str,
        prepare: F,
    ) -> Result<&R::Kernel>
    where
        F: FnOnce(&R::Kernel) -> Result<()>,
    {
        let mut program = runtime
            .create_program(context, source)
            .map_err(|code| Error::ProgramCreationFailed { code })?;

        log::debug!("building program #{} (options: {options:?})", self.programs.len() + 1);
        let built = runtime.build_program(&mut program, device, options);

        self.programs.push(program);
        let program = &self.programs[self.programs.len() - 1];

        if let Err(code) = built {
            let log = match runtime.build_log(program, device) {
                Ok(log) => log,
                Err(log_code) => format!("<build log unavailable (code {log_code})>"),
            };
            log::error!("kernel build failed (code {code}):\n{log}");
            return Err(Error::BuildFailed { code, log });
        }

        let kernel = runtime
            .create_kernel(program, ENTRY_POINT)
            .map_err(|code| Error::KernelCreationFailed {
                name: ENTRY_POINT.to_string(),
                code,
            })?;

        prepare(&kernel)?;

        Ok(self.kernel.insert(kernel))
    }

    /// The active kernel, if any build succeeded.
    pub fn kernel(&self) -> Option<&R::Kernel> {
        self.kernel.as_ref()
    }

    pub fn active_kernel(&self) -> Result<&R::Kernel> {
        self.kernel.as_ref().ok_or(Error::KernelNotReady)
    }

    /// Binds one argument of the active kernel.
    pub fn set_arg(&self, runtime: &R, index: u32, arg: KernelArg<'_, R::Mem>) -> Result<()> {
        let kernel = self.active_kernel()?;
        runtime
            .set_kernel_arg(kernel, index, arg)
            .map_err(|code| Error::ArgumentBindFailed { index, code })
    }

    /// Number of programs retained, successful or not.
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

impl<R: ComputeRuntime> Default for ProgramSet<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{select_device, LastEnumerated};
    use crate::mock::{Call, Handle, MockContext, MockDevice, MockRuntime};

    const GOOD: &str = "__kernel void render(__write_only image2d_t out, int2 size) {}";

    fn setup() -> (MockRuntime, MockContext, MockDevice) {
        let rt = MockRuntime::single_gpu();
        let device = select_device(&rt, &LastEnumerated).unwrap().handle().clone();
        let ctx = rt
            .create_context(&device, &Default::default())
            .ok()
            .unwrap();
        (rt, ctx, device)
    }

    #[test]
    fn set_arg_before_build_is_not_ready() {
        let (rt, _ctx, _dev) = setup();
        let set: ProgramSet<MockRuntime> = ProgramSet::new();

        let err = set.set_arg(&rt, 2, KernelArg::value(&1.0f32)).err().unwrap();
        assert!(matches!(err, Error::KernelNotReady));
        assert!(!rt.journal().iter().any(|c| matches!(c, Call::SetArg { .. })));

        // Still usable afterwards.
        assert!(set.kernel().is_none());
        assert!(set.is_empty());
    }

    #[test]
    fn build_passes_options_and_activates_kernel() {
        let (rt, ctx, dev) = setup();
        let mut set = ProgramSet::new();

        let kernel = set.build(&rt, &ctx, &dev, GOOD, "-cl-fast-relaxed-math").ok().unwrap();
        assert_eq!(kernel.program, 0);
        assert!(rt.journal().contains(&Call::BuildProgram {
            program: 0,
            options: "-cl-fast-relaxed-math".into(),
        }));
        assert!(set.set_arg(&rt, 2, KernelArg::Local(256)).is_ok());
    }

    #[test]
    fn build_failure_carries_log_per_source() {
        let (rt, ctx, dev) = setup();
        let mut set = ProgramSet::new();

        let first = set
            .build(&rt, &ctx, &dev, "#error missing semicolon", "")
            .err()
            .unwrap();
        let second = set
            .build(&rt, &ctx, &dev, "void f() {}\n#error unknown type", "")
            .err()
            .unwrap();

        let (Error::BuildFailed { log: log1, .. }, Error::BuildFailed { log: log2, .. }) = (&first, &second)
        else {
            panic!("expected build failures, got {first} / {second}");
        };
        assert!(!log1.is_empty());
        assert_ne!(log1, log2);
        assert!(first.to_string().contains("missing semicolon"));
        assert!(second.to_string().contains("unknown type"));

        assert!(rt.journal().contains(&Call::BuildLog(0)));
        assert!(rt.journal().contains(&Call::BuildLog(1)));
        // Failed programs stay allocated.
        assert_eq!(set.len(), 2);
        assert!(set.kernel().is_none());
    }

    #[test]
    fn failed_rebuild_keeps_previous_kernel() {
        let (rt, ctx, dev) = setup();
        let mut set = ProgramSet::new();

        set.build(&rt, &ctx, &dev, GOOD, "").ok().unwrap();
        assert!(set.build(&rt, &ctx, &dev, "#error", "").is_err());
        assert_eq!(set.kernel().map(|k| k.program), Some(0));
    }

    #[test]
    fn rebuild_replaces_kernel_but_keeps_program() {
        let (rt, ctx, dev) = setup();
        let mut set = ProgramSet::new();

        set.build(&rt, &ctx, &dev, GOOD, "").ok().unwrap();
        set.build(&rt, &ctx, &dev, GOOD, "").ok().unwrap();

        assert_eq!(set.kernel().map(|k| k.program), Some(1));
        let journal = rt.journal();
        assert!(journal.contains(&Call::Released(Handle::Kernel(0))));
        assert!(!journal.contains(&Call::Released(Handle::Program(0))));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn missing_entry_point() {
        let (rt, ctx, dev) = setup();
        let mut set = ProgramSet::new();

        let err = set
            .build(&rt, &ctx, &dev, "__kernel void draw() {}", "")
            .err()
            .unwrap();
        assert!(matches!(err, Error::KernelCreationFailed { code: -46, .. }));
    }

    #[test]
    fn bind_failure_reports_index_and_code() {
        let (rt, ctx, dev) = setup();
        let mut set = ProgramSet::new();
        set.build(&rt, &ctx, &dev, GOOD, "").ok().unwrap();
        rt.faults().set_arg = Some((3, -51));

        let err = set.set_arg(&rt, 3, KernelArg::value(&7u32)).err().unwrap();
        assert!(matches!(err, Error::ArgumentBindFailed { index: 3, code: -51 }));
    }

    #[test]
    fn failed_prepare_keeps_previous_kernel() {
        let (rt, ctx, dev) = setup();
        let mut set = ProgramSet::new();
        set.build(&rt, &ctx, &dev, GOOD, "").ok().unwrap();

        let err = set
            .build_then(&rt, &ctx, &dev, GOOD, "", |_| Err(Error::KernelNotReady))
            .err()
            .unwrap();
        assert!(matches!(err, Error::KernelNotReady));

        assert_eq!(set.kernel().map(|k| k.program), Some(0));
        assert_eq!(set.len(), 2);
        let journal = rt.journal();
        assert!(journal.contains(&Call::Released(Handle::Kernel(1))));
        assert!(!journal.contains(&Call::Released(Handle::Kernel(0))));
    }
}
