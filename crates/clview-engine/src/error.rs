use std::fmt;

/// Raw status code reported by the compute runtime. `0` means success.
pub type StatusCode = i32;

/// Errors raised while setting up or mutating a session.
///
/// Per-frame diagnostics are not errors; see [`FrameCode`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("no OpenCL platform with version 2 or 3 available")]
    NoCompatiblePlatform,

    #[error("no GPU device for the platform {platform}")]
    NoCompatibleDevice { platform: String },

    #[error("failed to query the compute runtime (code {code})")]
    PlatformQuery { code: StatusCode },

    #[error("error while creating context (code {code})")]
    ContextCreationFailed { code: StatusCode },

    #[error("error while creating command queue (code {code})")]
    QueueCreationFailed { code: StatusCode },

    #[error("error while creating program (code {code})")]
    ProgramCreationFailed { code: StatusCode },

    /// `log` holds the compiler output of every device the build ran on.
    #[error("error while building (code {code}):\n{log}")]
    BuildFailed { code: StatusCode, log: String },

    #[error("error while creating kernel `{name}` (code {code})")]
    KernelCreationFailed { name: String, code: StatusCode },

    #[error("no kernel available: build program code before setting kernel arguments")]
    KernelNotReady,

    #[error("error while setting kernel arg {index} (code {code})")]
    ArgumentBindFailed { index: u32, code: StatusCode },

    #[error("error while creating shared render buffer (code {code})")]
    SharedTargetCreationFailed { code: StatusCode },

    #[error("window error: {0}")]
    Window(String),

    #[error("GL context cannot be shared with the compute runtime: {0}")]
    InteropUnavailable(String),

    #[error("failed to present frame: {0}")]
    Present(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Combined status of one rendered frame.
///
/// Every step of the frame ORs its status code into this value; the frame is
/// always completed, and the caller decides whether to keep going.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct FrameCode(pub StatusCode);

impl FrameCode {
    pub const OK: FrameCode = FrameCode(0);

    pub fn is_ok(self) -> bool {
        self.0 == 0
    }

    pub fn code(self) -> StatusCode {
        self.0
    }

    /// Folds a step status into the frame status.
    pub(crate) fn accumulate(&mut self, code: StatusCode) {
        self.0 |= code;
    }
}

impl fmt::Display for FrameCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame status {}", self.0)
    }
}
