/// Observable state of the shader pipeline.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStatus {
    #[default]
    Unloaded,
    Ready,
    /// Last compile or link attempt failed. Drawing is suppressed.
    Failed,
}

/// Background shown while the shader is broken.
pub const SENTINEL_CLEAR_COLOR: [f64; 4] = [1.0, 0.0, 0.0, 1.0];
pub const NEUTRAL_CLEAR_COLOR: [f64; 4] = [0.0, 0.0, 0.0, 0.0];

impl PipelineStatus {
    pub fn clear_color(self) -> [f64; 4] {
        match self {
            Self::Failed => SENTINEL_CLEAR_COLOR,
            Self::Unloaded | Self::Ready => NEUTRAL_CLEAR_COLOR,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Unloaded => "unloaded",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// How the process ends. Fatal startup errors and the quit command are both
/// abnormal but report different codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Normal,
    Fatal,
    ForcedQuit,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::Fatal => 1,
            Self::ForcedQuit => 2,
        }
    }
}

impl From<ExitStatus> for std::process::ExitCode {
    fn from(status: ExitStatus) -> Self {
        std::process::ExitCode::from(status.code())
    }
}
