use std::fmt;

use crate::render::offscreen::TargetStatus;
use crate::render::shader::ShaderStage;

/// Startup failures of the Voronoi pipeline.
///
/// Every variant is fatal: resources are created up front, so nothing in the
/// steady-state frame loop produces one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum VoronoiError {
    /// Backend or presentation surface unavailable, or below the required
    /// capability level.
    ContextInit(String),
    /// A shader stage failed to parse or validate.
    Compile { stage: ShaderStage, log: String },
    /// The vertex and fragment stages (or the attribute layout) do not agree.
    Link { log: String },
    /// Offscreen attachments rejected by the completeness check.
    TargetIncomplete { status: TargetStatus },
    /// CPU-side buffer allocation failed.
    Allocation { bytes: usize },
    /// Configuration outside the supported range.
    InvalidConfig(String),
    /// Copying a texture back to the CPU failed.
    Readback(String),
}

impl VoronoiError {
    pub(crate) fn context_init(msg: impl Into<String>) -> Self {
        Self::ContextInit(msg.into())
    }

    pub(crate) fn link(msg: impl Into<String>) -> Self {
        Self::Link { log: msg.into() }
    }
}

impl fmt::Display for VoronoiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContextInit(msg) => write!(f, "context initialization failed: {msg}"),
            Self::Compile { stage, log } => write!(f, "{stage} shader failed to compile: {log}"),
            Self::Link { log } => write!(f, "program failed to link: {log}"),
            Self::TargetIncomplete { status } => {
                write!(f, "offscreen target is incomplete ({status})")
            }
            Self::Allocation { bytes } => write!(f, "failed to allocate {bytes} bytes"),
            Self::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
            Self::Readback(msg) => write!(f, "texture readback failed: {msg}"),
        }
    }
}

impl std::error::Error for VoronoiError {}

pub type Result<T> = std::result::Result<T, VoronoiError>;
