// Typed errors for precondition violations.
//
// Fatal platform-call failures travel as anyhow errors with context attached
// at the failing call site; the variants here exist so callers and tests can
// name the specific contract that was broken.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    /// A mesh needs at least three vertices to form a triangle.
    #[error("mesh requires at least 3 vertices, got {count}")]
    InsufficientVertices { count: usize },

    /// Pipeline construction was attempted without a required handle.
    #[error("cannot create graphics pipeline: no {missing} provided")]
    IncompletePipelineConfig { missing: &'static str },

    /// None of the candidate depth formats is supported by the device.
    #[error("no supported depth format among the preferred candidates")]
    NoSupportedDepthFormat,

    /// The surface reports no formats or present modes.
    #[error("surface is unusable: {reason}")]
    UnusableSurface { reason: &'static str },
}
