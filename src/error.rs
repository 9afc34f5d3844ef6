use thiserror::Error;

/// Top-level error type for the CAM geometry kernel.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Errors related to raw geometric computation (construction, evaluation).
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    ParameterOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,

    #[error("invalid knot vector: {0}")]
    InvalidKnotVector(String),
}

/// Contract violations: shape-kind mismatches, malformed chains, bad inputs.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("chain is not closed")]
    ChainNotClosed(),

    #[error("chain has fewer than one shape")]
    EmptyChain(),
}

/// Non-fatal and fatal errors raised while running a multi-stage pipeline
/// (chain offset). Numerical degeneracies in the intersection dispatcher are
/// deliberately *not* represented here — per the dispatcher's contract it
/// never raises, it returns an empty candidate list instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("extension failed for shape: {0}")]
    ExtensionFailed(String),

    #[error("offset pipeline failed: {0}")]
    Failed(String),

    #[error("maximum iterations ({0}) exceeded")]
    MaxIterationsExceeded(usize),
}

/// Convenience alias for results using [`KernelError`].
pub type Result<T> = std::result::Result<T, KernelError>;
