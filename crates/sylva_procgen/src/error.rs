use sylva_scene::SceneError;
use thiserror::Error;

/// Failures a generation call can surface.
///
/// Parameter validation errors are raised before any host mutation; a host
/// failure mid-recursion aborts the call and leaves already-created siblings
/// in place.
#[derive(Debug, Error)]
pub enum GenError {
    #[error("invalid dimension: {0}")]
    InvalidDimension(String),
    #[error("animation step must be nonzero")]
    InvalidStep,
    #[error("branch decay must be positive, got {0}")]
    NonTerminatingRecursion(f32),
    #[error("branch recursion exceeded {0} levels")]
    RecursionLimitExceeded(u32),
    #[error("asset `{0}` already exists and could not be replaced")]
    DuplicateAssetName(String),
    #[error("scene host operation failed")]
    HostOperationFailed(#[source] SceneError),
}

impl From<SceneError> for GenError {
    fn from(err: SceneError) -> Self {
        match err {
            SceneError::DuplicateName(name) => GenError::DuplicateAssetName(name),
            other => GenError::HostOperationFailed(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, GenError>;
