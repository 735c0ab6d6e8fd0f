use ember_core::RenderError;
use thiserror::Error;

use crate::surface::SurfaceError;

pub type DomResult<T> = Result<T, DomError>;

#[derive(Debug, Error)]
pub enum DomError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error("hydration mismatch: expected {expected}, found {found}")]
    HydrationMismatch { expected: String, found: String },
    #[error("updates did not settle after {passes} render passes")]
    UpdateDepthExceeded { passes: usize },
    #[error("root is not mounted")]
    NotMounted,
}
