use ember_core::RenderError;
use thiserror::Error;

pub type SsrResult<T> = Result<T, SsrError>;

#[derive(Debug, Error)]
pub enum SsrError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("failed to encode or decode the initial state: {0}")]
    Json(#[from] serde_json::Error),
    #[error("server props loader for `{page}` failed: {source}")]
    Loader {
        page: String,
        source: Box<dyn std::error::Error + 'static>,
    },
}
