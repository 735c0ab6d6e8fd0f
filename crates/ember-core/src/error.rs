use thiserror::Error;

pub type RenderResult<T> = Result<T, RenderError>;

/// Failures raised while walking or rendering a node tree.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid hook call: `{hook}` can only be called while a component is rendering")]
    InvalidHookCall { hook: &'static str },
    #[error("hook slot {index} of `{component}` changed between renders; expected {expected}")]
    HookOrderMismatch {
        component: &'static str,
        index: usize,
        expected: &'static str,
    },
    #[error("unsupported node kind: {0}")]
    UnsupportedNodeKind(String),
    #[error(transparent)]
    Custom(Box<dyn std::error::Error + 'static>),
}

impl RenderError {
    /// Wraps an application error raised from inside a component.
    pub fn custom(error: impl Into<Box<dyn std::error::Error + 'static>>) -> Self {
        RenderError::Custom(error.into())
    }
}
