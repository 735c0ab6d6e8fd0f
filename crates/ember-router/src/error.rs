use thiserror::Error;

/// Failures raised by the route-bound components.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouterError {
    #[error("route component is missing its `{0}` prop")]
    MissingProp(&'static str),
}
