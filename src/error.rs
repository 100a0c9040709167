//! Error types for component creation and teardown.

use crate::types::ComponentType;

/// Errors surfaced by factories, handles and the reference view pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkerError {
    /// The injector could not resolve a required dependency.
    #[error("No provider for {token}")]
    MissingDependency { token: String },

    /// A view factory or host-view materialization failed.
    #[error("Component construction failed: {0}")]
    Construction(String),

    /// A handle was used after its component was destroyed.
    #[error("Component {component} has already been destroyed")]
    UseAfterDestroy { component: ComponentType },

    /// The component instance is not of the requested type.
    #[error("Component instance is not a {expected}")]
    InstanceType { expected: &'static str },

    /// A view was still dirty after change detection ran.
    #[error("View {view} changed after it was checked")]
    ExpressionChanged { view: String },
}

impl LinkerError {
    pub fn construction(message: impl Into<String>) -> Self {
        LinkerError::Construction(message.into())
    }
}

pub type Result<T> = std::result::Result<T, LinkerError>;
