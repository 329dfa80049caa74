/// Convenience result type used across facelift.
pub type FaceliftResult<T> = Result<T, FaceliftError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Tracking loss is not represented here: it is a visibility state, not a failure.
#[derive(thiserror::Error, Debug)]
pub enum FaceliftError {
    /// The platform lacks a capability required at startup (capture device, encoder).
    #[error("unsupported environment: {0}")]
    UnsupportedEnvironment(String),

    /// The user declined camera access.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Overlay assets (mesh topology, texture) could not be loaded.
    #[error("asset load error: {0}")]
    AssetLoad(String),

    /// A recording could not be started or finalized.
    #[error("recording error: {0}")]
    Recording(String),

    /// Invalid user-provided configuration or data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors raised while drawing a frame.
    #[error("render error: {0}")]
    Render(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FaceliftError {
    /// Build a [`FaceliftError::UnsupportedEnvironment`] value.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedEnvironment(msg.into())
    }

    /// Build a [`FaceliftError::PermissionDenied`] value.
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    /// Build a [`FaceliftError::AssetLoad`] value.
    pub fn asset_load(msg: impl Into<String>) -> Self {
        Self::AssetLoad(msg.into())
    }

    /// Build a [`FaceliftError::Recording`] value.
    pub fn recording(msg: impl Into<String>) -> Self {
        Self::Recording(msg.into())
    }

    /// Build a [`FaceliftError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FaceliftError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Return `true` for failures that must prevent the render loop from starting.
    pub fn is_environment_fatal(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedEnvironment(_) | Self::PermissionDenied(_)
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
