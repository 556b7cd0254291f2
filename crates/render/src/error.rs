//! Renderer error type.

use thiserror::Error;

/// Errors surfaced by renderer setup and the per-frame path.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Error from the RHI layer
    #[error(transparent)]
    Rhi(#[from] glacier_rhi::RhiError),

    /// Error loading an asset from disk
    #[error(transparent)]
    Asset(#[from] glacier_assets::AssetError),

    /// Error from platform windowing
    #[error(transparent)]
    Platform(#[from] glacier_core::Error),
}

impl RenderError {
    /// Whether the frame loop can survive this error.
    ///
    /// A bounded GPU wait expiring means the device is stalled; everything
    /// else on the per-frame path is worth logging and skipping a frame
    /// over.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RenderError::Rhi(glacier_rhi::RhiError::Timeout(_)))
    }
}

/// Result type alias for renderer operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;
