pub type OverlayResult<T> = Result<T, OverlayError>;

#[derive(thiserror::Error, Debug)]
pub enum OverlayError {
    /// No pixel surface could be acquired for the source image. Callers skip the frame.
    #[error("render surface unavailable: {0}")]
    RenderSurfaceUnavailable(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("network failure: {0}")]
    NetworkFailure(String),

    #[error("malformed manifest: {0}")]
    MalformedManifest(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OverlayError {
    pub fn render_surface_unavailable(msg: impl Into<String>) -> Self {
        Self::RenderSurfaceUnavailable(msg.into())
    }

    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    pub fn network_failure(msg: impl Into<String>) -> Self {
        Self::NetworkFailure(msg.into())
    }

    pub fn malformed_manifest(msg: impl Into<String>) -> Self {
        Self::MalformedManifest(msg.into())
    }
}
