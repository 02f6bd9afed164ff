use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackdropError {
    #[error("drawing surface unavailable ({width}x{height})")]
    SurfaceUnavailable { width: f32, height: f32 },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BackdropError {
    /// The surface may gain a usable size later; the config will not change.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BackdropError::SurfaceUnavailable { .. })
    }
}
