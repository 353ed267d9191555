use thiserror::Error;

/// Errors surfaced by level loading. Rendering itself never fails: geometric
/// edge cases (parallel rays, near-zero distances, off-frustum sprites) all
/// resolve to safe fallbacks instead of error values.
#[derive(Debug, Error)]
pub enum LevelError {
    /// Malformed header, directory or lump. Fatal to the load in progress.
    #[error("malformed level data: {0}")]
    Format(String),

    /// A requested lump or map is absent. Callers decide the fallback.
    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LevelError {
    pub fn format(msg: impl Into<String>) -> Self {
        LevelError::Format(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        LevelError::NotFound(what.into())
    }
}
