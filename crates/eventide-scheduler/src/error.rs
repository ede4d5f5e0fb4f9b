//! Error types for presets and the catalog.

/// A preset definition that cannot be repaired by clamping.
#[derive(Debug, thiserror::Error)]
pub enum PresetError {
    /// Presets are keyed by id; an empty one cannot be stored.
    #[error("preset id is empty")]
    EmptyId,

    /// Duration must be positive; there is no sensible clamp for an
    /// event that lasts no time at all.
    #[error("preset {0} has a non-positive duration")]
    InvalidDuration(String),
}

/// Failure to load a preset catalog from disk.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("could not read preset file: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse preset file: {0}")]
    Parse(#[from] serde_json::Error),
}
