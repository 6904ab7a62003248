use aura_core::{CoreError, MapId};

/// Alias for `Result<T, SimError>`.
pub type SimResult<T> = Result<T, SimError>;

/// Errors raised while configuring or loading a simulation.
///
/// Evaluation passes never produce these; a pass that cannot run simply
/// contributes nothing.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// No map with this ID is registered.
    #[error("map not found in simulation: {0}")]
    MapNotFound(MapId),

    /// A map with this ID is already registered.
    #[error("map already registered: {0}")]
    DuplicateMap(MapId),

    /// Two passes share a name.
    #[error("pass already registered: \"{0}\"")]
    DuplicatePass(String),

    /// A pass was configured to run every zero ticks.
    #[error("pass \"{0}\" has a zero cadence")]
    ZeroCadence(String),

    /// A configuration record failed validation.
    #[error("invalid config for \"{name}\": {reason}")]
    InvalidConfig {
        /// The family, mirror, or cache name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A scenario file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// The file path.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A scenario file is not valid TOML for the expected shape.
    #[error("scenario parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A scenario could not be written back out as TOML.
    #[error("scenario serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// An error from the core data model.
    #[error(transparent)]
    Core(#[from] CoreError),
}
