use crate::entity::{EntityId, Position};

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur when manipulating a map or the catalog.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The requested entity ID is not present on the map (never spawned or already disposed).
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    /// A position lies outside the map's bounds.
    #[error("position {pos} is outside the {width}x{height} map")]
    OutOfBounds {
        /// The rejected position.
        pos: Position,
        /// Map width in cells.
        width: i32,
        /// Map height in cells.
        height: i32,
    },

    /// A tag name has not been interned in the catalog.
    #[error("unknown tag: \"{0}\"")]
    UnknownTag(String),

    /// An effect kind has not been defined in the catalog.
    #[error("unknown effect kind: \"{0}\"")]
    UnknownEffect(String),
}
