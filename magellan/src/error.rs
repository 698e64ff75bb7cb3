//! Error types used by the crate.
//!
//! No failure in this crate is escalated to the embedder as an error value or a panic. View
//! operations called before initialization are logged and ignored, invalid points of interest
//! are skipped at the rendering boundary, and tile provider failures degrade to the fallback
//! provider. The error type exists for the internal seams (tile providers, validation) where a
//! failure still has to travel before it is absorbed and logged.

use thiserror::Error;

/// Magellan error type.
#[derive(Debug, Error)]
pub enum MagellanError {
    /// A view or marker operation was called before the map was initialized.
    #[error("map is not initialized")]
    NotInitialized,
    /// A point of interest carries a missing or non-numeric coordinate.
    #[error("invalid coordinates for place {0}")]
    InvalidCoordinates(u64),
    /// Failed to load a tile from a provider.
    #[error("failed to load tile")]
    TileLoad,
    /// Generic error - details are inside.
    #[error("{0}")]
    Generic(String),
}

#[cfg(not(target_arch = "wasm32"))]
impl From<reqwest::Error> for MagellanError {
    fn from(_value: reqwest::Error) -> Self {
        Self::TileLoad
    }
}
