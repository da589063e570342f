use thiserror::Error;

/// Failures of a sync round trip. Nothing here is fatal to the session;
/// the triggering action is abandoned and can be re-issued by the player.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Network, status, or body-decode failure talking to the game server.
    #[error("game server request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A per-site array whose length does not match the field size. The
    /// payload is rejected as a whole; applying it would break every
    /// site-indexed lookup downstream.
    #[error("per-site array '{layer}' has {got} entries, expected {expected}")]
    FieldSizeMismatch {
        layer: &'static str,
        got: usize,
        expected: usize,
    },
}
