//! Error types for the provider and its backend boundary.
//!
//! Backend failures are consumed by the polling worker: one failed cycle
//! leaves the previously published slot data in place and is never surfaced
//! to snapshot readers.

use thiserror::Error;

/// Errors a device backend may report from a single poll.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Device temporarily unreadable
    #[error("device unavailable: {0}")]
    DeviceUnavailable(String),

    /// Underlying I/O failure
    #[error("backend I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed report from one slot
    #[error("protocol error on slot {slot}: {message}")]
    Protocol {
        /// Slot index the report belonged to
        slot: usize,
        /// Error message
        message: String,
    },
}

/// Errors surfaced by the provider facade.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The polling worker thread could not be spawned
    #[error("failed to spawn polling worker: {0}")]
    SpawnFailed(#[source] std::io::Error),
}
