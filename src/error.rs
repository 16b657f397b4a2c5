//! Engine-level error taxonomy.

use thiserror::Error;

/// Errors raised by the engine itself, as opposed to errors signaled by
/// handlers (which travel through the error pipeline as `anyhow::Error`).
#[derive(Debug, Error)]
pub enum EngineError {
    /// The port given to `listen` is outside the valid TCP range.
    /// Raised synchronously, before any socket is opened.
    #[error("invalid port {0}: expected a value between 1 and 65535")]
    InvalidPort(u32),
}
