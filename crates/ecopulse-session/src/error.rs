//! Error types for the session layer.

/// Errors that can occur during session tracking.
///
/// The server never distinguishes failure kinds beyond "no session exists
/// for that connection" — events for unknown sessions are logged and
/// ignored, so this enum has exactly one variant.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No session exists for the given connection.
    /// This happens when a device or violation event arrives before login,
    /// or after the session was removed at disconnect.
    #[error("session not found: {0}")]
    NotFound(ecopulse_protocol::SessionId),
}
