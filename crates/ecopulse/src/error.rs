//! Unified error type for the EcoPulse server.

use ecopulse_protocol::ProtocolError;
use ecopulse_session::SessionError;
use ecopulse_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `ecopulse` meta-crate, you deal with this single error
/// type instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant auto-generates `From` impls, so the `?`
/// operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum EcoPulseError {
    /// A transport-level error (connection, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (unknown session).
    #[error(transparent)]
    Session(#[from] SessionError),
}
