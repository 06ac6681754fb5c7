//! Error types for the protocol layer.
//!
//! Each crate in EcoPulse defines its own error enum. This keeps errors
//! specific and meaningful — when you see a `ProtocolError`, you know the
//! problem is in serialization/deserialization, not in networking or
//! session tracking.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, missing required fields, wrong data
    /// types, or an unknown `"event"` tag.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}
