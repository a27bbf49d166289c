use thiserror::Error;

pub type Result<T> = std::result::Result<T, AsrError>;

/// Every failure in this crate is fatal to the session; nothing is retried.
/// The variants identify which phase of the protocol broke.
#[derive(Error, Debug)]
pub enum AsrError {
    #[error("Framing error: {0}")]
    Framing(String),

    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("Source error: {0}")]
    Source(std::io::Error),

    #[error("Handshake error: {0}")]
    Handshake(String),

    #[error("Server rejected {phase}: response code {code}")]
    Server { phase: &'static str, code: i32 },

    #[error("Configuration error: {0}")]
    Config(String),

    /// The other flow of the session failed first and cancelled this one.
    /// The orchestrator reports the real error, not this marker.
    #[error("Session aborted")]
    Aborted,

    #[error("Internal error: {0}")]
    Internal(String),
}
