//! # asr-client-rs
//!
//! Streaming client for a speech-recognition service reachable over a single
//! TCP connection. After a plain-text connection upgrade and a framed
//! handshake, audio is pushed as length-framed messages by a producer task
//! while recognition responses are consumed concurrently, until the response
//! counter reaches the expected total.

pub mod client;
pub mod collector;
pub mod config;
pub mod error;
pub mod messages;
pub mod protocol;
pub mod streamer;

pub use client::AsrClient;
pub use collector::RecognitionEvent;
pub use config::ClientConfig;
pub use error::{AsrError, Result};
