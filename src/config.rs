use crate::error::{AsrError, Result};

pub const DEFAULT_SERVER: &str = "asr.yandex.net";
pub const DEFAULT_PORT: u16 = 80;
pub const DEFAULT_TOPIC: &str = "freeform";
pub const DEFAULT_LANG: &str = "ru-RU";
pub const DEFAULT_FORMAT: &str = "audio/x-pcm;bit=16;rate=16000";
/// Roughly one second of audio in the default format.
pub const DEFAULT_CHUNK_SIZE: usize = 32 * 1024;

/// Session parameters, passed explicitly into every component.
/// There is no process-wide configuration state.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Recognition server hostname.
    pub server: String,
    pub port: u16,
    /// API key sent in the session descriptor.
    pub api_key: String,
    /// Recognition model topic (aka "model").
    pub topic: String,
    /// Recognition language tag, e.g. "ru-RU" or "en-EN".
    pub lang: String,
    /// Audio format descriptor for the source payload.
    pub format: String,
    /// Application name reported to the server.
    pub app_name: String,
    /// Service named in the connection upgrade, e.g. "dictation".
    pub service: String,
    /// Bytes of audio per outbound frame.
    pub chunk_size: usize,
    /// Log protocol-level progress, not only recognized text.
    pub verbose: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            port: DEFAULT_PORT,
            api_key: String::new(),
            topic: DEFAULT_TOPIC.to_string(),
            lang: DEFAULT_LANG.to_string(),
            format: DEFAULT_FORMAT.to_string(),
            app_name: "asr-client-rs".to_string(),
            service: "dictation".to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            verbose: false,
        }
    }
}

impl ClientConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.server, self.port)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(AsrError::Config(
                "chunk size must be at least 1 byte".to_string(),
            ));
        }
        if self.server.is_empty() {
            return Err(AsrError::Config("server must not be empty".to_string()));
        }
        Ok(())
    }
}
