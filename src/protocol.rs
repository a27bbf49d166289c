//! Length-prefixed framing over a duplex byte stream.
//!
//! Wire format: `<hex-length>\r\n<payload bytes>`, no trailing delimiter
//! after the payload. Frames carry no type tag; message identity comes from
//! protocol position and direction. A zero-length frame is valid.

use prost::Message;
use std::io;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::error::{AsrError, Result};

/// Sanity cap on a single inbound frame (16MB).
const MAX_FRAME_LEN: u64 = 16 * 1024 * 1024;

/// Write half of a framed connection.
pub struct FrameWriter<W> {
    inner: W,
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Write raw unframed bytes. Used only for the plain-text handshake.
    pub async fn send_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes).await?;
        self.inner.flush().await?;
        Ok(())
    }

    /// Write one frame: hex length line, then the payload verbatim.
    /// Returns the total number of bytes written.
    pub async fn send_frame(&mut self, payload: &[u8]) -> Result<usize> {
        let header = format!("{:x}\r\n", payload.len());
        self.inner.write_all(header.as_bytes()).await?;
        self.inner.write_all(payload).await?;
        self.inner.flush().await?;
        Ok(header.len() + payload.len())
    }

    /// Encode a message and send it as one frame.
    pub async fn send_message<M: Message>(&mut self, message: &M) -> Result<usize> {
        self.send_frame(&message.encode_to_vec()).await
    }
}

/// Buffered read half of a framed connection.
pub struct FrameReader<R> {
    inner: BufReader<R>,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner: BufReader::new(inner),
        }
    }

    /// Read one text line including its terminator. Used only for the
    /// plain-text handshake. EOF before any byte is a transport error.
    pub async fn recv_line(&mut self) -> Result<String> {
        let mut line = String::new();
        let read = self.inner.read_line(&mut line).await?;
        if read == 0 {
            return Err(AsrError::Transport(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed while reading a line",
            )));
        }
        Ok(line)
    }

    /// Read one frame: a hex length line, then exactly that many payload
    /// bytes. A missing or non-hexadecimal length line is a framing error;
    /// a short payload read is a transport error.
    pub async fn recv_frame(&mut self) -> Result<Vec<u8>> {
        let mut line = String::new();
        self.inner.read_line(&mut line).await?;
        if line.len() < 2 {
            return Err(AsrError::Framing(
                "no length line before frame payload".to_string(),
            ));
        }
        let hex = line.trim_end_matches(['\r', '\n']);
        let len = u64::from_str_radix(hex, 16)
            .map_err(|_| AsrError::Framing(format!("invalid hex length line {:?}", hex)))?;
        if len > MAX_FRAME_LEN {
            return Err(AsrError::Framing(format!(
                "frame length {} exceeds {} byte cap",
                len, MAX_FRAME_LEN
            )));
        }
        let mut payload = vec![0u8; len as usize];
        if len > 0 {
            self.inner.read_exact(&mut payload).await?;
        }
        log::debug!("<- frame 0x{} ({} bytes)", hex, len);
        Ok(payload)
    }

    /// Receive one frame and decode it as a message.
    pub async fn recv_message<M: Message + Default>(&mut self) -> Result<M> {
        let payload = self.recv_frame().await?;
        Ok(M::decode(payload.as_slice())?)
    }
}
