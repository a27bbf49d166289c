//! High-level client: session negotiation and the two-flow streaming
//! orchestration over one TCP connection.

use tokio::io::AsyncRead;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::collector::{collect_responses, RecognitionEvent};
use crate::config::ClientConfig;
use crate::error::{AsrError, Result};
use crate::messages::{ConnectionRequest, ConnectionResponse, RESPONSE_OK};
use crate::protocol::{FrameReader, FrameWriter};
use crate::streamer::{expected_total, stream_audio};

/// Resource path named in the upgrade request line.
const UPGRADE_PATH: &str = "/asr_partial";

/// A negotiated recognition session. Owns the connection; the two halves are
/// handed to the producer task and the consumer loop by [`recognize`].
///
/// [`recognize`]: AsrClient::recognize
pub struct AsrClient {
    reader: FrameReader<OwnedReadHalf>,
    writer: FrameWriter<OwnedWriteHalf>,
    config: ClientConfig,
    session_id: String,
}

impl AsrClient {
    /// Dial the server and negotiate a session: the plain-text upgrade
    /// exchange first, then one framed descriptor/ack pair. Strictly
    /// sequential; nothing is streamed until this completes, and any failure
    /// here is fatal.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let address = config.address();
        log::info!("Connecting to {}", address);
        let stream = TcpStream::connect(&address).await?;
        let (read_half, write_half) = stream.into_split();
        let mut reader = FrameReader::new(read_half);
        let mut writer = FrameWriter::new(write_half);

        upgrade_connection(&mut reader, &mut writer, &config.service).await?;

        let uuid = Uuid::new_v4().simple().to_string();
        log::debug!("Session uuid: {}", uuid);
        let descriptor = ConnectionRequest {
            protocol_version: Some(1),
            speechkit_version: String::new(),
            service_name: config.service.clone(),
            uuid,
            api_key: config.api_key.clone(),
            application_name: config.app_name.clone(),
            device: "desktop".to_string(),
            coords: "0, 0".to_string(),
            topic: config.topic.clone(),
            lang: config.lang.clone(),
            format: config.format.clone(),
        };
        writer.send_message(&descriptor).await?;

        let ack: ConnectionResponse = reader.recv_message().await?;
        if ack.response_code != RESPONSE_OK {
            return Err(AsrError::Server {
                phase: "handshake",
                code: ack.response_code,
            });
        }
        log::info!("Session established, id: {}", ack.session_id);

        Ok(Self {
            reader,
            writer,
            config,
            session_id: ack.session_id,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Stream `source` to the server while consuming recognition responses,
    /// surfacing each incremental result through `on_event`.
    ///
    /// The producer runs as its own task and owns the write half; the
    /// calling task consumes the read half. Both flows observe one
    /// cancellation token: whichever fails first cancels it, and the other
    /// stops at its next suspension point. The producer handle is always
    /// joined before the connection is released, so neither flow outlives
    /// the session.
    pub async fn recognize<R, F>(mut self, source: R, source_size: u64, on_event: F) -> Result<()>
    where
        R: AsyncRead + Unpin + Send + 'static,
        F: FnMut(RecognitionEvent),
    {
        let expected = expected_total(source_size, self.config.chunk_size);
        log::info!(
            "Streaming {} bytes in chunks of {}, expecting {} responses",
            source_size,
            self.config.chunk_size,
            expected
        );

        let cancel = CancellationToken::new();
        let producer = tokio::spawn({
            let cancel = cancel.clone();
            let chunk_size = self.config.chunk_size;
            let mut writer = self.writer;
            let mut source = source;
            async move {
                let result = stream_audio(&mut writer, &mut source, chunk_size, &cancel).await;
                if result.is_err() {
                    cancel.cancel();
                }
                result
            }
        });

        let collected = collect_responses(&mut self.reader, expected, &cancel, on_event).await;
        if collected.is_err() {
            cancel.cancel();
        }

        let produced = producer
            .await
            .map_err(|join| AsrError::Internal(format!("producer task failed: {join}")))?;

        // First real error wins; Aborted only marks the flow that was
        // stopped by the other's failure.
        match (produced, collected) {
            (Ok(()), Ok(())) => {
                log::info!("Recognition complete");
                Ok(())
            }
            (Err(AsrError::Aborted), Err(collect_err)) => Err(collect_err),
            (Err(produce_err), _) => Err(produce_err),
            (Ok(()), Err(collect_err)) => Err(collect_err),
        }
    }
}

/// Plain-text handshake: one request line naming the resource path and
/// protocol version, one header line requesting the upgrade, then a blank
/// line. The response headers are discarded; framed mode starts after the
/// server's own blank line.
async fn upgrade_connection(
    reader: &mut FrameReader<OwnedReadHalf>,
    writer: &mut FrameWriter<OwnedWriteHalf>,
    service: &str,
) -> Result<()> {
    let request = format!("GET {} HTTP/1.1\r\nUpgrade: {}\r\n\r\n", UPGRADE_PATH, service);
    writer.send_raw(request.as_bytes()).await?;

    loop {
        let line = reader.recv_line().await.map_err(|err| match err {
            AsrError::Transport(io) => {
                AsrError::Handshake(format!("connection closed during upgrade: {io}"))
            }
            other => other,
        })?;
        log::debug!("<- {}", line.trim_end());
        if line.trim_end_matches(['\r', '\n']).is_empty() {
            return Ok(());
        }
    }
}
