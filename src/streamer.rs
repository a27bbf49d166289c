//! Producer flow: reads the audio source in fixed-size chunks and sends each
//! as one framed [`AddData`] message, terminated by a single empty
//! `last_chunk` message.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio_util::sync::CancellationToken;

use crate::error::{AsrError, Result};
use crate::messages::AddData;
use crate::protocol::FrameWriter;

/// Number of response messages the server produces for a source of
/// `source_size` bytes sent in `chunk_size` chunks: one per data chunk plus
/// one for the terminating empty chunk. A zero-length source still yields 1.
pub fn expected_total(source_size: u64, chunk_size: usize) -> u64 {
    source_size.div_ceil(chunk_size as u64) + 1
}

/// Fill `buf` from `source`, re-issuing short reads until the buffer is full
/// or the source is exhausted. Frame sizes must match the `expected_total`
/// arithmetic, so a short read mid-source may not produce a short chunk.
async fn read_chunk<R: AsyncRead + Unpin>(source: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let read = source
            .read(&mut buf[filled..])
            .await
            .map_err(AsrError::Source)?;
        if read == 0 {
            break;
        }
        filled += read;
    }
    Ok(filled)
}

/// Send the whole source as a sequence of audio chunks, then exactly one
/// final empty chunk, then stop. Any failure is fatal to the session: the
/// caller observes it through the task's return value, and the shared token
/// is cancelled so the consumer flow stops too.
///
/// The loop checks the token at every suspension point so a consumer-side
/// failure stops a producer blocked on a full socket buffer.
pub async fn stream_audio<R, W>(
    writer: &mut FrameWriter<W>,
    source: &mut R,
    chunk_size: usize,
    cancel: &CancellationToken,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; chunk_size];
    let mut chunks_sent = 0u64;
    loop {
        let read = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AsrError::Aborted),
            read = read_chunk(source, &mut buf) => read?,
        };
        if read == 0 {
            break;
        }
        let chunk = AddData {
            audio_data: buf[..read].to_vec(),
            last_chunk: false,
        };
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AsrError::Aborted),
            sent = writer.send_message(&chunk) => { sent?; }
        }
        chunks_sent += 1;
        log::debug!("-> chunk {} ({} bytes)", chunks_sent, read);
    }

    let last = AddData {
        audio_data: Vec::new(),
        last_chunk: true,
    };
    tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(AsrError::Aborted),
        sent = writer.send_message(&last) => { sent?; }
    }
    log::debug!("-> final chunk after {} data chunks", chunks_sent);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::FrameReader;

    #[test]
    fn expected_total_for_empty_source_is_one() {
        assert_eq!(expected_total(0, 32 * 1024), 1);
        assert_eq!(expected_total(0, 1), 1);
    }

    #[test]
    fn expected_total_for_exact_multiples() {
        assert_eq!(expected_total(32 * 1024, 32 * 1024), 2);
        assert_eq!(expected_total(3 * 32 * 1024, 32 * 1024), 4);
    }

    #[test]
    fn expected_total_for_a_trailing_partial_chunk() {
        assert_eq!(expected_total(70000, 32 * 1024), 4);
        assert_eq!(expected_total(32 * 1024 + 1, 32 * 1024), 3);
        assert_eq!(expected_total(1, 32 * 1024), 2);
    }

    /// Run the producer over an in-memory source and collect the decoded
    /// chunk sequence from the other end of the pipe.
    async fn produced_chunks(source: Vec<u8>, chunk_size: usize) -> Vec<AddData> {
        let (near, far) = tokio::io::duplex(1 << 20);
        let mut writer = FrameWriter::new(near);
        let mut reader = FrameReader::new(far);
        let cancel = CancellationToken::new();

        let mut cursor = std::io::Cursor::new(source);
        stream_audio(&mut writer, &mut cursor, chunk_size, &cancel)
            .await
            .unwrap();
        drop(writer);

        let mut chunks = Vec::new();
        loop {
            match reader.recv_message::<AddData>().await {
                Ok(chunk) => chunks.push(chunk),
                Err(AsrError::Framing(_)) => break, // pipe closed, no more frames
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        chunks
    }

    #[tokio::test]
    async fn empty_source_produces_only_the_final_chunk() {
        let chunks = produced_chunks(Vec::new(), 32 * 1024).await;
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].last_chunk);
        assert!(chunks[0].audio_data.is_empty());
    }

    #[tokio::test]
    async fn source_is_split_into_full_chunks_plus_remainder() {
        let source: Vec<u8> = (0..70000u32).map(|i| (i % 256) as u8).collect();
        let chunks = produced_chunks(source.clone(), 32 * 1024).await;

        let sizes: Vec<usize> = chunks.iter().map(|c| c.audio_data.len()).collect();
        assert_eq!(sizes, [32768, 32768, 4464, 0]);

        // exactly one final chunk, and it is the last one
        let finals: Vec<usize> = chunks
            .iter()
            .enumerate()
            .filter(|(_, c)| c.last_chunk)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(finals, [chunks.len() - 1]);

        // payload bytes pass through verbatim and in order
        let replayed: Vec<u8> = chunks.iter().flat_map(|c| c.audio_data.clone()).collect();
        assert_eq!(replayed, source);
    }

    #[tokio::test]
    async fn exact_multiple_source_has_no_partial_chunk() {
        let chunks = produced_chunks(vec![7u8; 2 * 1024], 1024).await;
        let sizes: Vec<usize> = chunks.iter().map(|c| c.audio_data.len()).collect();
        assert_eq!(sizes, [1024, 1024, 0]);
    }

    #[tokio::test]
    async fn cancelled_token_stops_the_producer() {
        let (near, _far) = tokio::io::duplex(64);
        let mut writer = FrameWriter::new(near);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut cursor = std::io::Cursor::new(vec![0u8; 4096]);
        let result = stream_audio(&mut writer, &mut cursor, 1024, &cancel).await;
        assert!(matches!(result, Err(AsrError::Aborted)));
    }
}
