//! Consumer flow: reads framed recognition updates, accumulates their delta
//! message counts, and surfaces incremental results until the running total
//! reaches the expected number of responses.

use tokio::io::AsyncRead;
use tokio_util::sync::CancellationToken;

use crate::error::{AsrError, Result};
use crate::messages::{AddDataResponse, RESPONSE_OK};
use crate::protocol::FrameReader;

/// Incremental recognition result surfaced to the caller while streaming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionEvent {
    /// Normalized text of the first (best) candidate.
    pub text: String,
    pub end_of_utterance: bool,
}

/// Consume recognition updates until the running sum of their delta counts
/// reaches `expected_total`. Completion is governed by the counter alone:
/// the loop never exits early, even if no recognition candidate has been
/// seen. Updates that carry candidates are surfaced through `on_event`.
///
/// The loop checks the token at every receive so a producer-side failure
/// stops a consumer blocked on an idle connection.
pub async fn collect_responses<R, F>(
    reader: &mut FrameReader<R>,
    expected_total: u64,
    cancel: &CancellationToken,
    mut on_event: F,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    F: FnMut(RecognitionEvent),
{
    let mut received = 0u64;
    while received < expected_total {
        let response: AddDataResponse = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AsrError::Aborted),
            response = reader.recv_message() => response?,
        };
        if response.response_code != RESPONSE_OK {
            return Err(AsrError::Server {
                phase: "streaming",
                code: response.response_code,
            });
        }
        received += response.delta();
        log::debug!(
            "<- progress {}/{} (end_of_utt: {})",
            received,
            expected_total,
            response.end_of_utt
        );
        if let Some(best) = response.recognition.first() {
            on_event(RecognitionEvent {
                text: best.normalized.clone(),
                end_of_utterance: response.end_of_utt,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Recognition;
    use crate::protocol::FrameWriter;

    /// Encode a sequence of responses into one framed byte buffer.
    async fn framed(responses: &[AddDataResponse]) -> Vec<u8> {
        let mut buf = Vec::new();
        let mut writer = FrameWriter::new(&mut buf);
        for response in responses {
            writer.send_message(response).await.unwrap();
        }
        buf
    }

    fn update(messages_count: i32, normalized: &str, end_of_utt: bool) -> AddDataResponse {
        AddDataResponse {
            response_code: RESPONSE_OK,
            recognition: if normalized.is_empty() {
                Vec::new()
            } else {
                vec![Recognition {
                    confidence: 1.0,
                    words: Vec::new(),
                    normalized: normalized.to_string(),
                }]
            },
            end_of_utt,
            messages_count: Some(messages_count),
        }
    }

    async fn collect(
        responses: &[AddDataResponse],
        expected_total: u64,
    ) -> (crate::error::Result<()>, Vec<RecognitionEvent>) {
        let bytes = framed(responses).await;
        let mut reader = FrameReader::new(std::io::Cursor::new(bytes));
        let cancel = CancellationToken::new();
        let mut events = Vec::new();
        let result =
            collect_responses(&mut reader, expected_total, &cancel, |e| events.push(e)).await;
        (result, events)
    }

    #[tokio::test]
    async fn terminates_when_unit_deltas_reach_the_total() {
        let responses: Vec<_> = (0..4).map(|_| update(1, "", false)).collect();
        let (result, events) = collect(&responses, 4).await;
        result.unwrap();
        // no candidates were carried, but the loop still ran to completion
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn a_single_large_delta_satisfies_termination() {
        let (result, events) = collect(&[update(4, "привет мир", true)], 4).await;
        result.unwrap();
        assert_eq!(
            events,
            [RecognitionEvent {
                text: "привет мир".to_string(),
                end_of_utterance: true,
            }]
        );
    }

    #[tokio::test]
    async fn does_not_read_past_the_expected_total() {
        // one satisfying update followed by garbage that must never be read
        let mut bytes = framed(&[update(2, "done", true)]).await;
        bytes.extend_from_slice(b"not a frame at all");
        let mut reader = FrameReader::new(std::io::Cursor::new(bytes));
        let cancel = CancellationToken::new();
        let result = collect_responses(&mut reader, 2, &cancel, |_| {}).await;
        result.unwrap();
    }

    #[tokio::test]
    async fn candidates_alone_never_terminate_the_loop() {
        // deltas sum to 2 of an expected 3; the stream then ends, which is
        // fatal, regardless of the candidates already surfaced
        let responses = [update(1, "partial", false), update(1, "partial two", false)];
        let (result, events) = collect(&responses, 3).await;
        assert!(matches!(result, Err(AsrError::Framing(_))));
        assert_eq!(events.len(), 2);
    }

    #[tokio::test]
    async fn zero_deltas_do_not_advance_the_counter() {
        let responses = [update(0, "still listening", false), update(2, "", true)];
        let (result, events) = collect(&responses, 2).await;
        result.unwrap();
        assert_eq!(events.len(), 1);
        assert!(!events[0].end_of_utterance);
    }

    #[tokio::test]
    async fn non_ok_response_code_is_fatal() {
        let mut rejected = update(1, "", false);
        rejected.response_code = 403;
        let (result, _) = collect(&[rejected], 1).await;
        assert!(matches!(
            result,
            Err(AsrError::Server {
                phase: "streaming",
                code: 403,
            })
        ));
    }

    #[tokio::test]
    async fn absent_delta_defaults_to_one() {
        let mut implicit = update(1, "", false);
        implicit.messages_count = None;
        let (result, _) = collect(&[implicit], 1).await;
        result.unwrap();
    }

    #[tokio::test]
    async fn cancelled_token_stops_the_collector() {
        let bytes = framed(&[update(1, "", false)]).await;
        let mut reader = FrameReader::new(std::io::Cursor::new(bytes));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = collect_responses(&mut reader, 1, &cancel, |_| {}).await;
        assert!(matches!(result, Err(AsrError::Aborted)));
    }
}
