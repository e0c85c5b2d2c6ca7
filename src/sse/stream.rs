//! Async event stream over an HTTP response body.

use futures_util::stream::{self, Stream};
use futures_util::StreamExt;
use std::collections::VecDeque;
use std::pin::Pin;
use std::time::Duration;

use crate::error::{classify_http_error, ChatError, StreamError};
use crate::traits::{ByteStream, StreamResponse};

use super::decoder::SseDecoder;
use super::events::StreamEvent;

/// Stream of decoded events for one chat turn.
///
/// Finite and not restartable. A transport error or idle timeout is yielded
/// once as `Err` and the stream then ends. Dropping it drops the body, which
/// releases the connection.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, ChatError>> + Send>>;

struct DecodeState {
    body: ByteStream,
    decoder: SseDecoder,
    ready: VecDeque<StreamEvent>,
    idle_timeout: Option<Duration>,
    url: String,
    ended: bool,
}

/// Turn a streaming response into an [`EventStream`].
///
/// Fails with [`StreamError::Protocol`] when the response has no readable
/// body.
pub fn decode_response(
    response: StreamResponse,
    url: &str,
    idle_timeout: Option<Duration>,
) -> Result<EventStream, ChatError> {
    let body = response.body.ok_or_else(|| StreamError::Protocol {
        message: format!("Response from {} has no readable body", url),
    })?;
    Ok(decode_body(body, url, idle_timeout))
}

/// Decode a raw body stream into events.
pub fn decode_body(body: ByteStream, url: &str, idle_timeout: Option<Duration>) -> EventStream {
    let state = DecodeState {
        body,
        decoder: SseDecoder::new(),
        ready: VecDeque::new(),
        idle_timeout,
        url: url.to_string(),
        ended: false,
    };

    let events = stream::unfold(state, |mut state| async move {
        loop {
            if let Some(event) = state.ready.pop_front() {
                return Some((Ok(event), state));
            }
            if state.ended {
                return None;
            }

            let next = match state.idle_timeout {
                Some(limit) => match tokio::time::timeout(limit, state.body.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        tracing::warn!("Chat stream idle for {:?}, giving up", limit);
                        state.ended = true;
                        let err = StreamError::IdleTimeout {
                            duration_secs: limit.as_secs(),
                        };
                        return Some((Err(err.into()), state));
                    }
                },
                None => state.body.next().await,
            };

            match next {
                Some(Ok(chunk)) => {
                    let decoded = state.decoder.feed(&chunk);
                    state.ready.extend(decoded);
                }
                Some(Err(e)) => {
                    tracing::warn!("Chat stream failed mid-body: {}", e);
                    state.ended = true;
                    let err = ChatError::Network(classify_http_error(e, &state.url));
                    return Some((Err(err), state));
                }
                None => {
                    state.ended = true;
                    let leftover = std::mem::take(&mut state.decoder).finish();
                    if !leftover.is_empty() {
                        tracing::debug!("Discarding unterminated stream fragment: {:?}", leftover);
                    }
                }
            }
        }
    });

    Box::pin(events)
}
