//! Streaming chat completion chunks.

use futures::future;
use futures::stream::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ops::Deref;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::debug;

use crate::client::ApiError;

/// One decoded streaming event, passed through verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatChunk(pub Value);

impl ChatChunk {
    pub fn into_value(self) -> Value {
        self.0
    }

    /// `choices[0].delta.content`, if present.
    pub fn content_delta(&self) -> Option<&str> {
        self.0.pointer("/choices/0/delta/content")?.as_str()
    }

    /// `choices[0].finish_reason`, if present.
    pub fn finish_reason(&self) -> Option<&str> {
        self.0.pointer("/choices/0/finish_reason")?.as_str()
    }
}

impl Deref for ChatChunk {
    type Target = Value;

    fn deref(&self) -> &Value {
        &self.0
    }
}

/// Lazy, forward-only sequence of [`ChatChunk`]s.
///
/// The HTTP response is owned by the stream: dropping it, whether exhausted or
/// not, releases the connection. Lines that are not valid JSON are skipped.
pub struct ChatStream {
    inner: Pin<Box<dyn Stream<Item = Result<ChatChunk, ApiError>> + Send>>,
}

impl ChatStream {
    /// Decode a stream of SSE data payloads.
    pub fn from_data_lines<S>(lines: S) -> Self
    where
        S: Stream<Item = Result<String, ApiError>> + Send + 'static,
    {
        let chunks = lines.filter_map(|line| {
            future::ready(match line {
                Ok(data) => decode_chunk(&data).map(Ok),
                Err(e) => Some(Err(e)),
            })
        });

        Self {
            inner: Box::pin(chunks),
        }
    }
}

impl Stream for ChatStream {
    type Item = Result<ChatChunk, ApiError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl std::fmt::Debug for ChatStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ChatStream")
    }
}

fn decode_chunk(data: &str) -> Option<ChatChunk> {
    match serde_json::from_str::<Value>(data) {
        Ok(value) => Some(ChatChunk(value)),
        Err(e) => {
            debug!(error = %e, "skipping undecodable stream chunk");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sse::sse_data;
    use bytes::Bytes;
    use futures::executor::block_on;
    use futures::stream;
    use serde_json::json;

    fn chat_stream(body: &'static [u8]) -> ChatStream {
        let bytes = stream::iter(vec![Ok::<_, std::io::Error>(Bytes::from_static(body))]);
        ChatStream::from_data_lines(sse_data(bytes))
    }

    #[test]
    fn test_single_chunk_then_done() {
        let chunks: Vec<_> = block_on(chat_stream(b"data: {\"a\":1}\n\ndata: [DONE]\n").collect());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].as_ref().unwrap().0, json!({"a": 1}));
    }

    #[test]
    fn test_malformed_line_is_skipped() {
        let chunks: Vec<_> = block_on(
            chat_stream(b"data: {\"a\":1}\n\ndata: {not json\n\ndata: {\"a\":2}\n\ndata: [DONE]\n")
                .collect(),
        );
        let values: Vec<Value> = chunks.into_iter().map(|c| c.unwrap().into_value()).collect();
        assert_eq!(values, vec![json!({"a": 1}), json!({"a": 2})]);
    }

    #[test]
    fn test_stream_without_done_marker_ends_with_body() {
        let chunks: Vec<_> = block_on(chat_stream(b"data: {\"a\":1}\n").collect());
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn test_chunk_accessors() {
        let chunk = ChatChunk(json!({
            "choices": [{"delta": {"content": "Hel"}, "finish_reason": null}]
        }));
        assert_eq!(chunk.content_delta(), Some("Hel"));
        assert_eq!(chunk.finish_reason(), None);
        assert_eq!(chunk["choices"][0]["delta"]["content"], "Hel");

        let last = ChatChunk(json!({"choices": [{"delta": {}, "finish_reason": "stop"}]}));
        assert_eq!(last.content_delta(), None);
        assert_eq!(last.finish_reason(), Some("stop"));
    }
}
