//! Server-Sent Events (SSE) stream processing utilities.
//!
//! SSE format:
//! ```text
//! data: {"key": "value"}
//!
//! data: {"another": "event"}
//!
//! data: [DONE]
//! ```

use bytes::{Bytes, BytesMut};
use futures::stream::{self, Stream, StreamExt};
use std::fmt::Display;

use crate::client::ApiError;

/// Extension trait for `reqwest::Response` to enable SSE streaming.
///
/// # Example
/// ```ignore
/// use waygpt::sse::SSEResponseExt;
///
/// let mut lines = response.sse();
/// while let Some(line) = lines.next().await {
///     println!("SSE data: {}", line?);
/// }
/// ```
pub trait SSEResponseExt {
    /// Convert the response into a stream of raw SSE data payloads.
    ///
    /// Returns the content after the `data: ` prefix for each event.
    /// Stops when the `[DONE]` marker is encountered or the body ends.
    fn sse(self) -> impl Stream<Item = Result<String, ApiError>> + Send;
}

impl SSEResponseExt for reqwest::Response {
    fn sse(self) -> impl Stream<Item = Result<String, ApiError>> + Send {
        sse_data(self.bytes_stream())
    }
}

/// Frame a byte stream into SSE data payloads.
///
/// Lines are split on `\n` in the raw bytes, so multi-byte characters split
/// across network chunks are reassembled before decoding. A transport error is
/// yielded once and ends the stream.
pub fn sse_data<S, E>(byte_stream: S) -> impl Stream<Item = Result<String, ApiError>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send,
    E: Display + Send,
{
    stream::unfold(
        (Box::pin(byte_stream), BytesMut::new(), false),
        |(mut byte_stream, mut buffer, mut stream_ended)| async move {
            loop {
                // Process complete lines from buffer
                while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
                    let raw = buffer.split_to(pos + 1);
                    let line = String::from_utf8_lossy(&raw);

                    match parse_sse_line(line.trim()) {
                        Some(data) if is_done_marker(data) => return None,
                        Some(data) => {
                            let data = data.to_string();
                            return Some((Ok(data), (byte_stream, buffer, stream_ended)));
                        }
                        // Blank lines, comments and other fields
                        None => continue,
                    }
                }

                if stream_ended {
                    // Unterminated final line
                    if buffer.is_empty() {
                        return None;
                    }
                    let raw = buffer.split();
                    let line = String::from_utf8_lossy(&raw);
                    return match parse_sse_line(line.trim()) {
                        Some(data) if !is_done_marker(data) => {
                            let data = data.to_string();
                            Some((Ok(data), (byte_stream, buffer, stream_ended)))
                        }
                        _ => None,
                    };
                }

                match byte_stream.next().await {
                    Some(Ok(chunk)) => buffer.extend_from_slice(&chunk),
                    Some(Err(e)) => {
                        buffer.clear();
                        stream_ended = true;
                        return Some((Err(ApiError::network(e)), (byte_stream, buffer, stream_ended)));
                    }
                    None => stream_ended = true,
                }
            }
        },
    )
}

/// Parse an SSE line to extract the data portion.
///
/// # Example
/// ```
/// use waygpt::sse::parse_sse_line;
///
/// assert_eq!(parse_sse_line("data: {\"key\": \"value\"}"), Some("{\"key\": \"value\"}"));
/// assert_eq!(parse_sse_line("event: ping"), None);
/// ```
pub fn parse_sse_line(line: &str) -> Option<&str> {
    line.strip_prefix("data: ").map(|s| s.trim())
}

/// Check if an SSE data payload marks the end of the stream.
///
/// # Example
/// ```
/// use waygpt::sse::is_done_marker;
///
/// assert!(is_done_marker("[DONE]"));
/// assert!(!is_done_marker("{\"data\": \"value\"}"));
/// ```
pub fn is_done_marker(data: &str) -> bool {
    data == "[DONE]"
}
