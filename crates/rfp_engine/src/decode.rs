use bytes::Bytes;
use encoding_rs::{CoderResult, Decoder, UTF_8};
use futures_util::stream::{self, BoxStream, Stream, StreamExt};

use crate::ApiError;

/// Lazy, finite, non-restartable sequence of decoded text chunks.
pub type TextStream = BoxStream<'static, Result<String, ApiError>>;

/// Incremental UTF-8 decoder. A code point split across two chunks is held
/// back until its remaining bytes arrive; malformed input becomes U+FFFD.
pub struct Utf8ChunkDecoder {
    decoder: Decoder,
}

impl Default for Utf8ChunkDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Utf8ChunkDecoder {
    pub fn new() -> Self {
        Self {
            decoder: UTF_8.new_decoder(),
        }
    }

    /// Decode the next chunk. May return an empty string if the chunk only
    /// held the start of a code point.
    pub fn feed(&mut self, bytes: &[u8]) -> String {
        self.decode(bytes, false)
    }

    /// Flush anything held back. The decoder must not be fed afterwards.
    pub fn finish(mut self) -> String {
        self.decode(&[], true)
    }

    fn decode(&mut self, mut src: &[u8], last: bool) -> String {
        let capacity = self
            .decoder
            .max_utf8_buffer_length(src.len())
            .unwrap_or(src.len() * 3 + 4);
        let mut out = String::with_capacity(capacity);
        loop {
            let (result, read, _replaced) = self.decoder.decode_to_string(src, &mut out, last);
            src = &src[read..];
            match result {
                CoderResult::InputEmpty => return out,
                CoderResult::OutputFull => out.reserve(src.len() * 3 + 4),
            }
        }
    }
}

/// Turn a byte stream into a [`TextStream`]. Empty decodes are skipped and
/// the stream ends right after the first error.
pub fn decode_text_stream<S>(bytes: S) -> TextStream
where
    S: Stream<Item = Result<Bytes, ApiError>> + Send + 'static,
{
    let state = (bytes.boxed(), Some(Utf8ChunkDecoder::new()));
    stream::unfold(state, |(mut bytes, mut decoder)| async move {
        loop {
            let current = decoder.as_mut()?;
            match bytes.next().await {
                Some(Ok(chunk)) => {
                    let text = current.feed(&chunk);
                    if !text.is_empty() {
                        return Some((Ok(text), (bytes, decoder)));
                    }
                }
                Some(Err(err)) => return Some((Err(err), (bytes, None))),
                None => {
                    let tail = decoder.take().map(Utf8ChunkDecoder::finish)?;
                    if tail.is_empty() {
                        return None;
                    }
                    return Some((Ok(tail), (bytes, None)));
                }
            }
        }
    })
    .boxed()
}
