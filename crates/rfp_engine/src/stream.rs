use std::future::Future;

use futures_util::StreamExt;
use rfp_core::RequestId;
use rfp_logging::{rfp_debug, rfp_warn};
use tokio_util::sync::CancellationToken;

use crate::decode::TextStream;
use crate::{ApiError, EngineEvent, EventSink};

/// Open a text stream and forward every chunk as `EngineEvent::StreamChunk`.
///
/// Exactly one `EngineEvent::StreamFinished` follows, whether the stream
/// ended, failed to open, broke off, or `token` was cancelled.
pub async fn pump_stream<F>(
    open: F,
    request: RequestId,
    token: CancellationToken,
    sink: &dyn EventSink,
) where
    F: Future<Output = Result<TextStream, ApiError>>,
{
    let result = read_all(open, request, &token, sink).await;
    match &result {
        Ok(()) => rfp_debug!("Stream {} complete", request),
        Err(err) => rfp_warn!("Stream {} ended early: {}", request, err),
    }
    sink.emit(EngineEvent::StreamFinished { request, result });
}

async fn read_all<F>(
    open: F,
    request: RequestId,
    token: &CancellationToken,
    sink: &dyn EventSink,
) -> Result<(), ApiError>
where
    F: Future<Output = Result<TextStream, ApiError>>,
{
    let mut stream = tokio::select! {
        _ = token.cancelled() => return Err(ApiError::cancelled()),
        opened = open => opened?,
    };

    let mut chunks: u64 = 0;
    loop {
        let next = tokio::select! {
            _ = token.cancelled() => return Err(ApiError::cancelled()),
            next = stream.next() => next,
        };
        match next {
            Some(Ok(text)) => {
                chunks += 1;
                sink.emit(EngineEvent::StreamChunk { request, text });
            }
            Some(Err(err)) => return Err(err),
            None => {
                rfp_debug!("Stream {} delivered {} chunks", request, chunks);
                return Ok(());
            }
        }
    }
}
