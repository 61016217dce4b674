mod support;

use bytes::Bytes;
use futures_util::stream;
use pretty_assertions::assert_eq;
use rfp_engine::{
    decode_text_stream, pump_stream, ApiError, EngineEvent, FailureKind, TextStream,
};
use support::{network_error, TestSink};
use tokio_util::sync::CancellationToken;

fn text_stream(chunks: Vec<Result<&'static [u8], ApiError>>) -> TextStream {
    let bytes = chunks
        .into_iter()
        .map(|chunk| chunk.map(Bytes::from_static))
        .collect::<Vec<_>>();
    decode_text_stream(stream::iter(bytes))
}

fn chunks_of(events: &[EngineEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            EngineEvent::StreamChunk { text, .. } => Some(text.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn every_chunk_is_forwarded_then_finished() {
    let sink = TestSink::new();
    let open = async {
        Ok(text_stream(vec![
            Ok(b"Hel".as_slice()),
            Ok(b"lo, ".as_slice()),
            Ok(b"world".as_slice()),
        ]))
    };

    pump_stream(open, 4, CancellationToken::new(), &sink).await;

    let events = sink.take();
    assert_eq!(chunks_of(&events), vec!["Hel", "lo, ", "world"]);
    assert_eq!(
        events.last(),
        Some(&EngineEvent::StreamFinished {
            request: 4,
            result: Ok(()),
        })
    );
}

#[tokio::test]
async fn multibyte_split_across_chunks_is_not_garbled() {
    let sink = TestSink::new();
    // "€" is E2 82 AC.
    let open = async { Ok(text_stream(vec![Ok(b"1 \xE2\x82".as_slice()), Ok(b"\xAC".as_slice())])) };

    pump_stream(open, 1, CancellationToken::new(), &sink).await;

    assert_eq!(chunks_of(&sink.take()).concat(), "1 €");
}

#[tokio::test]
async fn read_error_aborts_and_still_finishes() {
    let sink = TestSink::new();
    let open = async {
        Ok(text_stream(vec![
            Ok(b"partial".as_slice()),
            Err(ApiError {
                kind: FailureKind::Stream,
                message: "connection reset".to_string(),
            }),
            Ok(b"unreachable".as_slice()),
        ]))
    };

    pump_stream(open, 2, CancellationToken::new(), &sink).await;

    let events = sink.take();
    assert_eq!(chunks_of(&events), vec!["partial"]);
    match events.last() {
        Some(EngineEvent::StreamFinished {
            request: 2,
            result: Err(err),
        }) => assert_eq!(err.kind, FailureKind::Stream),
        other => panic!("unexpected final event {other:?}"),
    }
}

#[tokio::test]
async fn open_failure_finishes_without_chunks() {
    let sink = TestSink::new();
    let open = async { Err::<TextStream, _>(network_error("refused")) };

    pump_stream(open, 5, CancellationToken::new(), &sink).await;

    let events = sink.take();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        EngineEvent::StreamFinished {
            request: 5,
            result: Err(ApiError {
                kind: FailureKind::Network,
                ..
            }),
        }
    ));
}

#[tokio::test]
async fn cancelled_stream_reports_cancellation() {
    let sink = TestSink::new();
    let token = CancellationToken::new();
    token.cancel();
    let open = async { Ok(decode_text_stream(stream::pending::<Result<Bytes, ApiError>>())) };

    pump_stream(open, 6, token, &sink).await;

    let events = sink.take();
    assert!(matches!(
        &events[..],
        [EngineEvent::StreamFinished {
            request: 6,
            result: Err(ApiError {
                kind: FailureKind::Cancelled,
                ..
            }),
        }]
    ));
}
