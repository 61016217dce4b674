use std::time::Duration;

use rfp_core::{PollTarget, RequestId};
use rfp_logging::{rfp_debug, rfp_warn};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::{EngineEvent, EventSink, RfpApi};

/// Poll `target` every `interval` (first tick immediately) until a
/// successful tick reports nothing in progress, or `token` is cancelled.
///
/// Failed ticks are logged and reported but never end the loop.
/// `EngineEvent::PollStopped` is always emitted on exit.
pub async fn run_poller(
    api: &dyn RfpApi,
    request: RequestId,
    target: PollTarget,
    interval: Duration,
    token: CancellationToken,
    sink: &dyn EventSink,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut ticks: u64 = 0;

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                rfp_debug!("Poll {} cancelled after {} ticks", request, ticks);
                break;
            }
            _ = ticker.tick() => {}
        }

        let result = tokio::select! {
            _ = token.cancelled() => {
                rfp_debug!("Poll {} cancelled mid-request", request);
                break;
            }
            result = api.poll(&target) => result,
        };
        ticks += 1;

        let done = match &result {
            Ok(update) => !update.keeps_polling(),
            Err(err) => {
                rfp_warn!("Poll {} tick {} for {:?} failed: {}", request, ticks, target, err);
                false
            }
        };
        sink.emit(EngineEvent::Polled { request, result });
        if done {
            rfp_debug!("Poll {} finished after {} ticks", request, ticks);
            break;
        }
    }

    sink.emit(EngineEvent::PollStopped { request });
}
