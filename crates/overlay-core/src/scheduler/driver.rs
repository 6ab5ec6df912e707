use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use super::RecomputeScheduler;

/// Run the move debounce on the current task until `moves` closes.
///
/// Every received `()` is a map move. Once moves have been quiet for `delay`
/// the loop yields to the runtime and then calls `on_idle`. A debounce still
/// pending when the channel closes is flushed the same way. Returns the
/// number of passes run.
pub async fn run_move_loop<F>(
    mut moves: mpsc::UnboundedReceiver<()>,
    delay: Duration,
    mut on_idle: F,
) -> usize
where
    F: FnMut(),
{
    let mut scheduler = RecomputeScheduler::new(delay);
    let mut passes = 0;

    loop {
        let deadline = scheduler.deadline().map(Instant::from_std);
        let sleep = tokio::time::sleep_until(deadline.unwrap_or_else(|| Instant::now() + delay));

        tokio::select! {
            received = moves.recv() => {
                let Some(()) = received else {
                    break;
                };
                scheduler.notify(Instant::now().into_std());
            }
            _ = sleep, if deadline.is_some() => {
                if scheduler.poll(Instant::now().into_std()) {
                    passes += run_at_idle(&mut scheduler, &mut on_idle).await;
                }
            }
        }
    }

    if scheduler.flush() {
        passes += run_at_idle(&mut scheduler, &mut on_idle).await;
    }
    tracing::debug!(passes, "move loop stopped");
    passes
}

async fn run_at_idle<F: FnMut()>(scheduler: &mut RecomputeScheduler, on_idle: &mut F) -> usize {
    tokio::task::yield_now().await;
    if scheduler.take_idle() {
        on_idle();
        1
    } else {
        0
    }
}
