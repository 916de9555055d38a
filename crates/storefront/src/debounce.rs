//! Trailing-edge debouncing over tokio channels.
//!
//! A debounced channel propagates a value only once the input has been quiet
//! for the whole window: every new value cancels the pending timer and
//! starts a new one, and intermediate values are dropped, not queued. The
//! cart store uses this to coalesce bursts of mutations into a single
//! durable write.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};

/// Channel capacity for the debounced output.
const OUTPUT_CAPACITY: usize = 16;

/// Debounce `input`, yielding only values that stayed current for `window`.
///
/// The returned receiver closes after the input closes and any final pending
/// value has been flushed. Dropping the returned receiver stops the worker.
pub fn debounce<T: Send + 'static>(
    mut input: mpsc::Receiver<T>,
    window: Duration,
) -> mpsc::Receiver<T> {
    let (tx, rx) = mpsc::channel(OUTPUT_CAPACITY);

    tokio::spawn(async move {
        let mut pending: Option<T> = None;
        let timer = sleep(window);
        tokio::pin!(timer);

        loop {
            tokio::select! {
                next = input.recv() => match next {
                    Some(value) => {
                        // A newer value supersedes whatever was waiting.
                        pending = Some(value);
                        timer.as_mut().reset(Instant::now() + window);
                    }
                    None => {
                        // Input closed: flush the final value, then stop.
                        if let Some(value) = pending.take() {
                            let _ = tx.send(value).await;
                        }
                        break;
                    }
                },
                () = timer.as_mut(), if pending.is_some() => {
                    if let Some(value) = pending.take()
                        && tx.send(value).await.is_err()
                    {
                        break;
                    }
                }
            }
        }
    });

    rx
}
