//! Task-based flavour of the outbound notifier for multi-threaded hosts.
//!
//! Edits go into an unbounded channel; one tokio task takes them out in
//! order, waits `delay`, and sends. Since the task handles one message at a
//! time, that reproduces the queue semantics of
//! [`OutboundNotifier`](crate::notifier::OutboundNotifier): the first message
//! into an idle queue waits `delay`, and back-to-back messages go out at
//! least `delay` apart.

use std::time::{Duration, Instant};

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::error::{Result, SimscopeError};
use crate::notifier::Notify;
use crate::sink::{OutboundMessage, Transport};

pub struct AsyncNotifier {
    tx: UnboundedSender<OutboundMessage>,
    task: JoinHandle<()>,
}

impl AsyncNotifier {
    /// Start the delivery task on the current tokio runtime.
    pub fn spawn<T>(transport: T, delay: Duration) -> Self
    where
        T: Transport + Send + 'static,
    {
        let (tx, rx) = unbounded_channel();
        let task = tokio::spawn(run(rx, transport, delay));
        Self { tx, task }
    }

    /// Queue `message` for delivery.
    pub fn send(&self, message: OutboundMessage) -> Result<()> {
        self.tx
            .send(message)
            .map_err(|_| SimscopeError::Transport("notifier task has stopped".to_string()))
    }

    /// Stop accepting messages and wait until everything queued is delivered.
    /// Does not return while the transport keeps failing.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.task.await {
            log::warn!("notifier task ended abnormally: {e}");
        }
    }
}

impl Notify for AsyncNotifier {
    fn notify(&mut self, message: OutboundMessage, _now: Instant) {
        if let Err(e) = self.send(message) {
            log::warn!("dropping {message}: {e}");
        }
    }
}

async fn run<T: Transport>(
    mut rx: UnboundedReceiver<OutboundMessage>,
    mut transport: T,
    delay: Duration,
) {
    while let Some(message) = rx.recv().await {
        let text = message.to_string();
        let mut attempt = 0u64;
        loop {
            tokio::time::sleep(delay).await;
            attempt += 1;
            match transport.send_text(&text) {
                Ok(()) => {
                    if attempt > 1 {
                        log::info!("sent {text} after {attempt} attempts");
                    }
                    break;
                }
                Err(e) if attempt == 1 => log::warn!("send of {text} failed, retrying: {e}"),
                Err(e) => log::debug!("send of {text} failed (attempt {attempt}): {e}"),
            }
        }
    }
    log::debug!("outbound notifier task finished");
}
