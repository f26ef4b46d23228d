//! Held-key repeat
//!
//! A held D-pad key repeats its command on a fixed interval until released.
//! The repeat is an explicit task with a handle tied to the press/release
//! pair: releasing (or dropping) the handle aborts the task, so a lost
//! release event cannot leak a free-running dispatch loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::command::Command;
use crate::device::Device;
use crate::dispatch::Dispatcher;

/// Interval between repeated dispatches of a held key
pub const REPEAT_INTERVAL: Duration = Duration::from_millis(150);

/// Handle to a running key-repeat task
///
/// Obtained from [`KeyRepeat::start`] on press; call
/// [`KeyRepeat::release`] on release. Dropping the handle has the same
/// effect, covering component teardown mid-press.
pub struct KeyRepeat {
    task: JoinHandle<()>,
}

impl KeyRepeat {
    /// Start repeating a command against a device
    ///
    /// The first dispatch happens immediately; subsequent ones follow every
    /// `interval`. Individual failures are logged and do not stop the
    /// repeat; the user is still holding the key.
    #[must_use]
    pub fn start(
        dispatcher: Arc<Dispatcher>,
        device: Device,
        command: Command,
        interval: Duration,
    ) -> Self {
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let outcome = dispatcher.send_command(Some(&device), &command).await;
                if !outcome.success {
                    tracing::debug!(
                        device = %device.name,
                        command = %command,
                        "repeat dispatch failed"
                    );
                }
            }
        });
        Self { task }
    }

    /// Stop repeating (the key was released)
    pub fn release(self) {
        self.task.abort();
    }

    /// Whether the repeat task is still running
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for KeyRepeat {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::device::Brand;
    use crate::transport::{
        Delivery, Envelope, Transport, TransportError, TransportKind,
    };

    struct CountingTransport {
        sends: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Transport for CountingTransport {
        fn kind(&self) -> TransportKind {
            TransportKind::Direct
        }

        async fn probe(&self, _device: &Device) -> bool {
            true
        }

        async fn send(&self, _envelope: Envelope<'_>) -> Result<Delivery, TransportError> {
            self.sends.fetch_add(1, Ordering::SeqCst);
            Ok(Delivery::unconfirmed())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn repeat_dispatches_on_the_interval_until_released() {
        let sends = Arc::new(AtomicUsize::new(0));
        let dispatcher = Arc::new(Dispatcher::with_strategies(
            vec![Arc::new(CountingTransport {
                sends: Arc::clone(&sends),
            })],
            Duration::from_secs(8),
        ));
        let device = Device::new("tv", Brand::Roku, "192.168.1.50");

        let repeat = KeyRepeat::start(
            dispatcher,
            device,
            Command::Down,
            Duration::from_millis(150),
        );

        // First tick fires immediately, then one per interval.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(sends.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(310)).await;
        assert_eq!(sends.load(Ordering::SeqCst), 3);

        repeat.release();
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(sends.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_stops_the_repeat() {
        let sends = Arc::new(AtomicUsize::new(0));
        let dispatcher = Arc::new(Dispatcher::with_strategies(
            vec![Arc::new(CountingTransport {
                sends: Arc::clone(&sends),
            })],
            Duration::from_secs(8),
        ));
        let device = Device::new("tv", Brand::Roku, "192.168.1.50");

        {
            let _repeat = KeyRepeat::start(
                dispatcher,
                device,
                Command::Up,
                Duration::from_millis(150),
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let after_drop = sends.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(sends.load(Ordering::SeqCst), after_drop);
    }
}
