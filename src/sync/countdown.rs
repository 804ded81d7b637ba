// src/sync/countdown.rs

use std::{future::Future, time::Duration};

use tokio::{task::JoinHandle, time::Instant};

/// Single per-question countdown. Arming a new one cancels the previous,
/// so there is never more than one timer driving the advance logic.
#[derive(Debug, Default)]
pub struct Countdown {
    handle: Option<JoinHandle<()>>,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires `on_expire` once `remaining` has elapsed, checking every `tick`.
    ///
    /// `on_expire` runs on its own task, so it may re-arm or cancel this
    /// countdown without aborting itself.
    pub fn arm<F, Fut>(&mut self, remaining: Duration, tick: Duration, on_expire: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();

        let deadline = Instant::now() + remaining;
        self.handle = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick.max(Duration::from_millis(1)));
            loop {
                interval.tick().await;
                if Instant::now() >= deadline {
                    break;
                }
            }
            tokio::spawn(on_expire());
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    #[cfg(test)]
    fn is_armed(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    #[tokio::test]
    async fn fires_once_after_deadline() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut countdown = Countdown::new();

        let counter = fired.clone();
        countdown.arm(Duration::from_millis(50), Duration::from_millis(10), move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(countdown.is_armed());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!countdown.is_armed());
    }

    #[tokio::test]
    async fn rearming_cancels_the_previous_timer() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut countdown = Countdown::new();

        for _ in 0..3 {
            let counter = fired.clone();
            countdown.arm(Duration::from_millis(80), Duration::from_millis(10), move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        let counter = fired.clone();
        countdown.arm(Duration::from_millis(50), Duration::from_millis(10), move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        countdown.cancel();
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
