//! Page load wait/notify primitive
//!
//! Kept apart from the context state lock: a waiter here never holds, and is
//! never blocked by, the lock guarding frame transitions.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use tracing::debug;

use crate::Error;

#[derive(Debug, Default)]
pub struct PageLoadSignal {
    notify: Notify,
    in_flight: AtomicBool,
    loads: AtomicU64,
}

impl PageLoadSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for the next load signal
    pub async fn wait(&self, timeout: Duration) -> Result<(), Error> {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();

        tokio::time::timeout(timeout, notified)
            .await
            .map_err(|_| Error::timeout(format!("No page load event within {:?}", timeout)))
    }

    /// Wait for the load in flight, if any
    pub async fn wait_in_flight(&self, timeout: Duration) -> Result<(), Error> {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();

        if !self.in_flight() {
            return Ok(());
        }

        debug!("Waiting for in-flight page load");
        tokio::time::timeout(timeout, notified)
            .await
            .map_err(|_| Error::timeout(format!("Page still loading after {:?}", timeout)))
    }

    pub fn started(&self) {
        self.in_flight.store(true, Ordering::SeqCst);
    }

    /// Wake every current waiter
    pub fn signal(&self) {
        self.in_flight.store(false, Ordering::SeqCst);
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Number of loads signalled so far
    pub fn loads(&self) -> u64 {
        self.loads.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_signal_wakes_all_waiters() {
        let signal = Arc::new(PageLoadSignal::new());

        let waiters: Vec<_> = (0..3)
            .map(|_| {
                let signal = Arc::clone(&signal);
                tokio::spawn(async move { signal.wait(Duration::from_secs(5)).await })
            })
            .collect();

        tokio::time::sleep(Duration::from_millis(50)).await;
        signal.signal();

        for waiter in waiters {
            assert!(waiter.await.unwrap().is_ok());
        }
        assert_eq!(signal.loads(), 1);
    }

    #[tokio::test]
    async fn test_wait_times_out() {
        let signal = PageLoadSignal::new();
        let result = signal.wait(Duration::from_millis(30)).await;
        assert!(matches!(result, Err(Error::Timeout(_))));
    }

    #[tokio::test]
    async fn test_wait_in_flight() {
        let signal = Arc::new(PageLoadSignal::new());
        tokio_test::assert_ok!(signal.wait_in_flight(Duration::from_millis(10)).await);

        signal.started();
        let waiter = {
            let signal = Arc::clone(&signal);
            tokio::spawn(async move { signal.wait_in_flight(Duration::from_secs(5)).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        signal.signal();

        assert!(waiter.await.unwrap().is_ok());
        assert!(!signal.in_flight());
    }
}
