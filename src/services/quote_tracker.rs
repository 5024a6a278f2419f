//! Stale quote suppression.
//!
//! Callers re-quote on every input change. Each request takes a ticket; only the holder of
//! the newest ticket may publish a result.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::error::Result;

/// Default wait after the last input change before quoting.
pub const DEFAULT_QUOTE_DEBOUNCE: Duration = Duration::from_millis(500);

/// Identifies one quote request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct QuoteTicket(u64);

/// Issues monotonic tickets and tells whether a request was superseded.
#[derive(Debug)]
pub struct QuoteRequestTracker {
    current: AtomicU64,
    debounce: Duration,
}

impl QuoteRequestTracker {
    pub fn new(debounce: Duration) -> Self {
        Self { current: AtomicU64::new(0), debounce }
    }

    /// Start a request, superseding every earlier one.
    pub fn begin(&self) -> QuoteTicket {
        QuoteTicket(self.current.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: QuoteTicket) -> bool {
        self.current.load(Ordering::SeqCst) == ticket.0
    }

    /// Supersede any in-flight request without starting a new one.
    pub fn invalidate(&self) {
        self.current.fetch_add(1, Ordering::SeqCst);
    }

    /// Debounce, then run `quote` unless a newer request arrived.
    ///
    /// `None` means the request was superseded, either while waiting or while the quote
    /// was in flight; its result is dropped.
    pub async fn debounced_quote<T, F, Fut>(&self, quote: F) -> Option<Result<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let ticket = self.begin();

        tokio::time::sleep(self.debounce).await;
        if !self.is_current(ticket) {
            return None;
        }

        let result = quote().await;
        if !self.is_current(ticket) {
            tracing::debug!(ticket = ticket.0, "Dropping stale quote result");
            return None;
        }
        Some(result)
    }
}

impl Default for QuoteRequestTracker {
    fn default() -> Self {
        Self::new(DEFAULT_QUOTE_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_tickets_supersede() {
        let tracker = QuoteRequestTracker::default();
        let first = tracker.begin();
        let second = tracker.begin();

        assert!(second > first);
        assert!(!tracker.is_current(first));
        assert!(tracker.is_current(second));

        tracker.invalidate();
        assert!(!tracker.is_current(second));
    }

    #[tokio::test]
    async fn test_debounce_drops_superseded_request() {
        let tracker = QuoteRequestTracker::new(Duration::from_millis(40));

        let first = tracker.debounced_quote(|| async { Ok::<_, AppError>(1) });
        let second = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            tracker.debounced_quote(|| async { Ok::<_, AppError>(2) }).await
        };

        let (first, second) = tokio::join!(first, second);
        assert!(first.is_none());
        assert_eq!(second.unwrap().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_result_arriving_after_newer_request_is_dropped() {
        let tracker = QuoteRequestTracker::new(Duration::from_millis(1));

        let slow = tracker.debounced_quote(|| async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok::<_, AppError>("old")
        });
        let newer = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            tracker.debounced_quote(|| async { Ok::<_, AppError>("new") }).await
        };

        let (slow, newer) = tokio::join!(slow, newer);
        assert!(slow.is_none());
        assert_eq!(newer.unwrap().unwrap(), "new");
    }

    #[tokio::test]
    async fn test_errors_are_returned_to_current_request() {
        let tracker = QuoteRequestTracker::new(Duration::from_millis(1));
        let result =
            tracker.debounced_quote(|| async { Err::<u8, _>(AppError::PairNotFound) }).await;
        assert!(matches!(result, Some(Err(AppError::PairNotFound))));
    }
}
