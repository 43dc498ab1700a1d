use rand::Rng;

use crate::error::CrawlError;

/// Per-attempt retry policy: bounded attempts, randomized backoff, error-kind-aware give-up.
///
/// Created fresh for each download attempt. `seconds()` before any error has been
/// registered returns `Some(0)` so the first try is immediate.
pub struct RetryStrategy {
    attempts_left: u32,
    lower: u64,
    upper: u64,
    last_retryable: bool,
    started: bool,
}

impl RetryStrategy {
    pub fn new(max_attempts: u32, lower_seconds: u64, upper_seconds: u64) -> Self {
        Self {
            attempts_left: max_attempts,
            lower: lower_seconds,
            upper: upper_seconds,
            last_retryable: true,
            started: false,
        }
    }

    /// Consume one attempt's budget and classify the error. A terminal error kind
    /// (permanent HTTP status, non-retryable URL error) immediately exhausts the budget.
    pub fn register_error(&mut self, err: &CrawlError) {
        self.started = true;
        self.attempts_left = self.attempts_left.saturating_sub(1);
        self.last_retryable = !err.is_terminal();
        if err.is_terminal() {
            self.attempts_left = 0;
        }
    }

    /// Returns the next sleep delay in seconds, or `None` ("done") if the budget is
    /// exhausted or the last registered error was non-retryable.
    pub fn seconds(&self) -> Option<u64> {
        if !self.started {
            return Some(0);
        }
        if self.attempts_left == 0 || !self.last_retryable {
            return None;
        }
        if self.lower >= self.upper {
            return Some(self.lower);
        }
        Some(rand::thread_rng().gen_range(self.lower..=self.upper))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_call_is_immediate() {
        let retrier = RetryStrategy::new(3, 5, 15);
        assert_eq!(retrier.seconds(), Some(0));
    }

    #[test]
    fn exhausts_after_max_attempts() {
        let mut retrier = RetryStrategy::new(2, 1, 1);
        retrier.register_error(&CrawlError::Network("a".into()));
        assert_eq!(retrier.seconds(), Some(1));
        retrier.register_error(&CrawlError::Network("b".into()));
        assert_eq!(retrier.seconds(), None);
    }

    #[test]
    fn terminal_error_gives_up_immediately() {
        let mut retrier = RetryStrategy::new(5, 1, 1);
        retrier.register_error(&CrawlError::HttpPermanent {
            status: 404,
            url: "http://x/y".into(),
        });
        assert_eq!(retrier.seconds(), None);
    }
}
