use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Minimum delay before the pacer gives up for the day entirely.
const DAILY_LIMIT_DELAY: Duration = Duration::from_secs(30);
const MAX_DELAY: Duration = Duration::from_secs(60);

struct PacerState {
    last_request: Option<Instant>,
    delay: Duration,
}

/// Spaces requests at least `delay` apart, shared across concurrent tasks.
///
/// On a 429 the delay doubles (up to 60s); once it reaches 30s the source is
/// considered rate limited for the day and callers should stop issuing
/// requests until the flag is cleared.
pub struct RequestPacer {
    state: Mutex<PacerState>,
    daily_limit_reached: AtomicBool,
}

impl RequestPacer {
    pub fn new(initial_delay: Duration) -> Self {
        Self {
            state: Mutex::new(PacerState {
                last_request: None,
                delay: initial_delay,
            }),
            daily_limit_reached: AtomicBool::new(false),
        }
    }

    pub fn daily_limit_reached(&self) -> bool {
        self.daily_limit_reached.load(Ordering::Relaxed)
    }

    /// Used at the start of a new ingestion day.
    pub fn reset_daily_limit(&self) {
        self.daily_limit_reached.store(false, Ordering::Relaxed);
    }

    /// Waits until the next request slot.
    pub async fn acquire(&self) {
        let mut state = self.state.lock().await;
        let now = Instant::now();

        if let Some(last) = state.last_request {
            let elapsed = now.duration_since(last);
            if elapsed < state.delay {
                let wait = state.delay - elapsed;
                drop(state);
                tokio::time::sleep(wait).await;
                state = self.state.lock().await;
            }
        }

        state.last_request = Some(Instant::now());
    }

    /// Doubles the delay after a rate-limit response.
    pub async fn backoff(&self) {
        let mut state = self.state.lock().await;
        state.delay = (state.delay * 2).min(MAX_DELAY);
        tracing::warn!(
            "rate limit hit, increasing request delay to {:.0}s",
            state.delay.as_secs_f64()
        );

        if state.delay >= DAILY_LIMIT_DELAY {
            self.daily_limit_reached.store(true, Ordering::Relaxed);
            tracing::error!("daily rate limit likely reached");
        }
    }

    /// The current inter-request delay, for persisting across runs.
    pub async fn current_delay(&self) -> Duration {
        self.state.lock().await.delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn backoff_doubles_until_daily_limit() {
        let pacer = RequestPacer::new(Duration::from_secs(8));
        assert!(!pacer.daily_limit_reached());

        pacer.backoff().await; // 16s
        assert!(!pacer.daily_limit_reached());
        assert_eq!(pacer.current_delay().await, Duration::from_secs(16));

        pacer.backoff().await; // 32s, over the daily threshold
        assert!(pacer.daily_limit_reached());

        pacer.backoff().await; // clamped at 60s
        pacer.backoff().await;
        assert_eq!(pacer.current_delay().await, Duration::from_secs(60));

        pacer.reset_daily_limit();
        assert!(!pacer.daily_limit_reached());
    }

    #[tokio::test]
    async fn acquire_spaces_requests() {
        tokio::time::pause();
        let pacer = RequestPacer::new(Duration::from_millis(100));

        let start = Instant::now();
        pacer.acquire().await;
        pacer.acquire().await;
        // The second acquire must wait out the configured delay.
        assert!(start.elapsed() >= Duration::from_millis(100));
    }
}
