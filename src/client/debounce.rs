use tokio::time::{sleep_until, Duration, Instant};

/// Holds the last value that has been quiet for `delay`. Each `push` restarts
/// the clock.
#[derive(Debug)]
pub struct Debounce<T> {
    delay: Duration,
    settled: T,
    pending: Option<(T, Instant)>,
}

impl<T> Debounce<T> {
    pub fn new(delay: Duration, initial: T) -> Self {
        Self {
            delay,
            settled: initial,
            pending: None,
        }
    }

    pub fn push(&mut self, value: T) {
        self.pending = Some((value, Instant::now() + self.delay));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The most recent value, settled or not.
    pub fn latest(&self) -> &T {
        self.pending.as_ref().map_or(&self.settled, |(v, _)| v)
    }

    /// The settled value, promoting the pending one if it has gone quiet.
    pub fn settle(&mut self) -> &T {
        let due = matches!(
            &self.pending,
            Some((_, deadline)) if Instant::now() >= *deadline
        );
        if due {
            if let Some((value, _)) = self.pending.take() {
                self.settled = value;
            }
        }
        &self.settled
    }

    /// Wait out the pending value, if any, then return the settled one.
    pub async fn settled(&mut self) -> &T {
        if let Some((_, deadline)) = &self.pending {
            sleep_until(*deadline).await;
        }
        self.settle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn test_only_quiet_values_settle() {
        let mut search = Debounce::new(Duration::from_millis(300), String::new());
        search.push("m".to_string());
        advance(Duration::from_millis(200)).await;
        search.push("mi".to_string());
        advance(Duration::from_millis(200)).await;

        assert_eq!(search.settle(), "");
        assert_eq!(search.latest(), "mi");
        assert!(search.is_pending());

        advance(Duration::from_millis(100)).await;
        assert_eq!(search.settle(), "mi");
        assert!(!search.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_settled_waits_for_deadline() {
        let mut search = Debounce::new(Duration::from_millis(300), 0);
        assert_eq!(*search.settled().await, 0);

        let start = Instant::now();
        search.push(7);
        assert_eq!(*search.settled().await, 7);
        assert!(start.elapsed() >= Duration::from_millis(300));
    }
}
