//! Fixed-window attempt limiter keyed by client and endpoint.

use std::sync::Arc;

use dashmap::DashMap;
use time::{Duration, OffsetDateTime};

use super::clock::Clock;
use super::error::DomainError;

/// Throttled entry points. Each has its own counter per client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    SignIn,
    SignUp,
    MagicLink,
}

impl Endpoint {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SignIn => "sign_in",
            Self::SignUp => "sign_up",
            Self::MagicLink => "magic_link",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started_at: OffsetDateTime,
    count: u32,
}

pub struct RateLimiter {
    max_attempts: u32,
    window: Duration,
    clock: Arc<dyn Clock>,
    windows: DashMap<(String, Endpoint), Window>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(max_attempts: u32, window: std::time::Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            max_attempts,
            window: Duration::try_from(window).unwrap_or(Duration::MAX),
            clock,
            windows: DashMap::new(),
        }
    }

    /// Counts one attempt for `(client_key, endpoint)`.
    ///
    /// The shard lock held by the entry makes check-and-increment atomic per
    /// key. Refused attempts are not counted.
    ///
    /// # Errors
    /// `DomainError::RateLimited` once the window's quota is spent.
    pub fn check(&self, client_key: &str, endpoint: Endpoint) -> Result<(), DomainError> {
        let now = self.clock.now();
        let mut entry = self
            .windows
            .entry((client_key.to_owned(), endpoint))
            .or_insert(Window {
                started_at: now,
                count: 0,
            });

        if now - entry.started_at >= self.window {
            *entry = Window {
                started_at: now,
                count: 0,
            };
        }

        if entry.count >= self.max_attempts {
            tracing::warn!(
                endpoint = endpoint.as_str(),
                "rate limit exceeded for client"
            );
            return Err(DomainError::RateLimited);
        }

        entry.count += 1;
        Ok(())
    }

    /// Drops windows that have fully elapsed. Returns how many were removed.
    pub fn evict_elapsed(&self) -> usize {
        let now = self.clock.now();
        let before = self.windows.len();
        self.windows
            .retain(|_, window| now - window.started_at < self.window);
        before.saturating_sub(self.windows.len())
    }

    #[must_use]
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::ManualClock;

    fn limiter(max: u32, clock: &Arc<ManualClock>) -> RateLimiter {
        RateLimiter::new(
            max,
            std::time::Duration::from_secs(180),
            Arc::clone(clock) as Arc<dyn Clock>,
        )
    }

    #[test]
    fn denies_attempt_past_the_cap_until_window_elapses() {
        let clock = Arc::new(ManualClock::new(OffsetDateTime::UNIX_EPOCH));
        let limiter = limiter(10, &clock);

        for _ in 0..10 {
            assert!(limiter.check("10.0.0.1", Endpoint::SignUp).is_ok());
        }
        assert!(matches!(
            limiter.check("10.0.0.1", Endpoint::SignUp),
            Err(DomainError::RateLimited)
        ));

        clock.advance(Duration::minutes(2));
        assert!(limiter.check("10.0.0.1", Endpoint::SignUp).is_err());

        clock.advance(Duration::minutes(1));
        assert!(limiter.check("10.0.0.1", Endpoint::SignUp).is_ok());
    }

    #[test]
    fn keys_and_endpoints_are_independent() {
        let clock = Arc::new(ManualClock::default());
        let limiter = limiter(1, &clock);

        assert!(limiter.check("a", Endpoint::SignIn).is_ok());
        assert!(limiter.check("a", Endpoint::SignIn).is_err());
        assert!(limiter.check("a", Endpoint::MagicLink).is_ok());
        assert!(limiter.check("b", Endpoint::SignIn).is_ok());
    }

    #[test]
    fn evicts_only_elapsed_windows() {
        let clock = Arc::new(ManualClock::new(OffsetDateTime::UNIX_EPOCH));
        let limiter = limiter(5, &clock);

        assert!(limiter.check("old", Endpoint::SignIn).is_ok());
        clock.advance(Duration::minutes(2));
        assert!(limiter.check("new", Endpoint::SignIn).is_ok());
        clock.advance(Duration::minutes(1));

        assert_eq!(limiter.evict_elapsed(), 1);
        assert_eq!(limiter.tracked_keys(), 1);
    }

    #[test]
    fn concurrent_attempts_never_exceed_cap() {
        let clock = Arc::new(ManualClock::default());
        let limiter = Arc::new(limiter(25, &clock));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                std::thread::spawn(move || {
                    (0..10)
                        .filter(|_| limiter.check("shared", Endpoint::SignUp).is_ok())
                        .count()
                })
            })
            .collect();

        let allowed: usize = handles
            .into_iter()
            .map(|h| h.join().unwrap_or_default())
            .sum();
        assert_eq!(allowed, 25);
    }
}
