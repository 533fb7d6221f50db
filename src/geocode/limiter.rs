use std::thread;
use std::time::{Duration, Instant};

use tracing::warn;

use crate::config::GeocoderConfig;
use crate::types::LatLon;
use super::{GeocodeError, Geocoder};

/// Spaces requests at least `min_delay` apart and retries failed ones.
///
/// A lookup still failing after `max_retries` retries is reported as a miss.
pub struct RateLimiter<G> {
    inner: G,
    min_delay: Duration,
    max_retries: u32,
    retry_wait: Duration,
    last_call: Option<Instant>,
}

impl<G: Geocoder> RateLimiter<G> {
    pub fn new(inner: G, min_delay: Duration) -> Self {
        Self {
            inner,
            min_delay,
            max_retries: 3,
            retry_wait: Duration::from_secs(5),
            last_call: None,
        }
    }

    pub fn with_retries(mut self, max_retries: u32, retry_wait: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_wait = retry_wait;
        self
    }

    pub fn from_config(inner: G, config: &GeocoderConfig) -> Self {
        Self::new(inner, Duration::from_millis(config.min_delay_ms))
            .with_retries(config.max_retries, Duration::from_millis(config.retry_wait_ms))
    }

    pub fn into_inner(self) -> G { self.inner }

    /// Sleep until `min_delay` has passed since the previous request.
    fn throttle(&mut self) {
        if let Some(last) = self.last_call {
            let elapsed = last.elapsed();
            if elapsed < self.min_delay {
                thread::sleep(self.min_delay - elapsed);
            }
        }
        self.last_call = Some(Instant::now());
    }
}

impl<G: Geocoder> Geocoder for RateLimiter<G> {
    fn resolve(&mut self, query: &str) -> Result<Option<LatLon>, GeocodeError> {
        for attempt in 0..=self.max_retries {
            self.throttle();
            match self.inner.resolve(query) {
                Ok(found) => return Ok(found),
                Err(err) if attempt < self.max_retries => {
                    warn!(%query, attempt = attempt + 1, error = %err, "geocoding failed; retrying");
                    thread::sleep(self.retry_wait);
                }
                Err(err) => {
                    warn!(%query, attempts = attempt + 1, error = %err, "geocoding failed; giving up");
                }
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fails a fixed number of times, then finds everything.
    struct Flaky {
        failures_left: u32,
        calls: u32,
    }

    impl Geocoder for Flaky {
        fn resolve(&mut self, _query: &str) -> Result<Option<LatLon>, GeocodeError> {
            self.calls += 1;
            if self.failures_left > 0 {
                self.failures_left -= 1;
                return Err(GeocodeError::Malformed("temporarily unavailable".into()));
            }
            Ok(Some(LatLon::new(51.0, 10.0)))
        }
    }

    fn limiter(failures: u32, max_retries: u32) -> RateLimiter<Flaky> {
        RateLimiter::new(Flaky { failures_left: failures, calls: 0 }, Duration::ZERO)
            .with_retries(max_retries, Duration::ZERO)
    }

    #[test]
    fn retries_until_success() {
        let mut geocoder = limiter(2, 3);
        assert_eq!(geocoder.resolve("Kassel").unwrap(), Some(LatLon::new(51.0, 10.0)));
        assert_eq!(geocoder.into_inner().calls, 3);
    }

    #[test]
    fn exhausted_retries_become_a_miss() {
        let mut geocoder = limiter(10, 3);
        assert_eq!(geocoder.resolve("Kassel").unwrap(), None);
        assert_eq!(geocoder.into_inner().calls, 4);
    }

    #[test]
    fn requests_are_spaced() {
        let mut geocoder = RateLimiter::new(Flaky { failures_left: 0, calls: 0 }, Duration::from_millis(30));
        let start = Instant::now();
        geocoder.resolve("a").unwrap();
        geocoder.resolve("b").unwrap();
        geocoder.resolve("c").unwrap();
        assert!(start.elapsed() >= Duration::from_millis(60));
    }
}
