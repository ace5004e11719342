// ── Location resolution ──
//
// Devices carry a free-text location. Coordinates written as "lat, lon" are
// used as-is; anything else is geocoded with a bounded number of attempts.
// Successful lookups are cached for the lifetime of the process, failed ones
// for `FAILURE_TTL`. Each poll gets a geocoding budget; once it is spent the
// remaining devices fall back to `(0.0, 0.0)`.

use std::collections::HashMap;
use std::time::Duration;

use respondd_api::NominatimClient;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::model::Coordinates;

const DEFAULT_ATTEMPTS: u32 = 3;
const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);
const DEFAULT_BUDGET: Duration = Duration::from_secs(30);
const FAILURE_TTL: Duration = Duration::from_secs(3600);

/// Parse `"lat, lon"` or `"lat lon"` in decimal degrees.
pub fn parse_point(text: &str) -> Option<Coordinates> {
    let mut parts = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty());
    let latitude: f64 = parts.next()?.parse().ok()?;
    let longitude: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    let valid = latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude);
    valid.then(|| Coordinates::new(latitude, longitude))
}

#[derive(Debug, Clone, Copy)]
enum Cached {
    Found(Coordinates),
    Failed { at: Instant },
}

/// Resolves free-text locations to coordinates.
pub struct Locator {
    geocoder: Option<NominatimClient>,
    // Only held for lookups and inserts, never across a request.
    cache: Mutex<HashMap<String, Cached>>,
    attempts: u32,
    backoff: Duration,
    budget: Duration,
}

impl Locator {
    /// Without a geocoder only literal coordinates resolve.
    pub fn new(geocoder: Option<NominatimClient>) -> Self {
        Self {
            geocoder,
            cache: Mutex::new(HashMap::new()),
            attempts: DEFAULT_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
            budget: DEFAULT_BUDGET,
        }
    }

    /// Override the attempt count and the initial backoff (doubled after
    /// every failed attempt).
    #[must_use]
    pub fn with_retry(mut self, attempts: u32, backoff: Duration) -> Self {
        self.attempts = attempts.max(1);
        self.backoff = backoff;
        self
    }

    /// Override the total geocoding time allowed per poll.
    #[must_use]
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    /// End of the geocoding budget for a poll starting now.
    pub fn deadline(&self) -> Instant {
        Instant::now() + self.budget
    }

    /// Resolve `location`, falling back to `(0.0, 0.0)`.
    pub async fn resolve(&self, location: &str) -> Coordinates {
        self.resolve_until(location, self.deadline()).await
    }

    /// Like [`resolve`](Self::resolve), but gives up at `deadline`.
    ///
    /// A lookup cut off by the deadline counts as failed. Once the deadline
    /// has passed, uncached addresses are not looked up at all.
    pub async fn resolve_until(&self, location: &str, deadline: Instant) -> Coordinates {
        let location = location.trim();
        if location.is_empty() {
            return Coordinates::default();
        }
        if let Some(point) = parse_point(location) {
            return point;
        }
        let Some(geocoder) = &self.geocoder else {
            return Coordinates::default();
        };

        match self.cache.lock().await.get(location) {
            Some(Cached::Found(point)) => return *point,
            Some(Cached::Failed { at }) if at.elapsed() < FAILURE_TTL => {
                return Coordinates::default();
            }
            _ => {}
        }
        if Instant::now() >= deadline {
            debug!(location, "geocoding budget spent, skipping lookup");
            return Coordinates::default();
        }

        let entry = match tokio::time::timeout_at(deadline, self.search(geocoder, location)).await
        {
            Ok(Some(point)) => Cached::Found(point),
            Ok(None) => Cached::Failed { at: Instant::now() },
            Err(_) => {
                warn!(location, "geocoding budget exceeded");
                Cached::Failed { at: Instant::now() }
            }
        };
        self.cache.lock().await.insert(location.to_owned(), entry);

        match entry {
            Cached::Found(point) => point,
            Cached::Failed { .. } => Coordinates::default(),
        }
    }

    async fn search(&self, geocoder: &NominatimClient, location: &str) -> Option<Coordinates> {
        let mut delay = self.backoff;
        for attempt in 1..=self.attempts {
            match geocoder.search(location).await {
                Ok((latitude, longitude)) => {
                    debug!(location, latitude, longitude, "geocoded");
                    return Some(Coordinates::new(latitude, longitude));
                }
                Err(e) if !e.is_transient() => {
                    warn!(location, error = %e, "geocoding failed");
                    return None;
                }
                Err(e) => {
                    warn!(location, attempt, error = %e, "geocoding attempt failed");
                    if attempt < self.attempts {
                        tokio::time::sleep(delay).await;
                        delay = delay.saturating_mul(2);
                    }
                }
            }
        }
        None
    }
}
