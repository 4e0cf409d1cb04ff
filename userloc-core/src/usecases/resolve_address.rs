use std::time::Duration;

use crate::{
    cache::{CacheEntry, GeocodeCache},
    entities::*,
    gateways::geocode::{GeocodedPlace, GeocodingGateway, Lookup, TransportError},
};

pub const DEFAULT_COUNTRY: &str = "Brasil";

const NEIGHBOURHOOD_BOUNDS_PAD_DEG: f64 = 0.01;

/// How often and how patiently a failed request is repeated.
///
/// Only transport failures are retried, never a "no match".
#[rustfmt::skip]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts    : u32,
    pub initial_backoff : Duration,
    pub max_backoff     : Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// The delay after the given (1-based) failed attempt.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// Outcome of a single query.
#[derive(Debug)]
pub enum QueryOutcome {
    Found(GeoLocation),
    NotFound,
    Failed(TransportError),
}

/// Outcome of resolving the whole fallback chain of an address.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Resolved {
        /// The key of the query that succeeded.
        key: NormalizedKey,
        location: GeoLocation,
    },
    Unresolved {
        attempted: Vec<NormalizedKey>,
        transport_failures: usize,
    },
}

/// Builds the queries for an address from the most to the least specific one:
///
/// 1. `neighborhood, city, state, country`
/// 2. `neighborhood, city, country`
/// 3. `city, state, country`
/// 4. `city, country`
///
/// Queries with missing parts are omitted. Without a city there is nothing to ask for.
pub fn fallback_queries(fragments: &AddressFragments, country: &str) -> Vec<String> {
    let (n, c, s) = (fragments.neighborhood(), fragments.city(), fragments.state());
    let country = Some(country.trim()).filter(|name| !name.is_empty());
    let chain: [&[Option<&str>]; 4] = [&[n, c, s], &[n, c], &[c, s], &[c]];
    let mut queries: Vec<String> = Vec::with_capacity(chain.len());
    let mut keys: Vec<NormalizedKey> = Vec::with_capacity(chain.len());
    for parts in chain {
        if parts.iter().any(Option::is_none) {
            continue;
        }
        let query = parts
            .iter()
            .flatten()
            .chain(country.iter())
            .copied()
            .collect::<Vec<_>>()
            .join(", ");
        let key = NormalizedKey::normalize(&query);
        if !keys.contains(&key) {
            keys.push(key);
            queries.push(query);
        }
    }
    queries
}

fn place_to_location(place: GeocodedPlace) -> GeoLocation {
    let GeocodedPlace {
        pos,
        display_name,
        bbox,
        neighbourhood_level,
    } = place;
    let (bounds, granularity) = if neighbourhood_level {
        let bounds = MapBbox::padded_around(pos, NEIGHBOURHOOD_BOUNDS_PAD_DEG);
        debug_assert!(bounds.contains_point(pos));
        (Some(bounds), Granularity::Neighborhood)
    } else {
        // Provider bounds must contain the hit
        let bounds = bbox.filter(|bbox| {
            let contained = bbox.contains_point(pos);
            if !contained {
                log::debug!("Ignore bounding box {bbox} that does not contain {pos}");
            }
            contained
        });
        (bounds, Granularity::City)
    };
    GeoLocation {
        pos,
        bounds,
        display_name: Some(display_name).filter(|n| !n.is_empty()),
        granularity,
    }
}

/// Resolves addresses with the help of a geocoding gateway.
///
/// Every query is looked up in the cache first. Only cache misses reach the gateway.
#[derive(Debug)]
pub struct GeocodeResolver<'a, G> {
    gateway: &'a G,
    cache: &'a GeocodeCache,
    country: String,
    retry: RetryPolicy,
}

impl<'a, G> GeocodeResolver<'a, G>
where
    G: GeocodingGateway,
{
    pub fn new(gateway: &'a G, cache: &'a GeocodeCache) -> Self {
        Self {
            gateway,
            cache,
            country: DEFAULT_COUNTRY.to_owned(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn cache(&self) -> &GeocodeCache {
        self.cache
    }

    pub async fn resolve(&self, fragments: &AddressFragments) -> Resolution {
        let mut attempted = vec![];
        let mut transport_failures = 0;
        for query in fallback_queries(fragments, &self.country) {
            let key = NormalizedKey::normalize(&query);
            match self.lookup(&query).await {
                QueryOutcome::Found(location) => {
                    return Resolution::Resolved { key, location };
                }
                QueryOutcome::NotFound => {
                    log::debug!("No match for '{query}'");
                }
                QueryOutcome::Failed(err) => {
                    log::warn!("Unable to resolve '{query}': {err}");
                    transport_failures += 1;
                }
            }
            attempted.push(key);
        }
        Resolution::Unresolved {
            attempted,
            transport_failures,
        }
    }

    pub async fn lookup(&self, query: &str) -> QueryOutcome {
        let key = NormalizedKey::normalize(query);
        if let Some(entry) = self.cache.get(&key) {
            log::debug!("Cache hit for '{key}'");
            return match entry {
                CacheEntry::Found(location) => QueryOutcome::Found(location),
                CacheEntry::NotFound => QueryOutcome::NotFound,
            };
        }
        match self.fetch(query).await {
            Ok(Lookup::Found(place)) => {
                let location = place_to_location(place);
                log::debug!("Resolved '{query}' at {}", location.pos);
                self.cache.put(key, CacheEntry::Found(location.clone()));
                QueryOutcome::Found(location)
            }
            Ok(Lookup::NoMatch) => {
                self.cache.put(key, CacheEntry::NotFound);
                QueryOutcome::NotFound
            }
            Err(err) => QueryOutcome::Failed(err),
        }
    }

    async fn fetch(&self, query: &str) -> Result<Lookup, TransportError> {
        let mut attempt = 1;
        loop {
            match self.gateway.forward(query).await {
                Err(err) if attempt < self.retry.max_attempts => {
                    let backoff = self.retry.backoff(attempt);
                    log::warn!(
                        "Geocoding '{query}' failed (attempt {attempt} of {}): {err}",
                        self.retry.max_attempts
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                res => return res,
            }
        }
    }
}
