use std::{collections::HashMap, time::Duration};

use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;
use tokio::{sync::Mutex, time::Instant};
use userloc_core::gateways::geocode::{GeocodedPlace, GeocodingGateway, Lookup, TransportError};
use userloc_entities::geo::{MapBbox, MapPoint};

pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// The public instance allows at most one request per second.
pub const DEFAULT_MIN_REQUEST_INTERVAL: Duration = Duration::from_secs(1);

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub const DEFAULT_USER_AGENT: &str = "userloc";

/// Address keys that indicate a result on neighbourhood level.
const NEIGHBOURHOOD_ADDRESS_KEYS: [&str; 2] = ["suburb", "neighbourhood"];

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid Nominatim base URL: {0}")]
    BaseUrl(String),
    #[error(transparent)]
    Client(#[from] reqwest::Error),
}

#[rustfmt::skip]
#[derive(Debug, Clone)]
pub struct NominatimConfig {
    pub base_url             : String,
    /// Comma separated ISO 3166-1 alpha-2 codes, e.g. `br`.
    pub country_codes        : String,
    /// Identifies the application as demanded by the usage policy.
    pub user_agent           : String,
    pub min_request_interval : Duration,
    pub timeout              : Duration,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            country_codes: "br".to_owned(),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            min_request_interval: DEFAULT_MIN_REQUEST_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Forward geocoding with the OpenStreetMap Nominatim search API.
#[derive(Debug)]
pub struct Nominatim {
    client: reqwest::Client,
    search_url: Url,
    country_codes: String,
    throttle: Throttle,
}

/// Keeps a minimum interval between the start of consecutive requests.
#[derive(Debug)]
struct Throttle {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl Throttle {
    fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    async fn wait(&self) {
        let mut last_request = self.last_request.lock().await;
        if let Some(last) = *last_request {
            tokio::time::sleep_until(last + self.min_interval).await;
        }
        *last_request = Some(Instant::now());
    }
}

fn search_url(base_url: &str) -> Result<Url, Error> {
    let base_url = format!("{}/", base_url.trim().trim_end_matches('/'));
    let url = Url::parse(&base_url)
        .and_then(|base| base.join("search"))
        .map_err(|err| Error::BaseUrl(format!("{base_url}: {err}")))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(Error::BaseUrl(base_url));
    }
    Ok(url)
}

impl Nominatim {
    pub fn new(cfg: NominatimConfig) -> Result<Self, Error> {
        let NominatimConfig {
            base_url,
            country_codes,
            user_agent,
            min_request_interval,
            timeout,
        } = cfg;
        let search_url = search_url(&base_url)?;
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        log::info!("Use Nominatim geocoding gateway ({search_url})");
        Ok(Self {
            client,
            search_url,
            country_codes,
            throttle: Throttle::new(min_request_interval),
        })
    }

    pub fn search_url(&self) -> &Url {
        &self.search_url
    }

    /// `GET /search?q=..&format=json&limit=1&addressdetails=1[&countrycodes=..]`
    fn search_request(&self, query: &str) -> Result<reqwest::Request, TransportError> {
        let mut params = vec![
            ("q", query),
            ("format", "json"),
            ("limit", "1"),
            ("addressdetails", "1"),
        ];
        if !self.country_codes.is_empty() {
            params.push(("countrycodes", self.country_codes.as_str()));
        }
        self.client
            .get(self.search_url.clone())
            .query(&params)
            .build()
            .map_err(|err| TransportError::Request(err.to_string()))
    }
}

impl GeocodingGateway for Nominatim {
    async fn forward(&self, query: &str) -> Result<Lookup, TransportError> {
        self.throttle.wait().await;
        log::debug!("Searching Nominatim for '{query}'");
        let request = self.search_request(query)?;
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|err| TransportError::Request(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }
        let body = response
            .bytes()
            .await
            .map_err(|err| TransportError::Request(err.to_string()))?;
        parse_search_response(&body)
    }
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
    /// `[south, north, west, east]`
    #[serde(default)]
    boundingbox: Option<Vec<String>>,
    #[serde(default)]
    address: Option<HashMap<String, serde_json::Value>>,
}

fn parse_deg(deg: &str) -> Result<f64, TransportError> {
    deg.trim()
        .parse()
        .map_err(|_| TransportError::Response(format!("Invalid coordinate '{deg}'")))
}

fn parse_bbox(bbox: &[String]) -> Option<MapBbox> {
    let [south, north, west, east] = bbox else {
        return None;
    };
    let deg = |s: &String| s.trim().parse::<f64>().ok();
    let sw = MapPoint::try_from_lat_lng_deg(deg(south)?, deg(west)?).ok()?;
    let ne = MapPoint::try_from_lat_lng_deg(deg(north)?, deg(east)?).ok()?;
    Some(MapBbox::new(sw, ne)).filter(MapBbox::is_valid)
}

/// Parses the body of a `/search?format=json` response.
///
/// Only the first hit is considered.
pub fn parse_search_response(body: &[u8]) -> Result<Lookup, TransportError> {
    let hits: Vec<SearchHit> =
        serde_json::from_slice(body).map_err(|err| TransportError::Response(err.to_string()))?;
    let Some(hit) = hits.into_iter().next() else {
        return Ok(Lookup::NoMatch);
    };
    let SearchHit {
        lat,
        lon,
        display_name,
        boundingbox,
        address,
    } = hit;
    let pos = MapPoint::try_from_lat_lng_deg(parse_deg(&lat)?, parse_deg(&lon)?)
        .map_err(|err| TransportError::Response(err.to_string()))?;
    let bbox = boundingbox.as_deref().and_then(parse_bbox);
    let neighbourhood_level = address.is_some_and(|address| {
        NEIGHBOURHOOD_ADDRESS_KEYS
            .iter()
            .any(|key| address.contains_key(*key))
    });
    Ok(Lookup::Found(GeocodedPlace {
        pos,
        display_name,
        bbox,
        neighbourhood_level,
    }))
}
