use duration_str::deserialize_option_duration;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_CONFIG_FILE: &str = include_str!("userloc.default.toml");

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub geocoding: Option<Geocoding>,
    pub gateway: Option<Gateway>,
    pub viewport: Option<Viewport>,
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG_FILE).expect("Default configuration")
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Geocoding {
    pub gateway: Option<GeocodingGateway>,
    pub country_name: Option<String>,
    pub max_attempts: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_option_duration")]
    pub initial_backoff: Option<Duration>,
    #[serde(default, deserialize_with = "deserialize_option_duration")]
    pub max_backoff: Option<Duration>,
}

impl Default for Geocoding {
    fn default() -> Self {
        Config::default()
            .geocoding
            .expect("Geocoding configuration")
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GeocodingGateway {
    Nominatim,
}

#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Gateway {
    pub nominatim: Option<Nominatim>,
}

#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Nominatim {
    pub base_url: Option<String>,
    pub country_codes: Option<String>,
    pub user_agent: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_duration")]
    pub min_request_interval: Option<Duration>,
    #[serde(default, deserialize_with = "deserialize_option_duration")]
    pub timeout: Option<Duration>,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Viewport {
    pub default_center: Option<[f64; 2]>,
    pub default_zoom: Option<u8>,
    pub close_zoom: Option<u8>,
    pub regional_zoom: Option<u8>,
    pub neighborhood_radius_meters: Option<f64>,
    pub city_radius_meters: Option<f64>,
}
