use anyhow::{anyhow, Result};
use std::{env, fs, io::ErrorKind, path::Path};
use userloc_core::usecases::{RetryPolicy, ViewportSettings, DEFAULT_COUNTRY};
use userloc_entities::geo::{Distance, MapPoint};
use userloc_gateways::nominatim::NominatimConfig;

mod raw;

const DEFAULT_CONFIG_FILE_NAME: &str = "userloc.toml";

const ENV_NAME_NOMINATIM_BASE_URL: &str = "NOMINATIM_BASE_URL";

/// Highest zoom level of common slippy map tiles.
const MAX_ZOOM: u8 = 19;

pub struct Config {
    pub geocoding: Geocoding,
    pub viewport: ViewportSettings,
}

impl Config {
    pub fn try_load_from_file_or_default<P: AsRef<Path>>(file_path: Option<P>) -> Result<Self> {
        let file_path: &Path = file_path.as_ref().map(|p| p.as_ref()).unwrap_or_else(|| {
            log::info!("No configuration file specified. load {DEFAULT_CONFIG_FILE_NAME}");
            Path::new(DEFAULT_CONFIG_FILE_NAME)
        });

        let raw_config = match fs::read_to_string(file_path) {
            Ok(cfg_string) => toml::from_str(&cfg_string)?,
            Err(err) => match err.kind() {
                ErrorKind::NotFound => {
                    log::info!(
                        "{} not found => load default configuration.",
                        file_path.display()
                    );
                    Ok(raw::Config::default())
                }
                _ => Err(err),
            }?,
        };
        let mut cfg = Self::try_from(raw_config)?;
        if let Ok(base_url) = env::var(ENV_NAME_NOMINATIM_BASE_URL) {
            let GeocodingGateway::Nominatim(nominatim) = &mut cfg.geocoding.gateway;
            log::debug!("Override Nominatim base URL with ${ENV_NAME_NOMINATIM_BASE_URL}");
            nominatim.base_url = base_url;
        }
        Ok(cfg)
    }
}

pub struct Geocoding {
    pub gateway: GeocodingGateway,
    /// Country name that is appended to every query.
    pub country_name: String,
    pub retry: RetryPolicy,
}

pub enum GeocodingGateway {
    Nominatim(NominatimConfig),
}

impl TryFrom<raw::Config> for Config {
    type Error = anyhow::Error;
    fn try_from(from: raw::Config) -> Result<Self> {
        let raw::Config {
            geocoding,
            gateway,
            viewport,
        } = from;

        let raw::Geocoding {
            gateway: gateway_name,
            country_name,
            max_attempts,
            initial_backoff,
            max_backoff,
        } = geocoding.unwrap_or_default();

        let geo_gateway = match gateway_name.unwrap_or(raw::GeocodingGateway::Nominatim) {
            raw::GeocodingGateway::Nominatim => {
                let raw::Nominatim {
                    base_url,
                    country_codes,
                    user_agent,
                    min_request_interval,
                    timeout,
                } = gateway.and_then(|g| g.nominatim).unwrap_or_default();
                let defaults = NominatimConfig::default();
                let user_agent = user_agent.unwrap_or(defaults.user_agent);
                if user_agent.trim().is_empty() {
                    return Err(anyhow!("Missing Nominatim user agent"));
                }
                GeocodingGateway::Nominatim(NominatimConfig {
                    base_url: base_url.unwrap_or(defaults.base_url),
                    country_codes: country_codes.unwrap_or(defaults.country_codes),
                    user_agent,
                    min_request_interval: min_request_interval
                        .unwrap_or(defaults.min_request_interval),
                    timeout: timeout.unwrap_or(defaults.timeout),
                })
            }
        };

        let country_name = country_name
            .map(|name| name.trim().to_owned())
            .unwrap_or_else(|| DEFAULT_COUNTRY.to_owned());
        if country_name.is_empty() {
            return Err(anyhow!("Empty geocoding country name"));
        }

        let default_retry = RetryPolicy::default();
        let retry = RetryPolicy {
            max_attempts: max_attempts.unwrap_or(default_retry.max_attempts),
            initial_backoff: initial_backoff.unwrap_or(default_retry.initial_backoff),
            max_backoff: max_backoff.unwrap_or(default_retry.max_backoff),
        };
        if retry.max_attempts == 0 {
            return Err(anyhow!("At least one geocoding attempt is required"));
        }
        if retry.initial_backoff > retry.max_backoff {
            return Err(anyhow!(
                "Initial backoff ({:?}) exceeds maximum backoff ({:?})",
                retry.initial_backoff,
                retry.max_backoff
            ));
        }

        let geocoding = Geocoding {
            gateway: geo_gateway,
            country_name,
            retry,
        };

        let raw::Viewport {
            default_center,
            default_zoom,
            close_zoom,
            regional_zoom,
            neighborhood_radius_meters,
            city_radius_meters,
        } = viewport.unwrap_or_default();

        let defaults = ViewportSettings::default();
        let default_center = match default_center {
            Some([lat, lng]) => MapPoint::try_from_lat_lng_deg(lat, lng)
                .map_err(|err| anyhow!("Invalid default center: {err}"))?,
            None => defaults.default_center,
        };
        let viewport = ViewportSettings {
            default_center,
            default_zoom: default_zoom.unwrap_or(defaults.default_zoom),
            close_zoom: close_zoom.unwrap_or(defaults.close_zoom),
            regional_zoom: regional_zoom.unwrap_or(defaults.regional_zoom),
            neighborhood_radius: neighborhood_radius_meters
                .map(Distance::from_meters)
                .unwrap_or(defaults.neighborhood_radius),
            city_radius: city_radius_meters
                .map(Distance::from_meters)
                .unwrap_or(defaults.city_radius),
        };
        for zoom in [
            viewport.default_zoom,
            viewport.close_zoom,
            viewport.regional_zoom,
        ] {
            if zoom > MAX_ZOOM {
                return Err(anyhow!("Zoom level {zoom} exceeds {MAX_ZOOM}"));
            }
        }
        for radius in [viewport.neighborhood_radius, viewport.city_radius] {
            if !(radius.to_meters().is_finite() && radius.to_meters() > 0.0) {
                return Err(anyhow!("Invalid display radius: {} m", radius.to_meters()));
            }
        }

        Ok(Self {
            geocoding,
            viewport,
        })
    }
}
