use anyhow::Result;
use userloc_gateways::nominatim::Nominatim;

use crate::config::{Geocoding, GeocodingGateway};

pub fn geocoding_gateway(cfg: &Geocoding) -> Result<Nominatim> {
    match &cfg.gateway {
        GeocodingGateway::Nominatim(nominatim) => Ok(Nominatim::new(nominatim.clone())?),
    }
}
