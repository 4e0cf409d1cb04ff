use std::future::Future;

use thiserror::Error;

use crate::entities::{MapBbox, MapPoint};

/// A single search hit of the geocoding provider.
#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    pub pos                 : MapPoint,
    pub display_name        : String,
    pub bbox                : Option<MapBbox>,
    /// The provider classified the hit as a neighbourhood or suburb.
    pub neighbourhood_level : bool,
}

/// The semantic outcome of a successful request.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Found(GeocodedPlace),
    NoMatch,
}

/// The provider could not be asked or did not answer properly.
///
/// In contrast to [`Lookup::NoMatch`] these failures are
/// temporary and worth a retry.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Geocoding request failed: {0}")]
    Request(String),
    #[error("Unexpected geocoding response status: {0}")]
    Status(u16),
    #[error("Malformed geocoding response: {0}")]
    Response(String),
}

pub trait GeocodingGateway {
    fn forward(&self, query: &str) -> impl Future<Output = Result<Lookup, TransportError>> + Send;
}
