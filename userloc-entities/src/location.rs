use strum::{Display, EnumString};

use crate::geo::{MapBbox, MapPoint};

/// The size of the area a resolved location represents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Granularity {
    Neighborhood,
    City,
    #[default]
    Unknown,
}

/// The geographical coordinates of a resolved location.
#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq)]
pub struct GeoLocation {
    pub pos          : MapPoint,
    pub bounds       : Option<MapBbox>,
    /// The canonical label of the geocoding provider.
    pub display_name : Option<String>,
    pub granularity  : Granularity,
}
