use crate::entities::*;

/// National centroid of Brazil.
pub const DEFAULT_CENTER_LAT_DEG: f64 = -14.235;
pub const DEFAULT_CENTER_LNG_DEG: f64 = -51.9253;

pub const DEFAULT_ZOOM: u8 = 4;
pub const CLOSE_ZOOM: u8 = 12;
pub const REGIONAL_ZOOM: u8 = 6;

pub const NEIGHBORHOOD_RADIUS: Distance = Distance::from_meters(800.0);
pub const CITY_RADIUS: Distance = Distance::from_meters(3_000.0);

#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportSettings {
    /// Center if nothing could be resolved.
    pub default_center      : MapPoint,
    pub default_zoom        : u8,
    /// Zoom for a single resolved location.
    pub close_zoom          : u8,
    /// Zoom for multiple resolved locations.
    pub regional_zoom       : u8,
    pub neighborhood_radius : Distance,
    pub city_radius         : Distance,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            default_center: MapPoint::from_lat_lng_deg(
                DEFAULT_CENTER_LAT_DEG,
                DEFAULT_CENTER_LNG_DEG,
            ),
            default_zoom: DEFAULT_ZOOM,
            close_zoom: CLOSE_ZOOM,
            regional_zoom: REGIONAL_ZOOM,
            neighborhood_radius: NEIGHBORHOOD_RADIUS,
            city_radius: CITY_RADIUS,
        }
    }
}

impl ViewportSettings {
    /// The radius of the circle that marks a group on the map.
    ///
    /// It only depends on the granularity and not on the actual
    /// size of the area.
    pub fn display_radius(&self, granularity: Granularity) -> Distance {
        match granularity {
            Granularity::Neighborhood => self.neighborhood_radius,
            Granularity::City | Granularity::Unknown => self.city_radius,
        }
    }
}

pub fn display_radius(granularity: Granularity) -> Distance {
    ViewportSettings::default().display_radius(granularity)
}

pub fn compute_viewport(groups: &[UserGroup]) -> Viewport {
    compute_viewport_with(&ViewportSettings::default(), groups)
}

/// Centers the map on the centroid of all resolved groups.
pub fn compute_viewport_with(settings: &ViewportSettings, groups: &[UserGroup]) -> Viewport {
    let positions: Vec<_> = groups
        .iter()
        .filter_map(UserGroup::location)
        .map(|location| location.pos)
        .collect();
    let (center, zoom) = match positions.len() {
        0 => (settings.default_center, settings.default_zoom),
        1 => (positions[0], settings.close_zoom),
        count => {
            let (lat_sum, lng_sum) = positions
                .iter()
                .fold((0.0, 0.0), |(lat, lng), pos| (lat + pos.lat(), lng + pos.lng()));
            let center =
                MapPoint::from_lat_lng_deg(lat_sum / count as f64, lng_sum / count as f64);
            (center, settings.regional_zoom)
        }
    };
    Viewport { center, zoom }
}
