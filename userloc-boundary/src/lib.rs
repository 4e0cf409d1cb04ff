use serde::{Deserialize, Serialize};

#[cfg(feature = "entity-conversions")]
mod conv;

#[cfg(feature = "entity-conversions")]
pub use conv::InvalidUser;

#[rustfmt::skip]
#[derive(Serialize, Deserialize)]
#[cfg_attr(feature = "extra-derive", derive(Debug, Clone, PartialEq))]
pub struct User {
    pub id           : String,
    pub name         : String,
    pub email        : String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighborhood : Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city         : Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state        : Option<String>,
    pub role         : String,
}

#[derive(Serialize, Deserialize)]
#[cfg_attr(feature = "extra-derive", derive(Debug, Clone, Copy, PartialEq))]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Serialize, Deserialize)]
#[cfg_attr(feature = "extra-derive", derive(Debug, Clone, Copy, PartialEq))]
pub struct Bounds {
    pub south_west: Coordinate,
    pub north_east: Coordinate,
}

#[derive(Serialize, Deserialize)]
#[cfg_attr(feature = "extra-derive", derive(Debug, Clone, Copy, PartialEq, Eq))]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Neighborhood,
    City,
    Unknown,
}

#[derive(Serialize, Deserialize)]
#[cfg_attr(feature = "extra-derive", derive(Debug, Clone, Copy, PartialEq, Eq))]
#[serde(rename_all = "lowercase")]
pub enum GroupStatus {
    Pending,
    Resolved,
    Unresolved,
}

#[derive(Serialize, Deserialize)]
#[cfg_attr(feature = "extra-derive", derive(Debug, Clone, PartialEq))]
pub struct UserGroup {
    pub key: String,
    pub location_name: String,
    pub users: Vec<User>,
    pub status: GroupStatus,
    pub granularity: Granularity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<Coordinate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius_meters: Option<f64>,
    pub others_count: usize,
}

#[derive(Serialize, Deserialize)]
#[cfg_attr(feature = "extra-derive", derive(Debug, Clone, PartialEq))]
pub struct ResolutionResult {
    pub groups: Vec<UserGroup>,
    pub center: Coordinate,
    pub zoom: u8,
    pub resolved_count: usize,
    pub unresolved_count: usize,
}
