use crate::geo::MapPoint;

/// The visible area of a map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: MapPoint,
    pub zoom: u8,
}
