use super::*;
use thiserror::Error;
use userloc_entities as e;

#[derive(Debug, Error)]
pub enum InvalidUser {
    #[error("Invalid role '{role}' of user {id}")]
    Role { id: String, role: String },
}

impl From<e::user::User> for User {
    fn from(from: e::user::User) -> Self {
        let e::user::User {
            id,
            name,
            email,
            address,
            role,
        } = from;
        let e::address::AddressFragments {
            neighborhood,
            city,
            state,
        } = address;
        Self {
            id,
            name,
            email,
            neighborhood,
            city,
            state,
            role: role.to_string(),
        }
    }
}

impl TryFrom<User> for e::user::User {
    type Error = InvalidUser;
    fn try_from(from: User) -> Result<Self, Self::Error> {
        let User {
            id,
            name,
            email,
            neighborhood,
            city,
            state,
            role,
        } = from;
        let Ok(role) = role.parse::<e::user::Role>() else {
            return Err(InvalidUser::Role { id, role });
        };
        Ok(Self {
            id,
            name,
            email,
            address: e::address::AddressFragments {
                neighborhood,
                city,
                state,
            },
            role,
        })
    }
}

impl From<e::geo::MapPoint> for Coordinate {
    fn from(from: e::geo::MapPoint) -> Self {
        let (lat, lng) = from.to_lat_lng_deg();
        Self { lat, lng }
    }
}

impl From<e::geo::MapBbox> for Bounds {
    fn from(from: e::geo::MapBbox) -> Self {
        Self {
            south_west: from.south_west().into(),
            north_east: from.north_east().into(),
        }
    }
}

impl From<e::location::Granularity> for Granularity {
    fn from(from: e::location::Granularity) -> Self {
        use e::location::Granularity as G;
        match from {
            G::Neighborhood => Self::Neighborhood,
            G::City => Self::City,
            G::Unknown => Self::Unknown,
        }
    }
}

impl From<&e::group::GroupStatus> for GroupStatus {
    fn from(from: &e::group::GroupStatus) -> Self {
        use e::group::GroupStatus as S;
        match from {
            S::Pending => Self::Pending,
            S::Resolved(_) => Self::Resolved,
            S::Unresolved => Self::Unresolved,
        }
    }
}

impl From<e::group::UserGroup> for UserGroup {
    fn from(from: e::group::UserGroup) -> Self {
        let others_count = from.others_count();
        let status = GroupStatus::from(&from.status);
        let e::group::UserGroup {
            key,
            location_name,
            users,
            granularity,
            status: group_status,
        } = from;
        let (coordinate, bounds, display_name) = match group_status {
            e::group::GroupStatus::Resolved(location) => (
                Some(location.pos.into()),
                location.bounds.map(Into::into),
                location.display_name,
            ),
            e::group::GroupStatus::Pending | e::group::GroupStatus::Unresolved => {
                (None, None, None)
            }
        };
        Self {
            key: key.into(),
            location_name,
            users: users.into_iter().map(Into::into).collect(),
            status,
            granularity: granularity.into(),
            coordinate,
            bounds,
            display_name,
            radius_meters: None,
            others_count,
        }
    }
}
