use super::{
    compute_viewport::{compute_viewport_with, ViewportSettings},
    group_users::group_users,
    resolve_address::GeocodeResolver,
    resolve_groups::resolve_groups,
};
use crate::{entities::*, gateways::geocode::GeocodingGateway};

#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionResult {
    pub groups           : Vec<UserGroup>,
    pub viewport         : Viewport,
    pub resolved_count   : usize,
    pub unresolved_count : usize,
}

/// Groups the users by location, resolves the coordinates of
/// each group and calculates the map viewport.
pub async fn resolve_users<G>(
    resolver: &GeocodeResolver<'_, G>,
    users: Vec<User>,
    settings: &ViewportSettings,
) -> ResolutionResult
where
    G: GeocodingGateway,
{
    let user_count = users.len();
    let groups = group_users(users);
    log::info!("Resolving {} locations of {user_count} users", groups.len());
    let (groups, summary) = resolve_groups(resolver, groups).await;
    let viewport = compute_viewport_with(settings, &groups);
    ResolutionResult {
        groups,
        viewport,
        resolved_count: summary.resolved,
        unresolved_count: summary.unresolved,
    }
}
