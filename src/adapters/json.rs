use std::io::Read;

use anyhow::{Context, Result};
use userloc_boundary as json;
use userloc_core::usecases::{ResolutionResult, ViewportSettings};
use userloc_entities::{group::UserGroup, user::User};

/// Reads a JSON array of users.
///
/// Fails on the first user with an unknown role.
pub fn read_users<R: Read>(reader: R) -> Result<Vec<User>> {
    let users: Vec<json::User> = serde_json::from_reader(reader).context("Malformed users")?;
    let users = users
        .into_iter()
        .map(User::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(users)
}

pub fn user_group(from: UserGroup, settings: &ViewportSettings) -> json::UserGroup {
    let radius_meters = from
        .is_resolved()
        .then(|| settings.display_radius(from.granularity).to_meters());
    json::UserGroup {
        radius_meters,
        ..from.into()
    }
}

pub fn resolution_result(
    from: ResolutionResult,
    settings: &ViewportSettings,
) -> json::ResolutionResult {
    let ResolutionResult {
        groups,
        viewport,
        resolved_count,
        unresolved_count,
    } = from;
    json::ResolutionResult {
        groups: groups
            .into_iter()
            .map(|group| user_group(group, settings))
            .collect(),
        center: viewport.center.into(),
        zoom: viewport.zoom,
        resolved_count,
        unresolved_count,
    }
}
