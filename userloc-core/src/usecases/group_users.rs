use std::collections::HashMap;

use crate::entities::*;

fn granularity_hint(address: &AddressFragments) -> Granularity {
    if address.neighborhood().is_some() {
        Granularity::Neighborhood
    } else {
        Granularity::City
    }
}

/// Partitions users into groups of the same normalized location.
///
/// Groups are ordered by the first occurrence of their key.
/// Users without any neighborhood or city are skipped.
pub fn group_users<I>(users: I) -> Vec<UserGroup>
where
    I: IntoIterator<Item = User>,
{
    let mut groups: Vec<UserGroup> = vec![];
    let mut index_by_key: HashMap<NormalizedKey, usize> = HashMap::new();
    for user in users {
        let Some(label) = user.address.location_label() else {
            log::trace!("Skip user {} without location", user.id);
            continue;
        };
        let key = NormalizedKey::normalize(&label);
        if key.is_empty() {
            log::trace!("Skip user {} with blank location", user.id);
            continue;
        }
        let idx = *index_by_key.entry(key.clone()).or_insert_with(|| {
            let granularity = granularity_hint(&user.address);
            groups.push(UserGroup::new(key, label, granularity));
            groups.len() - 1
        });
        groups[idx].users.push(user);
    }
    log::debug!("Grouped users into {} locations", groups.len());
    groups
}
