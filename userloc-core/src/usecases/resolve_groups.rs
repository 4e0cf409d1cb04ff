use super::resolve_address::{GeocodeResolver, QueryOutcome, Resolution};
use crate::{entities::*, gateways::geocode::GeocodingGateway};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionSummary {
    pub resolved: usize,
    pub unresolved: usize,
}

/// Resolves the coordinates of all pending groups.
///
/// The groups are processed strictly one after another in the given order,
/// because public geocoding services do not tolerate parallel requests.
/// A group that cannot be resolved is marked as unresolved and never
/// aborts the whole run.
pub async fn resolve_groups<G>(
    resolver: &GeocodeResolver<'_, G>,
    mut groups: Vec<UserGroup>,
) -> (Vec<UserGroup>, ResolutionSummary)
where
    G: GeocodingGateway,
{
    let mut summary = ResolutionSummary::default();
    let total = groups.len();
    for (i, group) in groups.iter_mut().enumerate() {
        if group.is_pending() {
            log::debug!(
                "Resolving location {} of {total}: '{}'",
                i + 1,
                group.location_name
            );
            match resolve_group(resolver, group).await {
                Some(location) => group.mark_resolved(location),
                None => {
                    log::warn!("No coordinates available for '{}'", group.location_name);
                    group.mark_unresolved();
                }
            }
        }
        if group.is_resolved() {
            summary.resolved += 1;
        } else {
            summary.unresolved += 1;
        }
    }
    log::info!(
        "Resolved {} of {total} locations ({} unresolved, {} cached)",
        summary.resolved,
        summary.unresolved,
        resolver.cache().len()
    );
    (groups, summary)
}

async fn resolve_group<G>(
    resolver: &GeocodeResolver<'_, G>,
    group: &UserGroup,
) -> Option<GeoLocation>
where
    G: GeocodingGateway,
{
    let address = &group.representative()?.address;
    let attempted = match resolver.resolve(address).await {
        Resolution::Resolved { key, location } => {
            log::debug!("Resolved '{}' by '{key}'", group.location_name);
            return Some(location);
        }
        Resolution::Unresolved { attempted, .. } => attempted,
    };
    // Last resort: only the city, without any further qualification
    let city = address.city()?;
    if attempted.contains(&NormalizedKey::normalize(city)) {
        return None;
    }
    log::debug!("Falling back to city '{city}' for '{}'", group.location_name);
    match resolver.lookup(city).await {
        QueryOutcome::Found(location) => Some(location),
        QueryOutcome::NotFound => None,
        QueryOutcome::Failed(err) => {
            log::warn!("Unable to resolve '{city}': {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cache::GeocodeCache,
        usecases::{group_users, tests::MockGateway, RetryPolicy},
    };
    use std::time::Duration;
    use userloc_entities::builders::*;

    fn no_retries() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn resolve_groups_in_order() {
        let gw = MockGateway::default()
            .with_place("Recife, Brasil", -8.05, -34.88)
            .with_place("Natal, Brasil", -5.79, -35.2);
        let cache = GeocodeCache::new();
        let resolver = GeocodeResolver::new(&gw, &cache);
        let groups = group_users(vec![
            User::build().id("1").city("Recife").finish(),
            User::build().id("2").city("Natal").finish(),
            User::build().id("3").city("Recife").finish(),
        ]);
        let (groups, summary) = resolve_groups(&resolver, groups).await;
        assert_eq!(ResolutionSummary { resolved: 2, unresolved: 0 }, summary);
        assert_eq!(vec!["Recife, Brasil", "Natal, Brasil"], gw.requests());
        assert_eq!(
            MapPoint::from_lat_lng_deg(-8.05, -34.88),
            groups[0].location().unwrap().pos
        );
        assert_eq!(
            MapPoint::from_lat_lng_deg(-5.79, -35.2),
            groups[1].location().unwrap().pos
        );
    }

    #[tokio::test]
    async fn unresolved_groups_do_not_abort_the_run() {
        let gw = MockGateway::default().with_place("Natal, Brasil", -5.79, -35.2);
        let cache = GeocodeCache::new();
        let resolver = GeocodeResolver::new(&gw, &cache);
        let groups = group_users(vec![
            User::build().id("1").city("Atlantis").finish(),
            User::build().id("2").neighborhood("Lonely").finish(),
            User::build().id("3").city("Natal").finish(),
        ]);
        let (groups, summary) = resolve_groups(&resolver, groups).await;
        assert_eq!(ResolutionSummary { resolved: 1, unresolved: 2 }, summary);
        assert_eq!(GroupStatus::Unresolved, groups[0].status);
        assert_eq!(Granularity::Unknown, groups[0].granularity);
        assert_eq!(GroupStatus::Unresolved, groups[1].status);
        assert!(groups[2].is_resolved());
    }

    #[tokio::test]
    async fn fall_back_to_the_plain_city_name() {
        let gw = MockGateway::default().with_place("Curitiba", -25.43, -49.27);
        let cache = GeocodeCache::new();
        let resolver = GeocodeResolver::new(&gw, &cache);
        let groups = group_users(vec![User::build()
            .id("1")
            .neighborhood("Batel")
            .city("Curitiba")
            .state("PR")
            .finish()]);
        let (groups, summary) = resolve_groups(&resolver, groups).await;
        assert_eq!(1, summary.resolved);
        assert_eq!(Granularity::City, groups[0].granularity);
        assert_eq!(
            vec![
                "Batel, Curitiba, PR, Brasil",
                "Batel, Curitiba, Brasil",
                "Curitiba, PR, Brasil",
                "Curitiba, Brasil",
                "Curitiba",
            ],
            gw.requests()
        );
        assert_eq!(5, cache.len());
    }

    #[tokio::test]
    async fn skip_city_fallback_if_already_attempted() {
        let gw = MockGateway::default();
        let cache = GeocodeCache::new();
        let resolver = GeocodeResolver::new(&gw, &cache).with_country("");
        let groups = group_users(vec![User::build().id("1").city("Atlantis").finish()]);
        let (_, summary) = resolve_groups(&resolver, groups).await;
        assert_eq!(1, summary.unresolved);
        assert_eq!(vec!["Atlantis"], gw.requests());
    }

    #[tokio::test]
    async fn second_run_uses_the_cache() {
        let gw = MockGateway::default().with_place("Recife, Brasil", -8.05, -34.88);
        let cache = GeocodeCache::new();
        let resolver = GeocodeResolver::new(&gw, &cache);
        let users = vec![
            User::build().id("1").city("Recife").finish(),
            User::build().id("2").city("Atlantis").finish(),
        ];
        let (_, first) = resolve_groups(&resolver, group_users(users.clone())).await;
        let requests = gw.request_count();
        let (_, second) = resolve_groups(&resolver, group_users(users)).await;
        assert_eq!(first, second);
        assert_eq!(requests, gw.request_count());
    }

    #[tokio::test]
    async fn provider_outage_degrades_to_unresolved() {
        let gw = MockGateway::default().failing();
        let cache = GeocodeCache::new();
        let resolver = GeocodeResolver::new(&gw, &cache).with_retry_policy(no_retries());
        let groups = group_users(vec![
            User::build().id("1").city("Recife").finish(),
            User::build().id("2").neighborhood("Boa Viagem").city("Recife").finish(),
        ]);
        let (groups, summary) = resolve_groups(&resolver, groups).await;
        assert_eq!(ResolutionSummary { resolved: 0, unresolved: 2 }, summary);
        assert!(groups.iter().all(|g| g.status == GroupStatus::Unresolved));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn already_finished_groups_are_kept() {
        let gw = MockGateway::default();
        let cache = GeocodeCache::new();
        let resolver = GeocodeResolver::new(&gw, &cache);
        let mut groups = group_users(vec![User::build().id("1").city("Recife").finish()]);
        groups[0].mark_unresolved();
        let (_, summary) = resolve_groups(&resolver, groups).await;
        assert_eq!(1, summary.unresolved);
        assert_eq!(0, gw.request_count());
    }
}
