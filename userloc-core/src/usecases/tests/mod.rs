use std::{collections::HashMap, sync::Mutex};

use userloc_entities::builders::*;

use super::*;
use crate::{
    cache::GeocodeCache,
    entities::*,
    gateways::geocode::{GeocodedPlace, GeocodingGateway, Lookup, TransportError},
};

#[derive(Debug, Clone)]
enum Scripted {
    Found(GeocodedPlace),
    Fail,
    /// Fails the given number of times before the place is found.
    Flaky(usize, GeocodedPlace),
}

/// A geocoding gateway that answers from a script
/// and records every request.
///
/// Unknown queries have no match.
#[derive(Debug, Default)]
pub struct MockGateway {
    script: Mutex<HashMap<NormalizedKey, Scripted>>,
    fail_all: bool,
    requests: Mutex<Vec<String>>,
}

fn place(query: &str, lat: f64, lng: f64, neighbourhood_level: bool) -> GeocodedPlace {
    GeocodedPlace {
        pos: MapPoint::from_lat_lng_deg(lat, lng),
        display_name: query.to_owned(),
        bbox: None,
        neighbourhood_level,
    }
}

impl MockGateway {
    fn with(self, query: &str, scripted: Scripted) -> Self {
        self.script
            .lock()
            .unwrap()
            .insert(NormalizedKey::normalize(query), scripted);
        self
    }

    pub fn with_place(self, query: &str, lat: f64, lng: f64) -> Self {
        self.with(query, Scripted::Found(place(query, lat, lng, false)))
    }

    pub fn with_neighbourhood(self, query: &str, lat: f64, lng: f64) -> Self {
        self.with(query, Scripted::Found(place(query, lat, lng, true)))
    }

    pub fn with_transport_failure(self, query: &str) -> Self {
        self.with(query, Scripted::Fail)
    }

    pub fn with_flaky_place(self, query: &str, failures: usize, lat: f64, lng: f64) -> Self {
        self.with(
            query,
            Scripted::Flaky(failures, place(query, lat, lng, false)),
        )
    }

    /// Every request fails, e.g. because the provider is down.
    pub fn failing(mut self) -> Self {
        self.fail_all = true;
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl GeocodingGateway for MockGateway {
    async fn forward(&self, query: &str) -> Result<Lookup, TransportError> {
        self.requests.lock().unwrap().push(query.to_owned());
        if self.fail_all {
            return Err(TransportError::Status(503));
        }
        let mut script = self.script.lock().unwrap();
        match script.get_mut(&NormalizedKey::normalize(query)) {
            None => Ok(Lookup::NoMatch),
            Some(Scripted::Found(place)) => Ok(Lookup::Found(place.clone())),
            Some(Scripted::Fail) => Err(TransportError::Request("connection refused".into())),
            Some(Scripted::Flaky(0, place)) => Ok(Lookup::Found(place.clone())),
            Some(Scripted::Flaky(failures, _)) => {
                *failures -= 1;
                Err(TransportError::Request("connection reset".into()))
            }
        }
    }
}

fn no_retries() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 1,
        ..Default::default()
    }
}

#[tokio::test]
async fn resolve_users_end_to_end() {
    let _ = env_logger::builder().is_test(true).try_init();
    let users = vec![
        User::build()
            .id("1")
            .name("Ana")
            .neighborhood("Boa Viagem")
            .city("Recife")
            .state("PE")
            .finish(),
        User::build()
            .id("2")
            .name("Bruno")
            .city("Natal")
            .state("RN")
            .finish(),
        User::build()
            .id("3")
            .name("Carla")
            .neighborhood("boa viagem")
            .city("RECIFE")
            .state("PE")
            .finish(),
        User::build()
            .id("4")
            .name("Davi")
            .city("Fortaleza")
            .finish(),
        User::build()
            .id("5")
            .name("Elis")
            .neighborhood("Boa  Viagem")
            .city("Recife")
            .finish(),
    ];
    let gw = MockGateway::default()
        .with_neighbourhood("Boa Viagem, Recife, PE, Brasil", -8.13, -34.9)
        .with_place("Natal, RN, Brasil", -5.79, -35.2)
        .with_place("Fortaleza, Brasil", -3.73, -38.52);
    let cache = GeocodeCache::new();
    let resolver = GeocodeResolver::new(&gw, &cache);

    let res = resolve_users(&resolver, users, &ViewportSettings::default()).await;

    assert_eq!(3, res.groups.len());
    assert_eq!(
        vec![3, 1, 1],
        res.groups.iter().map(|g| g.users.len()).collect::<Vec<_>>()
    );
    assert_eq!(3, res.resolved_count);
    assert_eq!(0, res.unresolved_count);
    assert_eq!("Boa Viagem, Recife", res.groups[0].location_name);
    assert_eq!(2, res.groups[0].others_count());
    assert_eq!(Granularity::Neighborhood, res.groups[0].granularity);
    assert!(res.groups[0].location().unwrap().bounds.is_some());
    assert_eq!(Granularity::City, res.groups[1].granularity);
    assert_eq!(REGIONAL_ZOOM, res.viewport.zoom);
    let expected_lat = (-8.13 + -5.79 + -3.73) / 3.0;
    let expected_lng = (-34.9 + -35.2 + -38.52) / 3.0;
    assert!((res.viewport.center.lat() - expected_lat).abs() < 1e-9);
    assert!((res.viewport.center.lng() - expected_lng).abs() < 1e-9);
    assert_eq!(3, gw.request_count());
}

#[tokio::test]
async fn resolve_users_without_any_location() {
    let gw = MockGateway::default();
    let cache = GeocodeCache::new();
    let resolver = GeocodeResolver::new(&gw, &cache);
    let users = vec![User::build().id("1").finish(), User::build().id("2").finish()];
    let res = resolve_users(&resolver, users, &ViewportSettings::default()).await;
    assert!(res.groups.is_empty());
    assert_eq!(0, res.resolved_count);
    assert_eq!(0, res.unresolved_count);
    assert_eq!(compute_viewport(&[]), res.viewport);
    assert_eq!(0, gw.request_count());
}

#[tokio::test]
async fn provider_outage_yields_default_viewport() {
    let gw = MockGateway::default().failing();
    let cache = GeocodeCache::new();
    let resolver = GeocodeResolver::new(&gw, &cache).with_retry_policy(no_retries());
    let users = vec![
        User::build().id("1").city("Recife").finish(),
        User::build().id("2").city("Natal").finish(),
    ];
    let res = resolve_users(&resolver, users, &ViewportSettings::default()).await;
    assert_eq!(2, res.groups.len());
    assert_eq!(0, res.resolved_count);
    assert_eq!(2, res.unresolved_count);
    assert_eq!(DEFAULT_ZOOM, res.viewport.zoom);
    assert_eq!(ViewportSettings::default().default_center, res.viewport.center);
}

#[tokio::test]
async fn single_resolved_group_is_zoomed_in() {
    let gw = MockGateway::default().with_place("Brasília, DF, Brasil", -15.0, -47.0);
    let cache = GeocodeCache::new();
    let resolver = GeocodeResolver::new(&gw, &cache);
    let users = vec![
        User::build().id("1").city("Brasilia").state("DF").finish(),
        User::build().id("2").city("Atlantis").finish(),
    ];
    let res = resolve_users(&resolver, users, &ViewportSettings::default()).await;
    assert_eq!(1, res.resolved_count);
    assert_eq!(1, res.unresolved_count);
    assert_eq!(
        Viewport {
            center: MapPoint::from_lat_lng_deg(-15.0, -47.0),
            zoom: CLOSE_ZOOM,
        },
        res.viewport
    );
}
