//! E2E: activation takeover
//!
//! A newly activated version must take control of clients that were
//! already open, so its cache logic applies without a reload.

use offcache_e2e_tests::{bundle_body, deploy, shell_bundle};
use offcache_worker::{CacheStorage, Container, FetchEvent, ProxyConfig, Request, WorkerState};

const ORIGIN: &str = "https://example.com";

fn versioned_config(cache_name: &str) -> ProxyConfig {
    ProxyConfig {
        cache_name: cache_name.to_string(),
        ..ProxyConfig::default()
    }
}

#[test]
fn test_takeover_applies_new_cache_logic_without_reload() {
    let network = shell_bundle();
    let mut container = Container::new(ORIGIN);
    let mut storage = CacheStorage::new(ORIGIN);

    let v1 = container
        .install(versioned_config("assets_v1"), &mut storage, &network)
        .unwrap();
    container.activate(v1).unwrap();
    let client = container.connect_client("/");

    // A new version ships with a version-scoped store
    deploy(&network, 2);
    let v2 = container
        .install(versioned_config("assets_v2"), &mut storage, &network)
        .unwrap();
    // Until activation, the open client is still v1's
    assert_eq!(container.clients().controller_of(&client), Some(v1));

    container.activate(v2).unwrap();
    assert_eq!(container.clients().controller_of(&client), Some(v2));

    // The same client's next request runs the new version's refresh
    deploy(&network, 3);
    let mut event = FetchEvent::new(
        Request::new(format!("{}/assets/index.css", ORIGIN)).with_client(client.clone()),
    );
    assert!(container.dispatch_fetch(&mut event, &mut storage, &network));

    let refreshed = storage.open("assets_v2").match_path("/assets/index.css").unwrap();
    assert_eq!(refreshed.body, Some(bundle_body("/assets/index.css", 3)));
    // ...and v1's store was not the one written
    let untouched = storage.open("assets_v1").match_path("/assets/index.css").unwrap();
    assert_eq!(untouched.body, Some(bundle_body("/assets/index.css", 1)));
}

#[test]
fn test_takeover_claims_every_open_client() {
    let network = shell_bundle();
    let mut container = Container::new(ORIGIN);
    let mut storage = CacheStorage::new(ORIGIN);

    let clients = [
        container.connect_client("/"),
        container.connect_client("/about"),
        container.connect_client("/settings"),
    ];

    let id = container
        .install(ProxyConfig::default(), &mut storage, &network)
        .unwrap();
    container.activate(id).unwrap();

    for client in &clients {
        assert_eq!(container.clients().controller_of(client), Some(id));
    }
}

#[test]
fn test_superseded_version_goes_redundant() {
    let network = shell_bundle();
    let mut container = Container::new(ORIGIN);
    let mut storage = CacheStorage::new(ORIGIN);

    let v1 = container
        .install(versioned_config("assets_v1"), &mut storage, &network)
        .unwrap();
    container.activate(v1).unwrap();
    let v2 = container
        .install(versioned_config("assets_v2"), &mut storage, &network)
        .unwrap();
    container.activate(v2).unwrap();

    assert_eq!(container.worker(v1).unwrap().state(), WorkerState::Redundant);
    assert_eq!(container.registration().active(), Some(v2));
}

#[test]
fn test_activation_never_touches_prior_caches() {
    let network = shell_bundle();
    let mut container = Container::new(ORIGIN);
    let mut storage = CacheStorage::new(ORIGIN);

    let v1 = container
        .install(versioned_config("assets_v1"), &mut storage, &network)
        .unwrap();
    container.activate(v1).unwrap();
    deploy(&network, 2);
    let v2 = container
        .install(versioned_config("assets_v2"), &mut storage, &network)
        .unwrap();
    container.activate(v2).unwrap();

    // Takeover is control-only: the old store survives with its entries
    let old = storage.get("assets_v1").unwrap().match_path("/").unwrap();
    assert_eq!(old.body, Some(bundle_body("/", 1)));
}
