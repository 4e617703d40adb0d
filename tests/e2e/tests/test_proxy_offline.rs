//! E2E: network-first serving and offline fallback
//!
//! Drives a full install -> activate -> fetch flow against a scripted
//! origin and checks the passthrough, refresh, and cold-miss behavior
//! of the proxy as clients would observe it.

use offcache_e2e_tests::{bundle_body, deploy, shell_bundle, ScriptedNetwork};
use offcache_worker::{CacheStorage, Container, FetchEvent, ProxyConfig, Request};

const ORIGIN: &str = "https://example.com";

fn activated() -> (Container, CacheStorage, ScriptedNetwork) {
    let network = shell_bundle();
    let mut container = Container::new(ORIGIN);
    let mut storage = CacheStorage::new(ORIGIN);
    let id = container
        .install(ProxyConfig::default(), &mut storage, &network)
        .unwrap();
    container.activate(id).unwrap();
    (container, storage, network)
}

fn client_request(path: &str, client: &str) -> Request {
    Request::new(format!("{}{}", ORIGIN, path)).with_client(client)
}

#[test]
fn test_unmanaged_path_passes_untouched() {
    let (mut container, mut storage, network) = activated();
    let client = container.connect_client("/");

    let mut event = FetchEvent::new(client_request("/api/notes", &client));
    let intercepted = container.dispatch_fetch(&mut event, &mut storage, &network);

    assert!(!intercepted);
    assert!(!event.responded());
    // The proxy never reached for the network on its behalf
    assert_eq!(network.attempts_for("/api/notes"), 0);
}

#[test]
fn test_offline_serves_last_successful_fetch_byte_for_byte() {
    let (mut container, mut storage, network) = activated();
    let client = container.connect_client("/");

    // A newer deploy goes live; the online fetch sees it and refreshes
    deploy(&network, 2);
    let mut event = FetchEvent::new(client_request("/assets/index.js", &client));
    assert!(container.dispatch_fetch(&mut event, &mut storage, &network));
    let live = event.take_response().unwrap();
    assert_eq!(live.body, Some(bundle_body("/assets/index.js", 2)));

    // The network goes away; the stored copy is exactly the live one
    network.set_offline(true);
    let mut event = FetchEvent::new(client_request("/assets/index.js", &client));
    assert!(container.dispatch_fetch(&mut event, &mut storage, &network));
    let fallback = event.take_response().unwrap();
    assert_eq!(fallback, live);
}

#[test]
fn test_repeated_refresh_keeps_single_entry_per_path() {
    let (mut container, mut storage, network) = activated();
    let client = container.connect_client("/");

    for _ in 0..4 {
        let mut event = FetchEvent::new(client_request("/assets/index.css", &client));
        assert!(container.dispatch_fetch(&mut event, &mut storage, &network));
    }

    // Precache stored five entries; refreshes overwrote, never added
    assert_eq!(storage.open("assets_v1").len(), 5);
}

#[test]
fn test_exactly_one_network_attempt_per_fetch() {
    let (mut container, mut storage, network) = activated();
    let client = container.connect_client("/");
    network.set_offline(true);

    let before = network.attempts_for("/assets/index.css");
    let mut event = FetchEvent::new(client_request("/assets/index.css", &client));
    assert!(container.dispatch_fetch(&mut event, &mut storage, &network));

    // One attempt, no retry; the answer came from the precached copy
    assert_eq!(network.attempts_for("/assets/index.css"), before + 1);
    assert_eq!(
        network.requests().last().map(String::as_str),
        Some("/assets/index.css")
    );
    let response = event.take_response().unwrap();
    assert_eq!(response.body, Some(bundle_body("/assets/index.css", 1)));
}

#[test]
fn test_query_string_is_ignored_for_membership_and_keying() {
    let (mut container, mut storage, network) = activated();
    let client = container.connect_client("/");

    let mut event = FetchEvent::new(client_request("/assets/index.js?v=42", &client));
    assert!(container.dispatch_fetch(&mut event, &mut storage, &network));
    assert_eq!(storage.open("assets_v1").len(), 5);
}

#[test]
fn test_cold_miss_offline_resolves_absent() {
    let (mut container, mut storage, network) = activated();
    let client = container.connect_client("/");

    // The store is evicted out from under the proxy, then the network drops
    assert!(storage.delete("assets_v1"));
    network.set_offline(true);

    let mut event = FetchEvent::new(client_request("/", &client));
    assert!(container.dispatch_fetch(&mut event, &mut storage, &network));
    let response = event.take_response().unwrap();
    assert!(response.is_error());
    assert!(response.body.is_none());
}

#[test]
fn test_clientless_request_passes_through() {
    let (mut container, mut storage, network) = activated();
    container.connect_client("/");

    let mut event = FetchEvent::new(Request::new(format!("{}/", ORIGIN)));
    assert!(!container.dispatch_fetch(&mut event, &mut storage, &network));
    assert!(!event.responded());
}
