// Live tests (opt-in): cargo test --features online
#![cfg(feature = "online")]

use drillmap::api::{Client, GeoSource};
use drillmap::geo::to_map_points;
use drillmap::models::RegionCode;

#[test]
fn fetch_world_online() {
    let client = Client::default();
    let points = to_map_points(client.world().expect("world geography"));
    assert!(points.len() > 100);
    assert!(points.iter().any(|p| p.name == "Germany"));
}

#[test]
fn fetch_region_online() {
    let client = Client::default();
    let de = RegionCode::parse("DE").unwrap();
    let points = to_map_points(client.region(&de).expect("german geography"));
    assert!(points.iter().any(|p| p.property("hc-key").as_deref() == Some("de-by")));
}

#[test]
fn unknown_region_is_http_error_online() {
    let client = Client::default();
    let err = client.region(&RegionCode::parse("zz").unwrap()).unwrap_err();
    assert!(err.status().is_some_and(|s| s >= 400));
}
