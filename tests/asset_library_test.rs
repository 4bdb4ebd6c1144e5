// Runs against a live scene server: FLOW_MARKS_REST_URL=https://host/api/v1/
// FLOW_MARKS_TOKEN=... cargo test --features integration-tests
#[cfg(feature = "integration-tests")]
use flow_marks::{
    Context,
    data_structures::geometry_cache::{GeometryCache, UNKNOWN_CATEGORY},
    resources::AssetLoader,
};

#[tokio::test]
#[cfg(feature = "integration-tests")]
async fn should_populate_cache_from_live_library() {
    let Ok(rest_url) = std::env::var("FLOW_MARKS_REST_URL") else {
        eprintln!("FLOW_MARKS_REST_URL not set, skipping");
        return;
    };
    let ctx = Context {
        rest_url,
        auth_token: std::env::var("FLOW_MARKS_TOKEN").ok(),
        ..Default::default()
    };
    let loader = AssetLoader::from_context(&ctx).expect("valid rest url");
    let mut cache = GeometryCache::new();

    let summary = loader
        .load_assets(&mut cache, false, None)
        .await
        .expect("asset library reachable");

    assert!(summary.subscribe);
    assert!(cache.contains(UNKNOWN_CATEGORY));
    for name in summary.models.iter().chain(&summary.defaults) {
        assert!(cache.contains(name), "{name} missing from cache");
    }
}
