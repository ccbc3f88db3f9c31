//! End-to-end router tests for `/counter` and the operational endpoints.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use image::{Rgba, RgbaImage};
use tower::util::ServiceExt;

use hitcounter_core::error::StoreError;
use hitcounter_core::{
    CounterOptions, CounterService, CounterStore, MemoryCounterStore, SpriteSet,
};
use hitcounter_gateway::{app_state::AppState, config, router};

const W: u32 = 4;
const H: u32 = 6;

fn glyphs() -> Vec<RgbaImage> {
    (0..10u8)
        .map(|d| RgbaImage::from_pixel(W, H, Rgba([d * 25, 0, 0, 255])))
        .collect()
}

fn write_sprites(dir: &Path) {
    for (d, g) in glyphs().into_iter().enumerate() {
        g.save(dir.join(format!("{d}.png"))).unwrap();
    }
}

fn yaml(dir: &Path, extra: &str) -> String {
    format!(
        "version: 1\ncounter:\n  path: \"{}\"\nsprites:\n  dir: \"{}\"\n{extra}",
        dir.join("counter.dat").display(),
        dir.display(),
    )
}

fn app_from(dir: &Path, extra: &str) -> Router {
    let cfg = config::load_from_str(&yaml(dir, extra)).unwrap();
    router::build_router(AppState::new(cfg).unwrap())
}

/// Store whose reads stall while the counter lock is held.
struct StallingStore {
    inner: MemoryCounterStore,
    delay: Duration,
}

impl CounterStore for StallingStore {
    fn read(&self) -> Result<u64, StoreError> {
        std::thread::sleep(self.delay);
        self.inner.read()
    }
    fn write(&self, count: u64) -> Result<(), StoreError> {
        self.inner.write(count)
    }
}

async fn get(app: &Router, uri: &str) -> Response<Body> {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body(resp: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

#[tokio::test]
async fn counter_serves_png_attachment() {
    let dir = tempfile::tempdir().unwrap();
    write_sprites(dir.path());
    let app = app_from(dir.path(), "");

    let resp = get(&app, "/counter").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(
        resp.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"counter.png\""
    );

    let png = image::load_from_memory(&body(resp).await).unwrap().to_rgba8();
    assert_eq!((png.width(), png.height()), (W * 10, H));
    let shown: Vec<u8> = (0..10).map(|i| png.get_pixel(i * W, 0)[0] / 25).collect();
    assert_eq!(shown, vec![0, 0, 0, 0, 0, 0, 0, 0, 0, 2]);

    assert_eq!(fs::read_to_string(dir.path().join("counter.dat")).unwrap(), "2");
}

#[tokio::test]
async fn successive_requests_advance_the_count() {
    let dir = tempfile::tempdir().unwrap();
    write_sprites(dir.path());
    fs::write(dir.path().join("counter.dat"), "99").unwrap();
    let app = app_from(dir.path(), "");

    for _ in 0..3 {
        assert_eq!(get(&app, "/counter").await.status(), StatusCode::OK);
    }
    assert_eq!(fs::read_to_string(dir.path().join("counter.dat")).unwrap(), "102");
}

#[tokio::test]
async fn custom_store_via_with_counter() {
    let store = Arc::new(MemoryCounterStore::with_raw("7"));
    let svc = CounterService::new(
        store.clone(),
        SpriteSet::from_images(glyphs()).unwrap().into(),
        config::load_from_str("version: 1\ncounter:\n  pad_len: 3\n").unwrap().counter.options(),
    )
    .unwrap();
    let app = router::build_router(AppState::with_counter(config::HitCounterConfig::default(), svc));

    let png = image::load_from_memory(&body(get(&app, "/counter").await).await).unwrap();
    assert_eq!(png.width(), W * 3);
    assert_eq!(store.read().unwrap(), 8);
}

#[tokio::test]
async fn broken_sprites_fail_boot() {
    let dir = tempfile::tempdir().unwrap();
    write_sprites(dir.path());
    fs::remove_file(dir.path().join("6.png")).unwrap();

    let cfg = config::load_from_str(&yaml(dir.path(), "")).unwrap();
    assert!(AppState::new(cfg).is_err());
}

#[tokio::test]
async fn failure_is_legacy_200_json_by_default() {
    let dir = tempfile::tempdir().unwrap();
    write_sprites(dir.path());
    let app = app_from(dir.path(), "  reload_per_request: true\n");
    fs::remove_file(dir.path().join("6.png")).unwrap();

    let resp = get(&app, "/counter").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body(resp).await).unwrap();
    assert_eq!(json["message"], "Failed to generate of image.");

    // rolled back: a missing store re-persists the default prior count
    assert_eq!(fs::read_to_string(dir.path().join("counter.dat")).unwrap(), "1");
}

#[tokio::test]
async fn failure_is_5xx_in_strict_mode() {
    let dir = tempfile::tempdir().unwrap();
    write_sprites(dir.path());
    let app = app_from(
        dir.path(),
        "  reload_per_request: true\ngateway:\n  strict_errors: true\n",
    );
    fs::remove_file(dir.path().join("0.png")).unwrap();

    let resp = get(&app, "/counter").await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json: serde_json::Value = serde_json::from_slice(&body(resp).await).unwrap();
    assert_eq!(json["message"], "Failed to generate of image.");
}

#[tokio::test]
async fn ping_and_healthz() {
    let dir = tempfile::tempdir().unwrap();
    write_sprites(dir.path());
    let app = app_from(dir.path(), "");

    let resp = get(&app, "/ping").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body(resp).await).unwrap();
    assert_eq!(json["message"], "pong");

    let resp = get(&app, "/healthz").await;
    assert_eq!(body(resp).await, b"ok");
}

#[tokio::test]
async fn metrics_report_outcomes_and_current_count() {
    let dir = tempfile::tempdir().unwrap();
    write_sprites(dir.path());
    let app = app_from(dir.path(), "");

    get(&app, "/counter").await;
    get(&app, "/counter").await;

    let text = String::from_utf8(body(get(&app, "/metrics").await).await).unwrap();
    assert!(text.contains("hitcounter_requests_total{outcome=\"ok\"} 2"), "{text}");
    assert!(text.contains("hitcounter_request_duration_micros_count{} 2"), "{text}");
    assert!(text.contains("hitcounter_current_count 3"), "{text}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn lock_timeout_is_503_in_strict_mode() {
    let store = Arc::new(StallingStore {
        inner: MemoryCounterStore::new(),
        delay: Duration::from_millis(500),
    });
    let opts = CounterOptions {
        lock_timeout: Some(Duration::from_millis(50)),
        ..CounterOptions::default()
    };
    let svc = CounterService::new(store, SpriteSet::from_images(glyphs()).unwrap().into(), opts)
        .unwrap();
    let cfg = config::load_from_str("version: 1\ngateway:\n  strict_errors: true\n").unwrap();
    let app = router::build_router(AppState::with_counter(cfg, svc));

    let holder = {
        let app = app.clone();
        tokio::spawn(async move { get(&app, "/counter").await.status() })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    let resp = get(&app, "/counter").await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json: serde_json::Value = serde_json::from_slice(&body(resp).await).unwrap();
    assert_eq!(json["message"], "Failed to generate of image.");

    assert_eq!(holder.await.unwrap(), StatusCode::OK);
}

#[tokio::test]
async fn metrics_omit_count_before_first_hit() {
    let dir = tempfile::tempdir().unwrap();
    write_sprites(dir.path());
    let app = app_from(dir.path(), "");

    let text = String::from_utf8(body(get(&app, "/metrics").await).await).unwrap();
    assert!(!text.contains("hitcounter_current_count"), "{text}");
}
