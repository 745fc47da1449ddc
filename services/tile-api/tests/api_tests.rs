//! Integration test: HTTP routes exercised in-process.

mod common;

use axum::http::{Method, StatusCode};
use common::test_app;
use serde_json::json;
use test_utils::users::{OWNER, STRANGER};

// =============================================================================
// Tiles
// =============================================================================

#[tokio::test]
async fn test_tiles_dedupe_and_omit() {
    let app = test_app().await;
    let (status, body) = app
        .get_json("/api/v1/tiles/?d=mx.0.0.0&d=mx.0.0.0&d=nope.0.0.0&d=mx.9.0.0&d=garbage", None)
        .await;

    assert_eq!(status, StatusCode::OK);
    let tiles = body.as_object().unwrap();
    assert_eq!(tiles.len(), 1);
    assert_eq!(tiles["mx.0.0.0"]["dtype"], "float16");
    assert_eq!(tiles["mx.0.0.0"]["shape"], json!([16, 16]));
    assert!(tiles["mx.0.0.0"]["dense"].is_string());
}

#[tokio::test]
async fn test_private_tiles_need_owner() {
    let app = test_app().await;

    let (_, body) = app.get_json("/api/v1/tiles/?d=mx-secret.0.0.0", Some(STRANGER)).await;
    assert!(body.as_object().unwrap().is_empty());

    let (_, body) = app.get_json("/api/v1/tiles/?d=mx-secret.0.0.0", Some(OWNER)).await;
    assert!(body.get("mx-secret.0.0.0").is_some());
}

#[tokio::test]
async fn test_tileset_info_reports_errors() {
    let app = test_app().await;
    let (status, body) = app
        .get_json("/api/v1/tileset_info/?d=mx&d=mx-secret&d=x1x", None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mx"]["name"], "mx dataset");
    assert_eq!(body["mx"]["coordSystem"], "toy");
    assert_eq!(body["mx"]["tile_size"], 16);
    assert!(body["mx-secret"]["error"].is_string());
    assert!(body["x1x"]["error"].is_string());
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_list_tilesets() {
    let app = test_app().await;

    let (status, body) = app.get_json("/api/v1/tilesets/?o=name&r=1", Some(OWNER)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 4);
    let names: Vec<&str> = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["toy dataset", "mx-secret dataset", "mx dataset", "genes dataset"]);

    let (_, body) = app.get_json("/api/v1/tilesets/?limit=1", None).await;
    assert_eq!(body["count"], 3);
    assert_eq!(body["results"].as_array().unwrap().len(), 1);

    let (_, body) = app.get_json("/api/v1/tilesets/?dt=matrix&ac=MX", None).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["uuid"], "mx");
    assert_eq!(body["results"][0]["filetype"], "matrix");

    let (_, body) = app.get_json("/api/v1/tilesets/?t=xxxyx", None).await;
    assert_eq!(body["count"], 0);

    let (status, body) = app.get_json("/api/v1/tilesets/?o=owner", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_create_tileset() {
    let app = test_app().await;
    let upload = json!({
        "uid": "cc",
        "datafile": "contacts.mpyr",
        "filetype": "cooler",
        "datatype": "matrix",
        "coordSystem": "toy",
        "name": "tr2"
    });

    let (status, _) = app.post_json("/api/v1/tilesets/", None, upload.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .post_json(
            "/api/v1/tilesets/",
            Some(OWNER),
            json!({"datafile": "contacts.mpyr", "filetype": "cooler"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.post_json("/api/v1/tilesets/", Some(OWNER), upload.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["uuid"], "cc");
    assert_eq!(body["private"], true);
    assert_eq!(body["owner"], OWNER);

    let (status, body) = app.post_json("/api/v1/tilesets/", Some(OWNER), upload).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["detail"].as_str().unwrap().contains("cc"));
    assert_eq!(app.state.catalog.count_datasets().await.unwrap(), 5);
}

#[tokio::test]
async fn test_delete_tileset() {
    let app = test_app().await;

    let (status, _) = app.send(Method::DELETE, "/api/v1/tilesets/mx/", Some(STRANGER), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send(Method::DELETE, "/api/v1/tilesets/mx/", Some(OWNER), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.send(Method::DELETE, "/api/v1/tilesets/mx/", Some(OWNER), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.get_json("/api/v1/tiles/?d=mx.0.0.0", None).await;
    assert!(body.as_object().unwrap().is_empty());
}

#[tokio::test]
async fn test_uids_by_filename() {
    let app = test_app().await;

    let (_, body) = app.get_json("/api/v1/uids_by_filename/?d=contacts.mpyr", None).await;
    assert_eq!(body, json!({"count": 1, "results": ["mx"]}));

    let (_, body) = app.get_json("/api/v1/uids_by_filename/?d=xcontacts", None).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_suggest() {
    let app = test_app().await;

    let (status, body) = app.get_json("/api/v1/suggest/?d=xx&ac=r", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (_, body) = app.get_json("/api/v1/suggest/?d=genes&ac=gene1", None).await;
    let hits = body.as_array().unwrap();
    assert!(hits.len() > 1);
    assert!(hits[0]["score"].as_f64().unwrap() > hits[hits.len() - 1]["score"].as_f64().unwrap());
    assert_eq!(hits[0]["geneName"], "GENE19-AS");
}

// =============================================================================
// View configs
// =============================================================================

#[tokio::test]
async fn test_viewconfs() {
    let app = test_app().await;

    let (status, body) = app
        .post_json("/api/v1/viewconfs/", None, json!({"uid": "123", "viewconf": {"hello": "sir"}}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["uid"], "123");

    let (status, body) = app.get_json("/api/v1/viewconfs/?d=123", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"hello": "sir"}));

    let (status, body) = app
        .post_json("/api/v1/viewconfs/", None, json!({"uid": "123", "viewconf": {"try": "second"}}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["detail"].is_string());

    let (_, body) = app.get_json("/api/v1/viewconfs/?d=123", None).await;
    assert_eq!(body, json!({"hello": "sir"}));

    let (status, _) = app.get_json("/api/v1/viewconfs/?d=missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Chrom sizes
// =============================================================================

#[tokio::test]
async fn test_chrom_sizes() {
    let app = test_app().await;

    let (_, body) = app.get_json("/api/v1/available-chrom-sizes/", None).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["uuid"], "toy");

    let (status, text) = app.send(Method::GET, "/api/v1/chrom-sizes/?id=toy", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(text).unwrap(), "chr1\t2500\nchr2\t1500\n");

    let (_, body) = app.get_json("/api/v1/chrom-sizes/?id=toy&type=json", None).await;
    assert_eq!(body["chr2"], json!({"size": 1500, "offset": 2500}));

    let (status, _) = app.get_json("/api/v1/chrom-sizes/?id=toy&type=xml", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Health & metrics
// =============================================================================

#[tokio::test]
async fn test_health_and_metrics() {
    let app = test_app().await;

    let (status, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");

    let (status, _) = app.send(Method::GET, "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.send(Method::GET, "/metrics", None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
