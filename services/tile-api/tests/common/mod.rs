//! Common fixtures for tile-api tests

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use container_reader::{IntervalDbMeta, IntervalDbWriter, IntervalLayout, IntervalRecord, MatrixPyramidWriter};
use serde_json::Value;
use storage::Catalog;
use test_utils::{assemblies, chromsizes_text, create_contact_matrix, create_features, users, TempWorkspace};
use tile_api::{build_router, AppState, ServiceConfig};
use tile_engine::EngineConfig;
use tileset_common::{NewDataset, Requester};
use tower::ServiceExt;

pub const REQUESTER_HEADER: &str = "x-requester";

pub struct TestApp {
    pub workspace: TempWorkspace,
    pub state: Arc<AppState>,
    pub router: Router,
}

fn dataset(uuid: &str, file_path: &str, file_type: &str, data_type: &str, private: bool) -> NewDataset {
    NewDataset {
        uuid: Some(uuid.to_string()),
        name: Some(format!("{} dataset", uuid)),
        file_path: file_path.to_string(),
        file_type: file_type.to_string(),
        data_type: Some(data_type.to_string()),
        coord_system: Some("toy".to_string()),
        coord_system_2: None,
        private: Some(private),
    }
}

/// Registers, all owned by `users::OWNER`:
/// `mx` and private `mx-secret` (matrix), `genes` (beddb), `toy` (chromsizes).
pub async fn test_app() -> TestApp {
    let workspace = TempWorkspace::new();

    MatrixPyramidWriter::new(16, 1000)
        .write(&workspace.path("contacts.mpyr"), &create_contact_matrix(100), 100)
        .expect("Failed to write matrix");

    let records: Vec<IntervalRecord> = create_features(30, 100, 50)
        .into_iter()
        .map(|f| IntervalRecord::new(f.uid, f.name, f.importance, f.start, f.end))
        .collect();
    IntervalDbWriter::new(
        IntervalLayout::Linear,
        IntervalDbMeta {
            assembly: "toy".to_string(),
            chromsizes: assemblies::TOY.iter().map(|(n, s)| (n.to_string(), *s)).collect(),
            ..Default::default()
        },
    )
    .write(&workspace.path("genes.beddb"), &records)
    .await
    .expect("Failed to write interval database");

    workspace.write("toy.chrom.sizes", &chromsizes_text(assemblies::TOY));

    let catalog = Arc::new(Catalog::in_memory().await.expect("Failed to open catalog"));
    let engine = EngineConfig {
        data_dir: workspace.path(""),
        ..Default::default()
    };
    let state = Arc::new(AppState::with_catalog(catalog, ServiceConfig::default(), engine));

    let owner = Requester::user(users::OWNER);
    for new in [
        dataset("mx", "contacts.mpyr", "cooler", "matrix", false),
        dataset("mx-secret", "contacts.mpyr", "cooler", "matrix", true),
        dataset("genes", "genes.beddb", "beddb", "gene-annotation", false),
        dataset("toy", "toy.chrom.sizes", "chromsizes-tsv", "chromsizes", false),
    ] {
        state
            .service
            .create_dataset(&owner, new)
            .await
            .expect("Failed to register dataset");
    }

    let router = build_router(state.clone(), None);
    TestApp {
        workspace,
        state,
        router,
    }
}

impl TestApp {
    /// Send one request and return the status and raw body.
    pub async fn send(&self, method: Method, uri: &str, user: Option<&str>, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(REQUESTER_HEADER, user);
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self.router.clone().oneshot(request).await.expect("Request failed");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        (status, bytes.to_vec())
    }

    pub async fn get_json(&self, uri: &str, user: Option<&str>) -> (StatusCode, Value) {
        let (status, body) = self.send(Method::GET, uri, user, None).await;
        (status, serde_json::from_slice(&body).expect("Response is not JSON"))
    }

    pub async fn post_json(&self, uri: &str, user: Option<&str>, body: Value) -> (StatusCode, Value) {
        let (status, body) = self.send(Method::POST, uri, user, Some(body)).await;
        (status, serde_json::from_slice(&body).expect("Response is not JSON"))
    }
}
