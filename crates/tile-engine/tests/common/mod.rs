//! Common fixtures for tile-engine tests
//!
//! Builds a small data directory with one container per format, registers
//! the datasets in an in-memory catalog and returns a ready `TileService`.

#![allow(dead_code)]

use std::sync::Arc;

use container_reader::{
    IntervalDbMeta, IntervalDbWriter, IntervalLayout, IntervalRecord, MatrixPyramidWriter, VectorPyramidWriter,
};
use storage::Catalog;
use test_utils::{
    assemblies, chromsizes_text, create_balancing_weights, create_contact_matrix, create_features, create_signal,
    users, TempWorkspace,
};
use tile_engine::{EngineConfig, TileService};
use tileset_common::{NewDataset, Requester, TransformSpec};

pub const MATRIX_BINS: usize = 250;
pub const MATRIX_TILE_SIZE: u64 = 16;

pub struct Fixture {
    pub workspace: TempWorkspace,
    pub catalog: Arc<Catalog>,
    pub service: TileService,
}

pub fn owner() -> Requester {
    Requester::user(users::OWNER)
}

pub fn stranger() -> Requester {
    Requester::user(users::STRANGER)
}

pub fn addresses(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}

pub fn dataset(uuid: &str, file_path: &str, file_type: &str, data_type: &str, private: bool) -> NewDataset {
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

/// Write every container and register:
///
/// | uuid | file | type | private |
/// |---|---|---|---|
/// | `mx` | contacts.mpyr | matrix | no |
/// | `mx-secret` | contacts.mpyr | matrix | yes |
/// | `sig` | signal.vpyr | vector | no |
/// | `genes` | genes.beddb | beddb | no |
/// | `genes-secret` | genes.beddb | beddb | yes |
/// | `toy` | toy.chrom.sizes | chromsizes | no |
/// | `bw` | track.bigwig | bigwig | no |
pub async fn fixture_with(config: EngineConfig) -> Fixture {
    let workspace = TempWorkspace::new();

    MatrixPyramidWriter::new(MATRIX_TILE_SIZE, 1000)
        .with_transform(
            TransformSpec {
                name: "ICE".to_string(),
                value: "weight".to_string(),
            },
            create_balancing_weights(MATRIX_BINS),
        )
        .write(&workspace.path("contacts.mpyr"), &create_contact_matrix(MATRIX_BINS), MATRIX_BINS)
        .expect("Failed to write matrix");

    VectorPyramidWriter::new(256)
        .write(&workspace.path("signal.vpyr"), &create_signal(3000))
        .expect("Failed to write vector");

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
    workspace.write("track.bigwig", "not tiled here");

    let catalog = Arc::new(Catalog::in_memory().await.expect("Failed to open catalog"));
    let service = TileService::new(
        catalog.clone(),
        catalog.clone(),
        EngineConfig {
            data_dir: workspace.path(""),
            ..config
        },
    );

    let upload = EngineConfig {
        upload_enabled: true,
        ..service.config().clone()
    };
    let admin = TileService::new(catalog.clone(), catalog.clone(), upload);
    for new in [
        dataset("mx", "contacts.mpyr", "cooler", "matrix", false),
        dataset("mx-secret", "contacts.mpyr", "cooler", "matrix", true),
        dataset("sig", "signal.vpyr", "hitile", "vector", false),
        dataset("genes", "genes.beddb", "beddb", "gene-annotation", false),
        dataset("genes-secret", "genes.beddb", "beddb", "gene-annotation", true),
        dataset("toy", "toy.chrom.sizes", "chromsizes-tsv", "chromsizes", false),
        dataset("bw", "track.bigwig", "bigwig", "vector", false),
    ] {
        admin.create_dataset(&owner(), new).await.expect("Failed to register dataset");
    }

    Fixture {
        workspace,
        catalog,
        service,
    }
}

pub async fn fixture() -> Fixture {
    fixture_with(EngineConfig::default()).await
}
