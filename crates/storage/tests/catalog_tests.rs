//! Integration test: catalog persistence and concurrent creation.

use std::sync::Arc;

use chrono::Utc;
use storage::{Catalog, DatasetStore};
use tileset_common::{DatasetRecord, FileType, TileError};

fn record(uuid: &str, name: &str) -> DatasetRecord {
    DatasetRecord {
        uuid: uuid.to_string(),
        name: name.to_string(),
        file_path: format!("uploads/{}.sizes", name),
        file_type: FileType::ChromSizes,
        data_type: "chromsizes".to_string(),
        coord_system: String::new(),
        coord_system_2: String::new(),
        owner: Some("alice".to_string()),
        private: true,
        created: Utc::now(),
    }
}

#[tokio::test]
async fn test_records_survive_reconnect() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("catalog.db").display());

    {
        let catalog = Catalog::connect(&url).await.unwrap();
        catalog.migrate().await.unwrap();
        catalog.create_dataset(record("hg19", "hg19")).await.unwrap();
        catalog.close().await;
    }

    let catalog = Catalog::connect(&url).await.unwrap();
    catalog.migrate().await.unwrap();
    let found = catalog.get_dataset("hg19").await.unwrap().unwrap();
    assert_eq!(found.file_type, FileType::ChromSizes);
    assert!(found.private);
}

#[tokio::test]
async fn test_concurrent_creates_have_one_winner() {
    let catalog = Arc::new(Catalog::in_memory().await.unwrap());

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let catalog = catalog.clone();
            tokio::spawn(async move { catalog.create_dataset(record("shared", &format!("n{}", i))).await })
        })
        .collect();

    let mut created = 0;
    let mut conflicts = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => created += 1,
            Err(TileError::Conflict(_)) => conflicts += 1,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(conflicts, 7);
    assert_eq!(catalog.count_datasets().await.unwrap(), 1);
}
