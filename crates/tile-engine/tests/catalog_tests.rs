//! Integration test: listing, search, chrom sizes and admission.

mod common;

use common::{addresses, dataset, fixture, fixture_with, owner, stranger};
use storage::DatasetStore;
use tile_engine::{ChromSizesBody, ChromSizesFormat, EngineConfig, ListQuery};
use tileset_common::{DatasetFilter, FileType, NewDataset, Requester, TileError};
use tokio_test::{assert_err, assert_ok};

// =============================================================================
// Listing
// =============================================================================

#[tokio::test]
async fn test_list_hides_private_from_others() {
    let fx = fixture().await;
    let query = ListQuery {
        limit: Some(100),
        ..Default::default()
    };

    let mine = fx.service.list_datasets(&owner(), &query).await.unwrap();
    assert_eq!(mine.count, 7);

    let theirs = fx.service.list_datasets(&stranger(), &query).await.unwrap();
    assert_eq!(theirs.count, 5);
    assert!(theirs.results.iter().all(|r| !r.private));
}

#[tokio::test]
async fn test_list_order_and_paging() {
    let fx = fixture().await;
    let query = ListQuery {
        order_by: Some("name".to_string()),
        reverse: true,
        offset: 1,
        limit: Some(3),
        ..Default::default()
    };

    let page = fx.service.list_datasets(&owner(), &query).await.unwrap();
    assert_eq!(page.count, 7);
    assert_eq!(page.results.len(), 3);
    assert!(page.results.windows(2).all(|w| w[0].name >= w[1].name));
    // "toy dataset" is first in reverse order and skipped by the offset.
    assert_eq!(page.results[0].uuid, "sig");
}

#[tokio::test]
async fn test_list_default_page_size() {
    let fx = fixture_with(EngineConfig {
        default_page_size: 2,
        ..Default::default()
    })
    .await;

    let page = fx.service.list_datasets(&owner(), &ListQuery::default()).await.unwrap();
    assert_eq!(page.count, 7);
    assert_eq!(
        page.results.iter().map(|r| r.uuid.as_str()).collect::<Vec<_>>(),
        vec!["bw", "genes"]
    );
}

#[tokio::test]
async fn test_list_filters() {
    let fx = fixture().await;
    let query = ListQuery {
        filter: DatasetFilter {
            data_types: vec!["matrix".into(), "gene-annotation".into()],
            ..Default::default()
        },
        ..Default::default()
    };
    let page = fx.service.list_datasets(&Requester::anonymous(), &query).await.unwrap();
    assert_eq!(
        page.results.iter().map(|r| r.uuid.as_str()).collect::<Vec<_>>(),
        vec!["genes", "mx"]
    );

    let query = ListQuery {
        filter: DatasetFilter {
            file_type: Some(FileType::VectorPyramid),
            name_contains: Some("SIG".into()),
            ..Default::default()
        },
        ..Default::default()
    };
    let page = fx.service.list_datasets(&Requester::anonymous(), &query).await.unwrap();
    assert_eq!(page.count, 1);
    assert_eq!(page.results[0].uuid, "sig");
}

#[tokio::test]
async fn test_list_rejects_unknown_order_field() {
    let fx = fixture().await;
    let query = ListQuery {
        order_by: Some("owner".to_string()),
        ..Default::default()
    };
    let err = fx.service.list_datasets(&owner(), &query).await.unwrap_err();
    assert!(matches!(err, TileError::InvalidParameter { .. }));
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn test_suggest_is_ranked() {
    let fx = fixture().await;
    let hits = fx.service.suggest(&Requester::anonymous(), "genes", "gene2").await.unwrap();

    assert!(!hits.is_empty());
    assert!(hits.len() <= 10);
    assert!(hits.windows(2).all(|w| w[0].score > w[1].score
        || (w[0].score == w[1].score && w[0].uid < w[1].uid)));
    assert_eq!(hits[0].gene_name, "GENE29-AS");
}

#[tokio::test]
async fn test_suggest_unavailable_is_empty() {
    let fx = fixture().await;
    let anon = Requester::anonymous();

    assert!(fx.service.suggest(&anon, "nope", "gene").await.unwrap().is_empty());
    assert!(fx.service.suggest(&anon, "mx", "gene").await.unwrap().is_empty());
    assert!(fx.service.suggest(&stranger(), "genes-secret", "gene").await.unwrap().is_empty());
    assert!(!fx.service.suggest(&owner(), "genes-secret", "gene").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_uids_by_filename() {
    let fx = fixture().await;

    let found = fx.service.uids_by_filename(&owner(), "contacts.mpyr").await.unwrap();
    assert_eq!(found.count, 2);
    assert_eq!(found.results, vec!["mx".to_string(), "mx-secret".to_string()]);

    let found = fx.service.uids_by_filename(&stranger(), "contacts.mpyr").await.unwrap();
    assert_eq!(found.results, vec!["mx".to_string()]);

    let found = fx.service.uids_by_filename(&owner(), "missing.mpyr").await.unwrap();
    assert_eq!(found.count, 0);
}

#[tokio::test]
async fn test_chrom_sizes() {
    let fx = fixture().await;
    let anon = Requester::anonymous();

    let available = fx.service.available_chrom_sizes(&anon).await.unwrap();
    assert_eq!(available.count, 1);
    assert_eq!(available.results[0].uuid, "toy");

    let tsv = fx.service.chrom_sizes(&anon, "toy", ChromSizesFormat::Tsv).await.unwrap();
    assert_eq!(tsv, ChromSizesBody::Tsv("chr1\t2500\nchr2\t1500\n".to_string()));

    let ChromSizesBody::Json(json) = fx.service.chrom_sizes(&anon, "genes", ChromSizesFormat::Json).await.unwrap()
    else {
        panic!("expected JSON chrom sizes");
    };
    assert_eq!(json["chr2"].size, 1500);
    assert_eq!(json["chr2"].offset, 2500);

    let err = fx.service.chrom_sizes(&anon, "sig", ChromSizesFormat::Tsv).await.unwrap_err();
    assert!(matches!(err, TileError::InvalidParameter { .. }));
    let err = fx.service.chrom_sizes(&anon, "nope", ChromSizesFormat::Tsv).await.unwrap_err();
    assert!(matches!(err, TileError::NotFound(_)));
}

// =============================================================================
// Admission
// =============================================================================

#[tokio::test]
async fn test_duplicate_create_conflicts() {
    let fx = fixture().await;
    let err = fx
        .service
        .create_dataset(&owner(), dataset("mx", "other.mpyr", "cooler", "matrix", false))
        .await
        .unwrap_err();
    assert!(matches!(err, TileError::Conflict(_)));

    let kept = fx.catalog.get_dataset("mx").await.unwrap().unwrap();
    assert_eq!(kept.file_path, "contacts.mpyr");
    assert_eq!(fx.catalog.count_datasets().await.unwrap(), 7);
}

#[tokio::test]
async fn test_create_validation() {
    let fx = fixture().await;

    let err = fx
        .service
        .create_dataset(&Requester::anonymous(), dataset("a", "a.mpyr", "cooler", "matrix", false))
        .await
        .unwrap_err();
    assert!(matches!(err, TileError::PermissionDenied(_)));

    let mut missing_coords = dataset("b", "b.mpyr", "cooler", "matrix", false);
    missing_coords.coord_system = Some("  ".to_string());
    let err = fx.service.create_dataset(&owner(), missing_coords).await.unwrap_err();
    assert!(matches!(err, TileError::InvalidParameter { .. }));

    let err = fx
        .service
        .create_dataset(&owner(), dataset("c.1", "c.mpyr", "cooler", "matrix", false))
        .await
        .unwrap_err();
    assert!(matches!(err, TileError::InvalidParameter { .. }));

    assert_eq!(fx.catalog.count_datasets().await.unwrap(), 7);
}

#[tokio::test]
async fn test_create_defaults() {
    let fx = fixture().await;
    let record = assert_ok!(
        fx.service
            .create_dataset(
                &owner(),
                NewDataset {
                    file_path: "uploads/hg38.chrom.sizes".to_string(),
                    file_type: "chromsizes".to_string(),
                    ..Default::default()
                },
            )
            .await
    );

    assert_eq!(record.uuid.len(), 32);
    assert!(record.private);
    assert_eq!(record.name, "hg38.chrom.sizes");
    assert_eq!(record.owner.as_deref(), Some("alice"));
    assert_eq!(record.file_type, FileType::ChromSizes);
}

#[tokio::test]
async fn test_uploads_disabled() {
    let fx = fixture_with(EngineConfig {
        upload_enabled: false,
        ..Default::default()
    })
    .await;

    let err = fx
        .service
        .create_dataset(&owner(), dataset("new", "new.mpyr", "cooler", "matrix", false))
        .await
        .unwrap_err();
    assert!(matches!(err, TileError::PermissionDenied(_)));

    let err = assert_err!(fx.service.create_viewconf(None, serde_json::json!({})).await);
    assert!(matches!(err, TileError::PermissionDenied(_)));
}

#[tokio::test]
async fn test_delete_is_owner_only() {
    let fx = fixture().await;
    let batch = addresses(&["mx.1.0.0"]);
    assert_eq!(fx.service.get_tiles(&stranger(), &batch).await.len(), 1);

    let err = assert_err!(fx.service.delete_dataset(&stranger(), "mx").await);
    assert!(matches!(err, TileError::PermissionDenied(_)));

    assert_ok!(fx.service.delete_dataset(&owner(), "mx").await);
    assert!(fx.service.get_tiles(&stranger(), &batch).await.is_empty());
    assert_eq!(fx.service.cache_stats().await.entries, 0);

    let err = fx.service.delete_dataset(&owner(), "mx").await.unwrap_err();
    assert!(matches!(err, TileError::NotFound(_)));
}

#[tokio::test]
async fn test_viewconfs() {
    let fx = fixture().await;
    let doc = serde_json::json!({"editable": true, "views": []});

    let stored = fx.service.create_viewconf(Some("default".into()), doc.clone()).await.unwrap();
    assert_eq!(stored.uuid, "default");

    let err = fx
        .service
        .create_viewconf(Some("default".into()), serde_json::json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, TileError::Conflict(_)));
    assert_eq!(fx.service.get_viewconf("default").await.unwrap().document, doc);

    let generated = fx.service.create_viewconf(None, doc).await.unwrap();
    assert_eq!(generated.uuid.len(), 32);

    let err = fx.service.get_viewconf("missing").await.unwrap_err();
    assert!(matches!(err, TileError::NotFound(_)));
}
