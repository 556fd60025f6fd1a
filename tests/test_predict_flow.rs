//! Integration tests for the prediction service flow.
//!
//! Tests cover:
//! - The full download -> detect -> upload -> parse -> persist path
//! - Distinct failure categories: missing source object, missing label
//!   file, malformed labels
//! - Annotated results landing under the run-scoped store key

mod common;

use common::*;

use filtersnap::detect::labels;

async fn service_for(
    config: &AppConfig,
    store: FsObjectStore,
    detector: FakeDetector,
) -> PredictService<FsObjectStore, FakeDetector, PredictionDb> {
    let class_names = ClassNames::new(vec!["person".to_string(), "cat".to_string()]);
    let repo = PredictionDb::new(&config.db_file)
        .await
        .expect("Failed to open prediction db");
    PredictService::new(config, class_names, store, detector, repo)
}

#[tokio::test]
async fn test_predict_full_flow() -> anyhow::Result<()> {
    let (config, dir) = create_test_workspace("images-bucket");
    let store = FsObjectStore::new(dir.path().join("store"));

    let source = create_test_image();
    seed_object(&store, source.path(), "images-bucket", "cat.png").await;

    let detector = FakeDetector {
        label_lines: Some("1 0.5 0.5 0.25 0.4\n0 0.1 0.2 0.05 0.05\n".to_string()),
    };
    let service = service_for(&config, store.clone(), detector).await;

    let summary = service.predict("cat.png").await?;

    assert_eq!(summary.labels.len(), 2);
    assert_eq!(summary.labels[0].class, "cat");
    assert_eq!(summary.labels[1].class, "person");
    assert!(summary.original_img_path.ends_with("cat.png"));

    // Annotated image was uploaded under the run id
    let annotated = dir
        .path()
        .join("store")
        .join("images-bucket")
        .join(summary.prediction_id.to_string())
        .join("cat.png");
    assert!(annotated.exists());

    // Summary was persisted
    let repo = PredictionDb::new(&config.db_file).await?;
    let stored = repo
        .get_prediction(summary.prediction_id)
        .await?
        .expect("summary should be stored");
    assert_eq!(stored.labels, summary.labels);

    Ok(())
}

#[tokio::test]
async fn test_predict_missing_source_is_download_error() {
    let (config, dir) = create_test_workspace("images-bucket");
    let store = FsObjectStore::new(dir.path().join("store"));
    let detector = FakeDetector {
        label_lines: Some("0 0.5 0.5 0.2 0.2\n".to_string()),
    };
    let service = service_for(&config, store, detector).await;

    let err = service
        .predict("nope.png")
        .await
        .expect_err("missing object must fail");
    assert!(matches!(err, PredictError::Download { .. }), "got: {err}");
}

#[tokio::test]
async fn test_predict_missing_labels_is_result_not_found() {
    let (config, dir) = create_test_workspace("images-bucket");
    let store = FsObjectStore::new(dir.path().join("store"));

    let source = create_test_image();
    seed_object(&store, source.path(), "images-bucket", "cat.png").await;

    let service = service_for(&config, store, FakeDetector { label_lines: None }).await;

    let err = service
        .predict("cat.png")
        .await
        .expect_err("missing label file must fail");
    assert!(
        matches!(err, PredictError::ResultNotFound { .. }),
        "got: {err}"
    );
}

#[tokio::test]
async fn test_predict_malformed_labels_is_label_error() {
    let (config, dir) = create_test_workspace("images-bucket");
    let store = FsObjectStore::new(dir.path().join("store"));

    let source = create_test_image();
    seed_object(&store, source.path(), "images-bucket", "cat.png").await;

    let detector = FakeDetector {
        label_lines: Some("not a label line\n".to_string()),
    };
    let service = service_for(&config, store, detector).await;

    let err = service
        .predict("cat.png")
        .await
        .expect_err("malformed labels must fail");
    assert!(matches!(err, PredictError::Labels { .. }), "got: {err}");
}

#[tokio::test]
async fn test_class_table_loads_from_json_file() {
    let table_file = create_class_table(&["person", "bicycle", "car"]);
    let table = ClassNames::from_file(table_file.path()).expect("table should load");
    assert_eq!(table.resolve(2).unwrap(), "car");
    assert!(matches!(
        table.resolve(3),
        Err(labels::LabelError::UnknownClass { index: 3, count: 3 })
    ));
}

#[tokio::test]
async fn test_object_store_round_trip() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let store = FsObjectStore::new(dir.path().join("store"));

    let source = create_test_image();
    store
        .upload(source.path(), "bucket", "nested/key.png")
        .await?;

    let restored = dir.path().join("restored.png");
    store.download("bucket", "nested/key.png", &restored).await?;

    assert_eq!(std::fs::read(source.path())?, std::fs::read(&restored)?);
    Ok(())
}
