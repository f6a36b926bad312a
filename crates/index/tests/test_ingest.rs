//! Ingestion tests

use presage_index::{Chunker, IndexError, Ingestor, MockEmbedder, VectorStore};

#[tokio::test]
async fn text_file_is_chunked_and_indexed() {
    let tmp = tempfile::tempdir().unwrap();
    let index_dir = tmp.path().join("index");
    let documents_dir = tmp.path().join("documents");

    let file = tmp.path().join("milestones.txt");
    tokio::fs::write(
        &file,
        "FortiGate 100E launched in March 2016.\n\nEnd of order date: March 2021.\n\nEnd of support: March 2026.",
    )
    .await
    .unwrap();

    let ingestor = Ingestor::new(&index_dir, &documents_dir).with_chunker(Chunker::new(40));
    let embedder = MockEmbedder::default();

    let report = ingestor
        .ingest_path(&file, "product-milestones", &embedder)
        .await
        .unwrap();

    assert_eq!(report.collection, "product-milestones");
    assert_eq!(report.chunks_added, 3);

    let store = VectorStore::new(&index_dir);
    let collection = store.open("product-milestones").await.unwrap();
    assert_eq!(collection.len(), 3);
}

#[tokio::test]
async fn ingesting_again_appends_to_the_collection() {
    let tmp = tempfile::tempdir().unwrap();
    let index_dir = tmp.path().join("index");

    let file = tmp.path().join("notes.txt");
    tokio::fs::write(&file, "short note").await.unwrap();

    let ingestor = Ingestor::new(&index_dir, tmp.path().join("documents"));
    let embedder = MockEmbedder::default();

    ingestor.ingest_path(&file, "notes", &embedder).await.unwrap();
    ingestor.ingest_path(&file, "notes", &embedder).await.unwrap();

    let collection = VectorStore::new(&index_dir).open("notes").await.unwrap();
    assert_eq!(collection.len(), 2);
}

#[tokio::test]
async fn html_is_converted_to_text() {
    let tmp = tempfile::tempdir().unwrap();
    let index_dir = tmp.path().join("index");

    let file = tmp.path().join("page.html");
    tokio::fs::write(
        &file,
        "<html><body><h1>Datasheet</h1><p>Throughput: 10 Gbps</p></body></html>",
    )
    .await
    .unwrap();

    let ingestor = Ingestor::new(&index_dir, tmp.path().join("documents"));
    let embedder = MockEmbedder::default();

    let report = ingestor.ingest_path(&file, "datasheets", &embedder).await.unwrap();
    assert!(report.chunks_added >= 1);

    let collection = VectorStore::new(&index_dir).open("datasheets").await.unwrap();
    let hits = collection.query("throughput", 1, &embedder).await.unwrap();
    assert!(hits[0].text.contains("10 Gbps"));
    assert!(!hits[0].text.contains("<p>"));
}

#[tokio::test]
async fn pdf_is_rejected_as_unsupported() {
    let tmp = tempfile::tempdir().unwrap();
    let file = tmp.path().join("datasheet.pdf");
    tokio::fs::write(&file, b"%PDF-1.4").await.unwrap();

    let ingestor = Ingestor::new(tmp.path().join("index"), tmp.path().join("documents"));
    let embedder = MockEmbedder::default();

    let result = ingestor.ingest_path(&file, "datasheets", &embedder).await;
    assert!(matches!(result, Err(IndexError::Unsupported(_))));
}
