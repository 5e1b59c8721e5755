//! Tests for the in-memory vector store: ordering, filtering, and
//! full-replace ingestion semantics.

use gunner_rag::document::ChunkMetadata;
use gunner_rag::inmemory::InMemoryVectorStore;
use gunner_rag::vectorstore::{ALL_CATEGORIES, VectorStore};
use proptest::prelude::*;

fn meta(source: &str, category: &str, chunk_id: usize) -> ChunkMetadata {
    ChunkMetadata { source: source.to_string(), category: category.to_string(), chunk_id }
}

/// Add a batch of single-chunk documents with the given embeddings and
/// categories.
async fn seed(store: &InMemoryVectorStore, entries: &[(&str, Vec<f32>, &str)]) {
    let texts: Vec<String> = entries.iter().map(|(text, ..)| text.to_string()).collect();
    let embeddings: Vec<Vec<f32>> = entries.iter().map(|(_, e, _)| e.clone()).collect();
    let metadatas: Vec<ChunkMetadata> =
        entries.iter().map(|(text, _, cat)| meta(text, cat, 0)).collect();
    let ids: Vec<String> = entries.iter().map(|(text, ..)| format!("{text}_0")).collect();
    store.add_documents(&texts, &embeddings, &metadatas, &ids).await.unwrap();
}

#[tokio::test]
async fn empty_collection_returns_no_results() {
    let store = InMemoryVectorStore::new("kb");
    let results = store.query(&[1.0, 0.0], 5, ALL_CATEGORIES).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn query_returns_nearest_first() {
    let store = InMemoryVectorStore::new("kb");
    seed(
        &store,
        &[
            ("far", vec![0.0, 1.0], "history"),
            ("near", vec![1.0, 0.0], "history"),
            ("mid", vec![0.7, 0.7], "history"),
        ],
    )
    .await;

    let results = store.query(&[1.0, 0.0], 3, ALL_CATEGORIES).await.unwrap();
    let texts: Vec<&str> = results.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, ["near", "mid", "far"]);
    assert!(results[0].distance < results[1].distance);
}

#[tokio::test]
async fn category_filter_restricts_results() {
    let store = InMemoryVectorStore::new("kb");
    seed(
        &store,
        &[
            ("arteta", vec![1.0, 0.0], "managers"),
            ("henry", vec![0.9, 0.1], "players"),
            ("wenger", vec![0.8, 0.2], "managers"),
        ],
    )
    .await;

    let managers = store.query(&[1.0, 0.0], 10, "managers").await.unwrap();
    assert_eq!(managers.len(), 2);
    assert!(managers.iter().all(|r| r.metadata.category == "managers"));

    let unfiltered = store.query(&[1.0, 0.0], 10, ALL_CATEGORIES).await.unwrap();
    assert_eq!(unfiltered.len(), 3);

    let unknown = store.query(&[1.0, 0.0], 10, "stadiums").await.unwrap();
    assert!(unknown.is_empty());
}

#[tokio::test]
async fn add_documents_replaces_prior_contents() {
    let store = InMemoryVectorStore::new("kb");
    seed(&store, &[("old_a", vec![1.0, 0.0], "history"), ("old_b", vec![0.0, 1.0], "history")])
        .await;
    assert_eq!(store.info().await.count, 2);

    seed(&store, &[("new", vec![1.0, 0.0], "history")]).await;

    let info = store.info().await;
    assert_eq!(info.count, 1);
    let results = store.query(&[1.0, 0.0], 10, ALL_CATEGORIES).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].text, "new");
}

#[tokio::test]
async fn info_reports_name_and_count() {
    let store = InMemoryVectorStore::new("gunnergpt_arsenal_kb");
    let info = store.info().await;
    assert_eq!(info.name, "gunnergpt_arsenal_kb");
    assert_eq!(info.count, 0);
}

#[tokio::test]
async fn mismatched_input_lengths_are_rejected() {
    let store = InMemoryVectorStore::new("kb");
    let result = store
        .add_documents(
            &["a".to_string()],
            &[],
            &[meta("a.txt", "history", 0)],
            &["a.txt_0".to_string()],
        )
        .await;
    assert!(result.is_err());
}

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map("non-zero embedding", |mut v| {
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm < 1e-8 {
            return None;
        }
        for val in &mut v {
            *val /= norm;
        }
        Some(v)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// For any set of stored embeddings, query results come back ordered by
    /// ascending distance and bounded by top_k.
    #[test]
    fn results_ordered_ascending_and_bounded_by_top_k(
        embeddings in proptest::collection::vec(arb_normalized_embedding(16), 1..20),
        query in arb_normalized_embedding(16),
        top_k in 1usize..25,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let (results, stored) = rt.block_on(async {
            let store = InMemoryVectorStore::new("kb");
            let entries: Vec<(String, Vec<f32>, &str)> = embeddings
                .iter()
                .enumerate()
                .map(|(i, e)| (format!("chunk_{i}"), e.clone(), "history"))
                .collect();

            let texts: Vec<String> = entries.iter().map(|(t, ..)| t.clone()).collect();
            let vectors: Vec<Vec<f32>> = entries.iter().map(|(_, e, _)| e.clone()).collect();
            let metadatas: Vec<ChunkMetadata> =
                entries.iter().map(|(t, _, c)| meta(t, c, 0)).collect();
            let ids = texts.clone();
            store.add_documents(&texts, &vectors, &metadatas, &ids).await.unwrap();

            (store.query(&query, top_k, ALL_CATEGORIES).await.unwrap(), entries.len())
        });

        prop_assert!(results.len() <= top_k);
        prop_assert!(results.len() <= stored);

        for window in results.windows(2) {
            prop_assert!(
                window[0].distance <= window[1].distance,
                "results not in ascending distance order: {} > {}",
                window[0].distance,
                window[1].distance,
            );
        }

        // Cosine distance over non-zero vectors stays in [0, 2].
        for result in &results {
            prop_assert!((-1e-5..=2.0 + 1e-5).contains(&(result.distance as f64)));
        }
    }
}
