mod common;

use aimsage_knowledge::{KnowledgeEngine, SearchQuery};

use common::{FakeEmbedder, MemoryVectorStore, test_settings, text_doc};

fn engine_with_store() -> (
    KnowledgeEngine<FakeEmbedder, MemoryVectorStore>,
    MemoryVectorStore,
) {
    let store = MemoryVectorStore::new();
    let engine = KnowledgeEngine::with_parts(test_settings(), FakeEmbedder, store.clone());
    (engine, store)
}

fn crosshair_guide() -> aimsage_knowledge::TextKnowledge {
    text_doc(
        "Crosshair placement guide",
        "Keep your crosshair at head height when holding angles.",
        "positioning",
    )
}

#[tokio::test]
async fn text_documents_are_searchable() {
    let (engine, _store) = engine_with_store();
    engine.ensure_index().await.unwrap();

    let indexed = engine
        .index_text_knowledge(&crosshair_guide(), false)
        .await
        .unwrap();
    assert!(indexed);

    let results = engine
        .search(&SearchQuery::new("crosshair"))
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert!(result.id.starts_with("text_"));
    assert_eq!(result.title, "Crosshair placement guide");
    assert_eq!(result.url, "");
    assert!(result.metadata.is_text_knowledge);
    assert_eq!(result.metadata.category.as_deref(), Some("positioning"));
}

#[tokio::test]
async fn near_duplicate_titles_are_skipped() {
    let (engine, store) = engine_with_store();
    engine.ensure_index().await.unwrap();

    assert!(
        engine
            .index_text_knowledge(&crosshair_guide(), false)
            .await
            .unwrap()
    );
    // same title scores above the duplicate threshold against its own record
    assert!(
        !engine
            .index_text_knowledge(&crosshair_guide(), false)
            .await
            .unwrap()
    );
    assert_eq!(store.record_count(&engine.settings().index_name), 1);

    // force_overwrite bypasses the probe and rewrites in place
    assert!(
        engine
            .index_text_knowledge(&crosshair_guide(), true)
            .await
            .unwrap()
    );
    assert_eq!(store.record_count(&engine.settings().index_name), 1);
}

#[tokio::test]
async fn unrelated_titles_are_not_treated_as_duplicates() {
    let (engine, store) = engine_with_store();
    engine.ensure_index().await.unwrap();

    assert!(
        engine
            .index_text_knowledge(&crosshair_guide(), false)
            .await
            .unwrap()
    );

    let other = text_doc(
        "Sensitivity tuning guide",
        "Find a comfortable sensitivity and stick with it.",
        "settings",
    );
    assert!(engine.index_text_knowledge(&other, false).await.unwrap());
    assert_eq!(store.record_count(&engine.settings().index_name), 2);
}
