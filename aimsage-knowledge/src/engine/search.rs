use std::collections::HashSet;

use tracing::debug;

use aimsage_core::KnowledgeSettings;

use crate::embeddings::{Embedder, embed_document};
use crate::errors::KnowledgeResult;
use crate::models::{ContentRecord, SearchQuery, SearchResult};
use crate::store::{QueryHit, VectorStore};

/// Semantic search: embed the query text, pull nearest neighbors, then apply
/// score threshold, categorical filters, and order-preserving dedup by id.
pub(crate) async fn search<E: Embedder, S: VectorStore>(
    settings: &KnowledgeSettings,
    embedder: &E,
    store: &S,
    query: &SearchQuery,
) -> KnowledgeResult<Vec<SearchResult>> {
    let limit = query.limit.unwrap_or(settings.search.default_limit);
    if limit == 0 {
        return Ok(Vec::new());
    }

    let vector = embed_document(embedder, settings, &query.text).await?;
    let hits = store.query(&settings.index_name, &vector, limit).await?;
    debug!(
        index = %settings.index_name,
        candidates = hits.len(),
        "ran nearest-neighbor query"
    );

    let mut seen = HashSet::new();
    let mut results = Vec::new();
    for hit in hits {
        if hit.score < query.min_score {
            continue;
        }
        if !matches_filters(query, &hit.metadata) {
            continue;
        }
        if !seen.insert(hit.id.clone()) {
            continue;
        }
        results.push(to_search_result(hit));
        if results.len() == limit {
            break;
        }
    }

    Ok(results)
}

/// Categorical post-filters. List filters pass when any requested value
/// matches exactly; difficulty compares case-insensitively.
fn matches_filters(query: &SearchQuery, record: &ContentRecord) -> bool {
    if let Some(elements) = &query.aim_elements
        && !elements.is_empty()
        && !intersects(elements, &record.aim_elements)
    {
        return false;
    }
    if let Some(games) = &query.target_games
        && !games.is_empty()
        && !intersects(games, &record.target_games)
    {
        return false;
    }
    if let Some(difficulty) = &query.difficulty_level
        && !record.difficulty_level.eq_ignore_ascii_case(difficulty)
    {
        return false;
    }
    true
}

fn intersects(wanted: &[String], present: &[String]) -> bool {
    wanted.iter().any(|value| present.contains(value))
}

fn to_search_result(hit: QueryHit) -> SearchResult {
    let record = hit.metadata;
    let url = if record.is_text_knowledge {
        String::new()
    } else {
        format!("https://www.youtube.com/watch?v={}", record.id)
    };
    let matched_content_summary = if record.key_insights.is_empty() {
        record.summary.clone()
    } else {
        format!(
            "{}: {}",
            record.title,
            record.key_insights[..record.key_insights.len().min(2)].join(", ")
        )
    };

    SearchResult {
        id: hit.id,
        title: record.title.clone(),
        url,
        relevance_score: hit.score,
        difficulty_level: record.difficulty_level.clone(),
        aim_elements: record.aim_elements.clone(),
        key_insights: record.key_insights.clone(),
        practice_recommendations: record.practice_recommendations.clone(),
        matched_content_summary,
        metadata: record,
    }
}
