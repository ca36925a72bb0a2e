use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::embeddings::{Embedder, embed_document};
use crate::errors::{KnowledgeError, KnowledgeResult};
use crate::models::{
    ContentAnalysis, ContentItem, ContentRecord, IngestReport, PracticeRecommendation,
    SearchQuery, TextKnowledge, VideoContent,
};
use crate::store::{VectorRecord, VectorStore};

use super::KnowledgeEngine;

const DESCRIPTION_MAX_CHARS: usize = 1000;
const TRANSCRIPT_MAX_CHARS: usize = 5000;
const TEXT_CONTENT_MAX_CHARS: usize = 8000;

pub(crate) async fn ensure_index<E: Embedder, S: VectorStore>(
    engine: &KnowledgeEngine<E, S>,
) -> KnowledgeResult<bool> {
    let name = &engine.settings().index_name;
    let existing = engine.store().list_indexes().await?;
    if existing.iter().any(|index| index == name) {
        return Ok(false);
    }

    engine
        .store()
        .create_index(name, engine.settings().embedding_dim)
        .await?;
    info!(
        index = %name,
        dimension = engine.settings().embedding_dim,
        "created vector index"
    );
    Ok(true)
}

pub(crate) async fn reset_index<E: Embedder, S: VectorStore>(
    engine: &KnowledgeEngine<E, S>,
) -> KnowledgeResult<()> {
    let name = engine.settings().index_name.clone();
    match engine.store().delete_index(&name).await {
        Ok(()) => info!(index = %name, "deleted vector index"),
        Err(KnowledgeError::IndexNotFound(_)) => {
            debug!(index = %name, "index absent, nothing to delete");
        }
        Err(err) => return Err(err),
    }
    ensure_index(engine).await?;
    Ok(())
}

pub(crate) async fn index_video<E: Embedder, S: VectorStore>(
    engine: &KnowledgeEngine<E, S>,
    video: &VideoContent,
    analysis: &ContentAnalysis,
    transcript: Option<&str>,
) -> KnowledgeResult<String> {
    let record = video_record(video, analysis);
    let searchable = video_search_text(video, analysis, transcript);
    let embedding = embed_document(engine.embedder(), engine.settings(), &searchable).await?;

    let id = record.id.clone();
    engine
        .store()
        .upsert(
            &engine.settings().index_name,
            vec![VectorRecord {
                id: id.clone(),
                embedding,
                metadata: record,
            }],
        )
        .await?;
    info!(id = %id, title = %video.title, "indexed video content");
    Ok(id)
}

pub(crate) async fn index_text_knowledge<E: Embedder, S: VectorStore>(
    engine: &KnowledgeEngine<E, S>,
    doc: &TextKnowledge,
    force_overwrite: bool,
) -> KnowledgeResult<bool> {
    if !force_overwrite {
        let probe = SearchQuery {
            text: doc.title.clone(),
            difficulty_level: None,
            aim_elements: None,
            target_games: None,
            limit: Some(1),
            min_score: engine.settings().search.duplicate_threshold,
        };
        let hits =
            super::search::search(engine.settings(), engine.embedder(), engine.store(), &probe)
                .await?;
        if !hits.is_empty() {
            info!(title = %doc.title, "text knowledge already indexed, skipping");
            return Ok(false);
        }
    }

    let record = text_record(doc);
    let searchable = text_search_text(doc);
    let embedding = embed_document(engine.embedder(), engine.settings(), &searchable).await?;

    let id = record.id.clone();
    engine
        .store()
        .upsert(
            &engine.settings().index_name,
            vec![VectorRecord {
                id: id.clone(),
                embedding,
                metadata: record,
            }],
        )
        .await?;
    info!(id = %id, title = %doc.title, "indexed text knowledge");
    Ok(true)
}

pub(crate) async fn index_batch<E: Embedder, S: VectorStore>(
    engine: &KnowledgeEngine<E, S>,
    items: &[ContentItem],
) -> KnowledgeResult<IngestReport> {
    let mut report = IngestReport::default();
    for item in items {
        let outcome = match item {
            ContentItem::Video {
                video,
                analysis,
                transcript,
            } => index_video(engine, video, analysis, transcript.as_deref())
                .await
                .map(|_| ()),
            ContentItem::Text {
                doc,
                force_overwrite,
            } => index_text_knowledge(engine, doc, *force_overwrite)
                .await
                .map(|_| ()),
        };
        match outcome {
            Ok(()) => report.successful += 1,
            Err(err) => {
                warn!(error = %err, "failed to index content item");
                report.failed += 1;
            }
        }
    }
    Ok(report)
}

/// Stable text-knowledge id: `text_` + first 20 hex chars of SHA-256(title).
pub(crate) fn text_knowledge_id(title: &str) -> String {
    let digest = Sha256::digest(title.as_bytes());
    let hex = hex::encode(digest);
    format!("text_{}", &hex[..20])
}

fn video_record(video: &VideoContent, analysis: &ContentAnalysis) -> ContentRecord {
    ContentRecord {
        id: video.id.clone(),
        title: video.title.clone(),
        summary: analysis.summary.clone(),
        difficulty_level: analysis.difficulty_level.clone(),
        aim_elements: analysis.aim_elements.clone(),
        target_games: analysis.target_games.clone(),
        key_insights: analysis.key_insights.clone(),
        practice_recommendations: analysis.practice_recommendations.clone(),
        target_audience: analysis.target_audience.clone(),
        confidence_score: analysis.confidence_score,
        published_at: video.published_at,
        duration_seconds: video.duration.trim().parse().unwrap_or(0),
        view_count: video.view_count,
        thumbnail_url: video.thumbnail_url.clone(),
        is_text_knowledge: false,
        category: None,
    }
}

fn text_record(doc: &TextKnowledge) -> ContentRecord {
    ContentRecord {
        id: text_knowledge_id(&doc.title),
        title: doc.title.clone(),
        summary: doc.summary.clone(),
        difficulty_level: doc.difficulty_level.clone(),
        aim_elements: doc.aim_elements.clone(),
        target_games: doc.target_games.clone(),
        key_insights: doc.key_insights.clone(),
        practice_recommendations: doc.practice_recommendations.clone(),
        target_audience: doc.target_audience.clone(),
        confidence_score: doc.confidence_score,
        published_at: Utc::now(),
        duration_seconds: 0,
        view_count: 0,
        thumbnail_url: String::new(),
        is_text_knowledge: true,
        category: Some(doc.category.clone()),
    }
}

fn video_search_text(
    video: &VideoContent,
    analysis: &ContentAnalysis,
    transcript: Option<&str>,
) -> String {
    let mut sections = vec![
        video.title.clone(),
        truncate_with_ellipsis(&video.description, DESCRIPTION_MAX_CHARS),
        analysis.summary.clone(),
        analysis.key_insights.join("\n"),
        practice_lines(&analysis.practice_recommendations),
    ];
    if let Some(transcript) = transcript {
        sections.push(truncate_with_ellipsis(transcript, TRANSCRIPT_MAX_CHARS));
    }
    sections.retain(|section| !section.is_empty());
    sections.join("\n\n")
}

fn text_search_text(doc: &TextKnowledge) -> String {
    let mut sections = vec![
        doc.title.clone(),
        doc.category.clone(),
        doc.summary.clone(),
        doc.key_insights.join("\n"),
        practice_lines(&doc.practice_recommendations),
        truncate_chars(&doc.content, TEXT_CONTENT_MAX_CHARS),
    ];
    sections.retain(|section| !section.is_empty());
    sections.join("\n\n")
}

fn practice_lines(recommendations: &[PracticeRecommendation]) -> String {
    recommendations
        .iter()
        .map(|rec| format!("{}: {}", rec.scenario, rec.focus))
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        format!("{}...", truncate_chars(text, max_chars))
    }
}
