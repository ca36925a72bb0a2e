#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};

use aimsage_knowledge::{
    ContentAnalysis, Embedder, KnowledgeError, KnowledgeResult, KnowledgeSettings,
    PracticeRecommendation, QueryHit, TextKnowledge, VectorRecord, VectorStore, VideoContent,
};

/// Terms the fake embedder counts. One dimension per term plus a trailing
/// bias dimension, so every text gets a nonzero vector.
pub const VOCABULARY: [&str; 7] = [
    "flick",
    "tracking",
    "smoothness",
    "aim",
    "practice",
    "training",
    "crosshair",
];

pub const FAKE_DIM: usize = VOCABULARY.len() + 1;

/// Deterministic embedder: term-count vectors over [`VOCABULARY`].
/// Texts containing `%%boom%%` fail, for error-isolation tests.
pub struct FakeEmbedder;

impl Embedder for FakeEmbedder {
    async fn embed(&self, text: &str) -> KnowledgeResult<Vec<f32>> {
        if text.contains("%%boom%%") {
            return Err(KnowledgeError::Embedding("synthetic failure".to_string()));
        }
        let lower = text.to_lowercase();
        let mut vector: Vec<f32> = VOCABULARY
            .iter()
            .map(|term| lower.matches(term).count() as f32)
            .collect();
        vector.push(1.0);
        Ok(vector)
    }
}

struct MemoryIndex {
    dimension: usize,
    records: Vec<VectorRecord>,
}

/// In-memory [`VectorStore`] with exact cosine scoring. Cloning shares the
/// underlying map so tests can keep a handle next to the engine.
#[derive(Clone, Default)]
pub struct MemoryVectorStore {
    indexes: Arc<Mutex<HashMap<String, MemoryIndex>>>,
}

impl MemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_count(&self, name: &str) -> usize {
        let indexes = self.indexes.lock().unwrap();
        indexes.get(name).map_or(0, |index| index.records.len())
    }
}

impl VectorStore for MemoryVectorStore {
    async fn list_indexes(&self) -> KnowledgeResult<Vec<String>> {
        let indexes = self.indexes.lock().unwrap();
        let mut names: Vec<String> = indexes.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn create_index(&self, name: &str, dimension: usize) -> KnowledgeResult<()> {
        let mut indexes = self.indexes.lock().unwrap();
        if let Some(index) = indexes.get(name) {
            if index.dimension != dimension {
                return Err(KnowledgeError::EmbeddingDimMismatch {
                    expected: index.dimension,
                    actual: dimension,
                });
            }
            return Ok(());
        }
        indexes.insert(
            name.to_string(),
            MemoryIndex {
                dimension,
                records: Vec::new(),
            },
        );
        Ok(())
    }

    async fn delete_index(&self, name: &str) -> KnowledgeResult<()> {
        let mut indexes = self.indexes.lock().unwrap();
        indexes
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| KnowledgeError::IndexNotFound(name.to_string()))
    }

    async fn upsert(&self, name: &str, records: Vec<VectorRecord>) -> KnowledgeResult<()> {
        let mut indexes = self.indexes.lock().unwrap();
        let index = indexes
            .get_mut(name)
            .ok_or_else(|| KnowledgeError::IndexNotFound(name.to_string()))?;
        for record in records {
            if record.embedding.len() != index.dimension {
                return Err(KnowledgeError::EmbeddingDimMismatch {
                    expected: index.dimension,
                    actual: record.embedding.len(),
                });
            }
            match index.records.iter_mut().find(|r| r.id == record.id) {
                Some(existing) => *existing = record,
                None => index.records.push(record),
            }
        }
        Ok(())
    }

    async fn query(
        &self,
        name: &str,
        vector: &[f32],
        top_k: usize,
    ) -> KnowledgeResult<Vec<QueryHit>> {
        let indexes = self.indexes.lock().unwrap();
        let index = indexes
            .get(name)
            .ok_or_else(|| KnowledgeError::IndexNotFound(name.to_string()))?;
        if vector.len() != index.dimension {
            return Err(KnowledgeError::EmbeddingDimMismatch {
                expected: index.dimension,
                actual: vector.len(),
            });
        }

        let mut hits: Vec<QueryHit> = index
            .records
            .iter()
            .map(|record| QueryHit {
                id: record.id.clone(),
                score: cosine(vector, &record.embedding),
                metadata: record.metadata.clone(),
            })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(top_k);
        Ok(hits)
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

pub fn test_settings() -> KnowledgeSettings {
    KnowledgeSettings {
        embedding_dim: FAKE_DIM,
        chunk_delay_ms: 0,
        ..Default::default()
    }
}

pub fn video(id: &str, title: &str, description: &str) -> VideoContent {
    VideoContent {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        published_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        duration: "612".to_string(),
        view_count: 4321,
        thumbnail_url: format!("https://img.example/{id}.jpg"),
    }
}

pub fn analysis(
    summary: &str,
    difficulty: &str,
    elements: &[&str],
    games: &[&str],
) -> ContentAnalysis {
    ContentAnalysis {
        summary: summary.to_string(),
        difficulty_level: difficulty.to_string(),
        aim_elements: elements.iter().map(|s| s.to_string()).collect(),
        target_games: games.iter().map(|s| s.to_string()).collect(),
        key_insights: vec![format!("insight about {summary}")],
        practice_recommendations: vec![PracticeRecommendation {
            scenario: "1wall6targets".to_string(),
            focus: summary.to_string(),
            duration: Some("15 minutes".to_string()),
        }],
        target_audience: "ranked grinders".to_string(),
        confidence_score: 0.85,
    }
}

pub fn text_doc(title: &str, content: &str, category: &str) -> TextKnowledge {
    TextKnowledge {
        title: title.to_string(),
        content: content.to_string(),
        category: category.to_string(),
        summary: String::new(),
        difficulty_level: "intermediate".to_string(),
        aim_elements: vec![],
        target_games: vec![],
        key_insights: vec![],
        practice_recommendations: vec![],
        target_audience: String::new(),
        confidence_score: 0.7,
    }
}
