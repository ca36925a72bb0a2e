//! Knowledge system configuration types.
//!
//! These types define the resolved (non-optional) settings used by
//! `aimsage-knowledge`. They are created from the user-facing
//! `KnowledgeToolsSettings` TOML structs via `From`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::settings::{KnowledgeToolsSettings, SearchSettings};

/// Resolved knowledge engine settings (all values filled with defaults).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeSettings {
    /// Base URL of the embedding service (Ollama-compatible `/api/embed`).
    #[serde(default = "default_embedding_url")]
    pub embedding_url: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    /// Vector dimension. Fixed at index-creation time for the lifetime of
    /// the index; every embedding must match it.
    #[serde(default = "default_embedding_dim")]
    pub embedding_dim: usize,
    /// Name of the vector index holding coaching content.
    #[serde(default = "default_index_name")]
    pub index_name: String,
    /// Maximum UTF-8 byte length of a chunk sent to the embedding service.
    #[serde(default = "default_chunk_max_bytes")]
    pub chunk_max_bytes: usize,
    /// Trailing bytes of the previous chunk carried into the next one.
    #[serde(default = "default_chunk_overlap_bytes")]
    pub chunk_overlap_bytes: usize,
    /// Pause between sequential per-chunk embedding requests. Zero disables
    /// the pause (used by tests for determinism).
    #[serde(default = "default_chunk_delay_ms")]
    pub chunk_delay_ms: u64,
    #[serde(default)]
    pub db_path_override: Option<PathBuf>,
    #[serde(default)]
    pub search: SearchDefaults,
}

impl Default for KnowledgeSettings {
    fn default() -> Self {
        Self {
            embedding_url: default_embedding_url(),
            embedding_model: default_embedding_model(),
            embedding_dim: default_embedding_dim(),
            index_name: default_index_name(),
            chunk_max_bytes: default_chunk_max_bytes(),
            chunk_overlap_bytes: default_chunk_overlap_bytes(),
            chunk_delay_ms: default_chunk_delay_ms(),
            db_path_override: None,
            search: SearchDefaults::default(),
        }
    }
}

/// Resolved search and recommendation tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchDefaults {
    /// Result count when a query does not specify one.
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    /// Similarity score above which a title probe counts as already indexed.
    #[serde(default = "default_duplicate_threshold")]
    pub duplicate_threshold: f32,
    /// Minimum similarity for recommendation candidates.
    #[serde(default = "default_recommendation_min_score")]
    pub recommendation_min_score: f32,
    /// Candidate over-fetch multiplier for recommendations.
    #[serde(default = "default_overfetch_factor")]
    pub overfetch_factor: usize,
    /// Score bonus per weak area matched by a candidate's aim elements.
    #[serde(default = "default_weak_area_bonus")]
    pub weak_area_bonus: f32,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            duplicate_threshold: default_duplicate_threshold(),
            recommendation_min_score: default_recommendation_min_score(),
            overfetch_factor: default_overfetch_factor(),
            weak_area_bonus: default_weak_area_bonus(),
        }
    }
}

fn default_embedding_url() -> String {
    "http://127.0.0.1:11434".to_string()
}

fn default_embedding_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_embedding_dim() -> usize {
    768
}

fn default_index_name() -> String {
    "aim-training-content".to_string()
}

fn default_chunk_max_bytes() -> usize {
    8000
}

fn default_chunk_overlap_bytes() -> usize {
    200
}

fn default_chunk_delay_ms() -> u64 {
    100
}

fn default_limit() -> usize {
    5
}

fn default_duplicate_threshold() -> f32 {
    0.9
}

fn default_recommendation_min_score() -> f32 {
    0.6
}

fn default_overfetch_factor() -> usize {
    2
}

fn default_weak_area_bonus() -> f32 {
    0.1
}

impl From<&KnowledgeToolsSettings> for KnowledgeSettings {
    fn from(value: &KnowledgeToolsSettings) -> Self {
        let mut settings = KnowledgeSettings::default();
        if let Some(url) = &value.embedding_url {
            settings.embedding_url = url.clone();
        }
        if let Some(model) = &value.embedding_model {
            settings.embedding_model = model.clone();
        }
        if let Some(dim) = value.embedding_dim {
            settings.embedding_dim = dim;
        }
        if let Some(name) = &value.index_name {
            settings.index_name = name.clone();
        }
        if let Some(bytes) = value.chunk_max_bytes {
            settings.chunk_max_bytes = bytes;
        }
        if let Some(bytes) = value.chunk_overlap_bytes {
            settings.chunk_overlap_bytes = bytes;
        }
        if let Some(ms) = value.chunk_delay_ms {
            settings.chunk_delay_ms = ms;
        }
        if let Some(path) = &value.db_path_override {
            settings.db_path_override = Some(PathBuf::from(path));
        }
        apply_search_overrides(&mut settings.search, &value.search);
        settings
    }
}

fn apply_search_overrides(search: &mut SearchDefaults, overrides: &SearchSettings) {
    if let Some(limit) = overrides.default_limit {
        search.default_limit = limit;
    }
    if let Some(threshold) = overrides.duplicate_threshold {
        search.duplicate_threshold = threshold;
    }
    if let Some(min_score) = overrides.recommendation_min_score {
        search.recommendation_min_score = min_score;
    }
    if let Some(factor) = overrides.overfetch_factor {
        search.overfetch_factor = factor;
    }
    if let Some(bonus) = overrides.weak_area_bonus {
        search.weak_area_bonus = bonus;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let settings = KnowledgeSettings::default();
        assert_eq!(settings.embedding_dim, 768);
        assert_eq!(settings.search.default_limit, 5);
        assert!(settings.search.duplicate_threshold > 0.0);
    }

    #[test]
    fn overrides_apply() {
        let tools = KnowledgeToolsSettings {
            embedding_dim: Some(8),
            index_name: Some("test-index".to_string()),
            ..Default::default()
        };
        let settings = KnowledgeSettings::from(&tools);
        assert_eq!(settings.embedding_dim, 8);
        assert_eq!(settings.index_name, "test-index");
        // untouched fields keep defaults
        assert_eq!(settings.chunk_delay_ms, 100);
    }
}
