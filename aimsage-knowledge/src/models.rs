use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One drill suggestion attached to a piece of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeRecommendation {
    /// Trainer scenario name (e.g. "1wall6targets small").
    pub scenario: String,
    /// What the drill is meant to improve.
    pub focus: String,
    #[serde(default)]
    pub duration: Option<String>,
}

/// Metadata stored alongside each vector in the index.
///
/// Built once at ingestion time from upstream content + analysis and carried
/// through every search hit unchanged. `id` is globally unique across
/// video-origin and text-origin records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRecord {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub difficulty_level: String,
    pub aim_elements: Vec<String>,
    pub target_games: Vec<String>,
    pub key_insights: Vec<String>,
    pub practice_recommendations: Vec<PracticeRecommendation>,
    pub target_audience: String,
    pub confidence_score: f32,
    pub published_at: DateTime<Utc>,
    pub duration_seconds: u64,
    pub view_count: u64,
    pub thumbnail_url: String,
    #[serde(default)]
    pub is_text_knowledge: bool,
    #[serde(default)]
    pub category: Option<String>,
}

/// Raw video metadata from the upstream content provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoContent {
    pub id: String,
    pub title: String,
    pub description: String,
    pub published_at: DateTime<Utc>,
    /// Duration in seconds, as the string the provider hands us.
    /// Unparseable values coerce to 0 at ingestion.
    pub duration: String,
    pub view_count: u64,
    pub thumbnail_url: String,
}

/// Structured insights produced by the upstream content analyzer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentAnalysis {
    pub summary: String,
    pub difficulty_level: String,
    #[serde(default)]
    pub aim_elements: Vec<String>,
    #[serde(default)]
    pub target_games: Vec<String>,
    #[serde(default)]
    pub key_insights: Vec<String>,
    #[serde(default)]
    pub practice_recommendations: Vec<PracticeRecommendation>,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub confidence_score: f32,
}

/// A text document (guide, writeup) to index as knowledge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextKnowledge {
    pub title: String,
    pub content: String,
    pub category: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub difficulty_level: String,
    #[serde(default)]
    pub aim_elements: Vec<String>,
    #[serde(default)]
    pub target_games: Vec<String>,
    #[serde(default)]
    pub key_insights: Vec<String>,
    #[serde(default)]
    pub practice_recommendations: Vec<PracticeRecommendation>,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub confidence_score: f32,
}

/// One item in a batch ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ContentItem {
    Video {
        video: VideoContent,
        analysis: ContentAnalysis,
        transcript: Option<String>,
    },
    Text {
        doc: TextKnowledge,
        force_overwrite: bool,
    },
}

/// Outcome of a batch ingestion run. Per-item failures are counted, not
/// raised; skipped near-duplicates count as successful.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct IngestReport {
    pub successful: usize,
    pub failed: usize,
}

/// Semantic search query over the content index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    pub text: String,
    #[serde(default)]
    pub difficulty_level: Option<String>,
    #[serde(default)]
    pub aim_elements: Option<Vec<String>>,
    #[serde(default)]
    pub target_games: Option<Vec<String>>,
    /// Result cap. Unset falls back to the configured search default.
    #[serde(default)]
    pub limit: Option<usize>,
    /// Hits scoring below this are dropped. 0 keeps everything.
    #[serde(default)]
    pub min_score: f32,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            difficulty_level: None,
            aim_elements: None,
            target_games: None,
            limit: None,
            min_score: 0.0,
        }
    }
}

fn default_limit() -> usize {
    5
}

/// A single search hit projected for callers.
///
/// `relevance_score` is the raw similarity score from the index query,
/// unmodified by any post-filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub url: String,
    pub relevance_score: f32,
    pub difficulty_level: String,
    pub aim_elements: Vec<String>,
    pub key_insights: Vec<String>,
    pub practice_recommendations: Vec<PracticeRecommendation>,
    pub matched_content_summary: String,
    pub metadata: ContentRecord,
}

/// Input for a personalized recommendation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub skill_level: String,
    pub weak_areas: Vec<String>,
    #[serde(default)]
    pub target_game: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

/// Personalized suggestions for one player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalizedRecommendation {
    pub user_skill_level: String,
    pub weak_areas: Vec<String>,
    pub target_game: Option<String>,
    pub recommendations: Vec<SearchResult>,
    pub reasoning: String,
}

/// Player skill bands recognized by the recommender.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl SkillLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Expert => "expert",
        }
    }

    /// Case-insensitive parse; `None` for labels we don't recognize.
    pub fn parse_lenient(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            "expert" => Some(Self::Expert),
            _ => None,
        }
    }

    /// Difficulty labels a player of this skill should be shown.
    pub fn allowed_difficulties(&self) -> &'static [&'static str] {
        match self {
            Self::Beginner => &["beginner", "intermediate"],
            Self::Intermediate => &["beginner", "intermediate", "advanced"],
            Self::Advanced => &["intermediate", "advanced", "expert"],
            Self::Expert => &["advanced", "expert"],
        }
    }
}

impl std::fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Difficulty bands for an arbitrary skill label. Unknown labels get the
/// conservative beginner band.
pub fn allowed_difficulties_for(label: &str) -> &'static [&'static str] {
    match SkillLevel::parse_lenient(label) {
        Some(skill) => skill.allowed_difficulties(),
        None => &["beginner", "intermediate"],
    }
}
