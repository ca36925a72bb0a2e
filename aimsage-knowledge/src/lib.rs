//! RAG ingestion & retrieval subsystem for aimsage.
//!
//! Indexes analyzed coaching content (YouTube videos, text guides) into a
//! local sqlite-vec index and serves semantic search plus skill-aware
//! personalized recommendations on top of it.

pub mod chunker;
pub mod embeddings;
pub mod engine;
pub mod errors;
pub mod models;
pub mod paths;
pub mod store;

pub use aimsage_core::config::{KnowledgeSettings, SearchDefaults};
pub use embeddings::{Embedder, EmbeddingClient};
pub use engine::KnowledgeEngine;
pub use errors::{KnowledgeError, KnowledgeResult};
pub use models::{
    ContentAnalysis, ContentItem, ContentRecord, IngestReport, PersonalizedRecommendation,
    PracticeRecommendation, RecommendationRequest, SearchQuery, SearchResult, SkillLevel,
    TextKnowledge, VideoContent,
};
pub use store::{QueryHit, SqliteVectorStore, VectorRecord, VectorStore};
