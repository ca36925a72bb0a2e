use aimsage_core::KnowledgeSettings;

use crate::embeddings::{Embedder, EmbeddingClient};
use crate::errors::KnowledgeResult;
use crate::models::{
    ContentAnalysis, ContentItem, IngestReport, PersonalizedRecommendation,
    RecommendationRequest, SearchQuery, SearchResult, TextKnowledge, VideoContent,
};
use crate::paths::knowledge_db_path;
use crate::store::{SqliteVectorStore, VectorStore};

pub(crate) mod ingest;
pub(crate) mod recommend;
pub(crate) mod search;

/// Facade over the RAG subsystem: ingestion, retrieval, recommendations.
///
/// Stateless apart from the external services it holds — every operation is a
/// sequence of awaited calls against the embedder and the vector store. The
/// embedder and store are injectable so tests can run against fakes.
#[derive(Debug, Clone)]
pub struct KnowledgeEngine<E = EmbeddingClient, S = SqliteVectorStore> {
    settings: KnowledgeSettings,
    embedder: E,
    store: S,
}

impl KnowledgeEngine {
    /// Open an engine backed by the HTTP embedding service and the local
    /// sqlite-vec store at the configured path.
    pub async fn open(settings: KnowledgeSettings) -> KnowledgeResult<Self> {
        let path = knowledge_db_path(&settings)?;
        let store = SqliteVectorStore::open(&path).await?;
        let embedder = EmbeddingClient::new(&settings);
        Ok(Self {
            settings,
            embedder,
            store,
        })
    }
}

impl<E: Embedder, S: VectorStore> KnowledgeEngine<E, S> {
    /// Build an engine from explicit parts.
    pub fn with_parts(settings: KnowledgeSettings, embedder: E, store: S) -> Self {
        Self {
            settings,
            embedder,
            store,
        }
    }

    pub fn settings(&self) -> &KnowledgeSettings {
        &self.settings
    }

    pub(crate) fn embedder(&self) -> &E {
        &self.embedder
    }

    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    /// Create the configured index iff absent. Returns whether it was
    /// created; a second call is a no-op other than the listing round-trip.
    pub async fn ensure_index(&self) -> KnowledgeResult<bool> {
        ingest::ensure_index(self).await
    }

    /// Destroy and recreate the configured index. Removes every vector under
    /// that index name; deleting an absent index is benign.
    pub async fn reset_index(&self) -> KnowledgeResult<()> {
        ingest::reset_index(self).await
    }

    /// Index one analyzed video. Re-indexing the same video id overwrites the
    /// stored vector and metadata. Returns the indexed id.
    pub async fn index_video(
        &self,
        video: &VideoContent,
        analysis: &ContentAnalysis,
        transcript: Option<&str>,
    ) -> KnowledgeResult<String> {
        ingest::index_video(self, video, analysis, transcript).await
    }

    /// Index a text document. Unless `force_overwrite`, a near-duplicate
    /// title probe skips documents that already score above the duplicate
    /// threshold. Returns whether the document was actually indexed.
    pub async fn index_text_knowledge(
        &self,
        doc: &TextKnowledge,
        force_overwrite: bool,
    ) -> KnowledgeResult<bool> {
        ingest::index_text_knowledge(self, doc, force_overwrite).await
    }

    /// Sequentially index a batch with per-item error isolation: a failed
    /// item is counted and logged, then processing continues.
    pub async fn index_batch(&self, items: &[ContentItem]) -> KnowledgeResult<IngestReport> {
        ingest::index_batch(self, items).await
    }

    /// Semantic search with score threshold, categorical post-filters, and
    /// order-preserving dedup by content id.
    pub async fn search(&self, query: &SearchQuery) -> KnowledgeResult<Vec<SearchResult>> {
        search::search(&self.settings, &self.embedder, &self.store, query).await
    }

    /// Personalized suggestions: difficulty-band filtering plus weak-area
    /// bonus re-ranking on top of [`Self::search`].
    pub async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> KnowledgeResult<PersonalizedRecommendation> {
        recommend::recommend(&self.settings, &self.embedder, &self.store, request).await
    }
}
