use tracing::debug;

use aimsage_core::KnowledgeSettings;

use crate::embeddings::Embedder;
use crate::errors::KnowledgeResult;
use crate::models::{
    PersonalizedRecommendation, RecommendationRequest, SearchQuery, SearchResult,
    allowed_difficulties_for,
};
use crate::store::VectorStore;

/// Skill-aware recommendations on top of semantic search.
///
/// Overfetches candidates, keeps only content inside the player's difficulty
/// band, then re-ranks with a bonus per weak area the content covers. The
/// reported `relevance_score` stays the raw similarity; the bonus only
/// affects ordering.
pub(crate) async fn recommend<E: Embedder, S: VectorStore>(
    settings: &KnowledgeSettings,
    embedder: &E,
    store: &S,
    request: &RecommendationRequest,
) -> KnowledgeResult<PersonalizedRecommendation> {
    let query_text = format!(
        "{} {} practice training tutorial",
        request.skill_level,
        request.weak_areas.join(" ")
    );
    let query = SearchQuery {
        text: query_text,
        difficulty_level: None,
        aim_elements: (!request.weak_areas.is_empty()).then(|| request.weak_areas.clone()),
        target_games: request.target_game.clone().map(|game| vec![game]),
        limit: Some(request.limit * settings.search.overfetch_factor),
        min_score: settings.search.recommendation_min_score,
    };

    let candidates = super::search::search(settings, embedder, store, &query).await?;
    debug!(
        skill_level = %request.skill_level,
        candidates = candidates.len(),
        "fetched recommendation candidates"
    );

    let allowed = allowed_difficulties_for(&request.skill_level);
    let mut ranked: Vec<(f32, SearchResult)> = candidates
        .into_iter()
        .filter(|result| allowed.contains(&result.difficulty_level.to_lowercase().as_str()))
        .map(|result| {
            let overlap = result
                .aim_elements
                .iter()
                .filter(|element| request.weak_areas.contains(element))
                .count();
            let score =
                result.relevance_score + settings.search.weak_area_bonus * overlap as f32;
            (score, result)
        })
        .collect();

    // sort_by is stable, so retrieval order survives score ties
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
    ranked.truncate(request.limit);

    let recommendations: Vec<SearchResult> =
        ranked.into_iter().map(|(_, result)| result).collect();
    let reasoning = build_reasoning(request, recommendations.len());

    Ok(PersonalizedRecommendation {
        user_skill_level: request.skill_level.clone(),
        weak_areas: request.weak_areas.clone(),
        target_game: request.target_game.clone(),
        recommendations,
        reasoning,
    })
}

fn build_reasoning(request: &RecommendationRequest, count: usize) -> String {
    let mut reasoning = format!(
        "Selected {count} items matched to a {} player",
        request.skill_level
    );
    if !request.weak_areas.is_empty() {
        reasoning.push_str(&format!(
            ", prioritizing content that covers {}",
            request.weak_areas.join(", ")
        ));
    }
    if let Some(game) = &request.target_game {
        reasoning.push_str(&format!(", scoped to {game}"));
    }
    reasoning.push('.');
    reasoning
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(skill: &str, weak_areas: &[&str]) -> RecommendationRequest {
        RecommendationRequest {
            skill_level: skill.to_string(),
            weak_areas: weak_areas.iter().map(|s| s.to_string()).collect(),
            target_game: None,
            limit: 5,
        }
    }

    #[test]
    fn reasoning_names_skill_weak_areas_and_game() {
        let mut req = request("advanced", &["flick", "tracking"]);
        req.target_game = Some("valorant".to_string());
        let reasoning = build_reasoning(&req, 3);
        assert!(reasoning.contains("advanced player"));
        assert!(reasoning.contains("flick, tracking"));
        assert!(reasoning.contains("scoped to valorant"));
    }

    #[test]
    fn reasoning_omits_empty_sections() {
        let reasoning = build_reasoning(&request("beginner", &[]), 2);
        assert!(reasoning.contains("beginner player"));
        assert!(!reasoning.contains("prioritizing"));
        assert!(!reasoning.contains("scoped to"));
    }
}
