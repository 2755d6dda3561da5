//! Aggregate scorer — folds the described photos into population indicators
//! and the qualitative analysis shown to doctors.
//!
//! `memory_score` and `narrative_coherence` are computed by their own per-photo
//! passes here, independent of `photo_analysis`. The memory pass uses different
//! weights than `photo_analysis::memory_accuracy` and the two must not be merged.

use crate::baseline::heuristics::{
    char_len, has_causal_connective, has_recall_verb, has_sequence_marker,
    has_uncertainty_marker, mentions_first_token, mentions_year, people_tokens_lower,
    period_segments, sentence_count,
};
use crate::models::photo::Photo;
use crate::models::report::{Analysis, Indicators};

pub const STRENGTH_RECALL: &str = "Buena capacidad de recuerdo de detalles específicos";
pub const STRENGTH_COHERENCE: &str = "Narrativas coherentes y bien estructuradas";
pub const STRENGTH_FEW_OMISSIONS: &str = "Mínimas omisiones de información relevante";

pub const CONCERN_LOW_MEMORY: &str = "Puntuación de memoria por debajo del promedio";
pub const CONCERN_INCOHERENT: &str = "Dificultades en la coherencia narrativa";
pub const CONCERN_OMISSIONS: &str = "Omisiones significativas de información contextual";
pub const CONCERN_MEMORY_ERRORS: &str = "Presencia de errores de memoria";

pub const REC_FOLLOW_UP: &str = "Seguimiento en 2-4 semanas para evaluar evolución";
pub const REC_AUTOBIOGRAPHICAL: &str =
    "Ejercicios de memoria autobiográfica con fotografías familiares";
pub const REC_RETRIEVAL: &str = "Trabajo con técnicas de recuperación de memoria";
pub const REC_NEUROPSYCH: &str = "Considerar evaluación neuropsicológica detallada";
pub const REC_MAINTENANCE: &str = "Continuar con evaluaciones periódicas de mantenimiento";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateScores {
    pub indicators: Indicators,
    pub analysis: Analysis,
}

/// Scores every described photo in `photos`; undescribed ones are ignored.
/// An input with nothing described yields all-zero indicators.
pub fn score_photos(photos: &[Photo]) -> AggregateScores {
    let described: Vec<(&Photo, &str)> = photos
        .iter()
        .filter_map(|p| p.described_text().map(|d| (p, d)))
        .collect();

    if described.is_empty() {
        return AggregateScores::default();
    }

    let mut memory_total = 0;
    let mut coherence_total = 0;
    let mut omissions = 0;
    let mut memory_errors = 0;

    for (photo, description) in &described {
        memory_total += photo_memory_score(description, &photo.people, &photo.location);
        coherence_total += narrative_coherence(description);
        omissions += photo_omissions(description, &photo.people, &photo.location);
        if has_uncertainty_marker(description) {
            memory_errors += 1;
        }
    }

    let indicators = Indicators {
        memory_score: rounded_mean(memory_total, described.len()),
        narrative_coherence: rounded_mean(coherence_total, described.len()),
        omissions,
        memory_errors,
    };
    let analysis = build_analysis(&indicators);

    AggregateScores {
        indicators,
        analysis,
    }
}

/// Per-photo recall score, summed from zero and capped at 100.
fn photo_memory_score(description: &str, people: &str, location: &str) -> u32 {
    let description_lower = description.to_lowercase();
    let length = char_len(description);
    let mut score = 0;

    if length > 100 {
        score += 20;
    }
    if has_recall_verb(description) {
        score += 10;
    }

    let people_bonus: u32 = people_tokens_lower(people)
        .iter()
        .filter(|token| description_lower.contains(token.as_str()))
        .map(|_| 10)
        .sum();
    score += people_bonus.min(20);

    let location_lower = location.trim().to_lowercase();
    if !location_lower.is_empty() && description_lower.contains(&location_lower) {
        score += 15;
    }
    if mentions_year(description) {
        score += 10;
    }
    if period_segments(description) > 2 {
        score += 10;
    }
    if length > 200 {
        score += 10;
    }

    score.min(100)
}

/// Same rule set as `photo_analysis::coherence_score`, recomputed here.
fn narrative_coherence(description: &str) -> u32 {
    let mut score = 50;
    if sentence_count(description) >= 3 {
        score += 15;
    }
    if has_causal_connective(description) {
        score += 10;
    }
    if has_sequence_marker(description) {
        score += 10;
    }
    if char_len(description) > 150 {
        score += 15;
    }
    score.min(100)
}

fn photo_omissions(description: &str, people: &str, location: &str) -> u32 {
    let description_lower = description.to_lowercase();
    let mut omissions = 0;
    if mentions_first_token(&description_lower, people) == Some(false) {
        omissions += 1;
    }
    if mentions_first_token(&description_lower, location) == Some(false) {
        omissions += 1;
    }
    if char_len(description) < 50 {
        omissions += 1;
    }
    omissions
}

/// Integer mean rounded half up.
fn rounded_mean(total: u32, count: usize) -> u32 {
    if count == 0 {
        return 0;
    }
    (f64::from(total) / count as f64).round() as u32
}

/// Applies the strengths / concerns / recommendations rule table in order.
/// Every rule is evaluated independently.
pub fn build_analysis(indicators: &Indicators) -> Analysis {
    let Indicators {
        memory_score,
        narrative_coherence,
        omissions,
        memory_errors,
    } = *indicators;

    let mut strengths = Vec::new();
    let mut concerns = Vec::new();
    let mut recommendations = Vec::new();

    if memory_score >= 75 {
        strengths.push(STRENGTH_RECALL.to_string());
    }
    if narrative_coherence >= 75 {
        strengths.push(STRENGTH_COHERENCE.to_string());
    }
    if omissions <= 2 {
        strengths.push(STRENGTH_FEW_OMISSIONS.to_string());
    }

    if memory_score < 60 {
        concerns.push(CONCERN_LOW_MEMORY.to_string());
    }
    if narrative_coherence < 60 {
        concerns.push(CONCERN_INCOHERENT.to_string());
    }
    if omissions > 5 {
        concerns.push(CONCERN_OMISSIONS.to_string());
    }
    if memory_errors > 3 {
        concerns.push(CONCERN_MEMORY_ERRORS.to_string());
    }

    if memory_score < 70 || narrative_coherence < 70 {
        recommendations.push(REC_FOLLOW_UP.to_string());
        recommendations.push(REC_AUTOBIOGRAPHICAL.to_string());
    }
    if omissions > 5 {
        recommendations.push(REC_RETRIEVAL.to_string());
    }
    if memory_errors > 2 {
        recommendations.push(REC_NEUROPSYCH.to_string());
    }
    if !strengths.is_empty() && concerns.is_empty() {
        recommendations.push(REC_MAINTENANCE.to_string());
    }

    Analysis {
        strengths,
        concerns,
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARK_VISIT: &str = "María López y su nieto fueron al Parque Central en 2015. Primero caminaron, luego se sentaron, y finalmente comieron helado porque hacía calor.";

    fn photo(id: &str, people: &str, location: &str, description: Option<&str>) -> Photo {
        Photo {
            id: id.to_string(),
            patient_id: "pat-1".to_string(),
            people: people.to_string(),
            location: location.to_string(),
            description: description.map(str::to_string),
            ..Default::default()
        }
    }

    fn indicators(memory: u32, coherence: u32, omissions: u32, errors: u32) -> Indicators {
        Indicators {
            memory_score: memory,
            narrative_coherence: coherence,
            omissions,
            memory_errors: errors,
        }
    }

    #[test]
    fn test_park_visit_memory_score() {
        // 20 (len>100) + 20 (maría, lópez) + 15 (location) + 10 (year) + 10 (3 segments)
        assert_eq!(photo_memory_score(PARK_VISIT, "María López", "Parque Central"), 75);
    }

    #[test]
    fn test_park_visit_has_no_omissions() {
        let scores = score_photos(&[photo("a", "María López", "Parque Central", Some(PARK_VISIT))]);
        assert_eq!(scores.indicators.omissions, 0);
        assert_eq!(scores.indicators.memory_errors, 0);
        assert_eq!(scores.indicators.memory_score, 75);
        assert_eq!(scores.indicators.narrative_coherence, 70);
    }

    #[test]
    fn test_short_uncertain_description() {
        let scores = score_photos(&[photo("a", "Ana", "Playa", Some("No recuerdo mucho."))]);
        assert_eq!(scores.indicators.memory_errors, 1);
        // people, location and the under-50-characters rule all fire
        assert_eq!(scores.indicators.omissions, 3);
        assert_eq!(scores.indicators.narrative_coherence, 50);
        // only the recall verb matches
        assert_eq!(scores.indicators.memory_score, 10);
    }

    #[test]
    fn test_people_bonus_capped_at_twenty() {
        let score = photo_memory_score("ana pedro luis", "Ana, Pedro, Luis", "");
        assert_eq!(score, 20);
    }

    #[test]
    fn test_memory_score_capped_at_100() {
        let text = format!(
            "Recuerdo a Ana y Pedro en la playa grande en 1980. {}",
            "Fue un día precioso. ".repeat(12)
        );
        assert_eq!(photo_memory_score(&text, "Ana Pedro", "Playa Grande"), 95);
        let text = format!("{text} Ana volvió en 1981.");
        assert!(photo_memory_score(&text, "Ana Pedro", "Playa Grande") <= 100);
    }

    #[test]
    fn test_averages_round_half_up() {
        assert_eq!(rounded_mean(125, 2), 63);
        assert_eq!(rounded_mean(124, 2), 62);
        assert_eq!(rounded_mean(0, 0), 0);
    }

    #[test]
    fn test_undescribed_photos_are_ignored() {
        let with_blank = score_photos(&[
            photo("a", "Ana", "Playa", Some("No recuerdo mucho.")),
            photo("b", "Luis", "Casa", Some("   ")),
            photo("c", "Luis", "Casa", None),
        ]);
        let alone = score_photos(&[photo("a", "Ana", "Playa", Some("No recuerdo mucho."))]);
        assert_eq!(with_blank, alone);
    }

    #[test]
    fn test_nothing_described_is_all_zero() {
        let scores = score_photos(&[photo("a", "Ana", "Playa", None)]);
        assert_eq!(scores.indicators, Indicators::default());
        assert_eq!(scores.analysis, Analysis::default());
        assert_eq!(score_photos(&[]).indicators, Indicators::default());
    }

    #[test]
    fn test_omissions_drop_as_details_are_added() {
        let bare = photo_omissions("Fuimos.", "Ana Ruiz", "Playa Grande");
        let with_person = photo_omissions("Fuimos con Ana.", "Ana Ruiz", "Playa Grande");
        let with_place = photo_omissions("Fuimos con Ana a la playa.", "Ana Ruiz", "Playa Grande");
        let padded = photo_omissions(
            "Fuimos con Ana a la playa una tarde de verano muy tranquila.",
            "Ana Ruiz",
            "Playa Grande",
        );
        assert_eq!((bare, with_person, with_place, padded), (3, 2, 1, 0));
    }

    #[test]
    fn test_analysis_healthy_profile() {
        let analysis = build_analysis(&indicators(80, 80, 0, 0));
        assert_eq!(
            analysis.strengths,
            vec![STRENGTH_RECALL, STRENGTH_COHERENCE, STRENGTH_FEW_OMISSIONS]
        );
        assert!(analysis.concerns.is_empty());
        assert_eq!(analysis.recommendations, vec![REC_MAINTENANCE]);
    }

    #[test]
    fn test_analysis_struggling_profile() {
        let analysis = build_analysis(&indicators(40, 50, 7, 4));
        assert!(analysis.strengths.is_empty());
        assert_eq!(
            analysis.concerns,
            vec![
                CONCERN_LOW_MEMORY,
                CONCERN_INCOHERENT,
                CONCERN_OMISSIONS,
                CONCERN_MEMORY_ERRORS
            ]
        );
        assert_eq!(
            analysis.recommendations,
            vec![REC_FOLLOW_UP, REC_AUTOBIOGRAPHICAL, REC_RETRIEVAL, REC_NEUROPSYCH]
        );
    }

    #[test]
    fn test_analysis_rule_boundaries() {
        // 75/70/60 edges: strength at 75, no concern at 60, no follow-up at 70
        let analysis = build_analysis(&indicators(75, 70, 3, 3));
        assert_eq!(analysis.strengths, vec![STRENGTH_RECALL]);
        assert!(analysis.concerns.is_empty());
        assert_eq!(analysis.recommendations, vec![REC_NEUROPSYCH, REC_MAINTENANCE]);

        let analysis = build_analysis(&indicators(69, 74, 2, 0));
        assert_eq!(analysis.strengths, vec![STRENGTH_FEW_OMISSIONS]);
        assert_eq!(
            analysis.recommendations,
            vec![REC_FOLLOW_UP, REC_AUTOBIOGRAPHICAL, REC_MAINTENANCE]
        );
    }

    #[test]
    fn test_analysis_all_lists_may_be_empty() {
        let analysis = build_analysis(&indicators(70, 70, 4, 0));
        assert!(analysis.strengths.is_empty());
        assert!(analysis.concerns.is_empty());
        assert!(analysis.recommendations.is_empty());
    }
}
