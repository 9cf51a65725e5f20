use crate::models::{Profile, ScoredPartner, ScoringWeights};
use crate::core::{
    filters::{distance_check, is_gym_mate},
    scoring::calculate_partner_score,
};

/// Result of the partner search
#[derive(Debug)]
pub struct PartnerMatchResult {
    pub partners: Vec<ScoredPartner>,
    pub total_candidates: usize,
}

/// Workout-partner matcher
///
/// # Pipeline Stages
/// 1. Same gym, not the seeker
/// 2. Within the seeker's maximum distance (when both shared a location)
/// 3. Scoring
/// 4. Ranking by score, then distance
#[derive(Debug, Clone)]
pub struct PartnerMatcher {
    weights: ScoringWeights,
}

impl PartnerMatcher {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn with_default_weights() -> Self {
        Self {
            weights: ScoringWeights::default(),
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Rank gym-mates of `seeker` as workout partners, best first
    pub fn find_partners(
        &self,
        seeker: &Profile,
        candidates: Vec<Profile>,
        limit: usize,
    ) -> PartnerMatchResult {
        let total_candidates = candidates.len();

        let mut partners: Vec<ScoredPartner> = candidates
            .into_iter()
            .filter(|candidate| is_gym_mate(seeker, candidate))
            .filter_map(|candidate| {
                let (in_range, distance_km) = distance_check(seeker, &candidate);
                if !in_range {
                    return None;
                }

                let scored = calculate_partner_score(seeker, &candidate, distance_km, &self.weights);

                Some(ScoredPartner {
                    user_id: candidate.id,
                    name: candidate.name,
                    bio: candidate.bio,
                    fitness_level: candidate.fitness_level,
                    profile_image: candidate.profile_image,
                    shared_workouts: scored.shared_workouts,
                    shared_slots: scored.shared_slots,
                    distance_km,
                    match_score: scored.score,
                })
            })
            .collect();

        // Unknown distances sort after known ones on equal score
        partners.sort_by(|a, b| {
            b.match_score
                .total_cmp(&a.match_score)
                .then_with(|| {
                    a.distance_km
                        .unwrap_or(f64::INFINITY)
                        .total_cmp(&b.distance_km.unwrap_or(f64::INFINITY))
                })
        });

        partners.truncate(limit);

        PartnerMatchResult {
            partners,
            total_candidates,
        }
    }
}

impl Default for PartnerMatcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}
