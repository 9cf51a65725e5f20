use crate::models::{Profile, ScoringWeights};
use crate::core::filters::{interest_count, shared_workouts};

/// Workouts beyond this many shared add nothing further
const SHARED_WORKOUT_CAP: f64 = 3.0;

/// Score for a candidate whose distance is unknown
const UNKNOWN_DISTANCE_SCORE: f64 = 0.5;

/// Result of scoring one candidate against a seeker
#[derive(Debug, Clone)]
pub struct PartnerScore {
    pub score: f64,
    pub shared_workouts: Vec<String>,
    pub shared_slots: usize,
}

/// Calculate a partner score (0-100)
///
/// score = (
///     workout_score * 0.35 +       # more shared workouts = higher
///     availability_score * 0.30 +  # more overlapping weekly slots = higher
///     fitness_score * 0.15 +       # closer fitness level = higher
///     distance_score * 0.20        # closer = higher
/// ) * 100
pub fn calculate_partner_score(
    seeker: &Profile,
    candidate: &Profile,
    distance_km: Option<f64>,
    weights: &ScoringWeights,
) -> PartnerScore {
    let shared = shared_workouts(seeker, candidate);
    let workout_score = calculate_workout_score(shared.len(), interest_count(seeker));

    let shared_slots = seeker.availability.overlap(&candidate.availability);
    let availability_score =
        calculate_availability_score(shared_slots, seeker.availability.slot_count());

    let fitness_score = calculate_fitness_score(
        seeker.fitness_level.rank(),
        candidate.fitness_level.rank(),
    );

    let distance_score = match distance_km {
        Some(d) => calculate_distance_score(d, seeker.preferences.max_distance),
        None => UNKNOWN_DISTANCE_SCORE,
    };

    let total = (workout_score * weights.workouts
        + availability_score * weights.availability
        + fitness_score * weights.fitness
        + distance_score * weights.distance)
        * 100.0;

    PartnerScore {
        score: total.clamp(0.0, 100.0),
        shared_workouts: shared,
        shared_slots,
    }
}

/// Shared workouts (0-1), saturating at three
#[inline]
fn calculate_workout_score(shared: usize, declared: usize) -> f64 {
    if declared == 0 {
        return 0.0;
    }
    let cap = SHARED_WORKOUT_CAP.min(declared as f64);
    (shared as f64).min(cap) / cap
}

/// Fraction of the seeker's free slots the candidate also has free (0-1)
#[inline]
fn calculate_availability_score(shared_slots: usize, seeker_slots: usize) -> f64 {
    if seeker_slots == 0 {
        return 0.0;
    }
    (shared_slots as f64 / seeker_slots as f64).min(1.0)
}

/// 1.0 for the same level, 0.5 one step apart, 0.0 beginner vs advanced
#[inline]
fn calculate_fitness_score(seeker_rank: u8, candidate_rank: u8) -> f64 {
    1.0 - (seeker_rank.abs_diff(candidate_rank) as f64 / 2.0)
}

/// Exponential decay over the seeker's maximum distance (0-1)
#[inline]
fn calculate_distance_score(distance_km: f64, max_distance_km: f64) -> f64 {
    if max_distance_km <= 0.0 || distance_km >= max_distance_km {
        return 0.0;
    }
    (-distance_km / (max_distance_km * 0.5)).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Availability, FitnessLevel, MatchingPreferences};
    use chrono::Utc;
    use uuid::Uuid;

    fn member(level: FitnessLevel, workouts: &[&str], availability: Availability) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            email: "member@example.com".to_string(),
            name: "Member".to_string(),
            bio: None,
            age: None,
            fitness_level: level,
            workout_preferences: workouts.iter().map(|w| w.to_string()).collect(),
            availability,
            profile_image: None,
            location: None,
            gym: None,
            preferences: MatchingPreferences::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn evenings() -> Availability {
        let mut a = Availability::default();
        a.monday.evening = true;
        a.wednesday.evening = true;
        a
    }

    #[test]
    fn test_score_in_range() {
        let seeker = member(FitnessLevel::Beginner, &["running"], evenings());
        let candidate = member(FitnessLevel::Advanced, &["running"], evenings());
        let result = calculate_partner_score(&seeker, &candidate, Some(1.0), &ScoringWeights::default());

        assert!(result.score >= 0.0 && result.score <= 100.0);
        assert_eq!(result.shared_workouts, vec!["running"]);
        assert_eq!(result.shared_slots, 2);
    }

    #[test]
    fn test_perfect_partner_close_to_max() {
        let seeker = member(FitnessLevel::Intermediate, &["running", "yoga"], evenings());
        let twin = member(FitnessLevel::Intermediate, &["yoga", "running"], evenings());
        let result = calculate_partner_score(&seeker, &twin, Some(0.0), &ScoringWeights::default());

        assert!((result.score - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_workout_score() {
        assert_eq!(calculate_workout_score(0, 0), 0.0);
        assert_eq!(calculate_workout_score(1, 1), 1.0);
        assert_eq!(calculate_workout_score(3, 5), 1.0);
        assert!((calculate_workout_score(1, 5) - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_fitness_score() {
        assert_eq!(calculate_fitness_score(1, 1), 1.0);
        assert_eq!(calculate_fitness_score(0, 1), 0.5);
        assert_eq!(calculate_fitness_score(2, 0), 0.0);
    }

    #[test]
    fn test_distance_score() {
        assert!(calculate_distance_score(0.5, 10.0) > 0.9);
        assert_eq!(calculate_distance_score(10.0, 10.0), 0.0);
        let half = calculate_distance_score(5.0, 10.0);
        assert!(half > 0.3 && half < 0.8);
    }

    #[test]
    fn test_overlapping_schedule_scores_higher() {
        let seeker = member(FitnessLevel::Beginner, &["boxing"], evenings());
        let aligned = member(FitnessLevel::Beginner, &["boxing"], evenings());
        let mut mornings = Availability::default();
        mornings.monday.morning = true;
        let misaligned = member(FitnessLevel::Beginner, &["boxing"], mornings);

        let weights = ScoringWeights::default();
        let a = calculate_partner_score(&seeker, &aligned, None, &weights);
        let b = calculate_partner_score(&seeker, &misaligned, None, &weights);
        assert!(a.score > b.score);
    }
}
