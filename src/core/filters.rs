use crate::models::Profile;

/// Stage 1: the candidate is someone else training at the seeker's gym
#[inline]
pub fn is_gym_mate(seeker: &Profile, candidate: &Profile) -> bool {
    if candidate.id == seeker.id {
        return false;
    }

    match seeker.gym_id() {
        Some(gym_id) => candidate.gym_id() == Some(gym_id),
        None => false,
    }
}

/// Stage 2: distance between the two members, when both shared a location
///
/// Returns `None` for the distance when either side has no location; such
/// candidates are never excluded on distance.
#[inline]
pub fn distance_check(seeker: &Profile, candidate: &Profile) -> (bool, Option<f64>) {
    match (seeker.coordinates(), candidate.coordinates()) {
        (Some(from), Some(to)) => {
            let distance_km = from.distance_to(&to);
            (distance_km <= seeker.preferences.max_distance, Some(distance_km))
        }
        _ => (true, None),
    }
}

/// Lowercased workout interests: declared preferences plus wanted workout types
fn interests(profile: &Profile) -> Vec<String> {
    let mut all: Vec<String> = Vec::new();
    for workout in profile
        .workout_preferences
        .iter()
        .chain(profile.preferences.workout_types.iter())
    {
        let normalized = workout.trim().to_lowercase();
        if !normalized.is_empty() && !all.contains(&normalized) {
            all.push(normalized);
        }
    }
    all
}

/// Workouts both members are into, in the seeker's order
pub fn shared_workouts(seeker: &Profile, candidate: &Profile) -> Vec<String> {
    let theirs = interests(candidate);
    interests(seeker)
        .into_iter()
        .filter(|workout| theirs.contains(workout))
        .collect()
}

/// Number of distinct interests the seeker declared
pub fn interest_count(profile: &Profile) -> usize {
    interests(profile).len()
}
