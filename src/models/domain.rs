use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Great-circle distance to another point in kilometers
    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        crate::core::distance::haversine_distance(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Gym price tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriceRange {
    #[serde(rename = "$")]
    Budget,
    #[serde(rename = "$$")]
    Standard,
    #[serde(rename = "$$$")]
    Premium,
}

impl PriceRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceRange::Budget => "$",
            PriceRange::Standard => "$$",
            PriceRange::Premium => "$$$",
        }
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriceRange {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "$" => Ok(PriceRange::Budget),
            "$$" => Ok(PriceRange::Standard),
            "$$$" => Ok(PriceRange::Premium),
            other => Err(format!("unknown price range: {}", other)),
        }
    }
}

/// Free-form opening hours per weekday, e.g. "06:00-22:00"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpeningHours {
    pub monday: Option<String>,
    pub tuesday: Option<String>,
    pub wednesday: Option<String>,
    pub thursday: Option<String>,
    pub friday: Option<String>,
    pub saturday: Option<String>,
    pub sunday: Option<String>,
}

/// Gym directory entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gym {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub location: Coordinates,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub hours: OpeningHours,
    #[serde(default)]
    pub images: Vec<String>,
    pub rating: Option<f64>,
    pub price_range: Option<PriceRange>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Gym {
    pub fn summary(&self) -> GymSummary {
        GymSummary {
            id: self.id,
            name: self.name.clone(),
            address: self.address.clone(),
        }
    }
}

/// The slice of a gym embedded in a profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GymSummary {
    pub id: Uuid,
    pub name: String,
    pub address: String,
}

/// A gym together with its distance from a search origin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyGym {
    #[serde(flatten)]
    pub gym: Gym,
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "fitness_level", rename_all = "lowercase")]
pub enum FitnessLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl FitnessLevel {
    /// Position on the beginner..advanced scale
    pub fn rank(&self) -> u8 {
        match self {
            FitnessLevel::Beginner => 0,
            FitnessLevel::Intermediate => 1,
            FitnessLevel::Advanced => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DayAvailability {
    pub morning: bool,
    pub afternoon: bool,
    pub evening: bool,
}

impl DayAvailability {
    fn slots(&self) -> [bool; 3] {
        [self.morning, self.afternoon, self.evening]
    }
}

/// Weekly availability in morning/afternoon/evening slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Availability {
    pub monday: DayAvailability,
    pub tuesday: DayAvailability,
    pub wednesday: DayAvailability,
    pub thursday: DayAvailability,
    pub friday: DayAvailability,
    pub saturday: DayAvailability,
    pub sunday: DayAvailability,
}

impl Availability {
    fn days(&self) -> [DayAvailability; 7] {
        [
            self.monday,
            self.tuesday,
            self.wednesday,
            self.thursday,
            self.friday,
            self.saturday,
            self.sunday,
        ]
    }

    /// Number of slots marked available
    pub fn slot_count(&self) -> usize {
        self.days()
            .iter()
            .flat_map(|day| day.slots())
            .filter(|free| *free)
            .count()
    }

    /// Number of slots both schedules have free
    pub fn overlap(&self, other: &Availability) -> usize {
        self.days()
            .iter()
            .zip(other.days().iter())
            .flat_map(|(a, b)| a.slots().into_iter().zip(b.slots()))
            .filter(|(a, b)| *a && *b)
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl ProfileLocation {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// Partner-search preferences stored with a profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchingPreferences {
    #[serde(default = "default_max_distance")]
    pub max_distance: f64,
    #[serde(default)]
    pub workout_types: Vec<String>,
    #[serde(default)]
    pub available_hours: Vec<String>,
}

impl Default for MatchingPreferences {
    fn default() -> Self {
        Self {
            max_distance: default_max_distance(),
            workout_types: Vec::new(),
            available_hours: Vec::new(),
        }
    }
}

fn default_max_distance() -> f64 {
    10.0
}

/// Member profile, keyed by the auth user id
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub bio: Option<String>,
    pub age: Option<u8>,
    #[serde(default)]
    pub fitness_level: FitnessLevel,
    #[serde(default)]
    pub workout_preferences: Vec<String>,
    #[serde(default)]
    pub availability: Availability,
    pub profile_image: Option<String>,
    pub location: Option<ProfileLocation>,
    pub gym: Option<GymSummary>,
    #[serde(default)]
    pub preferences: MatchingPreferences,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn gym_id(&self) -> Option<Uuid> {
        self.gym.as_ref().map(|g| g.id)
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        self.location.as_ref().map(ProfileLocation::coordinates)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "match_status", rename_all = "lowercase")]
pub enum MatchStatus {
    Pending,
    Accepted,
    Declined,
    Completed,
}

/// A requested or confirmed workout pairing at a gym
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutMatch {
    pub id: Uuid,
    pub user_id: Uuid,
    pub partner_id: Uuid,
    pub gym_id: Uuid,
    pub status: MatchStatus,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub workout_type: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkoutMatch {
    pub fn involves(&self, member: Uuid) -> bool {
        self.user_id == member || self.partner_id == member
    }

    /// Only the invited partner answers a request
    pub fn can_respond(&self, member: Uuid) -> bool {
        self.partner_id == member
    }
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// Scored workout-partner candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredPartner {
    pub user_id: Uuid,
    pub name: String,
    pub bio: Option<String>,
    pub fitness_level: FitnessLevel,
    pub profile_image: Option<String>,
    pub shared_workouts: Vec<String>,
    pub shared_slots: usize,
    pub distance_km: Option<f64>,
    pub match_score: f64,
}

/// Partner scoring weights
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    pub workouts: f64,
    pub availability: f64,
    pub fitness: f64,
    pub distance: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            workouts: 0.35,
            availability: 0.30,
            fitness: 0.15,
            distance: 0.20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_range_wire_format() {
        let json = serde_json::to_string(&PriceRange::Standard).unwrap();
        assert_eq!(json, "\"$$\"");
        assert_eq!("$$$".parse::<PriceRange>().unwrap(), PriceRange::Premium);
        assert!("$$$$".parse::<PriceRange>().is_err());
    }

    #[test]
    fn test_missing_preferences_use_defaults() {
        let prefs: MatchingPreferences = serde_json::from_str("{}").unwrap();
        assert_eq!(prefs.max_distance, 10.0);
        assert!(prefs.workout_types.is_empty());
        assert!(prefs.available_hours.is_empty());
    }

    #[test]
    fn test_availability_overlap() {
        let mut a = Availability::default();
        a.monday.morning = true;
        a.friday.evening = true;
        a.sunday.afternoon = true;

        let mut b = Availability::default();
        b.monday.morning = true;
        b.friday.evening = true;
        b.saturday.evening = true;

        assert_eq!(a.slot_count(), 3);
        assert_eq!(a.overlap(&b), 2);
        assert_eq!(a.overlap(&Availability::default()), 0);
    }

    #[test]
    fn test_partial_availability_json() {
        let availability: Availability =
            serde_json::from_str(r#"{"tuesday": {"evening": true}}"#).unwrap();
        assert!(availability.tuesday.evening);
        assert!(!availability.tuesday.morning);
        assert_eq!(availability.slot_count(), 1);
    }

    #[test]
    fn test_coordinates_validity() {
        assert!(Coordinates::new(51.5074, -0.1278).is_valid());
        assert!(!Coordinates::new(91.0, 0.0).is_valid());
        assert!(!Coordinates::new(f64::NAN, 0.0).is_valid());
    }
}
