//! Gym Buddy - gym directory and workout-partner matching service
//!
//! The library backs two binaries: `gym-buddy`, the HTTP API over gyms,
//! profiles, matches and auth, and `gym-seeder`, which fills the gym
//! directory from the chain's site, Google Places and OpenStreetMap.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod scraper;
pub mod services;

// Re-export commonly used types
pub use core::{
    distance::{calculate_bounding_box, haversine_distance},
    PartnerMatcher,
};
pub use models::{Coordinates, Gym, NearbyGym, Profile, ScoredPartner, ScoringWeights, WorkoutMatch};
