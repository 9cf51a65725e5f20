// Core algorithm exports
pub mod dedup;
pub mod distance;
pub mod filters;
pub mod matcher;
pub mod scoring;
pub mod search;

pub use dedup::{dedup_key, remove_duplicates, GeoKeyed};
pub use distance::{haversine_distance, calculate_bounding_box, is_within_bounding_box, within_radius};
pub use filters::{distance_check, is_gym_mate, shared_workouts};
pub use matcher::{PartnerMatcher, PartnerMatchResult};
pub use scoring::{calculate_partner_score, PartnerScore};
pub use search::{filter_gyms, nearby_gyms};
