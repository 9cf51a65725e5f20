// Model exports
pub mod domain;
pub mod requests;
pub mod responses;
pub mod validation;

pub use domain::{
    Availability, BoundingBox, Coordinates, DayAvailability, FitnessLevel, Gym, GymSummary,
    MatchStatus, MatchingPreferences, NearbyGym, OpeningHours, PriceRange, Profile,
    ProfileLocation, ScoredPartner, ScoringWeights, WorkoutMatch,
};
pub use requests::{
    CreateGymRequest, CreateProfileRequest, FindPartnersQuery, GymSearchRequest, JoinGymRequest,
    LoginRequest, MatchFilter, MatchRequest, MatchStatusUpdate, NearbyGymsQuery, ProfileListQuery,
    RegisterRequest, ResetPasswordRequest, UpdateGymRequest, UpdateMatchRequest,
    UpdatePasswordRequest, UpdateProfileRequest,
};
pub use responses::{ErrorResponse, FindPartnersResponse, HealthResponse, OAuthUrlResponse};
