// Service exports
pub mod auth;
pub mod cache;
pub mod gyms;
pub mod matches;
pub mod postgres;
pub mod profiles;
pub mod token;

pub use auth::{AuthError, AuthUser, Session, SignUpOutcome, SupabaseAuthClient};
pub use cache::{CacheError, CacheKey, GymCache};
pub use gyms::{GymDigest, GymInsert};
pub use postgres::{PostgresClient, PostgresError};
pub use token::{Claims, TokenError, TokenVerifier};
