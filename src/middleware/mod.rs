pub mod actor;
pub mod auth;

pub use actor::load_actor_middleware;
pub use auth::{jwt_auth_middleware, AuthUser};
