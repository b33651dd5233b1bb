//! Data models for storage and API.

pub mod auth_state;
pub mod event;
pub mod user;

pub use auth_state::PendingAuthState;
pub use event::{EventSpec, GoogleEvent};
pub use user::{TokenBundle, User};
