// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod calendar;
pub mod google_auth;

pub use calendar::{CalendarClient, CalendarService};
pub use google_auth::{AuthOutcome, Credentials, GoogleAuthClient, GoogleAuthService};
