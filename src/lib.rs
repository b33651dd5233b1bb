// SPDX-License-Identifier: MIT

//! Calendar-Bridge: Google Calendar integration backend
//!
//! This crate provides the backend API for linking user accounts to
//! Google Calendar via OAuth and creating/listing events on the user's
//! primary calendar.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::FirestoreDb;
use services::{CalendarService, GoogleAuthService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub auth_service: GoogleAuthService,
    pub calendar_service: CalendarService,
}
