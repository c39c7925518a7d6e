//! # Liga Ágil Backend
//!
//! REST backend for a sports-facility booking and social platform.
//!
//! The crate covers user accounts and player/owner profiles, court listings
//! with weekly opening schedules, time-slot reservations, and a small social
//! feed (posts, comments, likes). The HTTP API is served by Axum.
//!
//! ## Architecture
//!
//! - [`models`]: Domain types shared by every layer
//! - [`db`]: Repository traits, in-memory and Postgres implementations, factory
//! - [`services`]: Business rules (availability, reservations, posts, ...)
//! - [`http`]: Axum router, handlers and DTOs
//!
//! ## Availability
//!
//! The only non-trivial rule set lives in [`services::availability`]: slots
//! are generated from day-of-week ranges, holidays may swap the weekday
//! schedule for the Sunday one, and active reservations are subtracted.

pub mod api;

pub mod db;
pub mod models;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
