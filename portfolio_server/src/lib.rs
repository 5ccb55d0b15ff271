//! Portfolio content service.
//!
//! A typed content store (PostgreSQL or in-memory) behind validating
//! services, exposed over an admin HTTP API with signed media uploads and
//! a change feed, plus the public site's view models with bundled fallback
//! content for database-less runs.

pub mod admin;
pub mod config;
pub mod dashboard;
pub mod events;
pub mod metrics;
pub mod migration;
pub mod models;
pub mod routes;
pub mod schema;
pub mod seeder;
pub mod services;
pub mod site;
pub mod store;
