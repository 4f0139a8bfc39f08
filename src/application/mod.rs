//! Application layer services implementing business logic.
//!
//! Services orchestrate domain operations by coordinating repository and cache
//! calls, validation and business rules. They hold their collaborators as
//! trait objects injected at construction.
//!
//! # Available Services
//!
//! - [`services::resolver::Resolver`] - Cache-aside short code resolution
//! - [`services::link_service::LinkService`] - Short link creation and deletion
//! - [`services::stats_service::StatsService`] - Click count queries
//! - [`services::auth_service::AuthService`] - API token authentication

pub mod services;
