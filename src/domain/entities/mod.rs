//! Core domain entities.
//!
//! # Entity Types
//!
//! - [`LinkRecord`] - A durable short code → long URL mapping
//! - [`CachedLink`] - The projection of a link kept in the resolution cache
//! - [`Click`] - A recorded access to a short link
//!
//! Creation inputs (`NewLink`, `NewClick`) are separate structs; `NewLink`
//! fills in server-side defaults when converted into a record.

pub mod click;
pub mod link;

pub use click::{Click, NewClick};
pub use link::{CachedLink, DEFAULT_LINK_TTL_DAYS, LinkRecord, NewLink};
