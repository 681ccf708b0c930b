//! # Gloam Common
//!
//! Common types, utilities, and shared abstractions for Gloam.
//!
//! This crate provides foundational types used across the Gloam crates:
//! - ID types (EntityId, ItemTypeId)
//! - 2-D geometry (Vec2, Aabb, Circle)
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod geometry;
pub mod ids;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::geometry::*;
    pub use crate::ids::*;
}

pub use prelude::*;
