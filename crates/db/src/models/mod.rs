//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - Create/replace DTOs for writes
//! - Outward-facing response projections (never the password hash)

pub mod portfolio;
pub mod user;
