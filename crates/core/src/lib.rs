//! Shared domain types for the Folio backend.
//!
//! Keeps the pieces every other crate needs: primitive type aliases,
//! the domain error taxonomy, account constants, and username rules.

pub mod account;
pub mod error;
pub mod handle;
pub mod types;
