//! Session token codec and password hashing.

pub mod jwt;
pub mod password;
