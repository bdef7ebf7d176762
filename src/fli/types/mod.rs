//! Foundational data structures, error types, and the pixel type table.

pub mod array;
pub mod datatypes;
pub mod error;
pub mod models;
