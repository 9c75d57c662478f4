//! Library exports for apprentice, shared between the binary and tests.

pub mod config;
pub mod routes;
pub mod startup;
pub mod utils;
