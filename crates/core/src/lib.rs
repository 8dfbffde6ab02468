//! Core business logic for potluck.

pub mod services;

pub use services::*;
