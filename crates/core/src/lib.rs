//! Core types and utilities for velcro
//!
//! This is the foundation crate (Layer 0) that all other velcro crates depend on.
//! It provides:
//! - The shared error taxonomy
//! - Setting value helpers
//!
//! This crate has no dependencies on other velcro crates.

pub mod error;
pub mod value;

pub use error::{Error, Result};
pub use value::Value;
