//! Configuration loading
//!
//! This module provides utilities for loading SDK configuration from
//! environment variables and files.

pub mod loader;

pub use loader::{load, load_from_env, load_from_file};
