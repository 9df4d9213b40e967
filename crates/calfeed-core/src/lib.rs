//! Shared configuration, error and data types for the calfeed workspace.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
