//! Core types and configuration for tabletalk
//!
//! This crate contains domain types shared across all other crates.

mod chat;
mod config;
mod env_config;
mod executor_trait;
mod schema;

pub use chat::*;
pub use config::*;
pub use env_config::*;
pub use executor_trait::*;
pub use schema::*;
