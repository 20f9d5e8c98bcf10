//! Vitrine Core Types and Traits
//!
//! This crate provides the fundamental types and traits used throughout Vitrine:
//! - Tenant identity and platform records
//! - Effective settings and currency configuration
//! - Collaborator traits (keyed storage, auth gateway, platform directory)
//! - Core error types

pub mod currency;
pub mod error;
pub mod gateway;
pub mod keyed_store;
pub mod settings;
pub mod tenant;

pub use error::{Error, Result};
