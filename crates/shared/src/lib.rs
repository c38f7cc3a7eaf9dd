//! Shared errors, configuration and identity claims for Reimburse.
//!
//! This crate provides common pieces used across all other crates:
//! - Application-wide error type
//! - Layered configuration loading
//! - Bearer token claims and validation

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;

pub use auth::Claims;
pub use config::{AppConfig, DatabaseConfig, JwtConfig, ServerConfig};
pub use error::{AppError, AppResult};
pub use jwt::{JwtError, JwtService};
