//! # Holocron Library
//!
//! This library provides the core functionality for the Holocron service:
//! a generic SeaORM repository, the character service built on it, and the
//! HTTP surface exposing both.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod server;
pub mod services;
pub mod telemetry;
pub use migration;
