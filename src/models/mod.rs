//! # Data Models
//!
//! This module contains all the data models used throughout the Holocron API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod character;

pub use character::Entity as Character;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
    /// Configuration profile the process was started with
    #[schema(example = "local")]
    pub profile: String,
}

impl ServiceInfo {
    pub fn new(profile: &str) -> Self {
        Self {
            service: "holocron".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            profile: profile.to_string(),
        }
    }
}
