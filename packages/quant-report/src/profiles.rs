//! Built-in risk profiles for automatic portfolio construction.

use crate::types::WeightMap;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Profile used when an unknown profile is requested.
pub const DEFAULT_PROFILE: &str = "medium";

/// Risk profile definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    /// Profile identifier
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Description of the allocation
    pub description: String,
    /// Assets held, equally weighted
    pub assets: Vec<String>,
}

impl Profile {
    fn new(id: &str, name: &str, description: &str, assets: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            assets: assets.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Equal weights (1/n) across the profile's assets.
    pub fn equal_weights(&self) -> WeightMap {
        WeightMap::equal(&self.assets)
    }
}

/// Built-in risk profiles.
pub static BUILTIN_PROFILES: LazyLock<HashMap<String, Profile>> = LazyLock::new(|| {
    let mut profiles = HashMap::new();

    profiles.insert(
        "low".to_string(),
        Profile::new(
            "low",
            "Low Risk",
            "Treasuries, investment-grade credit, short duration, and gold",
            &["IEF", "LQD", "SHY", "GLD"],
        ),
    );

    profiles.insert(
        "medium".to_string(),
        Profile::new(
            "medium",
            "Medium Risk",
            "US large caps, developed ex-US equity, real estate, and commodities",
            &["SPY", "VEA", "VNQ", "DBC"],
        ),
    );

    profiles.insert(
        "high".to_string(),
        Profile::new(
            "high",
            "High Risk",
            "Total US market, emerging markets, Nasdaq-100, and disruptive growth",
            &["VTI", "VWO", "QQQ", "ARKK"],
        ),
    );

    profiles
});

/// List all available profiles, sorted by identifier.
pub fn list_profiles() -> Vec<Profile> {
    let mut profiles: Vec<Profile> = BUILTIN_PROFILES.values().cloned().collect();
    profiles.sort_by(|a, b| a.id.cmp(&b.id));
    profiles
}

/// Get a specific profile by ID.
pub fn get_profile(id: &str) -> Result<Profile> {
    BUILTIN_PROFILES
        .get(&id.trim().to_lowercase())
        .cloned()
        .ok_or_else(|| Error::UnknownProfile(id.to_string()))
}

/// Get a profile by ID, falling back to [`DEFAULT_PROFILE`] when unknown.
pub fn resolve_profile(id: &str) -> Profile {
    match get_profile(id) {
        Ok(profile) => profile,
        Err(_) => {
            tracing::warn!(requested = id, fallback = DEFAULT_PROFILE, "Unknown risk profile");
            BUILTIN_PROFILES[DEFAULT_PROFILE].clone()
        }
    }
}
