//! Rewards configuration.
//!
//! Loaded from the environment with defaults suitable for development:
//!
//! - `QUESTFLOW_PUBLIC_URL`: base of referral links (default `http://localhost:3000`)
//! - `QUESTFLOW_REFERRAL_MILESTONES`: JSON array `[{"threshold":3,"bonus":100}, ...]`,
//!   bonuses in hundredths of a tTRUST (default: 3 -> 100, 10 -> 150)
//! - `QUESTFLOW_MILESTONE_REPEAT_INTERVAL`: spacing of progress targets past the
//!   last milestone (default 10)

use crate::error::ConfigError;
use crate::milestone::{Milestone, MilestoneTable, DEFAULT_MILESTONES, DEFAULT_REPEAT_INTERVAL};

pub const DEFAULT_PUBLIC_URL: &str = "http://localhost:3000";

const ENV_PUBLIC_URL: &str = "QUESTFLOW_PUBLIC_URL";
const ENV_MILESTONES: &str = "QUESTFLOW_REFERRAL_MILESTONES";
const ENV_REPEAT_INTERVAL: &str = "QUESTFLOW_MILESTONE_REPEAT_INTERVAL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardsConfig {
    pub milestones: MilestoneTable,
    /// Base URL referral links point at.
    pub public_base_url: String,
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            milestones: MilestoneTable::default(),
            public_base_url: DEFAULT_PUBLIC_URL.to_string(),
        }
    }
}

impl RewardsConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset and blank values fall back
    /// to defaults; anything else must parse and validate.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let public_base_url = match get(ENV_PUBLIC_URL) {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => url,
            Some(url) => {
                return Err(ConfigError::InvalidValue {
                    field: ENV_PUBLIC_URL.to_string(),
                    value: url,
                    reason: "must be an http(s) URL".to_string(),
                });
            }
            None => DEFAULT_PUBLIC_URL.to_string(),
        };

        let milestones: Vec<Milestone> = match get(ENV_MILESTONES) {
            Some(raw) => serde_json::from_str(&raw).map_err(|e| ConfigError::InvalidValue {
                field: ENV_MILESTONES.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_MILESTONES.to_vec(),
        };

        let repeat_interval = match get(ENV_REPEAT_INTERVAL) {
            Some(raw) => raw.parse::<u64>().map_err(|e| ConfigError::InvalidValue {
                field: ENV_REPEAT_INTERVAL.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_REPEAT_INTERVAL,
        };

        Ok(Self {
            milestones: MilestoneTable::new(milestones, repeat_interval)?,
            public_base_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::Ttrust;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = RewardsConfig::from_lookup(lookup(&[])).expect("defaults");
        assert_eq!(config, RewardsConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = RewardsConfig::from_lookup(lookup(&[
            (ENV_PUBLIC_URL, "https://questflow.app"),
            (ENV_MILESTONES, r#"[{"threshold":5,"bonus":200}]"#),
            (ENV_REPEAT_INTERVAL, "5"),
        ]))
        .expect("valid overrides");
        assert_eq!(config.public_base_url, "https://questflow.app");
        assert_eq!(config.milestones.total_earned(5), Ttrust::from_whole(2));
        assert_eq!(config.milestones.next_milestone(5), 10);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(RewardsConfig::from_lookup(lookup(&[(ENV_MILESTONES, "not json")])).is_err());
        assert!(RewardsConfig::from_lookup(lookup(&[(ENV_MILESTONES, "[]")])).is_err());
        assert!(RewardsConfig::from_lookup(lookup(&[(ENV_REPEAT_INTERVAL, "0")])).is_err());
        assert!(RewardsConfig::from_lookup(lookup(&[(ENV_PUBLIC_URL, "ftp://x")])).is_err());
    }
}
