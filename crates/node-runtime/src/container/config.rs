//! # Configuration Loading
//!
//! The simulation is configured by an optional JSON file (missing fields take
//! their defaults) followed by environment overrides:
//!
//! - `RC_SEED`: scheduler seed
//! - `RC_END_TIME`: last logical time processed

use std::path::Path;

use anyhow::{Context, Result};
use shared_types::SimulationConfig;
use tracing::info;

/// Environment variable overriding the seed.
pub const SEED_VAR: &str = "RC_SEED";

/// Environment variable overriding the end time.
pub const END_TIME_VAR: &str = "RC_END_TIME";

/// Load, override and validate the configuration.
pub fn load_config(path: Option<&Path>) -> Result<SimulationConfig> {
    let config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let config = parse_config(&raw)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?;
            info!(path = %path.display(), "Loaded configuration file");
            config
        }
        None => SimulationConfig::default(),
    };
    let config = apply_env_overrides(config, |name| std::env::var(name).ok())?;
    config.validate().context("Configuration rejected")?;
    Ok(config)
}

/// Parse a JSON configuration document.
pub fn parse_config(raw: &str) -> Result<SimulationConfig> {
    Ok(serde_json::from_str(raw)?)
}

/// Apply `RC_*` overrides read through `lookup`.
pub fn apply_env_overrides<F>(mut config: SimulationConfig, lookup: F) -> Result<SimulationConfig>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(seed) = lookup(SEED_VAR) {
        config.seed = seed
            .trim()
            .parse()
            .with_context(|| format!("{SEED_VAR} is not an unsigned integer: {seed}"))?;
    }
    if let Some(end_time) = lookup(END_TIME_VAR) {
        config.end_time = end_time
            .trim()
            .parse()
            .with_context(|| format!("{END_TIME_VAR} is not an unsigned integer: {end_time}"))?;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{ForkChoiceRule, Role};

    #[test]
    fn test_partial_document_keeps_defaults() {
        let config = parse_config(
            r#"{
                "seed": 7,
                "nodes": [
                    {"role": "ADMIN", "hash_rate_share": 0.5},
                    {"role": "MINER", "hash_rate_share": 0.5}
                ],
                "consensus": {"fork_choice": "heaviest_chain"}
            }"#,
        )
        .unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.nodes.len(), 2);
        assert_eq!(config.nodes[0].role, Role::Admin);
        assert_eq!(config.consensus.fork_choice, ForkChoiceRule::HeaviestChain);
        assert_eq!(config.consensus.orphan_timeout, 600_000);
        assert_eq!(config.block_interval, 300_000);
    }

    #[test]
    fn test_env_overrides() {
        let config = apply_env_overrides(SimulationConfig::default(), |name| match name {
            SEED_VAR => Some("1234".to_string()),
            END_TIME_VAR => Some(" 900000 ".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.seed, 1234);
        assert_eq!(config.end_time, 900_000);
    }

    #[test]
    fn test_bad_override_rejected() {
        let result = apply_env_overrides(SimulationConfig::default(), |name| {
            (name == SEED_VAR).then(|| "forty-two".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(load_config(Some(Path::new("/nonexistent/redact-chain.json"))).is_err());
    }
}
