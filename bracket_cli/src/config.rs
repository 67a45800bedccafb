//! CLI configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use bracket_engine::{EngineConfig, GrandFinalPolicy};

/// Complete CLI configuration loaded from environment variables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Engine configuration
    pub engine: EngineConfig,
    /// Fixed shuffle seed, random draw when unset
    pub seed: Option<u64>,
}

impl CliConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `grand_final_override` - Optional grand final policy (from CLI args)
    /// * `seed_override` - Optional shuffle seed (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but can't be parsed, or if the
    /// resulting engine configuration is invalid
    pub fn from_env(
        grand_final_override: Option<GrandFinalPolicy>,
        seed_override: Option<u64>,
    ) -> Result<Self, ConfigError> {
        Self::from_lookup(
            |key| std::env::var(key).ok(),
            grand_final_override,
            seed_override,
        )
    }

    /// Same as [`CliConfig::from_env`], reading variables through `lookup`
    pub fn from_lookup<F>(
        lookup: F,
        grand_final_override: Option<GrandFinalPolicy>,
        seed_override: Option<u64>,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = EngineConfig::default();

        let grand_final = match grand_final_override {
            Some(policy) => policy,
            None => parse_env_or(&lookup, "BRACKET_GRAND_FINAL", defaults.grand_final)?,
        };
        let max_entrants = parse_env_or(&lookup, "BRACKET_MAX_ENTRANTS", defaults.max_entrants)?;
        let seed = match seed_override {
            Some(seed) => Some(seed),
            None => parse_env(&lookup, "BRACKET_SEED")?,
        };

        let config = CliConfig {
            engine: EngineConfig {
                grand_final,
                max_entrants,
            },
            seed,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine
            .validate()
            .map_err(|reason| ConfigError::Invalid {
                var: "BRACKET_MAX_ENTRANTS".to_string(),
                reason,
            })
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse an optional environment variable
fn parse_env<F, T>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid {
                var: key.to_string(),
                reason: format!("can't parse {raw:?}"),
            }),
    }
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    Ok(parse_env(lookup, key)?.unwrap_or(default))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = CliConfig::from_lookup(lookup(&[]), None, None).unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn test_reads_env() {
        let config = CliConfig::from_lookup(
            lookup(&[
                ("BRACKET_GRAND_FINAL", "single"),
                ("BRACKET_MAX_ENTRANTS", "64"),
                ("BRACKET_SEED", "99"),
            ]),
            None,
            None,
        )
        .unwrap();
        assert_eq!(config.engine.grand_final, GrandFinalPolicy::SingleMatch);
        assert_eq!(config.engine.max_entrants, 64);
        assert_eq!(config.seed, Some(99));
    }

    #[test]
    fn test_overrides_win() {
        let config = CliConfig::from_lookup(
            lookup(&[("BRACKET_GRAND_FINAL", "single"), ("BRACKET_SEED", "1")]),
            Some(GrandFinalPolicy::Reset),
            Some(7),
        )
        .unwrap();
        assert_eq!(config.engine.grand_final, GrandFinalPolicy::Reset);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_invalid_values() {
        let err = CliConfig::from_lookup(lookup(&[("BRACKET_SEED", "abc")]), None, None)
            .unwrap_err();
        assert!(err.to_string().contains("BRACKET_SEED"));

        let err = CliConfig::from_lookup(lookup(&[("BRACKET_MAX_ENTRANTS", "1")]), None, None)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        assert!(
            CliConfig::from_lookup(lookup(&[("BRACKET_GRAND_FINAL", "twice")]), None, None)
                .is_err()
        );
    }
}
