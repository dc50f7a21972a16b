// crates/transfer-intake-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config validation tests.
// Purpose: Reduce duplication across integration tests for
//          transfer-intake-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use transfer_intake_config::IntakeConfig;

/// Parses a TOML string into an `IntakeConfig` for tests.
pub fn config_from_toml(toml_str: &str) -> Result<IntakeConfig, toml::de::Error> {
    toml::from_str(toml_str)
}

/// Returns a minimal config with all defaults applied and no secret.
pub fn minimal_config() -> Result<IntakeConfig, toml::de::Error> {
    config_from_toml("")
}

/// Returns a minimal config carrying a valid hashing secret.
pub fn config_with_secret() -> Result<IntakeConfig, toml::de::Error> {
    let mut config = minimal_config()?;
    config.hashing.secret = Some("a-long-enough-test-secret".to_string());
    Ok(config)
}
