// crates/transfer-intake-config/tests/config_defaults.rs
// =============================================================================
// Module: Config Defaults and Core Validation Tests
// Description: Validate default behavior and core config invariants.
// Purpose: Ensure minimal config is valid and critical invariants are
//          enforced.
// =============================================================================

//! Config defaults and core validation tests for transfer-intake-config.

use transfer_intake_config::AuditSinkKind;
use transfer_intake_config::ConfigError;
use transfer_intake_config::StoreType;
use transfer_intake_core::PatchPolicy;

mod common;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<(), ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(()) => Err("expected invalid config".to_string()),
    }
}

#[test]
fn config_with_secret_validates() -> TestResult {
    let config = common::config_with_secret().map_err(|err| err.to_string())?;
    config.validate().map_err(|err| err.to_string())?;
    Ok(())
}

#[test]
fn defaults_match_the_deployment_profile() -> TestResult {
    let config = common::minimal_config().map_err(|err| err.to_string())?;
    if config.rate_limit.window_ms != 600_000 {
        return Err("rate_limit.window_ms should default to 600000".to_string());
    }
    if config.rate_limit.max_requests != 20 {
        return Err("rate_limit.max_requests should default to 20".to_string());
    }
    if config.rate_limit.cache_ttl_ms != 30_000 {
        return Err("rate_limit.cache_ttl_ms should default to 30000".to_string());
    }
    if config.rate_limit.max_cache_entries != 4_096 {
        return Err("rate_limit.max_cache_entries should default to 4096".to_string());
    }
    if config.server.bind != "127.0.0.1:8080" {
        return Err("server.bind should default to loopback".to_string());
    }
    if config.store.store_type != StoreType::Memory {
        return Err("store.type should default to memory".to_string());
    }
    if config.notifier.enabled {
        return Err("notifier should default to disabled".to_string());
    }
    if config.audit.sink != AuditSinkKind::Stderr {
        return Err("audit.sink should default to stderr".to_string());
    }
    if config.validation.patch_policy != PatchPolicy::Progressive {
        return Err("validation.patch_policy should default to progressive".to_string());
    }
    Ok(())
}

#[test]
fn missing_secret_is_rejected() -> TestResult {
    let config = common::minimal_config().map_err(|err| err.to_string())?;
    assert_invalid(config.validate(), "hashing.secret is required")
}

#[test]
fn short_secret_is_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.hashing.secret = Some("short".to_string());
    assert_invalid(config.validate(), "at least 16 characters")
}

#[test]
fn full_document_parses() -> TestResult {
    let config = common::config_from_toml(
        r#"
        [server]
        bind = "0.0.0.0:9090"
        max_body_bytes = 32768

        [rate_limit]
        window_ms = 300000
        max_requests = 10
        cache_ttl_ms = 15000
        max_cache_entries = 512

        [hashing]
        secret = "configured-secret-value"

        [store]
        type = "sqlite"
        path = "/var/lib/intake/intake.db"
        journal_mode = "wal"
        sync_mode = "normal"

        [notifier]
        enabled = true
        endpoint = "https://hooks.example.com/intake"
        timeout_ms = 2500

        [audit]
        sink = "file"
        path = "/var/log/intake/audit.log"

        [validation]
        patch_policy = "strict"
        "#,
    )
    .map_err(|err| err.to_string())?;
    config.validate().map_err(|err| err.to_string())?;
    if config.validation.patch_policy != PatchPolicy::Strict {
        return Err("patch_policy should parse as strict".to_string());
    }
    if config.rate_limit.settings().max_requests != 10 {
        return Err("settings() should carry max_requests".to_string());
    }
    if config.rate_limit.settings().window_ms != 300_000 {
        return Err("settings() should carry window_ms".to_string());
    }
    Ok(())
}
