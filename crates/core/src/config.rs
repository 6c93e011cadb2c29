use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::runner::RunnerKind;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    profiled_env_opt(profile, key)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub registry: RegistryConfig,
    pub jobs: JobDefaults,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `INGESTJOB_PROFILE`. When set (e.g. `PROD`), every
    /// key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("INGESTJOB_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            registry: RegistryConfig::from_env_profiled(p),
            jobs: JobDefaults::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  registry:    data_dir={}, pretty_snapshots={}",
            self.registry.data_dir.display(),
            self.registry.pretty_snapshots
        );
        tracing::info!("  jobs:        default_runner={}", self.jobs.default_runner);
    }
}

// ── Registry ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub data_dir: PathBuf,
    /// Indent exported snapshot JSON.
    pub pretty_snapshots: bool,
}

impl RegistryConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            data_dir: PathBuf::from(profiled_env_or(p, "REGISTRY_DATA_DIR", "data/registry")),
            pretty_snapshots: profiled_env_bool(p, "SNAPSHOT_PRETTY", true),
        }
    }
}

// ── Job defaults ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDefaults {
    pub default_runner: RunnerKind,
}

impl JobDefaults {
    fn from_env_profiled(p: &str) -> Self {
        let default_runner = match profiled_env_opt(p, "DEFAULT_RUNNER") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!("Unknown DEFAULT_RUNNER '{}', using DirectRunner", raw);
                RunnerKind::Direct
            }),
            None => RunnerKind::Direct,
        };
        Self { default_runner }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env is process-global; each test uses its own profile prefix.

    #[test]
    fn profiled_key_wins_over_plain_key() {
        std::env::set_var("CFGTESTA_REGISTRY_DATA_DIR", "/tmp/profiled");
        let cfg = Config::for_profile("cfgtesta");
        assert_eq!(cfg.profile, "CFGTESTA");
        assert_eq!(cfg.registry.data_dir, PathBuf::from("/tmp/profiled"));
    }

    #[test]
    fn profiled_data_dir_beats_plain_env() {
        std::env::set_var("CFGTESTD_REGISTRY_DATA_DIR", "/srv/profiled-registry");
        std::env::set_var("REGISTRY_DATA_DIR", "/srv/plain-registry");
        let profiled = Config::for_profile("CFGTESTD");
        let unprofiled = Config::for_profile("CFGTESTE");
        std::env::remove_var("REGISTRY_DATA_DIR");

        assert_eq!(profiled.registry.data_dir, PathBuf::from("/srv/profiled-registry"));
        assert_eq!(unprofiled.registry.data_dir, PathBuf::from("/srv/plain-registry"));
    }

    #[test]
    fn runner_is_parsed_from_env() {
        std::env::set_var("CFGTESTB_DEFAULT_RUNNER", "DataflowRunner");
        std::env::set_var("CFGTESTB_SNAPSHOT_PRETTY", "false");
        let cfg = Config::for_profile("CFGTESTB");
        assert_eq!(cfg.jobs.default_runner, RunnerKind::Dataflow);
        assert!(!cfg.registry.pretty_snapshots);
    }

    #[test]
    fn bad_runner_falls_back_to_direct() {
        std::env::set_var("CFGTESTC_DEFAULT_RUNNER", "flink");
        let cfg = Config::for_profile("CFGTESTC");
        assert_eq!(cfg.jobs.default_runner, RunnerKind::Direct);
    }

    #[test]
    fn empty_profile_label_is_default() {
        let cfg = Config::for_profile("");
        assert_eq!(cfg.profile_label(), "default");
    }
}
