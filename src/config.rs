//! Gateway configuration
//!
//! Scalar options come from `GATEWAY_*` environment variables with
//! defaults; the target set, route rules and degraded payloads come
//! from a JSON file referenced by `GATEWAY_TARGETS_PATH`.

use crate::domain::entities::{HealthPolicy, Target};
use crate::domain::services::{DegradationCatalog, DegradationError, RouteRule, RouteTable};
use crate::domain::value_objects::Capability;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub targets_path: String,
    pub health_check_interval_secs: u64,
    pub failure_threshold: u32,
    pub proxy_timeout_secs: u64,
    pub probe_timeout_secs: u64,
    pub max_stale_secs: u64,
    pub cache_sweep_interval_secs: u64,
    pub degraded_latency_ms: u64,
    pub drain_timeout_secs: u64,
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            targets_path: "targets.json".to_string(),
            health_check_interval_secs: 30,
            failure_threshold: 2,
            proxy_timeout_secs: 5,
            probe_timeout_secs: 3,
            max_stale_secs: 86400,
            cache_sweep_interval_secs: 600,
            degraded_latency_ms: 1000,
            drain_timeout_secs: 30,
            debug: false,
        }
    }
}

impl Config {
    pub fn health_policy(&self) -> HealthPolicy {
        HealthPolicy {
            failure_threshold: self.failure_threshold,
            degraded_latency: Duration::from_millis(self.degraded_latency_ms),
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

pub fn load_config() -> anyhow::Result<Config> {
    let defaults = Config::default();

    Ok(Config {
        listen_addr: std::env::var("GATEWAY_LISTEN_ADDR").unwrap_or(defaults.listen_addr),
        targets_path: std::env::var("GATEWAY_TARGETS_PATH").unwrap_or(defaults.targets_path),
        health_check_interval_secs: env_or(
            "GATEWAY_HEALTH_CHECK_INTERVAL_SECS",
            defaults.health_check_interval_secs,
        ),
        failure_threshold: env_or("GATEWAY_FAILURE_THRESHOLD", defaults.failure_threshold),
        proxy_timeout_secs: env_or("GATEWAY_PROXY_TIMEOUT_SECS", defaults.proxy_timeout_secs),
        probe_timeout_secs: env_or("GATEWAY_PROBE_TIMEOUT_SECS", defaults.probe_timeout_secs),
        max_stale_secs: env_or("GATEWAY_MAX_STALE_SECS", defaults.max_stale_secs),
        cache_sweep_interval_secs: env_or(
            "GATEWAY_CACHE_SWEEP_INTERVAL_SECS",
            defaults.cache_sweep_interval_secs,
        ),
        degraded_latency_ms: env_or("GATEWAY_DEGRADED_LATENCY_MS", defaults.degraded_latency_ms),
        drain_timeout_secs: env_or("GATEWAY_DRAIN_TIMEOUT_SECS", defaults.drain_timeout_secs),
        debug: std::env::var("DEBUG").is_ok(),
    })
}

/// Problems with the targets file. All of these fail process start.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read targets file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse targets file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("targets file defines no targets")]
    NoTargets,
    #[error("duplicate target id {0:?}")]
    DuplicateTargetId(String),
    #[error("target {0:?} has no capabilities")]
    NoCapabilities(String),
    #[error(transparent)]
    Degradation(#[from] DegradationError),
}

#[derive(Debug, Deserialize)]
pub struct TargetSpec {
    pub id: String,
    pub endpoint_base: String,
    pub priority: u32,
    pub capabilities: Vec<String>,
    #[serde(default = "default_probe_path")]
    pub probe_path: String,
}

fn default_probe_path() -> String {
    "/health".to_string()
}

#[derive(Debug, Deserialize)]
pub struct RouteSpec {
    pub prefix: String,
    pub capability: String,
    #[serde(default)]
    pub cacheable: bool,
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default)]
    pub vary_headers: Vec<String>,
}

fn default_ttl_secs() -> u64 {
    60
}

#[derive(Debug, Deserialize)]
pub struct DegradedSpec {
    pub prefix: String,
    #[serde(default = "default_degraded_status")]
    pub status: u16,
    pub body: serde_json::Value,
}

fn default_degraded_status() -> u16 {
    200
}

/// The static JSON file describing targets, routes and degraded payloads.
#[derive(Debug, Deserialize)]
pub struct TargetsFile {
    pub targets: Vec<TargetSpec>,
    #[serde(default)]
    pub routes: Vec<RouteSpec>,
    #[serde(default)]
    pub degraded: Vec<DegradedSpec>,
}

impl TargetsFile {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        let file: TargetsFile =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_string(),
                source,
            })?;
        file.validate()?;
        Ok(file)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.targets.is_empty() {
            return Err(ConfigError::NoTargets);
        }

        let mut seen = HashSet::new();
        for spec in &self.targets {
            if !seen.insert(spec.id.as_str()) {
                return Err(ConfigError::DuplicateTargetId(spec.id.clone()));
            }
            if spec.capabilities.is_empty() {
                return Err(ConfigError::NoCapabilities(spec.id.clone()));
            }
        }
        Ok(())
    }

    pub fn targets(&self) -> Vec<Target> {
        self.targets
            .iter()
            .map(|spec| {
                Target::new(
                    spec.id.clone(),
                    spec.endpoint_base.clone(),
                    spec.priority,
                    spec.capabilities.iter().map(Capability::new).collect(),
                )
                .with_probe_path(spec.probe_path.clone())
            })
            .collect()
    }

    pub fn route_table(&self) -> RouteTable {
        let rules = self
            .routes
            .iter()
            .map(|spec| {
                let mut rule = RouteRule::new(spec.prefix.clone(), Capability::new(&spec.capability));
                if spec.cacheable {
                    rule = rule.cacheable(Duration::from_secs(spec.ttl_secs));
                }
                rule.vary_on(spec.vary_headers.clone())
            })
            .collect();
        RouteTable::new(rules)
    }

    pub fn degradation_catalog(&self) -> Result<DegradationCatalog, ConfigError> {
        let rules = self
            .degraded
            .iter()
            .map(|spec| (spec.prefix.clone(), spec.status, spec.body.clone()))
            .collect();
        let catalog = DegradationCatalog::new(rules)?;
        catalog.validate()?;
        Ok(catalog)
    }
}
