//! Loader for the gallery configuration with YAML + environment overlays.
//!
//! The trusted-host allow-list lives here and is injected into the extraction
//! pipeline; nothing downstream hardcodes hostnames. Environment variables
//! prefixed `LIGHTBOX_` override file values, and `${VAR}` placeholders inside
//! string values are expanded before the typed config is materialised.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

const MAX_ENV_EXPANSION_DEPTH: usize = 8;

/// Top-level configuration consumed by the binary and the mapping service.
#[derive(Debug, Clone, Deserialize)]
pub struct GalleryConfig {
    /// Hostnames a media URL may resolve to. Matching is exact or on a dot
    /// boundary (`video.twimg.com` matches `twimg.com`), never substring.
    #[serde(default = "default_trusted_hosts")]
    pub trusted_hosts: Vec<String>,
    #[serde(default)]
    pub fetch: FetchConfig,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            trusted_hosts: default_trusted_hosts(),
            fetch: FetchConfig::default(),
        }
    }
}

/// Settings for the tweet-detail fetch collaborator.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_api_base")]
    pub base_url: String,
    /// Bearer token for the GraphQL endpoint; optional because the offline
    /// payload path never talks to the network.
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base(),
            auth_token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Canonical media CDN hosts plus the platform's own web hosts.
pub fn default_trusted_hosts() -> Vec<String> {
    ["twimg.com", "x.com", "twitter.com"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn default_api_base() -> String {
    "https://x.com/i/api".into()
}

fn default_timeout_secs() -> u64 {
    15
}

/// Recursively expand `${VAR}` placeholders in string leaves.
///
/// Expansion is re-applied until it reaches a fixed point or the depth cap,
/// so an env value may itself reference another variable; cycles terminate
/// at the cap with the placeholder left in place.
fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if !s.contains('$') {
                return;
            }
            let mut cur = std::mem::take(s);
            for _ in 0..MAX_ENV_EXPANSION_DEPTH {
                let expanded = match shellexpand::env(&cur) {
                    Ok(cow) => cow.into_owned(),
                    Err(_) => cur.clone(),
                };
                if expanded == cur {
                    break;
                }
                cur = expanded;
            }
            *s = cur;
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct GalleryConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for GalleryConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl GalleryConfigLoader {
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a config file; the `config` crate infers the format by suffix.
    /// The file is optional so headless runs can rely purely on defaults.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet (tests and CLI overrides).
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Merge all sources, expand `${VAR}` placeholders, and materialise the
    /// strongly typed [`GalleryConfig`].
    pub fn load(self) -> Result<GalleryConfig, ConfigError> {
        // `LIGHTBOX_`-prefixed env vars merge last so they beat every file
        // source; `__` separates nesting levels (`LIGHTBOX_FETCH__TIMEOUT_SECS`).
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("LIGHTBOX")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}
