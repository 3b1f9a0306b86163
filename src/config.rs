use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use std::fs;

/// Server configuration persisted as TOML.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Address the listener binds to.
    pub address: String,
    pub port: u16,
    /// Seats at the table; admission stops once they are filled.
    pub max_players: usize,
    /// Rounds played before the game ends.
    pub rounds: u32,
    #[serde(default)]
    pub pacing: Pacing,
}

/// Delays that pace broadcasts so clients can render them as they arrive.
/// Tests zero these out.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct Pacing {
    pub deal_ms: u64,
    pub summary_ms: u64,
    pub resolve_ms: u64,
    pub round_ms: u64,
}

impl Default for Pacing {
    fn default() -> Self {
        Pacing {
            deal_ms: 1000,
            summary_ms: 500,
            resolve_ms: 1000,
            round_ms: 2000,
        }
    }
}

impl Pacing {
    pub fn deal(&self) -> Duration {
        Duration::from_millis(self.deal_ms)
    }

    pub fn summary(&self) -> Duration {
        Duration::from_millis(self.summary_ms)
    }

    pub fn resolve(&self) -> Duration {
        Duration::from_millis(self.resolve_ms)
    }

    pub fn round(&self) -> Duration {
        Duration::from_millis(self.round_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            address: "127.0.0.1".to_string(),
            port: 3000,
            max_players: 2,
            rounds: 5,
            pacing: Pacing::default(),
        }
    }
}

/// CLI overrides applied on top of the config file.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub port: Option<u16>,
    pub max_players: Option<usize>,
    pub rounds: Option<u32>,
}

impl Config {
    /// Load configuration from `path`. If the file does not exist, create it
    /// with defaults and return those.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let s = fs::read_to_string(path)
                .with_context(|| format!("reading config file '{}'", path.display()))?;
            let cfg: Config = toml::from_str(&s)
                .with_context(|| format!("parsing TOML config '{}'", path.display()))?;
            Ok(cfg)
        } else {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("creating config directory '{}'", parent.display())
                    })?;
                }
            }

            let cfg = Config::default();
            let toml_text =
                toml::to_string_pretty(&cfg).context("serializing default config to TOML")?;
            fs::write(path, toml_text)
                .with_context(|| format!("writing default config to '{}'", path.display()))?;
            Ok(cfg)
        }
    }

    /// Load (or create) config, then apply CLI overrides on top.
    pub fn load_or_create_with_overrides(
        path: &Path,
        address: Option<String>,
        overrides: Overrides,
    ) -> Result<Self> {
        let mut cfg = Self::load_or_create(path)?;
        if let Some(a) = address {
            cfg.address = a;
        }
        if let Some(p) = overrides.port {
            cfg.port = p;
        }
        if let Some(m) = overrides.max_players {
            cfg.max_players = m;
        }
        if let Some(r) = overrides.rounds {
            cfg.rounds = r;
        }
        Ok(cfg)
    }

    /// Startup validation. Runs before any socket is bound; violations
    /// abort the whole process.
    pub fn validate(&self) -> Result<()> {
        if self.max_players < 1 || self.max_players > 4 {
            bail!("max_players must be between 1 and 4, got {}", self.max_players);
        }
        if self.rounds < 1 {
            bail!("rounds must be at least 1, got {}", self.rounds);
        }
        Ok(())
    }
}
