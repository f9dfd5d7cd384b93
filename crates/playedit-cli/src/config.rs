use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use playedit_client::{DEFAULT_TIMEOUT, HttpSettings};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;

pub const DEFAULT_LOG_LEVEL: &str = "warn";
pub const DEFAULT_HANDOFF_TIMEOUT_SECS: u64 = 60;

/// Keys accepted by `config set`.
pub const KEYS: [&str; 6] = [
    "package-name",
    "account",
    "proxy",
    "proxy-insecure",
    "log-level",
    "handoff-timeout",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProfileConfig {
    pub package_name: Option<String>,
    pub account: Option<PathBuf>,
    pub proxy: Option<String>,
    pub proxy_insecure: Option<bool>,
    pub log_level: Option<String>,
    pub handoff_timeout: Option<u64>,
}

impl ProfileConfig {
    /// Sets one value by its `config set` key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "package-name" => self.package_name = Some(value.to_string()),
            "account" => self.account = Some(PathBuf::from(value)),
            "proxy" => self.proxy = Some(value.to_string()),
            "proxy-insecure" => {
                self.proxy_insecure = Some(
                    value
                        .parse()
                        .with_context(|| format!("proxy-insecure must be true or false, got '{value}'"))?,
                )
            }
            "log-level" => self.log_level = Some(value.to_string()),
            "handoff-timeout" => {
                self.handoff_timeout = Some(
                    value
                        .parse()
                        .with_context(|| format!("handoff-timeout must be whole seconds, got '{value}'"))?,
                )
            }
            other => anyhow::bail!("Unknown config key: {other}. Valid keys: {}", KEYS.join(", ")),
        }
        Ok(())
    }
}

pub type ConfigFile = HashMap<String, ProfileConfig>;

/// Zero seconds disables the handoff limit.
pub fn handoff_timeout(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn config_dir() -> Result<PathBuf> {
    let dir = dirs::home_dir()
        .context("Cannot determine home directory")?
        .join(".playedit");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

pub fn load_profile(profile: &str) -> Result<ProfileConfig> {
    load_profile_from(&config_path()?, profile)
}

pub fn save_profile(profile: &str, config: &ProfileConfig) -> Result<()> {
    save_profile_to(&config_path()?, profile, config)
}

fn load_all_from(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        return Ok(ConfigFile::new());
    }
    let content = fs::read_to_string(path)?;
    let cfg: ConfigFile =
        toml::from_str(&content).with_context(|| format!("Invalid config file {}", path.display()))?;
    Ok(cfg)
}

fn load_profile_from(path: &Path, profile: &str) -> Result<ProfileConfig> {
    let mut all = load_all_from(path)?;
    Ok(all.remove(profile).unwrap_or_default())
}

fn save_profile_to(path: &Path, profile: &str, config: &ProfileConfig) -> Result<()> {
    let mut all = load_all_from(path)?;
    all.insert(profile.to_string(), config.clone());
    let content = toml::to_string_pretty(&all)?;
    fs::write(path, content)?;
    Ok(())
}

/// Effective settings of one invocation: flags and env first, then the
/// profile file, then built-in defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub profile: String,
    pub package_name: Option<String>,
    pub account: Option<PathBuf>,
    pub token: Option<String>,
    pub print_token: bool,
    pub http: HttpSettings,
    pub log_level: String,
    /// `None` when the limit is disabled with 0.
    pub handoff_timeout: Option<Duration>,
}

impl Settings {
    pub fn resolve(cli: &Cli, profile: ProfileConfig) -> Self {
        Self {
            profile: cli.profile.clone(),
            package_name: cli.package_name.clone().or(profile.package_name),
            account: cli.account.clone().or(profile.account),
            token: cli.token.clone().filter(|t| !t.is_empty()),
            print_token: cli.print_token,
            http: HttpSettings {
                proxy: cli.proxy.clone().or(profile.proxy),
                proxy_insecure: cli.proxy_insecure || profile.proxy_insecure.unwrap_or(false),
                timeout: DEFAULT_TIMEOUT,
            },
            log_level: cli
                .log_level
                .clone()
                .or(profile.log_level)
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            handoff_timeout: handoff_timeout(
                cli.handoff_timeout
                    .or(profile.handoff_timeout)
                    .unwrap_or(DEFAULT_HANDOFF_TIMEOUT_SECS),
            ),
        }
    }

    pub fn package_name(&self) -> Result<&str> {
        self.package_name.as_deref().context(
            "No package name configured. Use --package-name, set PLAYEDIT_PACKAGE_NAME, or run: playedit config set package-name <name>",
        )
    }
}
