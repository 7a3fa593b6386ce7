use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_source_url")]
    pub url: String,
    /// Optional path for a rendered-text page dump after each fetch.
    /// Empty disables it.
    #[serde(default)]
    pub page_dump: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_file")]
    pub data_file: String,
    #[serde(default = "default_history_file")]
    pub history_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default)]
    pub pushover_user_key: String,
    #[serde(default)]
    pub pushover_api_token: String,
    #[serde(default = "default_enable_stdout")]
    pub enable_stdout: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub url: Option<String>,
    pub top_n: Option<usize>,
    pub interval_minutes: Option<u64>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/benchwatch/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        Ok(parsed)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(url) = overrides.url {
            self.source.url = url;
        }
        if let Some(top_n) = overrides.top_n {
            self.monitor.top_n = top_n;
        }
        if let Some(interval) = overrides.interval_minutes {
            self.monitor.interval_minutes = interval;
        }
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn resolved_data_path(&self) -> PathBuf {
        expand_tilde(&self.storage.data_file)
    }

    pub fn resolved_history_path(&self) -> PathBuf {
        expand_tilde(&self.storage.history_file)
    }

    pub fn resolved_page_dump(&self) -> Option<PathBuf> {
        let trimmed = self.source.page_dump.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(expand_tilde(trimmed))
        }
    }

    pub fn default_template() -> String {
        let template = r#"[source]
url = "https://artificialanalysis.ai/"
page_dump = ""

[monitor]
interval_minutes = 30
top_n = 15

[storage]
data_file = "~/.local/share/benchwatch/benchmark_data.json"
history_file = "~/.local/share/benchwatch/benchmark_history.json"

[notify]
pushover_user_key = ""
pushover_api_token = ""
enable_stdout = true
"#;
        template.to_string()
    }
}

impl NotifyConfig {
    /// Credentials from the config file, falling back to the PUSHOVER_*
    /// environment variables. Absent credentials are allowed (stdout-only
    /// operation); a half-configured pair is a startup error.
    pub fn pushover_credentials(&self) -> Result<Option<(String, String)>> {
        let user = non_empty(&self.pushover_user_key).or_else(|| env_var("PUSHOVER_USER_KEY"));
        let token = non_empty(&self.pushover_api_token).or_else(|| env_var("PUSHOVER_API_TOKEN"));
        resolve_credentials(user, token)
    }
}

fn resolve_credentials(
    user: Option<String>,
    token: Option<String>,
) -> Result<Option<(String, String)>> {
    match (user, token) {
        (Some(user), Some(token)) => Ok(Some((user, token))),
        (None, None) => Ok(None),
        _ => Err(anyhow!(
            "PUSHOVER_USER_KEY and PUSHOVER_API_TOKEN must both be set"
        )),
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|v| non_empty(&v))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_source_url(),
            page_dump: String::new(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_minutes: default_interval_minutes(),
            top_n: default_top_n(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            history_file: default_history_file(),
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            pushover_user_key: String::new(),
            pushover_api_token: String::new(),
            enable_stdout: default_enable_stdout(),
        }
    }
}

fn default_source_url() -> String {
    "https://artificialanalysis.ai/".to_string()
}

fn default_interval_minutes() -> u64 {
    30
}

fn default_top_n() -> usize {
    crate::diff::DEFAULT_TOP_N
}

fn default_data_file() -> String {
    "~/.local/share/benchwatch/benchmark_data.json".to_string()
}

fn default_history_file() -> String {
    "~/.local/share/benchwatch/benchmark_history.json".to_string()
}

fn default_enable_stdout() -> bool {
    true
}
