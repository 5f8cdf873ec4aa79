use serde::Deserialize;
use std::collections::HashMap;

use crate::domain::freshness::DEFAULT_STALE_THRESHOLD_HOURS;
use crate::domain::resource::ResourceKind;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    pub store: StoreSettings,
    #[serde(default)]
    pub freshness: FreshnessSettings,
    #[serde(default)]
    pub domains: Vec<DomainConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreSettings {
    pub base_url: String,
    #[serde(default = "default_live_template")]
    pub live_template: String,
    #[serde(default = "default_archive_template")]
    pub archive_template: String,
    #[serde(default = "default_profile_template")]
    pub profile_template: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FreshnessSettings {
    #[serde(default = "default_stale_hours")]
    pub stale_after_hours: i64,
}

impl Default for FreshnessSettings {
    fn default() -> Self {
        Self {
            stale_after_hours: default_stale_hours(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DomainConfig {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub ranked: Vec<ResourceKind>,
}

impl DomainConfig {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_live_template() -> String {
    "${base}/${domain}/live/${file}.json".to_string()
}

fn default_archive_template() -> String {
    "${base}/${domain}/archive/${year}_${month}_${file}.json".to_string()
}

fn default_profile_template() -> String {
    "${base}/${domain}/profile/${file}.json".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_stale_hours() -> i64 {
    DEFAULT_STALE_THRESHOLD_HOURS
}

/// Load `config/dashboard.*`, then apply `DASHBOARD__SECTION__KEY` environment overrides.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard"))
        .add_source(config::Environment::with_prefix("DASHBOARD").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Replace `${name}` placeholders in a template string
pub fn prepare_template(template: &str, vars: &HashMap<String, String>) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}
