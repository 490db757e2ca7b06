use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

/// Optional TOML settings consulted by the built-in dashboard definitions.
///
/// Every key has a default, so an absent file and an empty file mean the
/// same thing.
///
/// ```toml
/// refresh = "15s"
/// timezone = "utc"
/// tags = ["staging"]
///
/// [datasources]
/// metrics = "prom-main"
/// logs = "${loki}"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Overrides each dashboard's own auto-refresh interval.
    pub refresh: Option<String>,
    /// Overrides the default `"browser"` timezone.
    pub timezone: Option<String>,
    /// Extra tags appended to every generated dashboard.
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub datasources: Datasources,
}

/// Datasource references handed to panels and variables; either literal uids
/// or `"${variable}"` placeholders.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Datasources {
    #[serde(default = "default_metrics_uid")]
    pub metrics: String,
    #[serde(default = "default_logs_uid")]
    pub logs: String,
}

impl Default for Datasources {
    fn default() -> Self {
        Self {
            metrics: default_metrics_uid(),
            logs: default_logs_uid(),
        }
    }
}

fn default_metrics_uid() -> String {
    "${datasource}".to_string()
}

fn default_logs_uid() -> String {
    "${loki}".to_string()
}

impl Settings {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse settings file {}", path.display()))
    }

    pub fn timezone(&self) -> &str {
        self.timezone.as_deref().unwrap_or("browser")
    }

    /// The configured refresh interval, or the dashboard's own default.
    pub fn refresh_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.refresh.as_deref().unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_an_empty_document() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings.timezone(), "browser");
        assert_eq!(settings.refresh_or("30s"), "30s");
        assert_eq!(settings.datasources.metrics, "${datasource}");
        assert_eq!(settings.datasources.logs, "${loki}");
        assert!(settings.tags.is_empty());
    }

    #[test]
    fn overrides_are_honored() {
        let settings: Settings = toml::from_str(
            r#"
            refresh = "15s"
            timezone = "utc"
            tags = ["staging"]

            [datasources]
            metrics = "prom-main"
            "#,
        )
        .unwrap();
        assert_eq!(settings.refresh_or("30s"), "15s");
        assert_eq!(settings.timezone(), "utc");
        assert_eq!(settings.tags, vec!["staging"]);
        assert_eq!(settings.datasources.metrics, "prom-main");
        assert_eq!(settings.datasources.logs, "${loki}");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<Settings>("refrsh = \"15s\"").is_err());
    }
}
