//! Configuration management for Squawker.
//!
//! Settings are layered: per-channel overrides win over per-network
//! overrides, which win over the global defaults.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use crate::error::{Result, SquawkerError};
use crate::throttle::DEFAULT_CHANTYPES;

/// When the responder records a cooldown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordPolicy {
    /// Only after a reply was sent
    #[default]
    OnReply,
    /// After every channel message, so the reply waits for a quiet channel
    Always,
}

/// Main configuration for the Squawker responder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SquawkerConfig {
    /// Global settings
    #[serde(default)]
    pub defaults: ResponderSettings,

    /// Refuse (rather than throttle) replies to private targets.
    ///
    /// Only callers that hand private targets to the throttle see this. The
    /// responder answers channels only, so for it the flag changes nothing.
    #[serde(default)]
    pub limit_private: bool,

    /// Per-network configuration keyed by network name
    #[serde(default)]
    pub networks: HashMap<String, NetworkConfig>,
}

/// Fully resolved settings for one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponderSettings {
    /// Whether the responder answers at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// The canned reply
    #[serde(default = "default_text")]
    pub text: String,

    /// Cooldown in seconds
    #[serde(default = "default_throttle")]
    pub throttle: f64,

    /// Regular expression of nicks never answered
    #[serde(default)]
    pub ignored_nicks: Option<String>,

    /// When to record a cooldown
    #[serde(default)]
    pub record: RecordPolicy,
}

impl Default for ResponderSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            text: default_text(),
            throttle: default_throttle(),
            ignored_nicks: None,
            record: RecordPolicy::default(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_text() -> String {
    "squawk!".to_string()
}

fn default_throttle() -> f64 {
    600.0
}

fn default_chantypes() -> String {
    DEFAULT_CHANTYPES.to_string()
}

/// Optional values layered over [`ResponderSettings`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsOverride {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub throttle: Option<f64>,
    #[serde(default)]
    pub ignored_nicks: Option<String>,
    #[serde(default)]
    pub record: Option<RecordPolicy>,
}

impl SettingsOverride {
    fn apply(&self, settings: &mut ResponderSettings) {
        if let Some(enabled) = self.enabled {
            settings.enabled = enabled;
        }
        if let Some(ref text) = self.text {
            settings.text = text.clone();
        }
        if let Some(throttle) = self.throttle {
            settings.throttle = throttle;
        }
        if let Some(ref pattern) = self.ignored_nicks {
            settings.ignored_nicks = Some(pattern.clone());
        }
        if let Some(record) = self.record {
            settings.record = record;
        }
    }
}

/// Configuration for a single network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Leading characters that mark a target as a channel
    #[serde(default = "default_chantypes")]
    pub chantypes: String,

    /// Network-wide overrides
    #[serde(flatten)]
    pub overrides: SettingsOverride,

    /// Channel overrides keyed by channel name
    #[serde(default)]
    pub channels: HashMap<String, SettingsOverride>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            chantypes: default_chantypes(),
            overrides: SettingsOverride::default(),
            channels: HashMap::new(),
        }
    }
}

impl NetworkConfig {
    /// Find the overrides for a channel, ignoring ASCII case.
    pub fn channel(&self, channel: &str) -> Option<&SettingsOverride> {
        self.channels
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(channel))
            .map(|(_, overrides)| overrides)
    }
}

impl SquawkerConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading squawker configuration");

        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load and validate configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: SquawkerConfig = serde_yaml::from_str(yaml)
            .map_err(|e| SquawkerError::Config(format!("Failed to parse squawker config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check throttle values and compile every nick pattern.
    pub fn validate(&self) -> Result<()> {
        for (network, net) in &self.networks {
            if net.chantypes.is_empty() {
                return Err(SquawkerError::Config(format!(
                    "network {} has empty chantypes",
                    network
                )));
            }
            let mut seen: HashMap<String, &str> = HashMap::new();
            for name in net.channels.keys() {
                if let Some(other) = seen.insert(name.to_ascii_lowercase(), name) {
                    return Err(SquawkerError::Config(format!(
                        "network {} configures channel {} twice ({} and {})",
                        network,
                        name.to_ascii_lowercase(),
                        other,
                        name
                    )));
                }
            }
        }
        check_throttle(Some(self.defaults.throttle))?;
        for layer in self.layers() {
            check_throttle(layer.throttle)?;
        }
        self.compile_patterns().map(|_| ())
    }

    /// Compile every configured `ignored_nicks` pattern, keyed by its source.
    pub fn compile_patterns(&self) -> Result<HashMap<String, Regex>> {
        let mut compiled = HashMap::new();
        let sources = std::iter::once(&self.defaults.ignored_nicks)
            .chain(self.layers().map(|layer| &layer.ignored_nicks));
        for pattern in sources.flatten() {
            if !compiled.contains_key(pattern) {
                compiled.insert(pattern.clone(), Regex::new(pattern)?);
            }
        }
        Ok(compiled)
    }

    /// Get the configuration for a specific network.
    pub fn network(&self, network: &str) -> Option<&NetworkConfig> {
        self.networks.get(network)
    }

    /// Channel prefixes in effect on a network.
    pub fn chantypes(&self, network: &str) -> &str {
        self.network(network)
            .map(|net| net.chantypes.as_str())
            .unwrap_or(DEFAULT_CHANTYPES)
    }

    /// Resolve the settings for a channel on a network.
    pub fn resolve(&self, network: &str, channel: &str) -> ResponderSettings {
        let mut settings = self.defaults.clone();
        if let Some(net) = self.network(network) {
            net.overrides.apply(&mut settings);
            if let Some(chan) = net.channel(channel) {
                chan.apply(&mut settings);
            }
        }
        settings
    }

    fn layers(&self) -> impl Iterator<Item = &SettingsOverride> {
        self.networks
            .values()
            .flat_map(|net| std::iter::once(&net.overrides).chain(net.channels.values()))
    }
}

fn check_throttle(throttle: Option<f64>) -> Result<()> {
    match throttle {
        Some(secs) if !secs.is_finite() => Err(SquawkerError::Config(format!(
            "throttle must be a finite number of seconds, got {}",
            secs
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYERED: &str = r##"
defaults:
  text: "squawk!"
  throttle: 600
networks:
  libera:
    enabled: false
    throttle: 120
    ignored_nicks: "^(ChanServ|NickServ)$"
    channels:
      "#Debian":
        enabled: true
        text: "hello"
      "#quiet":
        record: always
  oftc:
    chantypes: "#"
"##;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = SquawkerConfig::from_yaml("{}").unwrap();
        let settings = config.resolve("libera", "#chan");

        assert_eq!(settings, ResponderSettings::default());
        assert!(settings.enabled);
        assert_eq!(settings.text, "squawk!");
        assert_eq!(settings.throttle, 600.0);
        assert_eq!(settings.record, RecordPolicy::OnReply);
        assert!(!config.limit_private);
    }

    #[test]
    fn test_network_overrides_defaults() {
        let config = SquawkerConfig::from_yaml(LAYERED).unwrap();
        let settings = config.resolve("libera", "#other");

        assert!(!settings.enabled);
        assert_eq!(settings.throttle, 120.0);
        assert_eq!(settings.text, "squawk!");
        assert_eq!(settings.ignored_nicks.as_deref(), Some("^(ChanServ|NickServ)$"));
    }

    #[test]
    fn test_channel_overrides_network() {
        let config = SquawkerConfig::from_yaml(LAYERED).unwrap();
        let settings = config.resolve("libera", "#debian");

        assert!(settings.enabled);
        assert_eq!(settings.text, "hello");
        assert_eq!(settings.throttle, 120.0);

        let quiet = config.resolve("libera", "#quiet");
        assert_eq!(quiet.record, RecordPolicy::Always);
    }

    #[test]
    fn test_channel_override_only_applies_on_its_network() {
        let config = SquawkerConfig::from_yaml(LAYERED).unwrap();
        let settings = config.resolve("oftc", "#debian");

        assert_eq!(settings.text, "squawk!");
        assert!(settings.enabled);
    }

    #[test]
    fn test_chantypes() {
        let config = SquawkerConfig::from_yaml(LAYERED).unwrap();

        assert_eq!(config.chantypes("oftc"), "#");
        assert_eq!(config.chantypes("libera"), DEFAULT_CHANTYPES);
        assert_eq!(config.chantypes("unknown"), DEFAULT_CHANTYPES);
    }

    #[test]
    fn test_compile_patterns() {
        let config = SquawkerConfig::from_yaml(LAYERED).unwrap();
        let patterns = config.compile_patterns().unwrap();

        assert_eq!(patterns.len(), 1);
        assert!(patterns["^(ChanServ|NickServ)$"].is_match("ChanServ"));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let yaml = r##"
defaults:
  ignored_nicks: "([unclosed"
"##;
        let err = SquawkerConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, SquawkerError::Pattern(_)));
    }

    #[test]
    fn test_invalid_channel_pattern_rejected() {
        let yaml = r##"
networks:
  libera:
    channels:
      "#chan":
        ignored_nicks: "*bot"
"##;
        assert!(matches!(
            SquawkerConfig::from_yaml(yaml),
            Err(SquawkerError::Pattern(_))
        ));
    }

    #[test]
    fn test_non_finite_throttle_rejected() {
        let yaml = r##"
defaults:
  throttle: .inf
"##;
        assert!(matches!(
            SquawkerConfig::from_yaml(yaml),
            Err(SquawkerError::Config(_))
        ));
    }

    #[test]
    fn test_empty_chantypes_rejected() {
        let yaml = r##"
networks:
  libera:
    chantypes: ""
"##;
        assert!(matches!(
            SquawkerConfig::from_yaml(yaml),
            Err(SquawkerError::Config(_))
        ));
    }

    #[test]
    fn test_channels_differing_only_in_case_rejected() {
        let yaml = r##"
networks:
  libera:
    channels:
      "#Chan":
        text: "one"
      "#chan":
        text: "two"
"##;
        let err = SquawkerConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, SquawkerError::Config(ref msg) if msg.contains("twice")));
    }

    #[test]
    fn test_malformed_yaml_rejected() {
        assert!(matches!(
            SquawkerConfig::from_yaml("defaults: [1, 2"),
            Err(SquawkerError::Config(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = SquawkerConfig::from_file("/nonexistent/squawker.yaml").unwrap_err();
        assert!(matches!(err, SquawkerError::Io(_)));
    }
}
