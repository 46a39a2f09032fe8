//! Configuration types for manifest-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Telegram bot settings (credentials, owner, delivery policy)
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BotConfig {
    /// Bot API token issued by @BotFather
    #[serde(default)]
    pub token: String,

    /// Telegram user id of the only account allowed to use the bot
    #[serde(default)]
    pub owner_id: u64,

    /// Which chat receives the produced videos
    #[serde(default)]
    pub delivery_target: DeliveryTarget,

    /// Custom Bot API server (e.g. a local `telegram-bot-api` instance with
    /// larger upload limits). Uses the public API when unset.
    #[serde(default)]
    pub api_url: Option<Url>,
}

/// Recipient of produced videos
///
/// Progress and failure texts always go to the chat that submitted the list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryTarget {
    /// The configured owner's private chat (default)
    #[default]
    Owner,
    /// The chat the URL list was sent from
    Sender,
}

/// External transcoder settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TranscodeConfig {
    /// Path to ffmpeg executable (auto-detected if None)
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    /// Whether to search PATH for ffmpeg if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,

    /// Video encoder passed to `-c:v` (default: "libx264")
    #[serde(default = "default_video_codec")]
    pub video_codec: String,

    /// Audio encoder passed to `-c:a` (default: "aac")
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Encoder speed preset passed to `-preset` (default: "veryfast")
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Per-item transcode timeout in seconds (None = wait indefinitely)
    #[serde(default, with = "optional_duration_serde")]
    pub timeout: Option<Duration>,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            search_path: true,
            video_codec: default_video_codec(),
            audio_codec: default_audio_codec(),
            preset: default_preset(),
            timeout: None,
        }
    }
}

/// Video delivery settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Mark uploaded videos as streamable (default: true)
    #[serde(default = "default_true")]
    pub supports_streaming: bool,

    /// Per-item upload timeout in seconds (None = wait indefinitely)
    #[serde(default, with = "optional_duration_serde")]
    pub timeout: Option<Duration>,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            supports_streaming: true,
            timeout: None,
        }
    }
}

/// Per-batch scratch directory settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Directory under which batch workspaces are created (system temp dir if None)
    #[serde(default)]
    pub parent_dir: Option<PathBuf>,

    /// Name prefix of each batch workspace (default: "manifest-dl-")
    #[serde(default = "default_workspace_prefix")]
    pub prefix: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            parent_dir: None,
            prefix: default_workspace_prefix(),
        }
    }
}

/// Main configuration for manifest-dl
///
/// Built once at startup and shared read-only (behind an `Arc`) by the bot
/// front-end and the batch pipeline.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Telegram bot settings
    #[serde(default)]
    pub bot: BotConfig,

    /// Transcoder settings
    #[serde(default)]
    pub transcode: TranscodeConfig,

    /// Video delivery settings
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Workspace settings
    #[serde(default)]
    pub workspace: WorkspaceConfig,
}

impl Config {
    /// Load configuration from an optional JSON file, then apply environment overrides
    ///
    /// Recognized variables: `BOT_TOKEN`, `OWNER_ID`, `FFMPEG_PATH`, `WORKSPACE_DIR`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Read a JSON configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config file '{}': {}", path.display(), e),
            ))
        })?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Apply overrides from a key lookup (normally the process environment)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("BOT_TOKEN") {
            self.bot.token = token;
        }
        if let Some(owner) = lookup("OWNER_ID") {
            self.bot.owner_id = owner.trim().parse().map_err(|_| {
                Error::config("bot.owner_id", format!("OWNER_ID is not a user id: {owner}"))
            })?;
        }
        if let Some(path) = lookup("FFMPEG_PATH") {
            self.transcode.ffmpeg_path = Some(PathBuf::from(path));
        }
        if let Some(dir) = lookup("WORKSPACE_DIR") {
            self.workspace.parent_dir = Some(PathBuf::from(dir));
        }
        Ok(())
    }

    /// Check that the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.bot.token.trim().is_empty() {
            return Err(Error::config("bot.token", "bot token must not be empty"));
        }
        if self.bot.owner_id == 0 {
            return Err(Error::config("bot.owner_id", "owner id must be set"));
        }
        for (key, value) in [
            ("transcode.video_codec", &self.transcode.video_codec),
            ("transcode.audio_codec", &self.transcode.audio_codec),
            ("transcode.preset", &self.transcode.preset),
        ] {
            if value.trim().is_empty() {
                return Err(Error::config(key, format!("{key} must not be empty")));
            }
        }
        if self.transcode.timeout.is_some_and(|t| t.is_zero()) {
            return Err(Error::config("transcode.timeout", "timeout must be positive"));
        }
        if self.delivery.timeout.is_some_and(|t| t.is_zero()) {
            return Err(Error::config("delivery.timeout", "timeout must be positive"));
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_video_codec() -> String {
    "libx264".to_string()
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

fn default_preset() -> String {
    "veryfast".to_string()
}

fn default_workspace_prefix() -> String {
    "manifest-dl-".to_string()
}

// Optional Duration serialization helper (whole seconds)
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.bot.token = "123456:ABC".into();
        config.bot.owner_id = 7833842279;
        config
    }

    #[test]
    fn test_defaults_match_reference_ffmpeg_invocation() {
        let config = Config::default();
        assert_eq!(config.transcode.video_codec, "libx264");
        assert_eq!(config.transcode.audio_codec, "aac");
        assert_eq!(config.transcode.preset, "veryfast");
        assert!(config.transcode.search_path);
        assert!(config.transcode.timeout.is_none());
        assert!(config.delivery.supports_streaming);
        assert_eq!(config.bot.delivery_target, DeliveryTarget::Owner);
        assert_eq!(config.workspace.prefix, "manifest-dl-");
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.transcode.preset, "veryfast");
        assert!(config.bot.token.is_empty());
    }

    #[test]
    fn test_json_round_trip_of_timeouts() {
        let json = r#"{
            "bot": { "token": "t", "owner_id": 42, "delivery_target": "sender" },
            "transcode": { "timeout": 900, "preset": "ultrafast" },
            "delivery": { "timeout": 120 }
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.bot.delivery_target, DeliveryTarget::Sender);
        assert_eq!(config.transcode.timeout, Some(Duration::from_secs(900)));
        assert_eq!(config.transcode.preset, "ultrafast");
        assert_eq!(config.transcode.video_codec, "libx264");
        assert_eq!(config.delivery.timeout, Some(Duration::from_secs(120)));

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["transcode"]["timeout"], 900);
        assert_eq!(value["delivery"]["timeout"], 120);
    }

    #[test]
    fn test_api_url_parses() {
        let json = r#"{ "bot": { "api_url": "http://localhost:8081/" } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(
            config.bot.api_url.unwrap().as_str(),
            "http://localhost:8081/"
        );
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let vars: HashMap<&str, &str> = [
            ("BOT_TOKEN", "999:XYZ"),
            ("OWNER_ID", " 12345 "),
            ("FFMPEG_PATH", "/opt/ffmpeg/bin/ffmpeg"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.bot.token, "999:XYZ");
        assert_eq!(config.bot.owner_id, 12345);
        assert_eq!(
            config.transcode.ffmpeg_path,
            Some(PathBuf::from("/opt/ffmpeg/bin/ffmpeg"))
        );
        assert!(config.workspace.parent_dir.is_none());
    }

    #[test]
    fn test_invalid_owner_override_is_config_error() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(|key| (key == "OWNER_ID").then(|| "not-a-number".to_string()))
            .unwrap_err();
        assert_eq!(err.error_code(), "config_error");
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_credentials() {
        let mut config = valid_config();
        config.bot.token = "  ".into();
        match config.validate().unwrap_err() {
            Error::Config { key, .. } => assert_eq!(key.as_deref(), Some("bot.token")),
            other => panic!("unexpected error: {other:?}"),
        }

        let mut config = valid_config();
        config.bot.owner_id = 0;
        match config.validate().unwrap_err() {
            Error::Config { key, .. } => assert_eq!(key.as_deref(), Some("bot.owner_id")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_empty_encoder_settings_and_zero_timeouts() {
        let mut config = valid_config();
        config.transcode.preset = String::new();
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.transcode.timeout = Some(Duration::ZERO);
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.delivery.timeout = Some(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_reports_missing_file() {
        let err = Config::from_file(Path::new("/nonexistent/manifest-dl.json")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("/nonexistent/manifest-dl.json"));
    }
}
