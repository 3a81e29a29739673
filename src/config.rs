use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::paths;
use crate::ruler::RulerSession;
use crate::units::LengthUnit;

const CONFIG_FILE: &str = "config.toml";

#[derive(Resource, Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub ruler: RulerConfig,
    #[serde(default)]
    pub messaging: MessagingConfig,
    #[serde(default)]
    pub scene: SceneConfig,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct RulerConfig {
    pub default_unit: LengthUnit,
    /// Marker sphere radius in meters
    pub marker_radius: f32,
    pub label_font_size: f32,
}

impl Default for RulerConfig {
    fn default() -> Self {
        Self {
            default_unit: LengthUnit::Inches,
            marker_radius: 0.01,
            label_font_size: 16.0,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct MessagingConfig {
    pub enabled: bool,
    /// Empty means measurements are only logged locally.
    pub endpoint_url: String,
    pub channel: String,
    pub event_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    pub timeout_ms: u64,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint_url: String::new(),
            channel: "private-channel".to_string(),
            event_name: "client-new-measurement".to_string(),
            auth_token: None,
            timeout_ms: 5000,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    /// Half the side length of the detected floor plane, meters
    pub plane_half_extent: f32,
    pub camera_distance: f32,
    pub camera_pitch_deg: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            plane_half_extent: 2.0,
            camera_distance: 3.0,
            camera_pitch_deg: 40.0,
        }
    }
}

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(load_config())
            .add_systems(Update, persist_selected_unit);
    }
}

fn config_path() -> PathBuf {
    paths::config_dir().join(CONFIG_FILE)
}

pub fn parse_config(contents: &str) -> Result<AppConfig, toml::de::Error> {
    toml::from_str(contents)
}

pub fn load_config() -> AppConfig {
    let path = config_path();
    if path.exists() {
        match fs::read_to_string(&path) {
            Ok(contents) => match parse_config(&contents) {
                Ok(config) => {
                    info!("Loaded config from {:?}", path);
                    return config;
                }
                Err(e) => {
                    warn!("Failed to parse config: {}, using defaults", e);
                    return AppConfig::default();
                }
            },
            Err(e) => {
                warn!("Failed to read config: {}, using defaults", e);
                return AppConfig::default();
            }
        }
    }

    let config = AppConfig::default();
    save_config(&config);
    config
}

pub fn save_config(config: &AppConfig) {
    let path = config_path();
    if let Some(dir) = path.parent() {
        paths::ensure_dir(dir);
    }
    match toml::to_string_pretty(config) {
        Ok(contents) => {
            if let Err(e) = fs::write(&path, contents) {
                error!("Failed to write config: {}", e);
            } else {
                info!("Saved config to {:?}", path);
            }
        }
        Err(e) => {
            error!("Failed to serialize config: {}", e);
        }
    }
}

/// Remember the last selected unit across launches.
fn persist_selected_unit(session: Res<RulerSession>, mut config: ResMut<AppConfig>) {
    if !session.is_changed() || session.selected_unit == config.ruler.default_unit {
        return;
    }
    config.ruler.default_unit = session.selected_unit;
    save_config(&config);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_private_channel_and_measurement_event() {
        let config = AppConfig::default();
        assert_eq!(config.messaging.channel, "private-channel");
        assert_eq!(config.messaging.event_name, "client-new-measurement");
        assert_eq!(config.ruler.default_unit, LengthUnit::Inches);
    }

    #[test]
    fn default_config_round_trips() {
        let config = AppConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(parse_config(&text).unwrap(), config);
    }

    #[test]
    fn partial_file_fills_missing_sections() {
        let config = parse_config(
            r#"
            [ruler]
            default_unit = "centimeters"

            [messaging]
            endpoint_url = "http://localhost:9000/events"
            auth_token = "secret"
            "#,
        )
        .unwrap();

        assert_eq!(config.ruler.default_unit, LengthUnit::Centimeters);
        assert_eq!(config.ruler.marker_radius, RulerConfig::default().marker_radius);
        assert_eq!(config.messaging.endpoint_url, "http://localhost:9000/events");
        assert_eq!(config.messaging.auth_token.as_deref(), Some("secret"));
        assert_eq!(config.messaging.channel, "private-channel");
        assert_eq!(config.scene, SceneConfig::default());
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(parse_config("").unwrap(), AppConfig::default());
    }

    #[test]
    fn unknown_unit_is_rejected() {
        assert!(parse_config("[ruler]\ndefault_unit = \"feet\"\n").is_err());
    }
}
