//! Session configuration.

use nuvie_world::LightingStyle;

use crate::error::ConfigError;

/// Whether walls hide what is behind them.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum XRayMode {
    #[default]
    Off,
    On,
    /// Enabled through the cheat menu; hides roofs as well.
    Cheat,
}

/// How far the player may reach when selecting targets.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InterfaceType {
    /// Original rules: adjacent objects only, distance caps apply.
    #[default]
    Normal,
    /// Anything on screen that is reachable.
    Fullscreen,
    /// Anything on screen, ignoring blocking.
    IgnoreBlock,
}

/// Settings read by the map window, the renderer and the action code.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    pub enable_blacking: bool,
    pub x_ray: XRayMode,
    pub roof_mode: bool,
    pub lighting: LightingStyle,
    /// Ambient floor applied only when cheats are enabled.
    pub min_brightness: u8,
    pub cheats_enabled: bool,
    pub interface: InterfaceType,
    /// Legacy fixed 11×11 window with border chrome.
    pub original_style: bool,
    /// Moving the cursor in a direction prompt selects that direction.
    pub direction_selects_target: bool,
    pub show_grid: bool,
    /// Light-emitting tiles and objects draw their own globes.
    pub map_tile_lighting: bool,
    pub win_width: i32,
    pub win_height: i32,
    pub center_xoff: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enable_blacking: true,
            x_ray: XRayMode::Off,
            roof_mode: false,
            lighting: LightingStyle::Original,
            min_brightness: 0,
            cheats_enabled: false,
            interface: InterfaceType::Normal,
            original_style: false,
            direction_selects_target: true,
            show_grid: false,
            map_tile_lighting: true,
            win_width: 11,
            win_height: 11,
            center_xoff: 0,
        }
    }
}

impl Config {
    /// The ambient floor actually in effect.
    pub fn effective_min_brightness(&self) -> u8 {
        if self.cheats_enabled { self.min_brightness } else { 0 }
    }

    pub fn xray_enabled(&self) -> bool {
        self.x_ray != XRayMode::Off
    }

    /// Apply one setting by its configuration path.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        match key {
            "config/cheats/enabled" => self.cheats_enabled = parse_bool(value).ok_or_else(invalid)?,
            "config/cheats/min_brightness" => {
                self.min_brightness = value.trim().parse().map_err(|_| invalid())?;
            }
            "config/general/lighting" => {
                self.lighting = match value.trim() {
                    "none" => LightingStyle::None,
                    "original" => LightingStyle::Original,
                    "smooth" => LightingStyle::Smooth,
                    _ => return Err(invalid()),
                };
            }
            "config/general/enable_blacking" => {
                self.enable_blacking = parse_bool(value).ok_or_else(invalid)?;
            }
            "config/general/show_roof" => self.roof_mode = parse_bool(value).ok_or_else(invalid)?,
            "config/input/direction_selects_target" => {
                self.direction_selects_target = parse_bool(value).ok_or_else(invalid)?;
            }
            "config/input/interface" => {
                self.interface = match value.trim() {
                    "normal" => InterfaceType::Normal,
                    "fullscreen" => InterfaceType::Fullscreen,
                    "ignore_block" => InterfaceType::IgnoreBlock,
                    _ => return Err(invalid()),
                };
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" | "1" | "on" => Some(true),
        "no" | "false" | "0" | "off" => Some(false),
        _ => None,
    }
}
