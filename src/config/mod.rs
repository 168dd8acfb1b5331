//! Configuration loading
//!
//! The file is TOML. Top-level values missing from the file fall back to the
//! defaults; missing keymap entries stay unbound.

pub mod schema;

pub use schema::{Config, Keymap};

use crate::session::MotionParams;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl Config {
    pub fn from_toml(data: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> ConfigResult<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_toml(&data)
    }

    /// Load `path`, writing the default configuration there first if absent
    pub fn load_or_init(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            tracing::info!("No config found, writing default to {}", path.display());
            std::fs::write(path, Self::with_standard_keymap().to_toml()?)?;
        }
        tracing::info!("Loading config from {}", path.display());
        Self::load(path)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.rate == 0 {
            return Err(ConfigError::Invalid("rate must be positive".to_string()));
        }
        if self.scroll_rate == 0 {
            return Err(ConfigError::Invalid(
                "scroll_rate must be positive".to_string(),
            ));
        }

        let scalars = [
            ("speed", self.speed),
            ("min_speed", self.min_speed),
            ("acceleration", self.acceleration),
            ("max_acceleration", self.max_acceleration),
            ("deceleration", self.deceleration),
        ];
        for (name, value) in scalars {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Session parameters for a screen of the given size
    pub fn motion_params(&self, (width, height): (u16, u16)) -> MotionParams {
        MotionParams {
            tick_interval: (Duration::from_secs(1) / self.rate).max(Duration::from_micros(1)),
            speed: self.speed,
            min_speed: self.min_speed,
            accel_increment: self.acceleration,
            accel_ceiling: self.max_acceleration,
            decel_decrement: self.deceleration,
            scroll_interval: Duration::from_millis(1000 / u64::from(self.scroll_rate)),
            screen_width: f64::from(width),
            screen_height: f64::from(height),
        }
    }
}
