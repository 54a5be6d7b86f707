//! Configuration module for savora-server.
//!
//! Handles loading configuration from the TOML file, CLI overrides, and the
//! `DATABASE_URL` environment variable, and converts the file sections into
//! the core crate's typed configs.

pub mod file;

use crate::config::file::{BankSection, FileConfig};
use savora_core::processors::SweeperConfig;
use savora_core::reservation::ReservationConfig;
use savora_core::unblock::UnblockConfig;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("DATABASE_URL environment variable not set")]
    MissingDatabaseUrl,
}

/// Fully validated runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub listen: SocketAddr,
    pub sweeper: SweeperConfig,
    pub reservation: ReservationConfig,
    pub unblock: UnblockConfig,
    pub bank: BankSection,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Read the TOML file, apply CLI overrides, validate, and convert to
    /// the runtime representation.
    pub fn load(&self) -> Result<RuntimeConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        let mut file_config: FileConfig = toml::from_str(&config_content)?;

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        validate(&file_config)?;
        Ok(build_runtime_config(file_config))
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    if config.sweeper.interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "sweeper.interval_secs must be greater than zero".to_owned(),
        ));
    }
    if config.sweeper.batch_size <= 0 {
        return Err(ConfigError::ValidationError(
            "sweeper.batch_size must be greater than zero".to_owned(),
        ));
    }
    if config.sweeper.grace_minutes < 0 {
        return Err(ConfigError::ValidationError(
            "sweeper.grace_minutes must not be negative".to_owned(),
        ));
    }
    if config.reservation.hold_minutes <= 0 {
        return Err(ConfigError::ValidationError(
            "reservation.hold_minutes must be greater than zero".to_owned(),
        ));
    }
    if config.unblock.amount_cents <= 0 {
        return Err(ConfigError::ValidationError(
            "unblock.amount_cents must be greater than zero".to_owned(),
        ));
    }
    if config.unblock.payment_expiry_days <= 0 {
        return Err(ConfigError::ValidationError(
            "unblock.payment_expiry_days must be greater than zero".to_owned(),
        ));
    }
    if config.bank.iban.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "bank.iban must not be empty".to_owned(),
        ));
    }
    Ok(())
}

fn build_runtime_config(file_config: FileConfig) -> RuntimeConfig {
    RuntimeConfig {
        listen: file_config.server.listen,
        sweeper: SweeperConfig {
            enabled: file_config.sweeper.enabled,
            interval: std::time::Duration::from_secs(file_config.sweeper.interval_secs),
            batch_size: file_config.sweeper.batch_size,
            grace: time::Duration::minutes(file_config.sweeper.grace_minutes),
        },
        reservation: ReservationConfig {
            hold: time::Duration::minutes(file_config.reservation.hold_minutes),
        },
        unblock: UnblockConfig {
            cooldown_days: file_config.unblock.cooldown_days,
            amount_cents: file_config.unblock.amount_cents,
            currency: file_config.unblock.currency,
            payment_expiry_days: file_config.unblock.payment_expiry_days,
            keep_active_strikes: file_config.unblock.keep_active_strikes,
        },
        bank: file_config.bank,
    }
}

/// Get the database URL from the environment.
pub fn get_database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::file::{ReservationSection, ServerSection, SweeperSection, UnblockSection};

    fn base_config() -> FileConfig {
        FileConfig {
            server: ServerSection::default(),
            sweeper: SweeperSection::default(),
            reservation: ReservationSection::default(),
            unblock: UnblockSection::default(),
            bank: BankSection {
                beneficiary_name: "SAVORA SHPK".to_owned(),
                iban: "AL00000000000000000000000000".to_owned(),
                bank_name: "Test Bank".to_owned(),
            },
        }
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = base_config();
        config.sweeper.interval_secs = 0;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_conversion_to_core_configs() {
        let runtime = build_runtime_config(base_config());
        assert_eq!(runtime.sweeper.interval, std::time::Duration::from_secs(30));
        assert_eq!(runtime.sweeper.grace, time::Duration::minutes(30));
        assert_eq!(runtime.reservation.hold, time::Duration::minutes(15));
        assert_eq!(runtime.unblock.keep_active_strikes, 2);
    }
}
