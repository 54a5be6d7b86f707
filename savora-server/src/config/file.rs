//! TOML file configuration structures.
//!
//! These structs directly map to the `savora-config.toml` file format.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub sweeper: SweeperSection,
    #[serde(default)]
    pub reservation: ReservationSection,
    #[serde(default)]
    pub unblock: UnblockSection,
    pub bank: BankSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    // Port chosen to stay clear of the usual dev-server defaults.
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

/// Expiry sweeper section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweeperSection {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_batch_size")]
    pub batch_size: i64,
    #[serde(default = "default_grace_minutes")]
    pub grace_minutes: i64,
}

impl Default for SweeperSection {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_interval_secs(),
            batch_size: default_batch_size(),
            grace_minutes: default_grace_minutes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationSection {
    #[serde(default = "default_hold_minutes")]
    pub hold_minutes: i64,
}

impl Default for ReservationSection {
    fn default() -> Self {
        Self {
            hold_minutes: default_hold_minutes(),
        }
    }
}

/// Self-unblock flow section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnblockSection {
    #[serde(default = "default_cooldown_days")]
    pub cooldown_days: i64,
    #[serde(default = "default_amount_cents")]
    pub amount_cents: i32,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_payment_expiry_days")]
    pub payment_expiry_days: i64,
    #[serde(default = "default_keep_active_strikes")]
    pub keep_active_strikes: usize,
}

impl Default for UnblockSection {
    fn default() -> Self {
        Self {
            cooldown_days: default_cooldown_days(),
            amount_cents: default_amount_cents(),
            currency: default_currency(),
            payment_expiry_days: default_payment_expiry_days(),
            keep_active_strikes: default_keep_active_strikes(),
        }
    }
}

/// Static bank-transfer instructions quoted to customers initiating a
/// self-unblock. No defaults: a deployment must state where the money goes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankSection {
    pub beneficiary_name: String,
    pub iban: String,
    pub bank_name: String,
}

fn default_true() -> bool {
    true
}
fn default_interval_secs() -> u64 {
    30
}
fn default_batch_size() -> i64 {
    200
}
fn default_grace_minutes() -> i64 {
    30
}
fn default_hold_minutes() -> i64 {
    15
}
fn default_cooldown_days() -> i64 {
    10
}
fn default_amount_cents() -> i32 {
    500
}
fn default_currency() -> String {
    "ALL".to_owned()
}
fn default_payment_expiry_days() -> i64 {
    3
}
fn default_keep_active_strikes() -> usize {
    2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_documented_defaults() {
        let toml_str = r#"
[bank]
beneficiary_name = "SAVORA SHPK"
iban = "AL00000000000000000000000000"
bank_name = "Test Bank"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen.port(), 8080);
        assert!(config.sweeper.enabled);
        assert_eq!(config.sweeper.interval_secs, 30);
        assert_eq!(config.sweeper.batch_size, 200);
        assert_eq!(config.sweeper.grace_minutes, 30);
        assert_eq!(config.reservation.hold_minutes, 15);
        assert_eq!(config.unblock.cooldown_days, 10);
        assert_eq!(config.unblock.amount_cents, 500);
        assert_eq!(config.unblock.currency, "ALL");
        assert_eq!(config.unblock.payment_expiry_days, 3);
        assert_eq!(config.unblock.keep_active_strikes, 2);
        assert_eq!(config.bank.beneficiary_name, "SAVORA SHPK");
    }

    #[test]
    fn test_full_config_parsing() {
        let toml_str = r#"
[server]
listen = "127.0.0.1:3000"

[sweeper]
enabled = false
interval_secs = 5
batch_size = 50
grace_minutes = 10

[reservation]
hold_minutes = 20

[unblock]
cooldown_days = 7
amount_cents = 1000
currency = "EUR"
payment_expiry_days = 1
keep_active_strikes = 1

[bank]
beneficiary_name = "ACME"
iban = "AL11111111111111111111111111"
bank_name = "Other Bank"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen.port(), 3000);
        assert!(!config.sweeper.enabled);
        assert_eq!(config.sweeper.interval_secs, 5);
        assert_eq!(config.reservation.hold_minutes, 20);
        assert_eq!(config.unblock.currency, "EUR");
        assert_eq!(config.unblock.keep_active_strikes, 1);
    }

    #[test]
    fn test_missing_bank_section_is_rejected() {
        let config: Result<FileConfig, _> = toml::from_str("[server]\n");
        assert!(config.is_err());
    }
}
