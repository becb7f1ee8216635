use std::ffi::OsString;

use chrono::TimeDelta;
use thiserror::Error;

use crate::{
    display::{DEFAULT_MIN_DECIMALS, MAX_MIN_DECIMALS},
    identifier::DEFAULT_MAX_ATTEMPTS,
    store::query::RECENT_WINDOW_DAYS,
    tenant::{TenantCode, TenantCodeError},
};

pub const TENANT_VAR: &str = "WTN_TENANT";
pub const MAX_IDENTIFIER_ATTEMPTS_VAR: &str = "WTN_MAX_IDENTIFIER_ATTEMPTS";
pub const MIN_DISPLAY_DECIMALS_VAR: &str = "WTN_MIN_DISPLAY_DECIMALS";
pub const RECENT_WINDOW_DAYS_VAR: &str = "WTN_RECENT_WINDOW_DAYS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("`{var}` must be a non-negative integer, got `{value}`")]
    NotANumber { var: &'static str, value: String },
    #[error("`WTN_MAX_IDENTIFIER_ATTEMPTS` must be at least 1")]
    NoIdentifierAttempts,
    #[error("`WTN_MIN_DISPLAY_DECIMALS` must be at most {max}, got {value}")]
    TooManyDecimals { value: u32, max: u32 },
    #[error(transparent)]
    Tenant(#[from] TenantCodeError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    pub tenant: TenantCode,
    pub max_identifier_attempts: u32,
    pub min_display_decimals: u32,
    pub recent_window_days: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            tenant: TenantCode::default(),
            max_identifier_attempts: DEFAULT_MAX_ATTEMPTS,
            min_display_decimals: DEFAULT_MIN_DECIMALS,
            recent_window_days: RECENT_WINDOW_DAYS,
        }
    }
}

impl LedgerConfig {
    /// Applies `WTN_*` overrides on top of the defaults. Unknown variables are ignored.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in vars {
            let value = value.as_ref();
            match key.as_ref() {
                TENANT_VAR => config.tenant = TenantCode::parse(value)?,
                MAX_IDENTIFIER_ATTEMPTS_VAR => {
                    config.max_identifier_attempts =
                        parse_number(MAX_IDENTIFIER_ATTEMPTS_VAR, value)?;
                    if config.max_identifier_attempts == 0 {
                        return Err(ConfigError::NoIdentifierAttempts);
                    }
                }
                MIN_DISPLAY_DECIMALS_VAR => {
                    config.min_display_decimals = parse_number(MIN_DISPLAY_DECIMALS_VAR, value)?;
                    if config.min_display_decimals > MAX_MIN_DECIMALS {
                        return Err(ConfigError::TooManyDecimals {
                            value: config.min_display_decimals,
                            max: MAX_MIN_DECIMALS,
                        });
                    }
                }
                RECENT_WINDOW_DAYS_VAR => {
                    config.recent_window_days = parse_number(RECENT_WINDOW_DAYS_VAR, value)?
                }
                _ => {}
            }
        }
        Ok(config)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_os_vars(std::env::vars_os())
    }

    /// Like [`Self::from_vars`], for raw OS strings. Non-UTF-8 text is replaced
    /// lossily, so a garbled `WTN_*` value is reported instead of skipped.
    pub fn from_os_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        Self::from_vars(vars.into_iter().map(|(key, value)| {
            (
                key.to_string_lossy().into_owned(),
                value.to_string_lossy().into_owned(),
            )
        }))
    }

    pub fn recent_window(&self) -> TimeDelta {
        TimeDelta::days(i64::from(self.recent_window_days))
    }
}

fn parse_number(var: &'static str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::NotANumber {
        var,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_storage_policy() {
        let config = LedgerConfig::default();
        assert_eq!(config.tenant.as_str(), "WTN");
        assert_eq!(config.max_identifier_attempts, 1000);
        assert_eq!(config.min_display_decimals, 2);
        assert_eq!(config.recent_window(), TimeDelta::days(30));
    }

    #[test]
    fn overrides_are_applied() {
        let config = LedgerConfig::from_vars([
            ("WTN_TENANT", "ACME"),
            ("WTN_MAX_IDENTIFIER_ATTEMPTS", "10"),
            ("WTN_MIN_DISPLAY_DECIMALS", " 3 "),
            ("WTN_RECENT_WINDOW_DAYS", "7"),
            ("HOME", "/root"),
        ])
        .unwrap();
        assert_eq!(config.tenant.as_str(), "ACME");
        assert_eq!(config.max_identifier_attempts, 10);
        assert_eq!(config.min_display_decimals, 3);
        assert_eq!(config.recent_window(), TimeDelta::days(7));
    }

    #[test]
    fn bad_values_are_reported() {
        assert_eq!(
            LedgerConfig::from_vars([("WTN_MIN_DISPLAY_DECIMALS", "two")]).unwrap_err(),
            ConfigError::NotANumber {
                var: MIN_DISPLAY_DECIMALS_VAR,
                value: "two".to_string()
            }
        );
        assert_eq!(
            LedgerConfig::from_vars([("WTN_MAX_IDENTIFIER_ATTEMPTS", "0")]).unwrap_err(),
            ConfigError::NoIdentifierAttempts
        );
        assert!(matches!(
            LedgerConfig::from_vars([("WTN_TENANT", "acme")]),
            Err(ConfigError::Tenant(_))
        ));
    }

    #[test]
    fn display_decimals_are_bounded() {
        assert_eq!(
            LedgerConfig::from_vars([("WTN_MIN_DISPLAY_DECIMALS", "4")])
                .unwrap()
                .min_display_decimals,
            4
        );
        let err =
            LedgerConfig::from_vars([("WTN_MIN_DISPLAY_DECIMALS", "4000000000")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::TooManyDecimals {
                value: 4_000_000_000,
                max: 4
            }
        );
        assert_eq!(
            err.to_string(),
            "`WTN_MIN_DISPLAY_DECIMALS` must be at most 4, got 4000000000"
        );
    }

    #[cfg(unix)]
    #[test]
    fn non_unicode_variables_do_not_abort() {
        use std::os::unix::ffi::OsStringExt;

        let config = LedgerConfig::from_os_vars([
            (OsString::from("LC_GARBAGE"), OsString::from_vec(vec![0xff, 0xfe])),
            (OsString::from_vec(vec![b'X', 0xff]), OsString::from("1")),
            (OsString::from("WTN_RECENT_WINDOW_DAYS"), OsString::from("9")),
        ])
        .unwrap();
        assert_eq!(config.recent_window(), TimeDelta::days(9));

        assert!(matches!(
            LedgerConfig::from_os_vars([(
                OsString::from("WTN_MIN_DISPLAY_DECIMALS"),
                OsString::from_vec(vec![b'2', 0xff]),
            )]),
            Err(ConfigError::NotANumber {
                var: MIN_DISPLAY_DECIMALS_VAR,
                ..
            })
        ));
    }
}
