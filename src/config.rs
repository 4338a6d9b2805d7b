use std::{env, time::Duration};

use crate::error::ConfigError;

pub const MEMORY_ALLOC_MB_VAR: &str = "MEMORY_ALLOC_MB";
pub const WAIT_SECONDS_VAR: &str = "WAIT_SECONDS";

pub const DEFAULT_MEMORY_ALLOC_MB: i64 = 512;
pub const DEFAULT_WAIT_SECONDS: i64 = 30;

/// Jak často se v idle stavu vypisuje heartbeat + statistiky. Z env se nečte.
pub const REPORT_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Kolik MB alokovat a držet
    pub memory_alloc_mb: u64,

    /// Jak dlouho (v sekundách) paměť držet před uvolněním
    pub wait_seconds: u64,

    pub report_interval: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        // var_os + lossy: ne-UTF8 hodnota skončí jako nevalidní číslo, ne jako "nenastaveno"
        Self::from_lookup(|name| env::var_os(name).map(|v| v.to_string_lossy().into_owned()))
    }

    /// Stejné jako `from_env`, jen s vlastním zdrojem proměnných (testy nesahají na env).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let memory_alloc_mb = resolve_non_negative(
            MEMORY_ALLOC_MB_VAR,
            lookup(MEMORY_ALLOC_MB_VAR).as_deref(),
            DEFAULT_MEMORY_ALLOC_MB,
        );
        let wait_seconds = resolve_non_negative(
            WAIT_SECONDS_VAR,
            lookup(WAIT_SECONDS_VAR).as_deref(),
            DEFAULT_WAIT_SECONDS,
        );

        Self {
            memory_alloc_mb,
            wait_seconds,
            report_interval: REPORT_INTERVAL,
        }
    }

    pub fn wait(&self) -> Duration {
        Duration::from_secs(self.wait_seconds)
    }
}

/// Přečte celé číslo z env proměnné `name`; při chybě zaloguje warning a vrátí default.
pub fn resolve_int(name: &str, raw: Option<&str>, default: i64) -> i64 {
    match parse_int(name, raw, default) {
        Ok(Some(v)) => v,
        Ok(None) => default,
        Err(e) => {
            crate::log_warn_display!(e, var = name, "invalid integer in environment");
            default
        }
    }
}

/// `Ok(None)` = nenastaveno nebo prázdné (tiše default), `Err` = nastaveno, ale nejde parsovat.
pub fn parse_int(name: &str, raw: Option<&str>, default: i64) -> Result<Option<i64>, ConfigError> {
    let raw = match raw {
        None | Some("") => return Ok(None),
        Some(s) => s,
    };

    raw.parse::<i64>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidInt {
            name: name.to_string(),
            value: raw.to_string(),
            default,
        })
}

fn resolve_non_negative(name: &str, raw: Option<&str>, default: i64) -> u64 {
    let value = resolve_int(name, raw, default);
    match clamp_non_negative(name, value) {
        Ok(v) => v,
        Err(e) => {
            crate::log_warn_display!(e, var = name, "negative value in environment");
            0
        }
    }
}

fn clamp_non_negative(name: &str, value: i64) -> Result<u64, ConfigError> {
    u64::try_from(value).map_err(|_| ConfigError::Negative {
        name: name.to_string(),
        value,
    })
}
