use thiserror::Error;

/// Chyby při čtení konfigurace z env. Nikdy neshodí proces - volající
/// je zaloguje a použije default.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name} ({value}), using default {default}")]
    InvalidInt {
        name: String,
        value: String,
        default: i64,
    },

    #[error("Negative value for {name} ({value}), clamping to 0")]
    Negative { name: String, value: i64 },
}
