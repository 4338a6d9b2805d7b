use std::io::IsTerminal;

use tracing_subscriber::{EnvFilter, fmt::MakeWriter};

/// Warningy z čtení konfigurace se vypisují vždy, ať je RUST_LOG jakýkoliv.
const CONFIG_WARNINGS: &str = "vpa_memory_demo::config=warn";

/// Nastaví globální tracing subscriber (stdout, filtr z RUST_LOG, default "info").
pub fn init() {
    let directives = std::env::var("RUST_LOG").ok();
    let ansi = std::io::stdout().is_terminal();

    // v testech už může být subscriber nastavený - chybu ignorujeme
    let _ = tracing::subscriber::set_global_default(subscriber(
        env_filter(directives.as_deref()),
        std::io::stdout,
        ansi,
    ));
}

/// Filtr z RUST_LOG-like řetězce; nevalidní nebo chybějící → "info".
pub(crate) fn env_filter(directives: Option<&str>) -> EnvFilter {
    let filter = directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    match CONFIG_WARNINGS.parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}

pub(crate) fn subscriber<W>(
    filter: EnvFilter,
    writer: W,
    ansi: bool,
) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(ansi)
        .with_writer(writer)
        .finish()
}

#[macro_export]
macro_rules! log_anyhow_with_source {
    ($err:expr, $($rest:tt)+) => {{
        // Jasně řekneme, že pracujeme s anyhow::Error
        let err: &::anyhow::Error = &$err;

        // Nejnižší příčina chyby (root cause)
        let root = err.root_cause();

        ::tracing::error!(
            error = %err,       // např. "read /proc/self/status"
            root_cause = %root, // např. "No such file or directory (os error 2)"
            $($rest)+
        );
    }};
}

#[macro_export]
macro_rules! log_warn_display {
    ($err:expr, $($rest:tt)+) => {{
        ::tracing::warn!(
            error = %$err,
            $($rest)+
        );
    }};
}


#[cfg(test)]
mod tests {
    use super::{capture::logs_of, *};
    use crate::config::resolve_int;

    #[test]
    fn config_warning_survives_restrictive_filter() {
        for directives in ["off", "error", "vpa_memory_demo=off"] {
            let out = logs_of(env_filter(Some(directives)), || {
                assert_eq!(resolve_int("MEMORY_ALLOC_MB", Some("abc"), 512), 512);
            });
            assert!(
                out.contains("Invalid value for MEMORY_ALLOC_MB (abc), using default 512"),
                "RUST_LOG={directives}: {out:?}"
            );
        }
    }

    #[test]
    fn other_modules_still_follow_filter() {
        let out = logs_of(env_filter(Some("off")), || {
            tracing::warn!("not from config");
        });
        assert!(out.is_empty(), "{out:?}");
    }

    #[test]
    fn plain_writer_has_no_ansi_codes() {
        let out = logs_of(env_filter(None), || {
            resolve_int("WAIT_SECONDS", Some("x"), 30);
        });
        assert!(out.contains("WARN"), "{out:?}");
        assert!(!out.contains('\x1b'), "{out:?}");
    }
}
