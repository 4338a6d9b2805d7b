//! Allocate → hold → release → idle.

use std::time::Duration;

use chrono::{DateTime, Local, SecondsFormat, TimeZone};
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::{
    ballast::{self, Ballast},
    config::Config,
    stats::{self, MemStats},
};

/// Co se během běhu naměřilo.
#[derive(Debug, Clone, Copy)]
pub struct Trace {
    pub held: MemStats,
    pub released: MemStats,
    pub heartbeats: u64,
}

/// Celý lifecycle. S `max_heartbeats = None` se z idle smyčky nikdy nevrátí.
pub async fn run(cfg: &Config, max_heartbeats: Option<u64>) -> Trace {
    print_banner(cfg);

    let ballast = allocate(cfg);
    let held = stats::print_stats();

    println!(
        "Waiting for {} seconds before releasing memory...",
        cfg.wait_seconds
    );
    time::sleep(cfg.wait()).await;

    println!("Releasing memory...");
    let released = ballast::release(ballast);
    println!("{released}");

    println!("Memory released. Running with minimal resources...");
    println!("Application will continue running indefinitely. Press Ctrl+C to stop.");

    let heartbeats = idle(cfg.report_interval, max_heartbeats).await;

    Trace {
        held,
        released,
        heartbeats,
    }
}

fn print_banner(cfg: &Config) {
    println!("Starting VPA Demo Application");
    println!("Configuration:");
    println!("  - Memory to allocate: {} MB", cfg.memory_alloc_mb);
    println!("  - Wait time before release: {} seconds", cfg.wait_seconds);
}

fn allocate(cfg: &Config) -> Ballast {
    println!("Allocating {} MB of memory...", cfg.memory_alloc_mb);
    Ballast::allocate(cfg.memory_alloc_mb)
}

/// Každých `period` vypíše heartbeat se statistikami. První tick až po celé periodě.
pub async fn idle(period: Duration, max_heartbeats: Option<u64>) -> u64 {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut beats = 0u64;
    loop {
        if max_heartbeats.is_some_and(|max| beats >= max) {
            return beats;
        }

        ticker.tick().await;
        heartbeat();
        beats += 1;
    }
}

fn heartbeat() {
    println!("{}", heartbeat_line(&Local::now()));
    stats::print_stats();
}

fn heartbeat_line<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "Still running... (timestamp: {})",
        now.to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, Utc};

    use super::*;

    fn timestamp_of(line: &str) -> &str {
        line.strip_prefix("Still running... (timestamp: ")
            .and_then(|rest| rest.strip_suffix(')'))
            .unwrap()
    }

    #[test]
    fn heartbeat_line_carries_rfc3339_timestamp() {
        let now = Local::now();
        let line = heartbeat_line(&now);
        let parsed = DateTime::parse_from_rfc3339(timestamp_of(&line)).unwrap();
        assert_eq!(parsed.timestamp(), now.timestamp());
    }

    #[test]
    fn heartbeat_line_keeps_offset() {
        let utc = Utc.with_ymd_and_hms(2026, 10, 18, 12, 30, 0).unwrap();
        assert_eq!(
            heartbeat_line(&utc),
            "Still running... (timestamp: 2026-10-18T12:30:00Z)"
        );

        let prague = FixedOffset::east_opt(2 * 3600).unwrap();
        let local = utc.with_timezone(&prague);
        assert_eq!(
            heartbeat_line(&local),
            "Still running... (timestamp: 2026-10-18T14:30:00+02:00)"
        );
    }
}
