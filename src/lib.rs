pub mod ballast;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod procfs;
pub mod stats;

// Počítání živých/kumulativních bytů pro "Memory Stats" výpis
#[global_allocator]
static GLOBAL: stats::CountingAlloc = stats::CountingAlloc;
