use std::path::Path;

use anyhow::{Context, Result};

const SELF_STATUS: &str = "/proc/self/status";

/// Paměťové položky z /proc/<pid>/status (v bytech).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcStatus {
    pub rss_bytes: u64,
    pub hwm_bytes: u64,
    pub vms_bytes: u64,
    pub swap_bytes: u64,
}

fn read_to_string(path: &Path) -> Result<String> {
    Ok(std::fs::read_to_string(path)?.trim().to_string())
}

/// Načte status vlastního procesu.
pub fn read_self_status() -> Result<ProcStatus> {
    read_status(Path::new(SELF_STATUS))
}

pub fn read_status(path: &Path) -> Result<ProcStatus> {
    let content = read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    Ok(parse_status(&content))
}

pub fn parse_status(content: &str) -> ProcStatus {
    let mut rss_kb = 0u64;
    let mut hwm_kb = 0u64;
    let mut vms_kb = 0u64;
    let mut swap_kb = 0u64;

    for line in content.lines() {
        if line.starts_with("VmRSS:") {
            rss_kb = grab_kb(line);
        } else if line.starts_with("VmHWM:") {
            hwm_kb = grab_kb(line);
        } else if line.starts_with("VmSize:") {
            vms_kb = grab_kb(line);
        } else if line.starts_with("VmSwap:") {
            swap_kb = grab_kb(line);
        }
    }

    ProcStatus {
        rss_bytes: rss_kb * 1024,
        hwm_bytes: hwm_kb * 1024,
        vms_bytes: vms_kb * 1024,
        swap_bytes: swap_kb * 1024,
    }
}

fn grab_kb(line: &str) -> u64 {
    line.split_whitespace()
        .nth(1)
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Name:\tvpa-memory-demo
Umask:\t0022
State:\tS (sleeping)
VmPeak:\t  600000 kB
VmSize:\t  593920 kB
VmHWM:\t  530432 kB
VmRSS:\t  528384 kB
RssAnon:\t  524288 kB
VmSwap:\t       0 kB
Threads:\t1";

    #[test]
    fn parses_memory_lines() {
        let st = parse_status(SAMPLE);
        assert_eq!(st.rss_bytes, 528_384 * 1024);
        assert_eq!(st.hwm_bytes, 530_432 * 1024);
        assert_eq!(st.vms_bytes, 593_920 * 1024);
        assert_eq!(st.swap_bytes, 0);
    }

    #[test]
    fn missing_or_garbled_lines_read_as_zero() {
        let st = parse_status("Name:\tx\nVmRSS:\tnope kB\n");
        assert_eq!(st, ProcStatus::default());
    }

    #[test]
    fn missing_file_carries_path_in_context() {
        let err = read_status(Path::new("/nonexistent/status")).unwrap_err();
        assert_eq!(err.to_string(), "read /nonexistent/status");
        assert!(err.root_cause().to_string().contains("No such file"));
    }
}
