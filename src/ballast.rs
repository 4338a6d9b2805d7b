use std::hint::black_box;

use crate::stats::{self, MIB, MemStats};

pub const PAGE_SIZE: usize = 4096;

/// Souvislý blok paměti, který drží lifecycle driver. Jediný vlastník.
#[derive(Debug)]
pub struct Ballast {
    data: Vec<u8>,
    megabytes: u64,
}

impl Ballast {
    /// Alokuje `megabytes` MB a zapíše na začátek každé stránky, aby se
    /// paměť opravdu commitnula (ne jen rezervovala). Selhání alokace = abort.
    pub fn allocate(megabytes: u64) -> Self {
        let size = usize::try_from(megabytes.saturating_mul(MIB)).unwrap_or(usize::MAX);

        let mut data = vec![0u8; size];
        for offset in (0..data.len()).step_by(PAGE_SIZE) {
            data[offset] = 1;
        }
        let data = black_box(data);

        println!("Successfully allocated {megabytes} MB of memory");
        Self { data, megabytes }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn megabytes(&self) -> u64 {
        self.megabytes
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

/// Uvolní ballast, vrátí volnou paměť OS a vrátí čerstvý snapshot statistik.
pub fn release(ballast: Ballast) -> MemStats {
    let bytes = ballast.len();
    drop(ballast);

    let trimmed = trim_heap();
    stats::record_reclaim_cycle();
    tracing::debug!(bytes, trimmed, "ballast released");

    MemStats::read()
}

#[cfg(all(target_os = "linux", target_env = "gnu"))]
fn trim_heap() -> bool {
    // malloc_trim vrací 1, pokud se něco vrátilo systému
    unsafe { libc::malloc_trim(0) == 1 }
}

#[cfg(not(all(target_os = "linux", target_env = "gnu")))]
fn trim_heap() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_is_exact_megabytes() {
        for mb in [1u64, 3, 10] {
            let b = Ballast::allocate(mb);
            assert_eq!(b.len(), mb as usize * 1_048_576);
            assert_eq!(b.megabytes(), mb);
        }
    }

    #[test]
    fn every_page_is_touched() {
        let b = Ballast::allocate(2);
        let data = b.as_slice();
        assert!((0..data.len()).step_by(PAGE_SIZE).all(|i| data[i] != 0));
        // mezi stránkami zůstávají nuly
        assert_eq!(data[1], 0);
        assert_eq!(data[PAGE_SIZE - 1], 0);
    }

    #[test]
    fn zero_megabytes_is_an_empty_buffer() {
        let b = Ballast::allocate(0);
        assert!(b.is_empty());
        let stats = release(b);
        assert!(stats.num_gc >= 1);
    }
}
