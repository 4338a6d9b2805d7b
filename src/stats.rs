//! Process memory accounting: counting global allocator + /proc/self/status.

use std::{
    alloc::{GlobalAlloc, Layout, System},
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::procfs;

pub const MIB: u64 = 1024 * 1024;

static LIVE_BYTES: AtomicU64 = AtomicU64::new(0);
static TOTAL_BYTES: AtomicU64 = AtomicU64::new(0);
static RECLAIM_CYCLES: AtomicU64 = AtomicU64::new(0);

/// Obal kolem systémového alokátoru, který počítá živé a kumulativně
/// alokované byty. Registruje se jako `#[global_allocator]` v lib.rs.
pub struct CountingAlloc;

fn on_alloc(size: usize) {
    LIVE_BYTES.fetch_add(size as u64, Ordering::Relaxed);
    TOTAL_BYTES.fetch_add(size as u64, Ordering::Relaxed);
}

fn on_dealloc(size: usize) {
    LIVE_BYTES.fetch_sub(size as u64, Ordering::Relaxed);
}

unsafe impl GlobalAlloc for CountingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            on_alloc(layout.size());
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        // velké nulové bloky jdou přes calloc/mmap bez zápisu - stránky se commitnou až při dotyku
        let ptr = unsafe { System.alloc_zeroed(layout) };
        if !ptr.is_null() {
            on_alloc(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) };
        on_dealloc(layout.size());
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = unsafe { System.realloc(ptr, layout, new_size) };
        if !new_ptr.is_null() {
            // realloc = nová alokace + uvolnění staré
            on_alloc(new_size);
            on_dealloc(layout.size());
        }
        new_ptr
    }
}

/// Zaznamená dokončený reclamation cyklus (viz `ballast::release`).
pub(crate) fn record_reclaim_cycle() {
    RECLAIM_CYCLES.fetch_add(1, Ordering::Relaxed);
}

/// Snapshot paměťových statistik procesu v okamžiku čtení.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemStats {
    /// Aktuálně živé byty na heapu
    pub alloc_bytes: u64,
    /// Kumulativně alokované byty od startu
    pub total_alloc_bytes: u64,
    /// Paměť rezervovaná od OS = VmSize (0, pokud /proc není k dispozici).
    /// RSS jde jen do debug logu.
    pub sys_bytes: u64,
    pub num_gc: u64,
}

impl MemStats {
    pub fn read() -> Self {
        let sys_bytes = match procfs::read_self_status() {
            Ok(st) => {
                tracing::debug!(
                    rss_bytes = st.rss_bytes,
                    hwm_bytes = st.hwm_bytes,
                    vms_bytes = st.vms_bytes,
                    swap_bytes = st.swap_bytes,
                    "process status"
                );
                reserved_bytes(&st)
            }
            Err(e) => {
                crate::log_anyhow_with_source!(e, "could not read process memory status");
                0
            }
        };

        Self {
            alloc_bytes: LIVE_BYTES.load(Ordering::Relaxed),
            total_alloc_bytes: TOTAL_BYTES.load(Ordering::Relaxed),
            sys_bytes,
            num_gc: RECLAIM_CYCLES.load(Ordering::Relaxed),
        }
    }

    pub fn alloc_mb(&self) -> u64 {
        self.alloc_bytes / MIB
    }

    pub fn total_alloc_mb(&self) -> u64 {
        self.total_alloc_bytes / MIB
    }

    pub fn sys_mb(&self) -> u64 {
        self.sys_bytes / MIB
    }
}

impl fmt::Display for MemStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Memory Stats:")?;
        writeln!(f, "  - Allocated: {} MB", self.alloc_mb())?;
        writeln!(f, "  - Total Allocated: {} MB", self.total_alloc_mb())?;
        writeln!(f, "  - System Memory: {} MB", self.sys_mb())?;
        write!(f, "  - Num GC: {}", self.num_gc)
    }
}

fn reserved_bytes(st: &procfs::ProcStatus) -> u64 {
    st.vms_bytes
}

/// Přečte aktuální statistiky, vypíše je na stdout a vrátí je volajícímu.
pub fn print_stats() -> MemStats {
    let stats = MemStats::read();
    println!("{stats}");
    stats
}
