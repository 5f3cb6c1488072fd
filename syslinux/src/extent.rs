//! Run-length encoding of sector lists

use crate::layout::RunLimit;
use alloc::vec::Vec;

/// Consecutive sectors `start..start + len`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectorRun {
    /// First sector
    pub start: u64,
    /// Number of sectors
    pub len: u64,
}

/// Collapse `sectors` into runs
///
/// A run grows while the next sector directly follows it, its length
/// stays at or below `max_len` and `limit` allows it. Everything else
/// starts a new run, so duplicates and descending lists are fine.
pub fn encode_runs(sectors: &[u64], sector_size: u64, max_len: u64, limit: RunLimit) -> Vec<SectorRun> {
    let mut runs: Vec<SectorRun> = Vec::new();
    let (mut addr, max_bytes) = match limit {
        RunLimit::Unbounded => (0, u64::MAX),
        RunLimit::LoadWindow { base, max_bytes } => (base, max_bytes),
    };
    let mut run_base = addr;

    for &sector in sectors {
        let extend = runs.last().is_some_and(|run| {
            let bytes = (run.len + 1).saturating_mul(sector_size);
            run.start.checked_add(run.len) == Some(sector)
                && run.len < max_len
                && bytes < max_bytes
                && fits_window(limit, addr, run_base, bytes)
        });

        match runs.last_mut() {
            Some(run) if extend => run.len += 1,
            _ => {
                run_base = addr;
                runs.push(SectorRun { start: sector, len: 1 });
            }
        }
        addr = addr.wrapping_add(sector_size);
    }

    runs
}

/// The run's last byte must share the 64 KiB segment of the sector being
/// added. A run only ever grows by the sector at `addr`, so this holds for
/// every extension and `max_bytes` is what actually bounds a run.
fn fits_window(limit: RunLimit, addr: u64, run_base: u64, bytes: u64) -> bool {
    match limit {
        RunLimit::Unbounded => true,
        RunLimit::LoadWindow { .. } => {
            (addr ^ run_base.wrapping_add(bytes).wrapping_sub(1)) & !0xFFFF == 0
        }
    }
}

/// Inverse of [`encode_runs`]
pub fn expand_runs(runs: &[SectorRun]) -> Vec<u64> {
    runs.iter()
        .flat_map(|run| (0..run.len).map(move |i| run.start + i))
        .collect()
}
