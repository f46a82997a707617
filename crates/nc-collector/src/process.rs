//! Resource usage of the exporter process itself.

use std::sync::Mutex;

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, RefreshKind, System};
use tracing::debug;

use nc_metrics::ProcessStats;

/// Samples CPU, memory and descriptor usage of the current process.
pub struct ProcessSampler {
    pid: Option<Pid>,
    system: Mutex<System>,
}

impl ProcessSampler {
    pub fn new() -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                debug!(error = e, "process metrics unavailable on this platform");
                None
            }
        };
        Self {
            pid,
            system: Mutex::new(System::new_with_specifics(RefreshKind::nothing())),
        }
    }

    /// Refresh and read the current process. `None` when the platform does
    /// not expose it.
    pub fn sample(&self) -> Option<ProcessStats> {
        let pid = self.pid?;
        let mut system = self
            .system
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::everything(),
        );
        let process = system.process(pid)?;

        Some(ProcessStats {
            cpu_seconds: process.accumulated_cpu_time() as f64 / 1000.0,
            resident_memory_bytes: process.memory(),
            virtual_memory_bytes: process.virtual_memory(),
            start_time_seconds: process.start_time(),
            open_fds: process.open_files().map(|n| n as u64),
            max_fds: process.open_files_limit().map(|n| n as u64),
        })
    }
}

impl Default for ProcessSampler {
    fn default() -> Self {
        Self::new()
    }
}
