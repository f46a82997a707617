//! Exporter process statistics → observations.

use crate::schema::{Observation, Schema};

/// Resource usage of the exporter process at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessStats {
    /// User plus system CPU time.
    pub cpu_seconds: f64,
    pub resident_memory_bytes: u64,
    pub virtual_memory_bytes: u64,
    /// Seconds since the unix epoch.
    pub start_time_seconds: u64,
    /// Not every platform reports descriptor counts.
    pub open_fds: Option<u64>,
    pub max_fds: Option<u64>,
}

/// Map process statistics onto the `process_*` families.
///
/// Descriptor families are skipped when the platform did not report them.
pub fn map_process<'s>(schema: &'s Schema, stats: &ProcessStats) -> Vec<Observation<'s>> {
    let mut out = vec![
        Observation::unlabeled(&schema.process_cpu_seconds, stats.cpu_seconds),
        Observation::unlabeled(
            &schema.process_resident_memory,
            stats.resident_memory_bytes as f64,
        ),
        Observation::unlabeled(
            &schema.process_virtual_memory,
            stats.virtual_memory_bytes as f64,
        ),
        Observation::unlabeled(&schema.process_start_time, stats.start_time_seconds as f64),
    ];

    if let Some(open) = stats.open_fds {
        out.push(Observation::unlabeled(&schema.process_open_fds, open as f64));
    }
    if let Some(max) = stats.max_fds {
        out.push(Observation::unlabeled(&schema.process_max_fds, max as f64));
    }
    out
}
